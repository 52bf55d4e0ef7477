//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Coordinator`, `Supervisor` (start, sweep, shutdown).
//! - **Consumers**: the coordinator's subscriber listener, which fans out to the
//!   `SubscriberSet` (`LogWriter`, `AliveTracker`, user subscribers).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
