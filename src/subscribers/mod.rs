//! # Event subscribers for the botvisor runtime.
//!
//! This module provides the [`Subscribe`] trait and built-in implementations
//! for handling runtime events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Supervisor ── publish(Event) ──► Bus ──► coordinator listener ──► SubscriberSet
//!                                                                       │
//!                                                    ┌──────────────────┼──────────┐
//!                                                    ▼                  ▼          ▼
//!                                                LogWriter        AliveTracker   Custom
//!                                              (tracing output)  (reporting view)
//! ```

mod alive;
mod log;
mod set;
mod subscriber;

pub use alive::AliveTracker;
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
