//! # Subscriber hook for lifecycle events.
//!
//! Implement [`Subscribe`] to react to worker deaths, lost workers, shutdown
//! and the rest of [`EventKind`](crate::EventKind). Each subscriber is fed from
//! its own bounded queue on its own tokio task, so a slow or panicking
//! subscriber never holds up the monitor loop.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use botvisor::{Event, EventKind, Subscribe};
//!
//! struct LostWorkerAlarm;
//!
//! #[async_trait]
//! impl Subscribe for LostWorkerAlarm {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::WorkerLost {
//!             eprintln!("bot {} is gone for good", ev.worker.as_deref().unwrap_or("?"));
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "lost-worker-alarm"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Consumer of runtime events.
///
/// `on_event` runs on the async runtime: do not block in it.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Events arrive in publish order for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Name used in logs when events are dropped or the handler panics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Bound of this subscriber's queue; events beyond it are dropped.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
