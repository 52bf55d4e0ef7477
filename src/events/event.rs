//! # Lifecycle events of the bot runtime.
//!
//! [`EventKind`] groups what the coordinator and supervisor report:
//! - backend choice (`BackendResolved`);
//! - worker lifecycle: start, skip, failed start, death, restart, loss;
//! - monitor and shutdown milestones.
//!
//! [`Event`] carries the kind plus optional worker name, reason and launch
//! generation. `seq` comes from a process-wide counter, so sorting by `seq`
//! recovers publish order even after per-subscriber queues reorder delivery.
//!
//! ## Example
//! ```rust
//! use botvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::WorkerDied)
//!     .with_worker("Twitter")
//!     .with_reason("thread exited")
//!     .with_generation(2);
//!
//! assert_eq!(ev.kind, EventKind::WorkerDied);
//! assert_eq!(ev.worker.as_deref(), Some("Twitter"));
//! assert_eq!(ev.reason.as_deref(), Some("thread exited"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Process-wide source of `Event::seq`.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Backend events ===
    /// A backend was resolved.
    ///
    /// Sets:
    /// - `reason`: `"<kind> <model name>"`
    BackendResolved,

    // === Worker events ===
    /// Worker launched on its own execution context and added to the active set.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `generation`: 1 for the first launch, +1 per restart
    WorkerStarted,

    /// Worker not started because its prerequisites are unmet (disabled / missing credentials).
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `reason`: why it was skipped
    WorkerSkipped,

    /// Worker prerequisites were met but launching it failed.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `reason`: failure message
    WorkerStartFailed,

    /// Worker execution context terminated unexpectedly; removed from the active set.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `generation`: generation that died
    WorkerDied,

    /// The single restart attempt after a death succeeded.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `generation`: new generation
    WorkerRestarted,

    /// The single restart attempt after a death failed; the worker is gone for good.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `reason`: restart failure message
    WorkerLost,

    // === Monitor / shutdown events ===
    /// Monitor loop entered.
    MonitorStarted,

    /// Active set became empty; the monitor loop ends.
    NoWorkersLeft,

    /// External stop signal observed by the coordinator.
    ShutdownRequested,

    /// Supervisor shutdown finished (published once, on the first `shutdown()` call).
    ///
    /// Sets:
    /// - `reason`: comma-separated names of detached workers left running
    ShutdownCompleted,
}

/// One published event; which optional fields are set depends on `kind`.
#[derive(Clone, Debug)]
pub struct Event {
    /// Publish order across the process.
    pub seq: u64,
    pub at: SystemTime,
    pub kind: EventKind,
    /// Name of the worker, if applicable.
    pub worker: Option<Arc<str>>,
    /// Human-readable reason (errors, skip details, etc.).
    pub reason: Option<Arc<str>>,
    /// Launch generation of the worker (starting from 1).
    pub generation: Option<u32>,
}

impl Event {
    /// Stamps a new event with the next `seq` and the current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            reason: None,
            generation: None,
        }
    }

    /// Attaches a worker name.
    #[inline]
    pub fn with_worker(mut self, worker: impl Into<Arc<str>>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a launch generation.
    #[inline]
    pub fn with_generation(mut self, generation: u32) -> Self {
        self.generation = Some(generation);
        self
    }

    /// True for events after which the named worker is no longer running.
    #[inline]
    pub fn is_worker_gone(&self) -> bool {
        matches!(self.kind, EventKind::WorkerDied | EventKind::WorkerLost)
    }
}
