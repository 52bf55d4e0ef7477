//! # LogWriter: renders runtime events through `tracing`
//!
//! Deaths and lost workers are logged at `error`, skips and failed starts at
//! `warn`, everything else at `info`.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO  botvisor: worker started worker="Twitter" generation=1
//! ERROR botvisor: worker terminated unexpectedly worker="Twitter" generation=1
//! INFO  botvisor: worker restarted successfully worker="Twitter" generation=2
//! ERROR botvisor: no active workers remaining
//! INFO  botvisor: all workers shutdown completed detached="Twitter"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let worker = e.worker.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::BackendResolved => {
                tracing::info!(backend = reason, "AI backend resolved");
            }
            EventKind::WorkerStarted => {
                tracing::info!(worker, generation = e.generation, "worker started");
            }
            EventKind::WorkerSkipped => {
                tracing::warn!(worker, reason, "worker not started");
            }
            EventKind::WorkerStartFailed => {
                tracing::warn!(worker, reason, "failed to start worker");
            }
            EventKind::WorkerDied => {
                tracing::error!(worker, generation = e.generation, "worker terminated unexpectedly");
            }
            EventKind::WorkerRestarted => {
                tracing::info!(worker, generation = e.generation, "worker restarted successfully");
            }
            EventKind::WorkerLost => {
                tracing::error!(worker, reason, "worker restart failed; giving up");
            }
            EventKind::MonitorStarted => {
                tracing::info!("monitoring active workers");
            }
            EventKind::NoWorkersLeft => {
                tracing::error!("no active workers remaining");
            }
            EventKind::ShutdownRequested => {
                tracing::info!("shutdown requested");
            }
            EventKind::ShutdownCompleted => {
                if !reason.is_empty() {
                    tracing::info!(
                        detached = reason,
                        "detached worker threads will terminate with the process"
                    );
                }
                tracing::info!("all workers shutdown completed");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
