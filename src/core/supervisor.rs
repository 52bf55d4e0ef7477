//! # Supervisor: owns the active worker set, watches liveness, restarts once per death.
//!
//! The [`Supervisor`] owns the resolved [`AiBackend`], the RunningFlag and the
//! active worker set. Every mutation of the set goes through `&mut self`, so
//! the set needs no lock: only the cooperative context that drives the
//! monitor loop can touch it.
//!
//! ## Monitor loop
//! ```text
//! monitor_loop(cancel)
//!   running = true, publish MonitorStarted
//!   loop {
//!     ├─► cancelled                       ─► exit (Cancelled)
//!     ├─► sweep():
//!     │     for each record whose thread is Dead (collected up front):
//!     │       ├─ remove from set, publish WorkerDied
//!     │       └─ exactly one start attempt with the same launcher
//!     │            ├─ Ok  ─► publish WorkerRestarted (generation + 1)
//!     │            └─ Err ─► publish WorkerLost (gone for good)
//!     ├─► set empty                       ─► publish NoWorkersLeft, exit
//!     └─► sleep(poll_interval) | cancelled ─► exit
//!   }
//!   running = false
//! ```
//!
//! A worker that dies again right after its restart is only looked at in the
//! next sweep, so one sweep never makes two attempts for the same worker.
//!
//! The loop holds `&mut self` while it runs, so only the [`CancellationToken`]
//! can stop it from outside. [`MonitorExit::Stopped`] is returned when the loop
//! is entered after [`Supervisor::shutdown`].
//!
//! ## Shutdown
//! [`Supervisor::shutdown`] clears the RunningFlag and the active set. Worker
//! threads are detached and not killed: they end with the process. A shut-down
//! supervisor refuses to start workers again.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::backend::AiBackend;
use crate::core::config::SupervisorConfig;
use crate::error::WorkerError;
use crate::events::{Bus, Event, EventKind};
use crate::settings::Settings;
use crate::workers::{LauncherRef, WorkerHandle, WorkerStatus};

/// One running worker in the active set.
struct WorkerRecord {
    handle: WorkerHandle,
    launcher: LauncherRef,
    generation: u32,
    started_at: Instant,
}

impl WorkerRecord {
    fn status(&self) -> WorkerStatus {
        self.handle.status()
    }
}

/// Why the monitor loop returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorExit {
    /// The cancellation token fired.
    Cancelled,
    /// The loop was entered after the supervisor had been shut down.
    Stopped,
    /// No workers left to supervise.
    NoWorkersLeft,
}

/// Outcome of one sweep over the active set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Workers found dead and removed.
    pub died: Vec<String>,
    /// Dead workers whose single restart attempt succeeded.
    pub restarted: Vec<String>,
    /// Dead workers whose restart attempt failed; permanently removed.
    pub lost: Vec<String>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.died.is_empty()
    }
}

/// Supervises the workers of one process.
pub struct Supervisor {
    cfg: SupervisorConfig,
    settings: Arc<Settings>,
    backend: Arc<AiBackend>,
    bus: Bus,
    running: bool,
    shut_down: bool,
    active: HashMap<String, WorkerRecord>,
}

impl Supervisor {
    pub fn new(
        cfg: SupervisorConfig,
        settings: Arc<Settings>,
        backend: Arc<AiBackend>,
        bus: Bus,
    ) -> Self {
        Self {
            cfg,
            settings,
            backend,
            bus,
            running: false,
            shut_down: false,
            active: HashMap::new(),
        }
    }

    /// Launches a worker on its own thread and adds it to the active set.
    ///
    /// Nothing is recorded on error: unmet prerequisites publish
    /// `WorkerSkipped`, any other failure publishes `WorkerStartFailed`.
    /// After [`shutdown`](Self::shutdown) this fails with [`WorkerError::ShutDown`].
    pub fn start_worker(&mut self, launcher: LauncherRef) -> Result<(), WorkerError> {
        let name = launcher.name().to_string();
        match self.launch(launcher, 1) {
            Ok(()) => {
                self.bus.publish(
                    Event::new(EventKind::WorkerStarted)
                        .with_worker(name.as_str())
                        .with_generation(1),
                );
                Ok(())
            }
            Err(e) => {
                let kind = if e.is_skip() {
                    EventKind::WorkerSkipped
                } else {
                    EventKind::WorkerStartFailed
                };
                self.bus.publish(
                    Event::new(kind)
                        .with_worker(name.as_str())
                        .with_reason(e.to_string()),
                );
                Err(e)
            }
        }
    }

    fn launch(&mut self, launcher: LauncherRef, generation: u32) -> Result<(), WorkerError> {
        let name = launcher.name().to_string();
        if self.shut_down {
            return Err(WorkerError::ShutDown(name));
        }
        if self.active.contains_key(&name) {
            return Err(WorkerError::AlreadyActive(name));
        }
        launcher.prerequisites(&self.settings)?;
        let worker = launcher.build(&self.settings, Arc::clone(&self.backend))?;
        let handle = WorkerHandle::spawn(&name, worker)?;

        self.active.insert(
            name,
            WorkerRecord {
                handle,
                launcher,
                generation,
                started_at: Instant::now(),
            },
        );
        Ok(())
    }

    /// One monitor iteration: removes dead workers and restarts each one once.
    pub fn sweep(&mut self) -> SweepReport {
        let mut dead: Vec<String> = self
            .active
            .iter()
            .filter(|(_, rec)| rec.status() == WorkerStatus::Dead)
            .map(|(name, _)| name.clone())
            .collect();
        dead.sort_unstable();

        let mut report = SweepReport::default();
        for name in dead {
            let Some(record) = self.active.remove(&name) else {
                continue;
            };
            let mut died = Event::new(EventKind::WorkerDied)
                .with_worker(name.as_str())
                .with_generation(record.generation);
            if let Some(reason) = record.handle.exit_reason() {
                died = died.with_reason(reason);
            }
            tracing::debug!(
                worker = %name,
                uptime = ?record.started_at.elapsed(),
                "worker execution context terminated"
            );
            self.bus.publish(died);
            report.died.push(name.clone());

            let generation = record.generation + 1;
            match self.launch(record.launcher, generation) {
                Ok(()) => {
                    self.bus.publish(
                        Event::new(EventKind::WorkerRestarted)
                            .with_worker(name.as_str())
                            .with_generation(generation),
                    );
                    report.restarted.push(name);
                }
                Err(e) => {
                    self.bus.publish(
                        Event::new(EventKind::WorkerLost)
                            .with_worker(name.as_str())
                            .with_reason(e.to_string()),
                    );
                    report.lost.push(name);
                }
            }
        }
        report
    }

    /// Polls worker liveness every `poll_interval` until `cancel` fires or no workers are left.
    pub async fn monitor_loop(&mut self, cancel: &CancellationToken) -> MonitorExit {
        if self.shut_down {
            return MonitorExit::Stopped;
        }
        self.running = true;
        self.bus.publish(Event::new(EventKind::MonitorStarted));
        let interval = self.cfg.poll_interval_clamped();

        let exit = loop {
            if cancel.is_cancelled() {
                break MonitorExit::Cancelled;
            }

            self.sweep();
            if self.active.is_empty() {
                self.bus.publish(Event::new(EventKind::NoWorkersLeft));
                break MonitorExit::NoWorkersLeft;
            }

            select! {
                _ = time::sleep(interval) => {}
                _ = cancel.cancelled() => break MonitorExit::Cancelled,
            }
        };

        self.running = false;
        exit
    }

    /// Stops supervision. Idempotent; worker threads are left to die with the process.
    pub fn shutdown(&mut self) {
        self.running = false;
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        let detached = self.active_workers();
        self.active.clear();
        let mut done = Event::new(EventKind::ShutdownCompleted);
        if !detached.is_empty() {
            done = done.with_reason(detached.join(", "));
        }
        self.bus.publish(done);
    }

    /// RunningFlag: true while the monitor loop runs and shutdown has not begun.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Sorted names of the workers in the active set.
    pub fn active_workers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.active.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn worker_status(&self, name: &str) -> Option<WorkerStatus> {
        self.active.get(name).map(WorkerRecord::status)
    }

    /// Launch generation of an active worker (1 = first start).
    pub fn generation(&self, name: &str) -> Option<u32> {
        self.active.get(name).map(|rec| rec.generation)
    }

    pub fn backend(&self) -> &Arc<AiBackend> {
        &self.backend
    }
}
