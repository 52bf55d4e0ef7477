//! # Coordinator: resolve → start → monitor → stop → tear down.
//!
//! The [`Coordinator`] is the top-level lifecycle of a bot process. It owns the
//! event listener (Bus → [`SubscriberSet`]) and drives a [`Supervisor`] from the
//! calling task.
//!
//! ```text
//! run(stop)
//!   Initializing ─► Resolving ──(NoBackend)──────────────────────────► Fatal (Err)
//!                      │  └──(stop)───────────────────────────────────► Stopped
//!                      ▼ publish BackendResolved
//!                 start_worker(launcher) for each launcher
//!                      │
//!          ┌───────────┴────────────┐
//!     none started             ≥ 1 started
//!          ▼                        ▼
//!      NoWorkers ─► Idle      WorkersActive ─► Monitoring
//!                                               select! {
//!                                                 monitor_loop(token) => natural exit
//!                                                 stop              => ShutdownRequested,
//!                                                                      token.cancel(), await loop
//!                                               }
//!                                               ─► ShuttingDown ─► shutdown() ─► Stopped
//! ```
//!
//! Before returning, the listener is cancelled, drains what is already on the
//! bus and waits for every subscriber queue to empty, so subscribers have seen
//! every event of the run once `run` returns.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::{BackendResolver, ModelProvider};
use crate::characters::CharacterSource;
use crate::core::builder::CoordinatorBuilder;
use crate::core::config::SupervisorConfig;
use crate::core::shutdown::ShutdownSignal;
use crate::core::supervisor::Supervisor;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::settings::Settings;
use crate::subscribers::{AliveTracker, Subscribe, SubscriberSet};
use crate::workers::LauncherRef;

/// Lifecycle phase of a [`Coordinator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Resolving,
    WorkersActive,
    Monitoring,
    ShuttingDown,
    Stopped,
    NoWorkers,
    Idle,
    Fatal,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Initializing => "initializing",
            Phase::Resolving => "resolving",
            Phase::WorkersActive => "workers_active",
            Phase::Monitoring => "monitoring",
            Phase::ShuttingDown => "shutting_down",
            Phase::Stopped => "stopped",
            Phase::NoWorkers => "no_workers",
            Phase::Idle => "idle",
            Phase::Fatal => "fatal",
        }
    }

    /// True for `Stopped`, `Idle` and `Fatal`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Stopped | Phase::Idle | Phase::Fatal)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a monitored run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The stop future completed (signal or caller request).
    Signal,
    /// Every worker died and could not be restarted.
    NoWorkersLeft,
}

/// Result of a completed [`Coordinator::run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Workers were monitored until `reason`; `detached` are the workers
    /// still running when supervision ended. A stop during backend
    /// resolution ends the run here too, with nothing started.
    Stopped {
        reason: StopReason,
        detached: Vec<String>,
    },
    /// No worker could be started; nothing was monitored.
    Idle,
}

/// Top-level lifecycle of a bot process.
pub struct Coordinator {
    pub(super) cfg: SupervisorConfig,
    pub(super) settings: Arc<Settings>,
    pub(super) resolver: BackendResolver,
    pub(super) launchers: Vec<LauncherRef>,
    pub(super) subscribers: Vec<Arc<dyn Subscribe>>,
    pub(super) alive: Arc<AliveTracker>,
    pub(super) phase: watch::Sender<Phase>,
}

impl Coordinator {
    /// Starts building a coordinator around an AI provider and a character source.
    pub fn builder(
        provider: Arc<dyn ModelProvider>,
        characters: Arc<dyn CharacterSource>,
    ) -> CoordinatorBuilder {
        CoordinatorBuilder::new(provider, characters)
    }

    /// Receiver observing the lifecycle phase.
    pub fn phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Event-fed view of running workers.
    pub fn alive(&self) -> Arc<AliveTracker> {
        Arc::clone(&self.alive)
    }

    /// Runs until an OS termination signal (SIGINT/SIGTERM/SIGQUIT, Ctrl-C).
    ///
    /// The listeners are installed before backend resolution starts, so a
    /// signal during resolution also ends the run gracefully.
    pub async fn run_until_signal(self) -> Result<Outcome, RuntimeError> {
        let signal = ShutdownSignal::register()?;
        self.run(async move {
            signal.recv().await;
            Ok(())
        })
        .await
    }

    /// Runs the full lifecycle; `stop` completing requests a graceful stop.
    ///
    /// If `stop` resolves to an error the run still stops gracefully and the
    /// error is returned afterwards.
    pub async fn run<F>(self, stop: F) -> Result<Outcome, RuntimeError>
    where
        F: Future<Output = Result<(), RuntimeError>>,
    {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener_token = CancellationToken::new();
        let listener = self.subscriber_listener(&bus, listener_token.clone());

        let result = self.drive(&bus, stop).await;

        listener_token.cancel();
        let _ = listener.await;
        result
    }

    async fn drive<F>(&self, bus: &Bus, stop: F) -> Result<Outcome, RuntimeError>
    where
        F: Future<Output = Result<(), RuntimeError>>,
    {
        tokio::pin!(stop);

        self.set_phase(Phase::Resolving);
        let resolved = tokio::select! {
            res = self.resolver.resolve(&self.settings) => res,
            res = &mut stop => {
                tracing::info!("stop requested before an AI backend was resolved");
                bus.publish(Event::new(EventKind::ShutdownRequested));
                self.set_phase(Phase::Stopped);
                res?;
                return Ok(Outcome::Stopped {
                    reason: StopReason::Signal,
                    detached: Vec::new(),
                });
            }
        };
        let backend = match resolved {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                tracing::error!(error = %e, label = e.as_label(), "cannot continue without an AI backend");
                self.set_phase(Phase::Fatal);
                return Err(e);
            }
        };
        bus.publish(Event::new(EventKind::BackendResolved).with_reason(backend.to_string()));

        let mut sup = Supervisor::new(
            self.cfg.clone(),
            Arc::clone(&self.settings),
            backend,
            bus.clone(),
        );
        for launcher in &self.launchers {
            // Failures are published by the supervisor; a skipped worker is not fatal.
            let _ = sup.start_worker(Arc::clone(launcher));
        }

        if sup.is_empty() {
            self.set_phase(Phase::NoWorkers);
            tracing::info!("no bots active; check enable flags and credentials in settings");
            self.set_phase(Phase::Idle);
            return Ok(Outcome::Idle);
        }
        self.set_phase(Phase::WorkersActive);

        let cancel = CancellationToken::new();
        self.set_phase(Phase::Monitoring);
        let (reason, stop_result) = {
            let monitor = sup.monitor_loop(&cancel);
            tokio::pin!(monitor);

            tokio::select! {
                exit = &mut monitor => {
                    tracing::debug!(?exit, "monitor loop finished on its own");
                    (StopReason::NoWorkersLeft, Ok(()))
                }
                res = &mut stop => {
                    bus.publish(Event::new(EventKind::ShutdownRequested));
                    cancel.cancel();
                    let exit = monitor.await;
                    tracing::debug!(?exit, "monitor loop cancelled");
                    (StopReason::Signal, res)
                }
            }
        };

        self.set_phase(Phase::ShuttingDown);
        let detached = sup.active_workers();
        sup.shutdown();
        self.set_phase(Phase::Stopped);

        stop_result?;
        Ok(Outcome::Stopped { reason, detached })
    }

    fn subscriber_listener(&self, bus: &Bus, token: CancellationToken) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(self.subscribers.clone());

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    ev = rx.recv() => match ev {
                        Ok(ev) => set.emit(&ev),
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(skipped = n, "subscriber listener lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = token.cancelled() => {
                        loop {
                            match rx.try_recv() {
                                Ok(ev) => set.emit(&ev),
                                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                                Err(_) => break,
                            }
                        }
                        break;
                    }
                }
            }
            set.shutdown().await;
        })
    }

    fn set_phase(&self, phase: Phase) {
        tracing::debug!(phase = phase.as_str(), "coordinator phase");
        self.phase.send_replace(phase);
    }
}
