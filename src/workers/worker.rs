//! # Worker abstractions.
//!
//! A [`Worker`] is a blocking unit of background work: [`Worker::start`] enters
//! its own run loop and only returns when the loop ends (normally or with an
//! error). It is always run on a dedicated OS thread, never on the async
//! runtime.
//!
//! A [`WorkerLauncher`] knows one worker kind: its stable name, the settings
//! it cannot run without, and how to build a fresh worker from [`Settings`]
//! plus the resolved [`AiBackend`]. The supervisor keeps the launcher so it
//! can build a new worker when the old one dies.

use std::sync::Arc;

use crate::backend::AiBackend;
use crate::error::WorkerError;
use crate::settings::Settings;

/// Blocking, long-running background work.
pub trait Worker: Send + 'static {
    /// Runs the worker loop on the calling thread until it stops or fails.
    fn start(&mut self) -> Result<(), WorkerError>;
}

/// Factory for one worker kind.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use botvisor::{AiBackend, Settings, Worker, WorkerError, WorkerLauncher};
///
/// struct Heartbeat;
///
/// impl Worker for Heartbeat {
///     fn start(&mut self) -> Result<(), WorkerError> {
///         loop {
///             std::thread::sleep(std::time::Duration::from_secs(30));
///         }
///     }
/// }
///
/// struct HeartbeatLauncher;
///
/// impl WorkerLauncher for HeartbeatLauncher {
///     fn name(&self) -> &str { "Heartbeat" }
///
///     fn build(&self, _: &Settings, _: Arc<AiBackend>) -> Result<Box<dyn Worker>, WorkerError> {
///         Ok(Box::new(Heartbeat))
///     }
/// }
/// ```
pub trait WorkerLauncher: Send + Sync + 'static {
    /// Stable worker name; also the key in the active worker set.
    fn name(&self) -> &str;

    /// Checks flags and credentials before anything is built.
    ///
    /// Return [`WorkerError::Disabled`] or [`WorkerError::MissingCredentials`]
    /// to have the worker skipped cleanly.
    fn prerequisites(&self, _settings: &Settings) -> Result<(), WorkerError> {
        Ok(())
    }

    /// Builds a fresh worker. Called on first start and on every restart.
    fn build(
        &self,
        settings: &Settings,
        backend: Arc<AiBackend>,
    ) -> Result<Box<dyn Worker>, WorkerError>;
}

/// Shared handle to a launcher.
pub type LauncherRef = Arc<dyn WorkerLauncher>;
