//! # Function-backed launcher (`WorkerFn`)
//!
//! [`WorkerFn`] wraps a closure `F: Fn(Arc<AiBackend>) -> Result<(), WorkerError>`
//! that *is* the worker's run loop. Each build produces a worker that calls the
//! closure once on its own thread, so a restart re-enters the closure from
//! scratch. Shared state across restarts must be captured explicitly (`Arc<...>`).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use botvisor::{LauncherRef, WorkerFn, WorkerLauncher};
//!
//! let echo: LauncherRef = WorkerFn::arc("echo", |backend| {
//!     let _ = backend.model_name();
//!     Ok(())
//! });
//! assert_eq!(echo.name(), "echo");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::backend::AiBackend;
use crate::error::WorkerError;
use crate::settings::Settings;
use crate::workers::{Worker, WorkerLauncher};

/// Function-backed launcher; the closure is the worker body.
pub struct WorkerFn<F> {
    name: Cow<'static, str>,
    f: Arc<F>,
}

impl<F> WorkerFn<F>
where
    F: Fn(Arc<AiBackend>) -> Result<(), WorkerError> + Send + Sync + 'static,
{
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    /// Creates the launcher and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

struct FnWorker<F> {
    f: Arc<F>,
    backend: Arc<AiBackend>,
}

impl<F> Worker for FnWorker<F>
where
    F: Fn(Arc<AiBackend>) -> Result<(), WorkerError> + Send + Sync + 'static,
{
    fn start(&mut self) -> Result<(), WorkerError> {
        (self.f)(Arc::clone(&self.backend))
    }
}

impl<F> WorkerLauncher for WorkerFn<F>
where
    F: Fn(Arc<AiBackend>) -> Result<(), WorkerError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn build(
        &self,
        _settings: &Settings,
        backend: Arc<AiBackend>,
    ) -> Result<Box<dyn Worker>, WorkerError> {
        Ok(Box::new(FnWorker {
            f: Arc::clone(&self.f),
            backend,
        }))
    }
}
