//! Error types used by the botvisor runtime, backends and workers.
//!
//! - [`RuntimeError`] - unrecoverable startup failures surfaced to the coordinator caller.
//! - [`BackendError`] - failures of the AI provider or of a backend attempt.
//! - [`CharacterError`] - failures of the character-prompt file.
//! - [`WorkerError`] - a worker could not be started, or its run loop failed.
//!
//! Every enum provides `as_label()` (stable snake_case) for logs/events.

use std::path::PathBuf;

use thiserror::Error;

/// # Errors produced by the botvisor runtime itself.
///
/// Only these reach the caller of [`Coordinator::run`](crate::Coordinator::run);
/// everything else is absorbed where the fallback decision is made.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Even the default backend could not be opened; there is no safe continuation.
    #[error("no AI backend available: {source}")]
    NoBackend {
        /// Why the last (default) attempt failed.
        #[source]
        source: BackendError,
    },

    /// Registering the OS signal listeners failed.
    #[error("failed to listen for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use botvisor::{BackendError, RuntimeError};
    ///
    /// let err = RuntimeError::NoBackend { source: BackendError::NotFound("gemini".into()) };
    /// assert_eq!(err.as_label(), "runtime_no_backend");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::NoBackend { .. } => "runtime_no_backend",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }
}

/// # Errors produced by the AI provider or a backend attempt.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BackendError {
    /// The provider rejected the request arguments (e.g. a malformed model name).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The provider does not know the requested model.
    #[error("model not found: {0}")]
    NotFound(String),

    /// Any other provider failure (transport, quota, generation).
    #[error("provider error: {0}")]
    Provider(String),

    /// The requested character is not defined in the character file.
    #[error("character '{0}' not found")]
    CharacterNotFound(String),

    /// The character file could not be used.
    #[error(transparent)]
    Character(#[from] CharacterError),
}

impl BackendError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BackendError::InvalidArgument(_) => "backend_invalid_argument",
            BackendError::NotFound(_) => "backend_not_found",
            BackendError::Provider(_) => "backend_provider",
            BackendError::CharacterNotFound(_) => "backend_character_not_found",
            BackendError::Character(_) => "backend_character_file",
        }
    }
}

/// # Errors produced while reading the character-prompt file.
///
/// A character that is simply absent from the file is **not** an error: the
/// loader returns `Ok(None)` for that case.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CharacterError {
    /// The characters file does not exist (configuration error).
    #[error("characters file not found: {}", path.display())]
    FileMissing {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("failed to read characters file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid character JSON.
    #[error("failed to parse characters file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// # Errors produced when starting or running a worker.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The worker kind is switched off in settings.
    #[error("worker '{worker}' disabled in settings")]
    Disabled {
        /// Worker name.
        worker: String,
    },

    /// Required credentials/settings are absent.
    #[error("worker '{worker}' missing required settings: {missing:?}")]
    MissingCredentials {
        /// Worker name.
        worker: String,
        /// Names of the absent settings.
        missing: Vec<&'static str>,
    },

    /// A worker with this name is already in the active set.
    #[error("worker '{0}' is already active")]
    AlreadyActive(String),

    /// The supervisor has been shut down and starts nothing new.
    #[error("supervisor is shut down; worker '{0}' not started")]
    ShutDown(String),

    /// Constructing the worker from settings failed.
    #[error("failed to build worker: {0}")]
    Build(String),

    /// The dedicated execution context could not be created.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The worker's run loop ended with an error.
    #[error("worker failed: {0}")]
    Failed(String),
}

impl WorkerError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Disabled { .. } => "worker_disabled",
            WorkerError::MissingCredentials { .. } => "worker_missing_credentials",
            WorkerError::AlreadyActive(_) => "worker_already_active",
            WorkerError::ShutDown(_) => "worker_shut_down",
            WorkerError::Build(_) => "worker_build",
            WorkerError::Spawn(_) => "worker_spawn",
            WorkerError::Failed(_) => "worker_failed",
        }
    }

    /// True when the worker was skipped because its prerequisites are unmet.
    ///
    /// Skips are expected at startup and are not reported as failures.
    ///
    /// # Example
    /// ```
    /// use botvisor::WorkerError;
    ///
    /// assert!(WorkerError::Disabled { worker: "Twitter".into() }.is_skip());
    /// assert!(!WorkerError::Build("bad config".into()).is_skip());
    /// ```
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            WorkerError::Disabled { .. } | WorkerError::MissingCredentials { .. }
        )
    }
}
