//! # Workers and their execution contexts.
//!
//! - [`Worker`] - blocking run loop with `start()`
//! - [`WorkerLauncher`] / [`LauncherRef`] - prerequisite check + construction of one worker kind
//! - [`WorkerHandle`] / [`WorkerStatus`] - dedicated thread with a lock-free liveness flag
//! - [`WorkerFn`] - closure-backed launcher
//! - [`TwitterLauncher`] - launcher for the Twitter polling bot

mod handle;
mod twitter;
mod worker;
mod worker_fn;

pub use handle::{WorkerHandle, WorkerStatus};
pub use twitter::{TwitterBotFactory, TwitterConfig, TwitterLauncher, TWITTER};
pub use worker::{LauncherRef, Worker, WorkerLauncher};
pub use worker_fn::WorkerFn;
