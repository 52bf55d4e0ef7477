//! `tracing` setup for bot processes.
//!
//! Filtering follows `RUST_LOG`; without it only this crate logs, at `info`.
//! Worker threads log with their thread name (`Twitter-worker`, ...).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "botvisor=info";

/// Installs a global fmt subscriber.
///
/// Returns `false` when a global subscriber was already installed (tests,
/// embedding applications); the existing one is kept.
pub fn init() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_names(true))
        .try_init()
        .is_ok()
}
