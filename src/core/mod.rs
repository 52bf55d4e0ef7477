//! Runtime core: supervision and lifecycle.
//!
//! - [`coordinator`]: resolve → start → monitor → stop, with observable phases;
//! - [`supervisor`]: active worker set, monitor loop, restart-once, shutdown;
//! - [`builder`]: assembles a coordinator;
//! - [`shutdown`]: cross-platform stop signal handling;
//! - [`config`]: runtime configuration.

mod builder;
mod config;
mod coordinator;
mod shutdown;
mod supervisor;

pub use builder::CoordinatorBuilder;
pub use config::SupervisorConfig;
pub use coordinator::{Coordinator, Outcome, Phase, StopReason};
pub use supervisor::{MonitorExit, Supervisor, SweepReport};
