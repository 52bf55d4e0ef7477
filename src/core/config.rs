//! # Runtime configuration.
//!
//! Provides [`SupervisorConfig`], the settings of the supervision runtime itself
//! (as opposed to [`Settings`](crate::Settings), which configure bots and backends).
//!
//! ## Sentinel values
//! - `poll_interval = 0s` → clamped to 1ms (the monitor loop must always yield)
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

/// Global configuration for the supervision runtime.
///
/// ## Field semantics
/// - `poll_interval`: Sleep between two monitor-loop sweeps
/// - `bus_capacity`: Event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Sleep between two sweeps of the active worker set.
    ///
    /// An empty active set is noticed at the next sweep, so the loop ends at
    /// most one interval after the last worker is lost.
    pub poll_interval: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages skip
    /// older items.
    pub bus_capacity: usize,
}

impl SupervisorConfig {
    /// Returns the poll interval clamped to a minimum of 1ms.
    #[inline]
    pub fn poll_interval_clamped(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `poll_interval = 5s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            bus_capacity: 1024,
        }
    }
}
