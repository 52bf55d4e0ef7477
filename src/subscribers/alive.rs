//! # Reporting view of running workers with sequence-based ordering.
//!
//! The active worker set is owned by the [`Supervisor`](crate::Supervisor) and
//! mutated only from the monitor context. Other contexts (health endpoints,
//! tests) read this tracker instead, fed from the event bus.
//!
//! ## Rules
//! - Only `WorkerStarted` / `WorkerRestarted` / `WorkerDied` / `WorkerLost` change state
//! - Read operations (`snapshot`, `is_alive`) are **eventually consistent**
//! - Events with `seq <= last_seq` for a worker are **rejected** (stale)

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

#[derive(Debug, Clone)]
struct WorkerState {
    last_seq: u64,
    alive: bool,
}

/// Thread-safe tracker of running workers.
#[derive(Default)]
pub struct AliveTracker {
    state: RwLock<HashMap<String, WorkerState>>,
}

impl AliveTracker {
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates worker state if the event is newer than the last one seen.
    ///
    /// Returns true if the alive flag was written.
    pub async fn update(&self, ev: &Event) -> bool {
        let Some(name) = ev.worker.as_deref() else {
            return false;
        };
        let alive = match ev.kind {
            EventKind::WorkerStarted | EventKind::WorkerRestarted => true,
            EventKind::WorkerDied | EventKind::WorkerLost => false,
            _ => return false,
        };

        let mut state = self.state.write().await;
        let entry = state.entry(name.to_string()).or_insert(WorkerState {
            last_seq: 0,
            alive: false,
        });
        if ev.seq <= entry.last_seq {
            return false;
        }
        entry.last_seq = ev.seq;
        entry.alive = alive;
        true
    }

    /// Returns sorted list of currently running worker names.
    pub async fn snapshot(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut alive: Vec<String> = state
            .iter()
            .filter(|(_, ws)| ws.alive)
            .map(|(name, _)| name.clone())
            .collect();
        alive.sort_unstable();
        alive
    }

    /// Returns true if the worker is currently running.
    pub async fn is_alive(&self, name: &str) -> bool {
        self.state
            .read()
            .await
            .get(name)
            .map(|ws| ws.alive)
            .unwrap_or(false)
    }
}

#[async_trait]
impl Subscribe for AliveTracker {
    async fn on_event(&self, event: &Event) {
        self.update(event).await;
    }

    fn name(&self) -> &'static str {
        "AliveTracker"
    }
}
