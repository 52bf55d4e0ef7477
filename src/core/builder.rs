use std::sync::Arc;

use tokio::sync::watch;

use crate::backend::{BackendResolver, ModelProvider};
use crate::characters::CharacterSource;
use crate::core::config::SupervisorConfig;
use crate::core::coordinator::{Coordinator, Phase};
use crate::settings::Settings;
use crate::subscribers::{AliveTracker, LogWriter, Subscribe};
use crate::workers::LauncherRef;

/// Builder for constructing a [`Coordinator`].
///
/// [`LogWriter`] and the coordinator's [`AliveTracker`] are always subscribed;
/// subscribers given here are added after them.
pub struct CoordinatorBuilder {
    provider: Arc<dyn ModelProvider>,
    characters: Arc<dyn CharacterSource>,
    settings: Settings,
    cfg: SupervisorConfig,
    launchers: Vec<LauncherRef>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl CoordinatorBuilder {
    pub fn new(provider: Arc<dyn ModelProvider>, characters: Arc<dyn CharacterSource>) -> Self {
        Self {
            provider,
            characters,
            settings: Settings::default(),
            cfg: SupervisorConfig::default(),
            launchers: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Bot-level settings (backend choice, worker switches and credentials).
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Runtime settings of the supervisor (poll interval, bus capacity).
    pub fn with_config(mut self, cfg: SupervisorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Adds a worker kind. Launchers are started in insertion order.
    pub fn with_launcher(mut self, launcher: LauncherRef) -> Self {
        self.launchers.push(launcher);
        self
    }

    /// Adds event subscribers.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers.extend(subscribers);
        self
    }

    pub fn build(self) -> Coordinator {
        let alive = Arc::new(AliveTracker::new());

        let mut subscribers: Vec<Arc<dyn Subscribe>> =
            vec![Arc::new(LogWriter::new()), alive.clone()];
        subscribers.extend(self.subscribers);

        let (phase, _) = watch::channel(Phase::Initializing);

        Coordinator {
            cfg: self.cfg,
            settings: Arc::new(self.settings),
            resolver: BackendResolver::new(self.provider, self.characters),
            launchers: self.launchers,
            subscribers,
            alive,
            phase,
        }
    }
}
