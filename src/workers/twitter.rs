//! # Twitter worker launcher.
//!
//! The polling bot itself lives outside this crate. [`TwitterLauncher`] owns
//! the part the supervisor cares about: the `enable_twitter` switch, the four
//! mandatory X credentials, and assembling a [`TwitterConfig`] that is handed,
//! together with the resolved backend, to a caller-supplied bot factory.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::AiBackend;
use crate::error::WorkerError;
use crate::settings::Settings;
use crate::workers::{Worker, WorkerLauncher};

/// Name of the Twitter worker in the active set.
pub const TWITTER: &str = "Twitter";

/// Everything the Twitter bot needs from settings.
#[derive(Clone, Debug)]
pub struct TwitterConfig {
    pub bearer_token: Option<String>,
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_secret: String,
    pub rapidapi_key: String,
    pub rapidapi_host: String,
    pub accounts_to_monitor: Vec<String>,
    pub polling_interval: Duration,
}

/// Builds the bot from its config and the shared backend.
pub type TwitterBotFactory =
    Arc<dyn Fn(TwitterConfig, Arc<AiBackend>) -> Result<Box<dyn Worker>, WorkerError> + Send + Sync>;

/// Launcher for the Twitter polling bot.
pub struct TwitterLauncher {
    factory: TwitterBotFactory,
}

impl TwitterLauncher {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(TwitterConfig, Arc<AiBackend>) -> Result<Box<dyn Worker>, WorkerError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }

    fn config(settings: &Settings) -> Result<TwitterConfig, WorkerError> {
        let required = [
            ("x_api_key", &settings.x_api_key),
            ("x_api_key_secret", &settings.x_api_key_secret),
            ("x_access_token", &settings.x_access_token),
            ("x_access_token_secret", &settings.x_access_token_secret),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, v)| v.as_deref().map_or(true, str::is_empty))
            .map(|(k, _)| *k)
            .collect();
        if !missing.is_empty() {
            return Err(WorkerError::MissingCredentials {
                worker: TWITTER.to_string(),
                missing,
            });
        }

        let take = |v: &Option<String>| v.clone().unwrap_or_default();
        Ok(TwitterConfig {
            bearer_token: settings.x_bearer_token.clone(),
            api_key: take(&settings.x_api_key),
            api_secret: take(&settings.x_api_key_secret),
            access_token: take(&settings.x_access_token),
            access_secret: take(&settings.x_access_token_secret),
            rapidapi_key: take(&settings.rapidapi_key),
            rapidapi_host: settings.rapidapi_host.clone(),
            accounts_to_monitor: settings.accounts_to_monitor.clone(),
            polling_interval: settings.twitter_polling_interval,
        })
    }
}

impl WorkerLauncher for TwitterLauncher {
    fn name(&self) -> &str {
        TWITTER
    }

    fn prerequisites(&self, settings: &Settings) -> Result<(), WorkerError> {
        if !settings.enable_twitter {
            return Err(WorkerError::Disabled {
                worker: TWITTER.to_string(),
            });
        }
        Self::config(settings).map(|_| ())
    }

    fn build(
        &self,
        settings: &Settings,
        backend: Arc<AiBackend>,
    ) -> Result<Box<dyn Worker>, WorkerError> {
        let config = Self::config(settings)?;
        (self.factory)(config, backend)
    }
}
