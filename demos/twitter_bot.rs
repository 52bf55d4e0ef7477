//! # Example: twitter_bot
//!
//! Runs the Twitter worker under supervision with an offline model provider.
//!
//! Shows how to:
//! - Load [`Settings`] from `.env` and the environment.
//! - Plug a bot into [`TwitterLauncher`] through its factory.
//! - Run the [`Coordinator`] until Ctrl-C / SIGTERM.
//!
//! ## Run
//! ```bash
//! ENABLE_TWITTER=true X_API_KEY=k X_API_KEY_SECRET=s X_ACCESS_TOKEN=t \
//! X_ACCESS_TOKEN_SECRET=ts ACCOUNTS_TO_MONITOR=@santa \
//! RUST_LOG=botvisor=debug cargo run --example twitter_bot
//! ```
//! Without `ENABLE_TWITTER` the coordinator reports that no bot is active and exits.

use std::sync::Arc;
use std::thread;

use async_trait::async_trait;
use botvisor::{
    AiBackend, BackendError, CharacterFile, Coordinator, Generation, ModelProvider, ModelRef,
    Outcome, Settings, TextModel, TunedModelInfo, TwitterConfig, TwitterLauncher, Worker,
    WorkerError,
};

/// Replies with a fixed line; stands in for a hosted model.
struct Scripted;

#[async_trait]
impl TextModel for Scripted {
    async fn generate_content(&self, prompt: &str) -> Result<Generation, BackendError> {
        Ok(Generation {
            text: format!("Ho ho ho! ({} chars heard)", prompt.len()),
        })
    }
}

struct OfflineProvider;

#[async_trait]
impl ModelProvider for OfflineProvider {
    async fn list_tuned_models(&self) -> Result<Vec<String>, BackendError> {
        Ok(Vec::new())
    }

    async fn get_tuned_model(&self, name: &str) -> Result<TunedModelInfo, BackendError> {
        Err(BackendError::NotFound(name.to_string()))
    }

    fn open_model(&self, _name: &str, _instr: Option<&str>) -> Result<ModelRef, BackendError> {
        Ok(Arc::new(Scripted))
    }
}

/// Polls the configured accounts and answers with the shared backend.
struct PollingBot {
    config: TwitterConfig,
    backend: Arc<AiBackend>,
}

impl Worker for PollingBot {
    fn start(&mut self) -> Result<(), WorkerError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| WorkerError::Failed(e.to_string()))?;
        loop {
            for account in &self.config.accounts_to_monitor {
                let prompt = format!("Reply to the latest post of {account}");
                match rt.block_on(self.backend.generate_content(&prompt)) {
                    Ok(reply) => println!("[{account}] {}", reply.text),
                    Err(e) => return Err(WorkerError::Failed(e.to_string())),
                }
            }
            thread::sleep(self.config.polling_interval);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    botvisor::telemetry::init();

    let settings = Settings::from_env();
    let characters = Arc::new(CharacterFile::new(settings.characters_file.clone()));

    let twitter = TwitterLauncher::new(|config, backend| {
        Ok(Box::new(PollingBot { config, backend }))
    });

    let coordinator = Coordinator::builder(Arc::new(OfflineProvider), characters)
        .with_settings(settings)
        .with_launcher(Arc::new(twitter))
        .build();

    match coordinator.run_until_signal().await? {
        Outcome::Idle => println!("nothing to supervise"),
        Outcome::Stopped { reason, detached } => {
            println!("stopped: {reason:?}, detached workers: {detached:?}");
        }
    }
    Ok(())
}
