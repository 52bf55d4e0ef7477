//! # botvisor
//!
//! **Botvisor** supervises long-running AI-backed social bot workers.
//!
//! It picks the AI backend once at startup (tuned model, then character, then
//! the default model), launches each enabled worker on its own OS thread,
//! watches their liveness from a cooperative tokio loop, restarts a dead
//! worker once, and stops gracefully on a signal.
//!
//! ## Architecture
//! ```text
//!   ModelProvider   CharacterSource        Settings
//!         └──────┬───────┘                    │
//!                ▼                            │
//!        BackendResolver  ── Arc<AiBackend> ──┤
//!                                             ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Coordinator (phases: Resolving → Monitoring → Stopped | Idle)    │
//! │  └─ Supervisor                                                    │
//! │      - active set: name → WorkerRecord (handle, launcher, gen)    │
//! │      - RunningFlag                                                │
//! │      - monitor_loop: sweep every poll_interval, restart once      │
//! └──────┬──────────────────────────┬─────────────────────────────────┘
//!        │ spawn                    │ publish(Event)
//!        ▼                          ▼
//!  ┌───────────────┐        ┌───────────────┐      ┌────────────────────┐
//!  │ Twitter-worker│        │      Bus      │ ───► │   SubscriberSet    │
//!  │ (std thread)  │        │  (broadcast)  │      │ LogWriter, Alive.. │
//!  └───────────────┘        └───────────────┘      └────────────────────┘
//! ```
//!
//! ## Features
//! | Area            | Description                                        | Key types / traits                          |
//! |-----------------|----------------------------------------------------|---------------------------------------------|
//! | **Backends**    | Provider seam, fallback resolution, chat cache     | [`ModelProvider`], [`AiBackend`], [`BackendResolver`], [`CharacterBackends`] |
//! | **Characters**  | Character prompt file                              | [`CharacterSource`], [`CharacterFile`]      |
//! | **Workers**     | Blocking bot run loops on dedicated threads        | [`Worker`], [`WorkerLauncher`], [`WorkerFn`], [`TwitterLauncher`] |
//! | **Supervision** | Restart-once monitoring and lifecycle              | [`Supervisor`], [`Coordinator`], [`Phase`]  |
//! | **Events**      | Lifecycle events and subscribers                   | [`Event`], [`Subscribe`], [`AliveTracker`]  |
//! | **Errors**      | Typed errors with stable labels                    | [`RuntimeError`], [`BackendError`], [`WorkerError`] |
//! | **Config**      | Environment settings and runtime tuning            | [`Settings`], [`SupervisorConfig`]          |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use async_trait::async_trait;
//! use botvisor::{
//!     BackendError, Coordinator, Generation, ModelProvider, ModelRef, Outcome, Settings,
//!     StopReason, SupervisorConfig, TextModel, TunedModelInfo, WorkerFn,
//! };
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl TextModel for Canned {
//!     async fn generate_content(&self, _prompt: &str) -> Result<Generation, BackendError> {
//!         Ok(Generation { text: "ho ho ho".into() })
//!     }
//! }
//!
//! struct Offline;
//!
//! #[async_trait]
//! impl ModelProvider for Offline {
//!     async fn list_tuned_models(&self) -> Result<Vec<String>, BackendError> {
//!         Ok(Vec::new())
//!     }
//!     async fn get_tuned_model(&self, name: &str) -> Result<TunedModelInfo, BackendError> {
//!         Err(BackendError::NotFound(name.to_string()))
//!     }
//!     fn open_model(&self, _name: &str, _instr: Option<&str>) -> Result<ModelRef, BackendError> {
//!         Ok(Arc::new(Canned))
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let chars = Arc::new(botvisor::CharacterFile::new("does-not-exist.json"));
//!     let coordinator = Coordinator::builder(Arc::new(Offline), chars)
//!         .with_settings(Settings::default())
//!         .with_config(SupervisorConfig {
//!             poll_interval: Duration::from_millis(10),
//!             ..SupervisorConfig::default()
//!         })
//!         .with_launcher(WorkerFn::arc("poster", |backend| {
//!             let _ = backend.model_name();
//!             loop {
//!                 std::thread::sleep(Duration::from_millis(50));
//!             }
//!         }))
//!         .build();
//!
//!     // No characters file: the default backend is used.
//!     let stop = async {
//!         tokio::time::sleep(Duration::from_millis(100)).await;
//!         Ok(())
//!     };
//!     let outcome = coordinator.run(stop).await?;
//!     assert_eq!(
//!         outcome,
//!         Outcome::Stopped { reason: StopReason::Signal, detached: vec!["poster".to_string()] }
//!     );
//!     Ok(())
//! }
//! ```

mod backend;
mod characters;
mod core;
mod error;
mod events;
mod prompts;
mod settings;
mod subscribers;
mod workers;

pub mod telemetry;

// ---- Public re-exports ----

pub use backend::{
    AiBackend, BackendKind, BackendResolver, CharacterBackends, Generation, ModelProvider,
    ModelRef, TextModel, TunedModelInfo,
};
pub use characters::{Character, CharacterFile, CharacterSource};
pub use crate::core::{
    Coordinator, CoordinatorBuilder, MonitorExit, Outcome, Phase, StopReason, Supervisor,
    SupervisorConfig, SweepReport,
};
pub use error::{BackendError, CharacterError, RuntimeError, WorkerError};
pub use events::{Bus, Event, EventKind};
pub use prompts::FEW_SHOT_PROMPT;
pub use settings::{Settings, DEFAULT_CHARACTER, DEFAULT_CHARACTERS_FILE, DEFAULT_MODEL_NAME};
pub use subscribers::{AliveTracker, LogWriter, Subscribe, SubscriberSet};
pub use workers::{
    LauncherRef, TwitterBotFactory, TwitterConfig, TwitterLauncher, Worker, WorkerFn,
    WorkerHandle, WorkerLauncher, WorkerStatus, TWITTER,
};
