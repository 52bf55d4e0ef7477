//! # Backend resolution: ordered fallback chain.
//!
//! ```text
//! resolve()
//!   ├─► Tuned      id configured? listed by provider? get + open "tunedModels/<id>"
//!   │                └─ miss / InvalidArgument / NotFound / any error ─► next
//!   ├─► Character  list characters (empty ─► next)
//!   │              pick configured default, else first listed
//!   │              load + open default model with the character's instruction
//!   │                └─ any error ─► next
//!   └─► Default    open default model with the built-in few-shot instruction
//!                    └─ error ─► RuntimeError::NoBackend (fatal)
//! ```
//!
//! Each optional attempt returns `Ok(Some(_))` on success, `Ok(None)` when it
//! does not apply and `Err(_)` when it failed; the latter two only log.

use std::sync::Arc;

use crate::backend::{AiBackend, BackendKind, ModelProvider};
use crate::characters::CharacterSource;
use crate::error::{BackendError, RuntimeError};
use crate::prompts::FEW_SHOT_PROMPT;
use crate::settings::Settings;

/// Steps that may fall through to the next one, in priority order.
#[derive(Clone, Copy, Debug)]
enum Attempt {
    Tuned,
    Character,
}

const FALLBACK_CHAIN: [Attempt; 2] = [Attempt::Tuned, Attempt::Character];

/// Picks the AI backend: tuned model, else named character, else default.
pub struct BackendResolver {
    provider: Arc<dyn ModelProvider>,
    characters: Arc<dyn CharacterSource>,
}

impl BackendResolver {
    pub fn new(provider: Arc<dyn ModelProvider>, characters: Arc<dyn CharacterSource>) -> Self {
        Self {
            provider,
            characters,
        }
    }

    /// Resolves a backend; only a failing default attempt is an error.
    pub async fn resolve(&self, settings: &Settings) -> Result<AiBackend, RuntimeError> {
        for attempt in FALLBACK_CHAIN {
            let outcome = match attempt {
                Attempt::Tuned => self.try_tuned(settings).await,
                Attempt::Character => self.try_character(settings),
            };
            match outcome {
                Ok(Some(backend)) => {
                    tracing::info!(backend = %backend, "using AI backend");
                    return Ok(backend);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(?attempt, error = %e, label = e.as_label(), "backend attempt failed");
                }
            }
        }

        match self.open_default(settings) {
            Ok(backend) => {
                tracing::info!(backend = %backend, "using default model with few-shot prompting");
                Ok(backend)
            }
            Err(source) => {
                tracing::error!(error = %source, "default backend unavailable");
                Err(RuntimeError::NoBackend { source })
            }
        }
    }

    async fn try_tuned(&self, settings: &Settings) -> Result<Option<AiBackend>, BackendError> {
        let Some(id) = settings.tuned_model_name.as_deref() else {
            tracing::info!("no tuned model configured");
            return Ok(None);
        };

        let tuned = self.provider.list_tuned_models().await?;
        tracing::info!(tuned_models = ?tuned, "available tuned models");
        if !tuned.iter().any(|name| name.contains(id)) {
            tracing::warn!(tuned_model = id, "tuned model not found in available models");
            return Ok(None);
        }

        let model_name = format!("tunedModels/{id}");
        let info = self.provider.get_tuned_model(&model_name).await?;
        tracing::info!(name = %info.name, base_model = ?info.base_model, "tuned model info");

        AiBackend::open(self.provider.as_ref(), BackendKind::Tuned, &model_name, None).map(Some)
    }

    fn try_character(&self, settings: &Settings) -> Result<Option<AiBackend>, BackendError> {
        let available = self.characters.list_available_characters();
        let Some(name) = pick_character(&available, &settings.default_character) else {
            tracing::warn!("no characters found");
            return Ok(None);
        };

        tracing::info!(character = name, "using character provider");
        AiBackend::open_character(
            self.provider.as_ref(),
            self.characters.as_ref(),
            name,
            &settings.default_model_name,
        )
        .map(Some)
    }

    fn open_default(&self, settings: &Settings) -> Result<AiBackend, BackendError> {
        AiBackend::open(
            self.provider.as_ref(),
            BackendKind::Default,
            &settings.default_model_name,
            Some(FEW_SHOT_PROMPT),
        )
    }
}

/// Configured character if listed, else the first listed one.
fn pick_character<'a>(available: &'a [String], preferred: &str) -> Option<&'a str> {
    available
        .iter()
        .find(|name| name.as_str() == preferred)
        .or_else(|| available.first())
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{FakeCharacters, FakeProvider};

    fn settings(tuned: Option<&str>) -> Settings {
        Settings {
            tuned_model_name: tuned.map(str::to_string),
            ..Settings::default()
        }
    }

    fn resolver(provider: FakeProvider, chars: FakeCharacters) -> BackendResolver {
        BackendResolver::new(Arc::new(provider), Arc::new(chars))
    }

    #[tokio::test]
    async fn test_listed_tuned_model_wins() {
        let provider = FakeProvider {
            tuned: vec!["tunedModels/pugo-hilion".into()],
            ..Default::default()
        };
        let r = resolver(provider, FakeCharacters::with(&["DarkSanta"]));

        let backend = r.resolve(&settings(Some("pugo-hilion"))).await.unwrap();
        assert_eq!(backend.kind(), BackendKind::Tuned);
        assert_eq!(backend.model_name(), "tunedModels/pugo-hilion");
        assert!(backend.system_instruction().is_none());
    }

    #[tokio::test]
    async fn test_unlisted_tuned_model_falls_back_to_character() {
        let provider = FakeProvider {
            tuned: vec!["tunedModels/other".into()],
            ..Default::default()
        };
        let r = resolver(provider, FakeCharacters::with(&["DarkSanta"]));

        let backend = r.resolve(&settings(Some("pugo-hilion"))).await.unwrap();
        assert_eq!(backend.kind(), BackendKind::Character);
        assert_eq!(backend.character(), Some("DarkSanta"));
    }

    #[tokio::test]
    async fn test_tuned_lookup_errors_fall_back() {
        let makers: [fn(String) -> BackendError; 3] = [
            BackendError::InvalidArgument,
            BackendError::NotFound,
            BackendError::Provider,
        ];
        for make in makers {
            let provider = FakeProvider {
                tuned: vec!["tunedModels/pugo-hilion".into()],
                get_error: Some(make),
                ..Default::default()
            };
            let r = resolver(provider, FakeCharacters::default());

            let backend = r.resolve(&settings(Some("pugo-hilion"))).await.unwrap();
            assert_eq!(backend.kind(), BackendKind::Default);
        }
    }

    #[tokio::test]
    async fn test_catalogue_failure_falls_back() {
        let provider = FakeProvider {
            list_error: true,
            ..Default::default()
        };
        let r = resolver(provider, FakeCharacters::with(&["DarkSanta"]));

        let backend = r.resolve(&settings(Some("pugo-hilion"))).await.unwrap();
        assert_eq!(backend.kind(), BackendKind::Character);
    }

    #[tokio::test]
    async fn test_no_characters_means_default_backend() {
        let r = resolver(FakeProvider::default(), FakeCharacters::default());

        let backend = r.resolve(&settings(None)).await.unwrap();
        assert_eq!(backend.kind(), BackendKind::Default);
        assert_eq!(backend.model_name(), "gemini-1.5-flash");
        assert_eq!(backend.system_instruction(), Some(FEW_SHOT_PROMPT));
    }

    #[tokio::test]
    async fn test_missing_default_character_picks_first_listed() {
        for _ in 0..3 {
            let r = resolver(
                FakeProvider::default(),
                FakeCharacters::with(&["Pirate", "Wizard"]),
            );
            let backend = r.resolve(&settings(None)).await.unwrap();
            assert_eq!(backend.character(), Some("Pirate"));
        }
    }

    #[tokio::test]
    async fn test_broken_character_file_falls_back_to_default() {
        let chars = FakeCharacters {
            broken: true,
            ..FakeCharacters::with(&["DarkSanta"])
        };
        let r = resolver(FakeProvider::default(), chars);

        let backend = r.resolve(&settings(None)).await.unwrap();
        assert_eq!(backend.kind(), BackendKind::Default);
    }

    #[tokio::test]
    async fn test_default_unavailable_is_fatal() {
        let provider = FakeProvider {
            unavailable: vec!["gemini-1.5-flash".into()],
            ..Default::default()
        };
        let r = resolver(provider, FakeCharacters::with(&["DarkSanta"]));

        let err = r.resolve(&settings(None)).await.unwrap_err();
        assert_eq!(err.as_label(), "runtime_no_backend");
    }

    #[test]
    fn test_pick_character_prefers_configured() {
        let names = vec!["Pirate".to_string(), "DarkSanta".to_string()];
        assert_eq!(pick_character(&names, "DarkSanta"), Some("DarkSanta"));
        assert_eq!(pick_character(&names, "Grinch"), Some("Pirate"));
        assert_eq!(pick_character(&[], "DarkSanta"), None);
    }
}
