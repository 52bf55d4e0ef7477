//! # Per-character backends for chat callers.
//!
//! Chat front-ends address characters by name. [`CharacterBackends`] opens a
//! character backend the first time a name is requested and reuses it after
//! that. Names are matched case-insensitively.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::backend::{AiBackend, Generation, ModelProvider};
use crate::characters::CharacterSource;
use crate::error::BackendError;

/// Lazily opened, cached character backends.
pub struct CharacterBackends {
    provider: Arc<dyn ModelProvider>,
    characters: Arc<dyn CharacterSource>,
    model_name: String,
    opened: RwLock<HashMap<String, Arc<AiBackend>>>,
}

impl CharacterBackends {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        characters: Arc<dyn CharacterSource>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            characters,
            model_name: model_name.into(),
            opened: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached backend for `character`, opening it on first use.
    ///
    /// Unknown characters yield [`BackendError::CharacterNotFound`] and are not cached.
    pub async fn get_or_open(&self, character: &str) -> Result<Arc<AiBackend>, BackendError> {
        let key = character.to_lowercase();
        if let Some(backend) = self.opened.read().await.get(&key) {
            return Ok(Arc::clone(backend));
        }

        let mut opened = self.opened.write().await;
        if let Some(backend) = opened.get(&key) {
            return Ok(Arc::clone(backend));
        }
        let backend = Arc::new(AiBackend::open_character(
            self.provider.as_ref(),
            self.characters.as_ref(),
            character,
            &self.model_name,
        )?);
        tracing::info!(character, "character provider initialized");
        opened.insert(key, Arc::clone(&backend));
        Ok(backend)
    }

    /// Sends `message` to `character` and returns its reply.
    pub async fn chat(&self, character: &str, message: &str) -> Result<Generation, BackendError> {
        let backend = self.get_or_open(character).await?;
        backend.generate_content(message).await.inspect_err(|e| {
            tracing::error!(character, error = %e, "failed to generate response");
        })
    }

    /// Names of the characters that can be chatted with.
    pub fn characters(&self) -> Vec<String> {
        self.characters.list_available_characters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{FakeCharacters, FakeProvider};

    fn backends(provider: Arc<FakeProvider>) -> CharacterBackends {
        CharacterBackends::new(
            provider,
            Arc::new(FakeCharacters::with(&["DarkSanta", "Pirate"])),
            "gemini-1.5-flash",
        )
    }

    #[tokio::test]
    async fn test_backend_is_opened_once_per_character() {
        let provider = Arc::new(FakeProvider::default());
        let cache = backends(Arc::clone(&provider));

        let a = cache.get_or_open("DarkSanta").await.unwrap();
        let b = cache.get_or_open("darksanta").await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(provider.opened.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_chat_replies_in_character() {
        let cache = backends(Arc::new(FakeProvider::default()));
        let reply = cache.chat("Pirate", "ahoy").await.unwrap();
        assert_eq!(reply.text, "You are Pirate.|ahoy");
        assert_eq!(cache.characters(), vec!["DarkSanta", "Pirate"]);
    }

    #[tokio::test]
    async fn test_unknown_character_is_not_cached() {
        let provider = Arc::new(FakeProvider::default());
        let cache = backends(Arc::clone(&provider));

        let err = cache.get_or_open("Grinch").await.unwrap_err();
        assert_eq!(err.as_label(), "backend_character_not_found");
        assert!(provider.opened.lock().unwrap().is_empty());
    }
}
