//! # AI backends.
//!
//! An [`AiBackend`] is a text-generation handle opened with a fixed system
//! instruction. It is immutable once built and shared read-only with workers
//! as `Arc<AiBackend>`.
//!
//! The provider behind it is external and consumed through two traits:
//! - [`ModelProvider`]: lists/looks up tuned models and opens model handles;
//! - [`TextModel`]: the opened handle, `generate_content(prompt) -> Generation`.
//!
//! ## Contents
//! - [`BackendResolver`]: tuned → character → default fallback chain
//! - [`CharacterBackends`]: lazily opened per-character backends for chat callers

mod cache;
mod resolver;

pub use cache::CharacterBackends;
pub use resolver::BackendResolver;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::characters::CharacterSource;
use crate::error::BackendError;

/// Text produced by a model call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
}

/// Metadata returned by a tuned-model lookup.
#[derive(Clone, Debug, Default)]
pub struct TunedModelInfo {
    /// Fully qualified name, e.g. `tunedModels/my-model`.
    pub name: String,
    /// Model the tuned model was derived from, if reported.
    pub base_model: Option<String>,
}

/// An opened model handle.
///
/// Implementations must be safe to call concurrently from several workers.
/// No retry is performed by this crate; retrying belongs to the caller.
#[async_trait]
pub trait TextModel: Send + Sync + 'static {
    /// Generates a completion for `prompt` under the handle's system instruction.
    async fn generate_content(&self, prompt: &str) -> Result<Generation, BackendError>;
}

/// Shared handle to an opened model.
pub type ModelRef = Arc<dyn TextModel>;

/// The AI provider: tuned-model catalogue plus model construction.
#[async_trait]
pub trait ModelProvider: Send + Sync + 'static {
    /// Names of the tuned models currently exposed by the provider.
    async fn list_tuned_models(&self) -> Result<Vec<String>, BackendError>;

    /// Looks up one tuned model by fully qualified name.
    async fn get_tuned_model(&self, name: &str) -> Result<TunedModelInfo, BackendError>;

    /// Opens a model handle with an optional fixed system instruction.
    fn open_model(
        &self,
        model_name: &str,
        system_instruction: Option<&str>,
    ) -> Result<ModelRef, BackendError>;
}

/// Which step of the fallback chain produced a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Tuned,
    Character,
    Default,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Tuned => "tuned",
            BackendKind::Character => "character",
            BackendKind::Default => "default",
        }
    }
}

/// A text-generation capability bound to a fixed system instruction.
#[derive(Clone)]
pub struct AiBackend {
    kind: BackendKind,
    model_name: String,
    character: Option<String>,
    system_instruction: Option<Arc<str>>,
    model: ModelRef,
}

impl AiBackend {
    /// Opens `model_name` on `provider` and wraps it.
    pub fn open(
        provider: &dyn ModelProvider,
        kind: BackendKind,
        model_name: &str,
        system_instruction: Option<&str>,
    ) -> Result<Self, BackendError> {
        let model = provider.open_model(model_name, system_instruction)?;
        Ok(Self {
            kind,
            model_name: model_name.to_string(),
            character: None,
            system_instruction: system_instruction.map(Arc::from),
            model,
        })
    }

    /// Loads `character` from `source` and opens `model_name` with its instruction.
    ///
    /// A character absent from the file yields [`BackendError::CharacterNotFound`];
    /// an unusable file yields [`BackendError::Character`].
    pub fn open_character(
        provider: &dyn ModelProvider,
        source: &dyn CharacterSource,
        character: &str,
        model_name: &str,
    ) -> Result<Self, BackendError> {
        let loaded = source
            .load(character)?
            .ok_or_else(|| BackendError::CharacterNotFound(character.to_string()))?;

        let mut backend = Self::open(
            provider,
            BackendKind::Character,
            model_name,
            Some(&loaded.system_instruction),
        )?;
        backend.character = Some(loaded.name);
        Ok(backend)
    }

    /// Generates text for `prompt`. Provider errors are returned as-is.
    pub async fn generate_content(&self, prompt: &str) -> Result<Generation, BackendError> {
        self.model.generate_content(prompt).await
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Character name as spelled in the character file (character backends only).
    pub fn character(&self) -> Option<&str> {
        self.character.as_deref()
    }

    pub fn system_instruction(&self) -> Option<&str> {
        self.system_instruction.as_deref()
    }
}

impl fmt::Display for AiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.character {
            Some(c) => write!(f, "{} {} ({c})", self.kind.as_str(), self.model_name),
            None => write!(f, "{} {}", self.kind.as_str(), self.model_name),
        }
    }
}

impl fmt::Debug for AiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiBackend")
            .field("kind", &self.kind)
            .field("model_name", &self.model_name)
            .field("character", &self.character)
            .finish_non_exhaustive()
    }
}
