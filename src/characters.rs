//! # Character prompts.
//!
//! A character is a named system instruction. [`CharacterSource`] is the
//! capability the resolver needs; [`CharacterFile`] implements it over a JSON
//! file of the form:
//!
//! ```json
//! { "characters": [
//!     { "character_name": "DarkSanta", "character_detail": { "text": "You are ..." } }
//! ] }
//! ```
//!
//! Listing never fails (errors are logged and degrade to an empty list).
//! Loading distinguishes a character missing from the file (`Ok(None)`) from
//! a missing or unreadable file (`Err`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CharacterError;

/// A loaded character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Character {
    /// Name as spelled in the source.
    pub name: String,
    /// System instruction the model is opened with.
    pub system_instruction: String,
}

/// Source of character prompts.
pub trait CharacterSource: Send + Sync + 'static {
    /// Names of all available characters, in source order. Never fails.
    fn list_available_characters(&self) -> Vec<String>;

    /// Loads one character by name (case-insensitive).
    fn load(&self, name: &str) -> Result<Option<Character>, CharacterError>;
}

#[derive(Deserialize)]
struct CharactersDoc {
    #[serde(default)]
    characters: Vec<CharacterEntry>,
}

#[derive(Deserialize)]
struct CharacterEntry {
    #[serde(default)]
    character_name: Option<String>,
    #[serde(default)]
    character_detail: Option<CharacterDetail>,
}

#[derive(Deserialize)]
struct CharacterDetail {
    #[serde(default)]
    text: String,
}

/// Character source backed by a JSON file, re-read on every call.
#[derive(Clone, Debug)]
pub struct CharacterFile {
    path: PathBuf,
}

impl CharacterFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<CharactersDoc, CharacterError> {
        if !self.path.exists() {
            tracing::error!(path = %self.path.display(), "characters file not found");
            return Err(CharacterError::FileMissing {
                path: self.path.clone(),
            });
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl CharacterSource for CharacterFile {
    fn list_available_characters(&self) -> Vec<String> {
        match self.read() {
            Ok(doc) => doc
                .characters
                .into_iter()
                .filter_map(|c| c.character_name)
                .filter(|n| !n.is_empty())
                .collect(),
            Err(e) => {
                tracing::error!(error = %e, "failed to list available characters");
                Vec::new()
            }
        }
    }

    fn load(&self, name: &str) -> Result<Option<Character>, CharacterError> {
        let doc = self.read().inspect_err(|e| {
            tracing::error!(character = name, error = %e, "failed to load character");
        })?;
        let wanted = name.to_lowercase();

        Ok(doc.characters.into_iter().find_map(|c| {
            let found = c.character_name.filter(|n| n.to_lowercase() == wanted)?;
            Some(Character {
                name: found,
                system_instruction: c.character_detail.map(|d| d.text).unwrap_or_default(),
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOC: &str = r#"{
        "characters": [
            { "character_name": "DarkSanta", "character_detail": { "text": "Ho ho no." } },
            { "character_name": "" },
            { "character_detail": { "text": "nameless" } },
            { "character_name": "Pirate" }
        ]
    }"#;

    fn file_with(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_lists_named_characters_in_order() {
        let f = file_with(DOC);
        let src = CharacterFile::new(f.path());
        assert_eq!(src.list_available_characters(), vec!["DarkSanta", "Pirate"]);
    }

    #[test]
    fn test_load_is_case_insensitive() {
        let f = file_with(DOC);
        let src = CharacterFile::new(f.path());

        let c = src.load("darksanta").unwrap().expect("character");
        assert_eq!(c.name, "DarkSanta");
        assert_eq!(c.system_instruction, "Ho ho no.");

        let bare = src.load("PIRATE").unwrap().expect("character");
        assert_eq!(bare.system_instruction, "");
    }

    #[test]
    fn test_unknown_character_is_none() {
        let f = file_with(DOC);
        let src = CharacterFile::new(f.path());
        assert!(src.load("Grinch").unwrap().is_none());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = CharacterFile::new(dir.path().join("characters.json"));

        assert!(src.list_available_characters().is_empty());
        assert!(matches!(
            src.load("DarkSanta"),
            Err(CharacterError::FileMissing { .. })
        ));
    }

    #[test]
    fn test_malformed_file() {
        let f = file_with("{ not json");
        let src = CharacterFile::new(f.path());

        assert!(src.list_available_characters().is_empty());
        assert!(matches!(src.load("DarkSanta"), Err(CharacterError::Parse(_))));
    }
}
