//! # Bot-level settings.
//!
//! [`Settings`] is the configuration bundle handed to the backend resolver and
//! to every [`WorkerLauncher`](crate::WorkerLauncher). It is plain data: build
//! it by hand (tests) or with [`Settings::from_env`] (process startup).
//!
//! ## Environment
//! | Variable                    | Field                       | Default                          |
//! |-----------------------------|-----------------------------|----------------------------------|
//! | `GEMINI_API_KEY`            | `gemini_api_key`            | empty                            |
//! | `TUNED_MODEL_NAME`          | `tuned_model_name`          | none                             |
//! | `DEFAULT_CHARACTER`         | `default_character`         | `DarkSanta`                      |
//! | `DEFAULT_MODEL_NAME`        | `default_model_name`        | `gemini-1.5-flash`               |
//! | `CHARACTERS_FILE`           | `characters_file`           | `src/characters/characters.json` |
//! | `ENABLE_TWITTER`            | `enable_twitter`            | `false`                          |
//! | `X_BEARER_TOKEN`            | `x_bearer_token`            | none                             |
//! | `X_API_KEY`                 | `x_api_key`                 | none                             |
//! | `X_API_KEY_SECRET`          | `x_api_key_secret`          | none                             |
//! | `X_ACCESS_TOKEN`            | `x_access_token`            | none                             |
//! | `X_ACCESS_TOKEN_SECRET`     | `x_access_token_secret`     | none                             |
//! | `RAPIDAPI_KEY`              | `rapidapi_key`              | none                             |
//! | `RAPIDAPI_HOST`             | `rapidapi_host`             | empty                            |
//! | `ACCOUNTS_TO_MONITOR`       | `accounts_to_monitor`       | empty (comma separated)          |
//! | `TWITTER_POLLING_INTERVAL`  | `twitter_polling_interval`  | `60` (seconds)                   |

use std::path::PathBuf;
use std::time::Duration;

/// Character used for the character backend when none is configured.
pub const DEFAULT_CHARACTER: &str = "DarkSanta";

/// Model opened by the character and default backends.
pub const DEFAULT_MODEL_NAME: &str = "gemini-1.5-flash";

/// Location of the character-prompt file relative to the working directory.
pub const DEFAULT_CHARACTERS_FILE: &str = "src/characters/characters.json";

/// Configuration bundle for backend resolution and worker construction.
///
/// Empty strings read from the environment are treated as absent, so a
/// blank `X_API_KEY=` counts as a missing credential.
#[derive(Clone, Debug)]
pub struct Settings {
    /// API key forwarded to the model provider.
    pub gemini_api_key: String,
    /// Identifier of the tuned model to try first (`None` skips that attempt).
    pub tuned_model_name: Option<String>,
    /// Preferred character for the character backend.
    pub default_character: String,
    /// Model opened by the character and default backends.
    pub default_model_name: String,
    /// Path of the character-prompt file.
    pub characters_file: PathBuf,

    /// Whether the Twitter worker should be started at all.
    pub enable_twitter: bool,
    pub x_bearer_token: Option<String>,
    pub x_api_key: Option<String>,
    pub x_api_key_secret: Option<String>,
    pub x_access_token: Option<String>,
    pub x_access_token_secret: Option<String>,
    pub rapidapi_key: Option<String>,
    pub rapidapi_host: String,
    /// Accounts the Twitter worker watches.
    pub accounts_to_monitor: Vec<String>,
    /// Interval between two polls of the Twitter worker.
    pub twitter_polling_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            tuned_model_name: None,
            default_character: DEFAULT_CHARACTER.to_string(),
            default_model_name: DEFAULT_MODEL_NAME.to_string(),
            characters_file: PathBuf::from(DEFAULT_CHARACTERS_FILE),
            enable_twitter: false,
            x_bearer_token: None,
            x_api_key: None,
            x_api_key_secret: None,
            x_access_token: None,
            x_access_token_secret: None,
            rapidapi_key: None,
            rapidapi_host: String::new(),
            accounts_to_monitor: Vec::new(),
            twitter_polling_interval: Duration::from_secs(60),
        }
    }
}

impl Settings {
    /// Loads `.env` (if present) and reads settings from the process environment.
    ///
    /// Unset or unparsable values fall back to [`Settings::default`].
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "failed to load .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    ///
    /// [`Settings::from_env`] uses the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Self {
            gemini_api_key: get("GEMINI_API_KEY").unwrap_or_default(),
            tuned_model_name: get("TUNED_MODEL_NAME"),
            default_character: get("DEFAULT_CHARACTER").unwrap_or(defaults.default_character),
            default_model_name: get("DEFAULT_MODEL_NAME").unwrap_or(defaults.default_model_name),
            characters_file: get("CHARACTERS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.characters_file),
            enable_twitter: get("ENABLE_TWITTER").is_some_and(|v| parse_bool(&v)),
            x_bearer_token: get("X_BEARER_TOKEN"),
            x_api_key: get("X_API_KEY"),
            x_api_key_secret: get("X_API_KEY_SECRET"),
            x_access_token: get("X_ACCESS_TOKEN"),
            x_access_token_secret: get("X_ACCESS_TOKEN_SECRET"),
            rapidapi_key: get("RAPIDAPI_KEY"),
            rapidapi_host: get("RAPIDAPI_HOST").unwrap_or_default(),
            accounts_to_monitor: get("ACCOUNTS_TO_MONITOR")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            twitter_polling_interval: get("TWITTER_POLLING_INTERVAL")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.twitter_polling_interval),
        }
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn split_list(v: &str) -> Vec<String> {
    v.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
