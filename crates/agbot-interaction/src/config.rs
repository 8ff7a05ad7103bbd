//! Configuration file management for the AG bot.
//!
//! Reads `~/.config/agbot/config.toml` for tunables and resolves the Gemini
//! API key from the environment, falling back to `~/.config/agbot/secret.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use agbot_core::{AgbotError, Result};
use serde::Deserialize;

use crate::gemini_api_client::DEFAULT_GEMINI_MODEL;

/// Environment variables checked for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "VITE_GEMINI_API_KEY"];

const CONFIG_FILE: &str = "config.toml";
const SECRET_FILE: &str = "secret.json";

/// Root of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AgbotConfig {
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

/// `[gemini]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GeminiSettings {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl GeminiSettings {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL)
    }
}

/// `[session]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionSettings {
    /// Absent means completion calls may take forever.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// `"24h"` (default) or `"12h"`.
    #[serde(default)]
    pub clock: Option<String>,
    /// Show user messages verbatim instead of as markdown.
    #[serde(default)]
    pub literal_user_text: bool,
}

impl SessionSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn uses_twelve_hour_clock(&self) -> bool {
        matches!(self.clock.as_deref(), Some("12h"))
    }
}

/// Secret file layout: `{"gemini": {"api_key": "..."}}`.
#[derive(Debug, Clone, Deserialize)]
struct SecretConfig {
    #[serde(default)]
    gemini: Option<GeminiSecret>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiSecret {
    api_key: String,
}

/// Returns `~/.config/agbot`.
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| AgbotError::config("Could not determine home directory"))?;
    Ok(home.join(".config").join("agbot"))
}

/// Loads `config.toml` from the default directory.
pub fn load_config() -> Result<AgbotConfig> {
    load_config_from(&config_dir()?.join(CONFIG_FILE))
}

/// Loads configuration from `path`; a missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<AgbotConfig> {
    if !path.exists() {
        return Ok(AgbotConfig::default());
    }

    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| {
        AgbotError::config(format!(
            "Failed to parse configuration file at {}: {}",
            path.display(),
            e
        ))
    })
}

/// Resolves the API key from the process environment or the default secret
/// file.
pub fn resolve_api_key() -> Result<String> {
    let secret_path = config_dir()?.join(SECRET_FILE);
    resolve_api_key_with(|name| std::env::var(name).ok(), &secret_path)
}

/// Resolves the API key using `lookup` for environment variables and
/// `secret_path` as the fallback file.
///
/// Empty values are treated as absent. The key itself never appears in
/// error messages.
pub fn resolve_api_key_with<F>(lookup: F, secret_path: &Path) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let from_env = API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty());
    if let Some(key) = from_env {
        return Ok(key);
    }

    if !secret_path.exists() {
        return Err(AgbotError::config(format!(
            "No Gemini API key: set {} or create {}",
            API_KEY_ENV_VARS[0],
            secret_path.display()
        )));
    }

    let content = fs::read_to_string(secret_path)?;
    let secret: SecretConfig = serde_json::from_str(&content).map_err(|e| {
        AgbotError::config(format!(
            "Failed to parse secret file at {}: {}",
            secret_path.display(),
            e
        ))
    })?;

    secret
        .gemini
        .map(|gemini| gemini.api_key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            AgbotError::config(format!(
                "Gemini configuration not found in {}",
                secret_path.display()
            ))
        })
}
