use crate::errors::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_ai")]
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Name of the environment variable holding the API key. The key itself never
    /// lives in the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        default_ai()
    }
}

fn default_ai() -> AiConfig {
    AiConfig {
        model: default_model(),
        endpoint: default_endpoint(),
        temperature: default_temperature(),
        api_key_env: default_api_key_env(),
        timeout_secs: default_timeout_secs(),
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
/// Highest sampling temperature accepted. Scoring has to stay consistent between
/// runs, so the creative end of the range is off limits.
pub const MAX_TEMPERATURE: f32 = 0.5;

fn default_temperature() -> f32 {
    0.4
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}

/// Access credential for the inference service.
///
/// `Debug` is redacted so the key never ends up in a trace.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read the key from the named environment variable. Empty values count as absent.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl Config {
    /// Load config from the given path, or return defaults if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| CoreError::Io(format!("reading config: {e}")))?;
            let config: Config =
                toml::from_str(&contents).map_err(|e| CoreError::Config(e.to_string()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Write config to the given path.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::Io(format!("creating config dir: {e}")))?;
        }
        std::fs::write(path, contents)
            .map_err(|e| CoreError::Io(format!("writing config: {e}")))?;
        Ok(())
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.ai.model.trim().is_empty() {
            return Err(CoreError::Config("ai.model must not be empty".to_string()));
        }
        if !(0.0..=MAX_TEMPERATURE).contains(&self.ai.temperature) {
            return Err(CoreError::Config(format!(
                "ai.temperature must be between 0.0 and {MAX_TEMPERATURE}, got {}",
                self.ai.temperature
            )));
        }
        if self.ai.api_key_env.trim().is_empty() {
            return Err(CoreError::Config("ai.api_key_env must not be empty".to_string()));
        }
        Ok(())
    }

    /// Read the API key named by `ai.api_key_env` from the process environment.
    pub fn api_key(&self) -> Option<ApiKey> {
        ApiKey::from_env(&self.ai.api_key_env)
    }
}

/// Get the artcat data directory (~/.artcat/).
pub fn artcat_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".artcat")
}

/// Expand ~ at the start of a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else if path == "~" {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
    } else {
        PathBuf::from(path)
    }
}
