pub mod analyze;
pub mod init;
pub mod studio;

use anyhow::{Context, Result};
use artcat_core::analysis::gemini::GeminiBackend;
use artcat_core::config::{artcat_dir, Config};
use artcat_core::errors::CoreError;
use artcat_core::worker::SharedBackend;
use std::sync::Arc;

/// The one message users see for any failed analysis.
pub const GENERIC_FAILURE: &str =
    "No pude procesar la imagen. Verifica tu conexión o intenta con otra imagen.";

/// Load ~/.artcat/config.toml (defaults if absent) and apply a model override.
pub fn load_config(model: Option<String>) -> Result<Config> {
    let config_path = artcat_dir().join("config.toml");
    let config = Config::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    apply_model_override(config, model)
}

/// Replace `ai.model` with a `--model` value. A blank override is rejected the
/// same way a blank `ai.model` in the file is.
fn apply_model_override(mut config: Config, model: Option<String>) -> Result<Config> {
    if let Some(model) = model {
        let model = model.trim();
        if model.is_empty() {
            anyhow::bail!("--model must not be empty");
        }
        config.ai.model = model.to_string();
    }
    Ok(config)
}

/// Build the Gemini backend for one request. The API key is read from the
/// environment here, once per request, and injected.
pub fn backend_for_request(config: &Config) -> Result<SharedBackend, CoreError> {
    let key = config.api_key();
    if key.is_none() {
        tracing::debug!(var = %config.ai.api_key_env, "API key variable not set");
    }
    let backend = GeminiBackend::new(&config.ai, key)?;
    Ok(Arc::new(backend))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_override_replaces_configured_model() {
        let config = apply_model_override(Config::default(), Some("gemini-2.5-pro".to_string()))
            .unwrap();
        assert_eq!(config.ai.model, "gemini-2.5-pro");

        let config = apply_model_override(Config::default(), None).unwrap();
        assert_eq!(config.ai.model, Config::default().ai.model);
    }

    #[test]
    fn test_blank_model_override_is_rejected() {
        for model in ["", "   ", "\t"] {
            let err = apply_model_override(Config::default(), Some(model.to_string()));
            assert!(err.is_err(), "override {model:?} accepted");
        }
    }
}
