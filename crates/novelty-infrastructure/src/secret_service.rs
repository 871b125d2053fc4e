//! Secret service implementation.
//!
//! Reads the Gemini API key from `secret.json`, falling back to the
//! `GEMINI_API_KEY` and `API_KEY` environment variables.

use crate::paths::NoveltyPaths;
use novelty_core::config::{GeminiConfig, SecretConfig};
use novelty_core::error::{NoveltyError, Result};
use novelty_core::secret::SecretService;
use std::path::PathBuf;

/// Environment variables consulted, in order, when secret.json has no key.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Service for managing secret configuration.
#[derive(Debug, Clone)]
pub struct SecretServiceImpl {
    path: PathBuf,
}

impl SecretServiceImpl {
    pub fn new(paths: &NoveltyPaths) -> Result<Self> {
        let path = paths
            .secret_file()
            .map_err(|e| NoveltyError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the Gemini API key or a configuration error naming where it was looked for.
    pub async fn gemini_api_key(&self) -> Result<String> {
        self.load_secrets()
            .await?
            .gemini
            .map(|gemini| gemini.api_key)
            .ok_or_else(|| {
                NoveltyError::config(format!(
                    "Gemini API key not found in {} or the {} environment variables",
                    self.path.display(),
                    API_KEY_ENV_VARS.join("/")
                ))
            })
    }

    async fn read_file(&self) -> Result<SecretConfig> {
        if !self.path.exists() {
            return Ok(SecretConfig::default());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(SecretConfig::default());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        let from_file = self.read_file().await?;
        Ok(resolve_gemini_key(from_file, |name| std::env::var(name).ok()))
    }

    async fn secret_file_exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}

/// Keeps a non-blank key from the file, otherwise takes the first non-blank
/// environment variable.
pub fn resolve_gemini_key<F>(mut config: SecretConfig, env: F) -> SecretConfig
where
    F: Fn(&str) -> Option<String>,
{
    let has_file_key = config
        .gemini
        .as_ref()
        .is_some_and(|gemini| !gemini.api_key.trim().is_empty());
    if has_file_key {
        return config;
    }

    config.gemini = API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| env(name))
        .find(|value| !value.trim().is_empty())
        .map(|api_key| GeminiConfig { api_key });
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_file_key_wins_over_environment() {
        let config = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: "from-file".to_string(),
            }),
        };
        let resolved = resolve_gemini_key(config, |_| Some("from-env".to_string()));
        assert_eq!(resolved.gemini.unwrap().api_key, "from-file");
    }

    #[test]
    fn test_blank_file_key_falls_back_to_environment_order() {
        let config = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: " ".to_string(),
            }),
        };
        let resolved = resolve_gemini_key(config, |name| match name {
            "GEMINI_API_KEY" => Some(String::new()),
            "API_KEY" => Some("legacy".to_string()),
            _ => None,
        });
        assert_eq!(resolved.gemini.unwrap().api_key, "legacy");
    }

    #[test]
    fn test_missing_everywhere_leaves_no_gemini_config() {
        let resolved = resolve_gemini_key(SecretConfig::default(), no_env);
        assert!(resolved.gemini.is_none());
    }
}
