//! Path management for Novelty Architect configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/novelty-architect/   # Config directory (platform default)
//! ├── config.toml                # Models, timings, user profile
//! ├── secret.json                # Gemini API key
//! └── logs/                      # Application logs
//!     └── novelty.log.YYYY-MM-DD
//! ```

use novelty_core::config::{GeminiConfig, SecretConfig};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "novelty-architect";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves every file location from one root.
///
/// `NoveltyPaths::new(None)` uses the platform config directory; passing a
/// base path roots everything there instead (tests, portable installs).
#[derive(Debug, Clone)]
pub struct NoveltyPaths {
    base: Option<PathBuf>,
}

impl NoveltyPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    /// Returns the path to config.toml.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    /// Returns the path to the logs directory.
    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }

    /// Ensures the secret file exists, creating it with an empty template if it doesn't.
    ///
    /// On Unix the new file is created with permissions 600.
    pub fn ensure_secret_file(&self) -> Result<PathBuf, std::io::Error> {
        let secret_path = self
            .secret_file()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;

        if secret_path.exists() {
            return Ok(secret_path);
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template_config = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
            }),
        };
        let template_json =
            serde_json::to_string_pretty(&template_config).map_err(std::io::Error::other)?;

        std::fs::write(&secret_path, template_json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&secret_path, permissions)?;
        }

        Ok(secret_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_under_config_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let paths = NoveltyPaths::new(Some(temp_dir.path()));

        let config_dir = paths.config_dir().unwrap();
        assert_eq!(config_dir, temp_dir.path());
        assert!(paths.config_file().unwrap().ends_with("config.toml"));
        assert!(paths.secret_file().unwrap().starts_with(&config_dir));
        assert!(paths.logs_dir().unwrap().ends_with("logs"));
    }

    #[test]
    fn test_ensure_secret_file_writes_template_once() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let paths = NoveltyPaths::new(Some(&temp_dir.path().join("nested")));

        let created = paths.ensure_secret_file().unwrap();
        let template: SecretConfig =
            serde_json::from_str(&std::fs::read_to_string(&created).unwrap()).unwrap();
        assert_eq!(template.gemini.map(|g| g.api_key), Some(String::new()));

        std::fs::write(&created, r#"{"gemini":{"api_key":"kept"}}"#).unwrap();
        paths.ensure_secret_file().unwrap();
        assert!(std::fs::read_to_string(&created).unwrap().contains("kept"));
    }
}
