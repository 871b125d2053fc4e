//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml` in the configuration
//! directory, writing a default file on first use.

use crate::paths::NoveltyPaths;
use novelty_core::config::RootConfig;
use novelty_core::error::{NoveltyError, Result};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    /// Uses RwLock for thread-safe lazy loading.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a service for the config.toml resolved by `paths`.
    pub fn new(paths: &NoveltyPaths) -> Result<Self> {
        let path = paths
            .config_file()
            .map_err(|e| NoveltyError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a service reading an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Gets the root configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<RootConfig> {
        // Check if already cached
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        // Cache it
        {
            let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }

    fn load_config(&self) -> Result<RootConfig> {
        if !self.path.exists() {
            let default_config = RootConfig::default();
            self.write_config(&default_config)?;
            tracing::info!(path = %self.path.display(), "Created default configuration");
            return Ok(default_config);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let config: RootConfig = toml::from_str(&content)?;
        config.generation.validate()?;
        tracing::debug!(path = %self.path.display(), "Loaded configuration");
        Ok(config)
    }

    fn write_config(&self, config: &RootConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
