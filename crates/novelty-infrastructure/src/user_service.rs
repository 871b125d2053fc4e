//! Configuration-based user service.

use crate::config_service::ConfigService;
use novelty_core::user::{UserProfile, UserService};
use std::sync::Arc;

/// Serves the profile configured under `[user]` in config.toml.
///
/// Falls back to the built-in profile when the configuration can't be read,
/// so a broken config file never blocks idea generation.
#[derive(Debug, Clone)]
pub struct ConfigBasedUserService {
    config_service: Arc<ConfigService>,
}

impl ConfigBasedUserService {
    pub fn new(config_service: Arc<ConfigService>) -> Self {
        Self { config_service }
    }
}

impl UserService for ConfigBasedUserService {
    fn get_user_profile(&self) -> UserProfile {
        match self.config_service.get_config() {
            Ok(config) => config.user.to_profile(),
            Err(err) => {
                tracing::warn!("Failed to load user profile, using default: {}", err);
                UserProfile::default()
            }
        }
    }
}
