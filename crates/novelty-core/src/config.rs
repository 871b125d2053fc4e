//! Configuration models.
//!
//! `RootConfig` mirrors `config.toml`; `SecretConfig` mirrors `secret.json`.
//! Every field has a default so partial files load cleanly.

use crate::error::{NoveltyError, Result};
use crate::user::{DEFAULT_BIO, UserProfile};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct RootConfig {
    pub user: UserConfig,
    pub generation: GenerationSettings,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct UserConfig {
    pub bio: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            bio: DEFAULT_BIO.to_string(),
        }
    }
}

impl UserConfig {
    /// Falls back to the built-in profile when the configured bio is blank.
    pub fn to_profile(&self) -> UserProfile {
        if self.bio.trim().is_empty() {
            UserProfile::default()
        } else {
            UserProfile {
                bio: self.bio.clone(),
            }
        }
    }
}

/// Settings for one generation round.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationSettings {
    /// Model used for the idea text call
    pub text_model: String,
    /// Model used for the per-idea image calls
    pub image_model: String,
    /// Number of ideas requested from the text model
    pub idea_count: usize,
    /// Pause between completing the progress bar and revealing the ideas
    pub reveal_delay_ms: u64,
    /// HTTP timeout applied by the clients
    pub request_timeout_secs: u64,
    pub progress: ProgressSettings,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            idea_count: 5,
            reveal_delay_ms: 800,
            request_timeout_secs: 120,
            progress: ProgressSettings::default(),
        }
    }
}

impl GenerationSettings {
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Rejects settings the orchestrator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.idea_count == 0 {
            return Err(NoveltyError::config("generation.idea_count must be at least 1"));
        }
        self.progress.validate()
    }
}

/// Shape of the simulated progress curve.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProgressSettings {
    pub tick_ms: u64,
    /// Highest value reachable without an explicit completion
    pub ceiling: f64,
    /// Smallest step taken per tick
    pub min_increment: f64,
    /// Divisor applied to the remaining distance to the ceiling
    pub deceleration: f64,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            ceiling: 95.0,
            min_increment: 0.5,
            deceleration: 50.0,
        }
    }
}

impl ProgressSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// The curve must rise on every tick and stay within (0, 100].
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(NoveltyError::config("generation.progress.tick_ms must be positive"));
        }
        if !(self.ceiling > 0.0 && self.ceiling <= 100.0) {
            return Err(NoveltyError::config(format!(
                "generation.progress.ceiling must be within (0, 100], got {}",
                self.ceiling
            )));
        }
        let positive = [
            ("min_increment", self.min_increment),
            ("deceleration", self.deceleration),
        ];
        match positive.iter().find(|(_, value)| !(value.is_finite() && *value > 0.0)) {
            Some((name, value)) => Err(NoveltyError::config(format!(
                "generation.progress.{name} must be a positive number, got {value}"
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

#[derive(Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: RootConfig = toml::from_str(
            r#"
            [generation]
            reveal_delay_ms = 250

            [generation.progress]
            tick_ms = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.generation.reveal_delay_ms, 250);
        assert_eq!(config.generation.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.generation.progress.tick_ms, 50);
        assert_eq!(config.generation.progress.ceiling, 95.0);
        assert_eq!(config.user.bio, DEFAULT_BIO);
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert!(GenerationSettings::default().validate().is_ok());
    }

    #[test]
    fn test_progress_validation_rejects_unusable_curves() {
        let too_high = ProgressSettings {
            ceiling: 150.0,
            ..ProgressSettings::default()
        };
        assert!(too_high.validate().unwrap_err().to_string().contains("ceiling"));

        let backwards = ProgressSettings {
            min_increment: -1.0,
            ..ProgressSettings::default()
        };
        assert!(backwards.validate().unwrap_err().to_string().contains("min_increment"));

        let stalled = ProgressSettings {
            deceleration: 0.0,
            ..ProgressSettings::default()
        };
        assert!(stalled.validate().unwrap_err().is_config());

        let frozen = ProgressSettings {
            tick_ms: 0,
            ..ProgressSettings::default()
        };
        assert!(frozen.validate().is_err());
    }

    #[test]
    fn test_zero_idea_count_is_rejected() {
        let settings = GenerationSettings {
            idea_count: 0,
            ..GenerationSettings::default()
        };
        assert!(settings.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_blank_bio_falls_back_to_default_profile() {
        let user = UserConfig {
            bio: "   ".to_string(),
        };
        assert_eq!(user.to_profile(), UserProfile::default());
    }

    #[test]
    fn test_gemini_config_debug_hides_key() {
        let config = GeminiConfig {
            api_key: "super-secret".to_string(),
        };
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
