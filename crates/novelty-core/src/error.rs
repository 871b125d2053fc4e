//! Error types for Novelty Architect.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire application.
///
/// Every failure of the hosted AI clients, the configuration layer and the
/// generation core is expressed through this enum so the orchestrator can
/// surface a single human-readable message per failed submission.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoveltyError {
    /// The request never produced an HTTP response (DNS, connect, timeout...)
    #[error("Gemini API request failed: {message}")]
    Transport { message: String },

    /// The service answered with a non-success status
    #[error("Gemini API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        is_retryable: bool,
    },

    /// The service answered successfully but without any usable body
    #[error("No response from Gemini.")]
    EmptyResponse,

    /// The body could not be interpreted as the expected payload
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NoveltyError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates an Api error, deriving retryability from the status code.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            is_retryable: matches!(status, 429 | 500 | 502 | 503 | 504),
        }
    }

    /// Creates a MalformedResponse error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Whether a later identical request could plausibly succeed.
    ///
    /// Nothing in the generation core retries; the hint is informational
    /// for the presentation layer.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Api { is_retryable, .. } => *is_retryable,
            _ => false,
        }
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for NoveltyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for NoveltyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for NoveltyError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for NoveltyError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, NoveltyError>`.
pub type Result<T> = std::result::Result<T, NoveltyError>;
