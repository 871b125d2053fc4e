//! Domain layer for Novelty Architect.
//!
//! Holds the idea model, the user profile, configuration models and the
//! traits through which the application layer reaches the hosted AI
//! services.

pub mod config;
pub mod error;
pub mod idea;
pub mod secret;
pub mod user;

// Re-export common error type
pub use error::NoveltyError;
