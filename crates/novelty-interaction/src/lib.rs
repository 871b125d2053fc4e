//! Gemini REST clients implementing the idea and image traits of
//! `novelty-core`.

pub mod data_uri;
pub mod gemini_client;
pub mod idea_agent;
pub mod image_agent;
pub mod prompts;

pub use gemini_client::GeminiClient;
pub use idea_agent::GeminiIdeaAgent;
pub use image_agent::GeminiImageAgent;
