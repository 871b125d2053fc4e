//! Idea domain module.
//!
//! # Module Structure
//!
//! - `model`: Idea records and their identifiers
//! - `source`: Traits for the idea and image generation clients

mod model;
mod source;

pub use model::{Idea, IdeaDraft, IdeaId, IdeaSummary, SessionToken};
pub use source::{IdeaSource, ImageSynthesizer};
