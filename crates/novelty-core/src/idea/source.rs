//! Client traits for the two hosted AI calls.

use super::model::IdeaDraft;
use crate::error::Result;
use crate::user::UserProfile;

/// Produces idea drafts from free-text keywords.
///
/// Implementations must surface every transport, parsing or validation
/// problem as a single error; an empty or missing response body is an
/// error, never an empty success list.
#[async_trait::async_trait]
pub trait IdeaSource: Send + Sync {
    /// Generates an ordered list of ideas grounded in the user's profile.
    ///
    /// # Arguments
    ///
    /// * `keywords` - Non-empty, already trimmed keyword phrase
    /// * `profile` - Read-only grounding context
    async fn generate_ideas(&self, keywords: &str, profile: &UserProfile) -> Result<Vec<IdeaDraft>>;
}

/// Illustrates one idea.
#[async_trait::async_trait]
pub trait ImageSynthesizer: Send + Sync {
    /// Returns a renderable image reference (typically a `data:` URI), or
    /// `None` when the model produced no image.
    ///
    /// An `Err` only ever affects the idea it was requested for.
    async fn synthesize(&self, visual_prompt: &str) -> Result<Option<String>>;
}
