//! UserProfile domain model.

use serde::{Deserialize, Serialize};

/// Built-in biography used when no profile is configured.
pub const DEFAULT_BIO: &str = "I am a seasoned engineer and architect with over 19 years of experience driving large-scale software architecture and enterprise solutions. I have proven expertise in leading cross-functional and global teams through multiple strategic projects and complex technology transformations.
I am working on a new state of the art licensing platform for my company focused on managing product use of enterprise servers, storage, networking and other data center products using licensing.
I have re-imagined platforms, written several white-papers, filed several patents across software architecture, enterprise licensing and GenAI domains.
I am currently leading & driving delivery excellence within cross-functional teams.";

/// User profile domain model.
///
/// Grounding context for idea generation. The generation core only ever
/// reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User's background or bio
    pub bio: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            bio: DEFAULT_BIO.to_string(),
        }
    }
}
