//! Idea domain model.
//!
//! An [`IdeaDraft`] is what the idea source hands back; an [`Idea`] is the
//! same record after the orchestrator has given it an identity and an image
//! slot.

use crate::error::{NoveltyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one accepted submission.
///
/// Tokens increase monotonically within a process. Every in-flight task
/// carries the token of the submission that spawned it, and results whose
/// token no longer matches the current session are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SessionToken(pub u64);

impl SessionToken {
    /// The token following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of an idea, stable for the lifetime of its session.
///
/// Built from the session token and the idea's position in the source
/// response, so two submissions can never mint the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeaId(String);

impl IdeaId {
    pub fn new(token: SessionToken, index: usize) -> Self {
        Self(format!("idea-{}-{}", token.0, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdeaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured write-up of an idea. All four fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaSummary {
    /// Why the idea is novel
    pub novelty: String,
    /// Detailed summary write-up
    pub description: String,
    /// How it differs from existing solutions and patents
    pub prior_art_difference: String,
    /// Best mode of implementation
    pub implementation: String,
}

/// An idea as returned by the idea source, before ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaDraft {
    pub title: String,
    pub domain: String,
    /// Scene description handed to the image synthesizer; never displayed.
    pub visual_prompt: String,
    pub summary: IdeaSummary,
}

impl IdeaDraft {
    /// Rejects drafts with a blank required field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("title", &self.title),
            ("domain", &self.domain),
            ("visualPrompt", &self.visual_prompt),
            ("summary.novelty", &self.summary.novelty),
            ("summary.description", &self.summary.description),
            ("summary.priorArtDifference", &self.summary.prior_art_difference),
            ("summary.implementation", &self.summary.implementation),
        ];

        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(NoveltyError::malformed(format!(
                "idea '{}' has an empty '{}' field",
                self.title, name
            ))),
            None => Ok(()),
        }
    }

    /// Ingests the draft under the given id with its image still pending.
    pub fn into_idea(self, id: IdeaId) -> Idea {
        Idea {
            id,
            title: self.title,
            domain: self.domain,
            visual_prompt: self.visual_prompt,
            summary: self.summary,
            image_url: None,
            loading_image: true,
        }
    }
}

/// One generated invention concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: IdeaId,
    pub title: String,
    pub domain: String,
    pub visual_prompt: String,
    pub summary: IdeaSummary,
    /// Renderable image reference (a data URI); absent until synthesis succeeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// True from creation until the image call resolves; never set back.
    pub loading_image: bool,
}

impl Idea {
    /// The image call resolved without producing an image.
    pub fn image_unavailable(&self) -> bool {
        !self.loading_image && self.image_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> IdeaDraft {
        IdeaDraft {
            title: title.to_string(),
            domain: "Licensing".to_string(),
            visual_prompt: "A clay server rack wearing a padlock".to_string(),
            summary: IdeaSummary {
                novelty: "Ties entitlements to attested hardware".to_string(),
                description: "A licensing agent embedded in firmware".to_string(),
                prior_art_difference: "No central license server".to_string(),
                implementation: "TPM-backed entitlement ledger".to_string(),
            },
        }
    }

    #[test]
    fn test_session_token_next_is_strictly_greater() {
        let first = SessionToken::default().next();
        assert_eq!(first, SessionToken(1));
        assert!(first.next() > first);
    }

    #[test]
    fn test_idea_ids_are_unique_across_sessions() {
        let first = IdeaId::new(SessionToken(1), 0);
        let second = IdeaId::new(SessionToken(2), 0);
        let sibling = IdeaId::new(SessionToken(1), 1);

        assert_ne!(first, second);
        assert_ne!(first, sibling);
        assert_eq!(first.as_str(), "idea-1-0");
    }

    #[test]
    fn test_into_idea_starts_with_pending_image() {
        let idea = draft("Firmware Licensing").into_idea(IdeaId::new(SessionToken(3), 2));

        assert!(idea.loading_image);
        assert!(idea.image_url.is_none());
        assert!(!idea.image_unavailable());
        assert_eq!(idea.id.to_string(), "idea-3-2");
    }

    #[test]
    fn test_validate_rejects_blank_summary_field() {
        let mut bad = draft("Firmware Licensing");
        bad.summary.prior_art_difference = "  ".to_string();

        let err = bad.validate().unwrap_err();
        assert!(err.to_string().contains("summary.priorArtDifference"));
        assert!(draft("Firmware Licensing").validate().is_ok());
    }

    #[test]
    fn test_draft_deserializes_camel_case_payload() {
        let json = r#"{
            "title": "Clay Ledger",
            "domain": "Distributed Ledger",
            "visualPrompt": "A ledger book made of clay",
            "summary": {
                "novelty": "n",
                "description": "d",
                "priorArtDifference": "p",
                "implementation": "i"
            }
        }"#;

        let parsed: IdeaDraft = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.visual_prompt, "A ledger book made of clay");
        assert_eq!(parsed.summary.prior_art_difference, "p");
    }

    #[test]
    fn test_idea_serializes_loading_flag_in_camel_case() {
        let idea = draft("Clay Ledger").into_idea(IdeaId::new(SessionToken(1), 0));
        let value = serde_json::to_value(&idea).unwrap();

        assert_eq!(value["loadingImage"], serde_json::json!(true));
        assert_eq!(value["id"], serde_json::json!("idea-1-0"));
        assert!(value.get("imageUrl").is_none());
    }
}
