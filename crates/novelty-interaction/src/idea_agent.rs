//! GeminiIdeaAgent - the idea source backed by the Gemini text model.

use crate::gemini_client::{Content, GeminiClient, GenerateContentRequest, GenerationConfig};
use crate::prompts;
use async_trait::async_trait;
use novelty_core::config::DEFAULT_TEXT_MODEL;
use novelty_core::error::{NoveltyError, Result};
use novelty_core::idea::{IdeaDraft, IdeaSource};
use novelty_core::user::UserProfile;
use serde_json::json;

/// Idea source that asks a Gemini text model for a JSON list of ideas,
/// grounded with Google Search for prior-art research.
#[derive(Clone)]
pub struct GeminiIdeaAgent {
    client: GeminiClient,
    model: String,
    idea_count: usize,
    search_grounding: bool,
}

impl GeminiIdeaAgent {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            model: DEFAULT_TEXT_MODEL.to_string(),
            idea_count: 5,
            search_grounding: true,
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_idea_count(mut self, idea_count: usize) -> Self {
        self.idea_count = idea_count.max(1);
        self
    }

    /// Enables or disables the Google Search grounding tool.
    pub fn with_search_grounding(mut self, enabled: bool) -> Self {
        self.search_grounding = enabled;
        self
    }

    fn build_request(&self, keywords: &str, profile: &UserProfile) -> GenerateContentRequest {
        let prompt = prompts::idea_prompt(keywords, profile, self.idea_count);
        let mut request = GenerateContentRequest::user_text(prompt);
        request.system_instruction = Some(Content::text("system", prompts::SYSTEM_INSTRUCTION));
        if self.search_grounding {
            request.tools.push(json!({ "googleSearch": {} }));
        }
        request.generation_config = Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: prompts::idea_list_schema(),
        });
        request
    }
}

#[async_trait]
impl IdeaSource for GeminiIdeaAgent {
    async fn generate_ideas(
        &self,
        keywords: &str,
        profile: &UserProfile,
    ) -> Result<Vec<IdeaDraft>> {
        let request = self.build_request(keywords, profile);
        let response = self.client.generate_content(&self.model, &request).await?;
        let text = response.text().ok_or(NoveltyError::EmptyResponse)?;

        let drafts = parse_idea_drafts(&text)?;
        tracing::info!(count = drafts.len(), model = %self.model, "Received idea drafts");
        Ok(drafts)
    }
}

/// Parses the model's JSON answer into validated drafts.
///
/// Grounded responses are sometimes wrapped in a Markdown code fence, which
/// is stripped before parsing.
pub fn parse_idea_drafts(text: &str) -> Result<Vec<IdeaDraft>> {
    let json = strip_code_fence(text);
    if json.is_empty() {
        return Err(NoveltyError::EmptyResponse);
    }

    let drafts: Vec<IdeaDraft> = serde_json::from_str(json)
        .map_err(|err| NoveltyError::malformed(format!("Idea list is not valid JSON: {err}")))?;

    for draft in &drafts {
        draft.validate()?;
    }

    Ok(drafts)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const TWO_IDEAS: &str = r#"[
        {
            "title": "Entitlement Mesh",
            "domain": "Enterprise Licensing",
            "visualPrompt": "Clay servers holding hands",
            "summary": {
                "novelty": "Peer-verified entitlements",
                "description": "Servers gossip license state",
                "priorArtDifference": "No central license server",
                "implementation": "CRDT ledger in the BMC"
            }
        },
        {
            "title": "Semantic Quota Cache",
            "domain": "GenAI",
            "visualPrompt": "A clay librarian stacking prompts",
            "summary": {
                "novelty": "Quota by meaning, not tokens",
                "description": "Cache keyed on embeddings",
                "priorArtDifference": "Exact-match caches only",
                "implementation": "Vector index in front of the gateway"
            }
        }
    ]"#;

    #[test]
    fn test_parse_idea_drafts_preserves_order() {
        let drafts = parse_idea_drafts(TWO_IDEAS).unwrap();
        let titles: Vec<_> = drafts.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Entitlement Mesh", "Semantic Quota Cache"]);
    }

    #[test]
    fn test_parse_idea_drafts_strips_code_fence() {
        let fenced = format!("```json\n{TWO_IDEAS}\n```");
        assert_eq!(parse_idea_drafts(&fenced).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_idea_drafts_rejects_missing_summary_field() {
        let broken = r#"[{"title":"t","domain":"d","visualPrompt":"v","summary":{"novelty":"n","description":"d","implementation":"i"}}]"#;
        let err = parse_idea_drafts(broken).unwrap_err();
        assert!(matches!(err, NoveltyError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_idea_drafts_rejects_blank_body() {
        assert_eq!(parse_idea_drafts("  ").unwrap_err(), NoveltyError::EmptyResponse);
        assert_eq!(parse_idea_drafts("```json\n```").unwrap_err(), NoveltyError::EmptyResponse);
    }

    #[test]
    fn test_build_request_enables_grounding_and_schema() {
        let client = GeminiClient::new("test-key", Duration::from_secs(5)).unwrap();
        let agent = GeminiIdeaAgent::new(client).with_idea_count(3);
        let request = agent.build_request("semantic caching", &UserProfile::default());

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["tools"][0], json!({ "googleSearch": {} }));
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert!(
            value["contents"][0]["parts"][0]["text"]
                .as_str()
                .unwrap()
                .contains("Generate 3 unique")
        );
    }

    #[test]
    fn test_build_request_without_grounding_has_no_tools() {
        let client = GeminiClient::new("test-key", Duration::from_secs(5)).unwrap();
        let agent = GeminiIdeaAgent::new(client).with_search_grounding(false);
        let request = agent.build_request("x", &UserProfile::default());
        let value = serde_json::to_value(request).unwrap();
        assert!(value.get("tools").is_none());
    }
}
