//! Shared transport for the Gemini `generateContent` REST endpoint.
//!
//! Both agents speak the same wire format; this module owns the request and
//! response shapes, the HTTP call and the error mapping.

use novelty_core::error::{NoveltyError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Thin HTTP client bound to one API key.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client with the given per-request timeout.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| NoveltyError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        })
    }

    /// Points the client at another endpoint root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub(crate) async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!("{}/{model}:generateContent", self.base_url);

        tracing::debug!(model, "Sending Gemini generateContent request");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| NoveltyError::transport(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let body_text = response.text().await.map_err(|err| {
            NoveltyError::transport(format!("Failed to read Gemini response: {err}"))
        })?;

        if body_text.trim().is_empty() {
            return Err(NoveltyError::EmptyResponse);
        }

        serde_json::from_str(&body_text).map_err(|err| {
            NoveltyError::malformed(format!("Failed to parse Gemini response: {err}"))
        })
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// A single user turn with no extra configuration.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::text("user", text)],
            system_instruction: None,
            tools: Vec::new(),
            generation_config: None,
        }
    }
}

#[derive(Serialize, Debug)]
pub(crate) struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Serialize, Debug)]
pub(crate) struct Part {
    pub text: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct Candidate {
    pub content: Option<ContentResponse>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ContentResponse {
    #[serde(default)]
    pub parts: Vec<PartResponse>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct PartResponse {
    pub text: Option<String>,
    #[serde(rename = "inlineData", alias = "inline_data")]
    pub inline_data: Option<InlineData>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    #[serde(alias = "mime_type")]
    pub mime_type: Option<String>,
    pub data: Option<String>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[PartResponse] {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.as_slice())
            .unwrap_or_default()
    }

    /// Concatenated text parts of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.trim().is_empty() { None } else { Some(text) }
    }

    /// First inline image of the first candidate as a data URI.
    pub fn inline_image(&self) -> Option<String> {
        self.first_parts().iter().find_map(|part| {
            let inline = part.inline_data.as_ref()?;
            let data = inline.data.as_deref().filter(|data| !data.is_empty())?;
            let mime_type = inline.mime_type.as_deref().unwrap_or("image/png");
            Some(crate::data_uri::encode(mime_type, data))
        })
    }
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

pub(crate) fn map_http_error(status: StatusCode, body: &str) -> NoveltyError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string());

    NoveltyError::api(status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_http_error_reads_service_error_body() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body);

        assert_eq!(
            err,
            NoveltyError::Api {
                status: 429,
                message: "RESOURCE_EXHAUSTED: Quota exceeded".to_string(),
                is_retryable: true,
            }
        );
    }

    #[test]
    fn test_map_http_error_falls_back_to_raw_body() {
        let err = map_http_error(StatusCode::BAD_REQUEST, "plain failure");
        assert_eq!(err.to_string(), "Gemini API error (400): plain failure");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"[{\"a\":"},{"text":"1}]"}]}}]}"#,
        )
        .unwrap();

        assert_eq!(response.text().as_deref(), Some(r#"[{"a":1}]"#));
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
        assert!(response.inline_image().is_none());
    }

    #[test]
    fn test_inline_image_becomes_data_uri() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"Here is your clay scene"},
                {"inlineData":{"mimeType":"image/png","data":"iVBORw0K"}}
            ]}}]}"#,
        )
        .unwrap();

        assert_eq!(
            response.inline_image().as_deref(),
            Some("data:image/png;base64,iVBORw0K")
        );
    }

    #[test]
    fn test_request_serializes_camel_case_keys() {
        let mut request = GenerateContentRequest::user_text("hello");
        request.system_instruction = Some(Content::text("system", "be brief"));
        request.generation_config = Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: serde_json::json!({"type": "ARRAY"}),
        });

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert!(value.get("tools").is_none());
    }
}
