//! GeminiImageAgent - the image synthesizer backed by a Gemini image model.

use crate::gemini_client::{GeminiClient, GenerateContentRequest};
use crate::prompts;
use async_trait::async_trait;
use novelty_core::config::DEFAULT_IMAGE_MODEL;
use novelty_core::error::Result;
use novelty_core::idea::ImageSynthesizer;

/// Renders one claymation-style illustration per call.
#[derive(Clone)]
pub struct GeminiImageAgent {
    client: GeminiClient,
    model: String,
}

impl GeminiImageAgent {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl ImageSynthesizer for GeminiImageAgent {
    async fn synthesize(&self, visual_prompt: &str) -> Result<Option<String>> {
        let request = GenerateContentRequest::user_text(prompts::image_prompt(visual_prompt));
        let response = self.client.generate_content(&self.model, &request).await?;

        let image = response.inline_image();
        if image.is_none() {
            tracing::debug!(model = %self.model, "Gemini returned no inline image");
        }
        Ok(image)
    }
}
