//! Prompt text for the idea and image models.

use novelty_core::user::UserProfile;
use serde_json::{Value, json};

pub const SYSTEM_INSTRUCTION: &str = "You are a world-class Chief Innovation Officer and Patent Strategist.
Your goal is to generate novel, patentable ideas based on user input and their professional background.
The ideas must be realistic, technically sound, yet creative and non-obvious.
You must adhere to the following guidelines:
1. Use simple, clear, unambiguous language.
2. Provide enabling details for someone \"skilled in the art\".
3. Explicitly highlight novelty and differences from prior art.
4. Ideas should be page-turning and trigger imagination.
5. Consider the user's background in Enterprise Architecture, Licensing, and GenAI.

Format the output strictly as a JSON array of objects.";

const CLAYMATION_STYLE: &str = "Create a high-quality claymation style image, polymer clay texture, stop-motion animation aesthetic, studio lighting, plasticine look.";

pub fn idea_prompt(keywords: &str, profile: &UserProfile, idea_count: usize) -> String {
    format!(
        "User Bio: \"{bio}\"\n\n\
         Keywords/Phrases: \"{keywords}\"\n\n\
         Task: Generate {idea_count} unique, novel invention ideas based on the keywords and my background.\n\
         For each idea, provide a title, the specific domain, a summary write-up (covering novelty, detailed description, prior art differentiation, and implementation), and a visual description suitable for a claymation image.\n\n\
         The visual description for the image must be descriptive of the physical scene to be modeled in clay.",
        bio = profile.bio,
    )
}

pub fn image_prompt(visual_prompt: &str) -> String {
    format!("{CLAYMATION_STYLE} Scene: {visual_prompt}")
}

/// Response schema for the idea list.
pub fn idea_list_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "domain": { "type": "STRING" },
                "visualPrompt": {
                    "type": "STRING",
                    "description": "A detailed description of the scene for a claymation image generator."
                },
                "summary": {
                    "type": "OBJECT",
                    "properties": {
                        "novelty": { "type": "STRING", "description": "Why is this novel? What are the components of novelty?" },
                        "description": { "type": "STRING", "description": "Detailed summary write-up." },
                        "priorArtDifference": { "type": "STRING", "description": "How it differs from existing solutions/patents." },
                        "implementation": { "type": "STRING", "description": "Best mode of implementation." }
                    },
                    "required": ["novelty", "description", "priorArtDifference", "implementation"]
                }
            },
            "required": ["title", "domain", "visualPrompt", "summary"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idea_prompt_grounds_in_profile_and_keywords() {
        let profile = UserProfile {
            bio: "Storage licensing architect".to_string(),
        };
        let prompt = idea_prompt("smart contracts for licensing", &profile, 5);

        assert!(prompt.contains("Storage licensing architect"));
        assert!(prompt.contains("\"smart contracts for licensing\""));
        assert!(prompt.contains("Generate 5 unique"));
    }

    #[test]
    fn test_image_prompt_enforces_claymation_style() {
        let prompt = image_prompt("a clay robot signing a contract");
        assert!(prompt.starts_with("Create a high-quality claymation"));
        assert!(prompt.ends_with("Scene: a clay robot signing a contract"));
    }

    #[test]
    fn test_schema_requires_every_summary_field() {
        let schema = idea_list_schema();
        let required = &schema["items"]["properties"]["summary"]["required"];
        assert_eq!(required.as_array().map(Vec::len), Some(4));
    }
}
