//! OpenAI chat completions provider, the primary scorer.
//!
//! Asks for `response_format: json_object`, and sends images inline as base64 data URLs.

use super::json_extract::parse_raw_analysis;
use super::provider::{LlmError, ScoringProvider};
use crate::analysis::{Prompt, RawAnalysis};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 500;

pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAIProvider {
    /// # Arguments
    /// * `base_url` - Base URL of the API (e.g., "https://api.openai.com/v1").
    /// * `model` - Model to use, it must accept image input.
    /// * `api_key` - API key. Without one every call fails with [`LlmError::NotConfigured`].
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn build_request(&self, prompt: &Prompt) -> OpenAIChatRequest {
        let user_content = match &prompt.image {
            Some(image) => OpenAIContent::Parts(vec![
                OpenAIContentPart::Text {
                    text: prompt.user_text.clone(),
                },
                OpenAIContentPart::ImageUrl {
                    image_url: OpenAIImageUrl {
                        url: image.data_url(),
                    },
                },
            ]),
            None => OpenAIContent::Text(prompt.user_text.clone()),
        };

        OpenAIChatRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system",
                    content: OpenAIContent::Text(prompt.system.clone()),
                },
                OpenAIMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            response_format: OpenAIResponseFormat {
                format_type: "json_object",
            },
            max_tokens: MAX_TOKENS,
        }
    }
}

#[async_trait]
impl ScoringProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn attempt_analysis(&self, prompt: &Prompt) -> Result<RawAnalysis, LlmError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| LlmError::NotConfigured("missing OpenAI API key".to_string()))?;

        let url = format!("{}/chat/completions", self.base_url);
        let request = self.build_request(prompt);

        debug!(
            model = %self.model,
            has_image = prompt.image.is_some(),
            "Sending analysis request to OpenAI"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let openai_response: OpenAIChatResponse = response.json().await.map_err(|e| {
            LlmError::InvalidResponse(format!("Failed to parse OpenAI response: {}", e.without_url()))
        })?;

        let content = openai_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("Empty response from OpenAI".to_string()))?;

        debug!(chars = content.len(), "Received analysis from OpenAI");
        parse_raw_analysis(&content)
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    response_format: OpenAIResponseFormat,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: OpenAIContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum OpenAIContent {
    Text(String),
    Parts(Vec<OpenAIContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAIContentPart {
    Text { text: String },
    ImageUrl { image_url: OpenAIImageUrl },
}

#[derive(Debug, Serialize)]
struct OpenAIImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct OpenAIResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}
