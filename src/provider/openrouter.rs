//! OpenRouter hosted chat completions.
//!
//! Completes via: POST https://api.openrouter.ai/v1/chat/completions
//! with a bearer token.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{prompt, ProviderError};
use crate::types::{ProviderConfig, ProviderId};

pub const DEFAULT_BASE_URL: &str = "https://api.openrouter.ai/v1";
pub const DEFAULT_MODEL: &str = "qwen/qwen-2.5-coder-7b-instruct:free";

const SYSTEM_MESSAGE: &str = "You are a precise code analysis assistant.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Client for OpenRouter's chat completion API.
#[derive(Debug, Clone)]
pub struct OpenRouterProvider {
    http: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenRouterProvider {
    pub fn new(http: Client, config: &ProviderConfig) -> Self {
        Self {
            http,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full chat completions endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, code: &str, language: Option<&str>) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt::build_prompt(code, language),
                },
            ],
            temperature: super::TEMPERATURE,
        }
    }

    pub async fn analyze(&self, code: &str, language: Option<&str>) -> Result<String, ProviderError> {
        let url = self.endpoint();
        if self.api_key.is_empty() {
            tracing::warn!("no API key configured for openrouter, request will likely be rejected");
        }
        tracing::debug!(%url, model = %self.model, "sending chat completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(code, language))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http {
                provider: ProviderId::OpenRouter,
                status: status.as_u16(),
            });
        }

        let body: ChatCompletionResponse = response.json().await?;
        Ok(extract_completion(body))
    }
}

fn extract_completion(body: ChatCompletionResponse) -> String {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default()
}
