//! Local Ollama server.
//!
//! Generates via: POST {base_url}/api/generate (no auth)

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{prompt, ProviderError};
use crate::types::{ProviderConfig, ProviderId};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen2.5-coder:7b";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Client for a local Ollama model.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    http: Client,
    model: String,
    base_url: String,
}

impl OllamaProvider {
    pub fn new(http: Client, config: &ProviderConfig) -> Self {
        Self {
            http,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full generate endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, code: &str, language: Option<&str>) -> GenerateRequest<'_> {
        GenerateRequest {
            model: &self.model,
            prompt: prompt::build_prompt(code, language),
            stream: false,
            options: GenerateOptions {
                temperature: super::TEMPERATURE,
            },
        }
    }

    pub async fn analyze(&self, code: &str, language: Option<&str>) -> Result<String, ProviderError> {
        let url = self.endpoint();
        tracing::debug!(%url, model = %self.model, "sending generate request");

        let response = self
            .http
            .post(&url)
            .json(&self.request_body(code, language))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http {
                provider: ProviderId::Ollama,
                status: status.as_u16(),
            });
        }

        let body: GenerateResponse = response.json().await?;
        Ok(extract_completion(body))
    }
}

fn extract_completion(body: GenerateResponse) -> String {
    body.response.unwrap_or_default()
}
