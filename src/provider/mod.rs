//! Language-model backends.
//!
//! Each backend lives in its own module and exposes the same
//! `analyze(code, language) -> raw text` operation:
//! - Ollama (local model server, no auth)
//! - OpenRouter (hosted chat completions, bearer auth)
//!
//! `ProviderClient` dispatches on `ProviderId`. Adding a backend means adding
//! a module, a variant, and an arm in `ProviderClient::from_config`.

mod ollama;
mod openrouter;
pub mod prompt;

pub use ollama::{
    OllamaProvider, DEFAULT_BASE_URL as OLLAMA_DEFAULT_BASE_URL,
    DEFAULT_MODEL as OLLAMA_DEFAULT_MODEL,
};
pub use openrouter::{
    OpenRouterProvider, DEFAULT_BASE_URL as OPENROUTER_DEFAULT_BASE_URL,
    DEFAULT_MODEL as OPENROUTER_DEFAULT_MODEL,
};

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{ProviderConfig, ProviderId};

/// Sampling temperature sent to every backend.
pub(crate) const TEMPERATURE: f64 = 0.2;

/// Errors that can occur while calling a provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} error: HTTP {status}")]
    Http { provider: ProviderId, status: u16 },
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProviderError {
    /// HTTP status for non-success responses.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Http { status, .. } => Some(*status),
            ProviderError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Anything that can turn a snippet into raw model text.
#[async_trait]
pub trait CodeAnalyzer: Send + Sync {
    /// Backend identifier, for logging.
    fn provider_id(&self) -> ProviderId;

    async fn analyze(&self, code: &str, language: Option<&str>) -> Result<String, ProviderError>;
}

/// Provider selected from a `ProviderConfig`.
#[derive(Debug, Clone)]
pub enum ProviderClient {
    Ollama(OllamaProvider),
    OpenRouter(OpenRouterProvider),
}

impl ProviderClient {
    /// Build the client for `config.id`.
    ///
    /// Ids without a dedicated backend fall back to the local Ollama client.
    pub fn from_config(http: reqwest::Client, config: &ProviderConfig) -> Self {
        match config.id {
            ProviderId::Ollama => ProviderClient::Ollama(OllamaProvider::new(http, config)),
            ProviderId::OpenRouter => {
                ProviderClient::OpenRouter(OpenRouterProvider::new(http, config))
            }
            other => {
                tracing::warn!(
                    provider = %other,
                    "no backend for provider, falling back to ollama"
                );
                ProviderClient::Ollama(OllamaProvider::new(http, config))
            }
        }
    }

    /// The backend actually used.
    pub fn id(&self) -> ProviderId {
        match self {
            ProviderClient::Ollama(_) => ProviderId::Ollama,
            ProviderClient::OpenRouter(_) => ProviderId::OpenRouter,
        }
    }

    /// Endpoint the next request will hit.
    pub fn endpoint(&self) -> String {
        match self {
            ProviderClient::Ollama(p) => p.endpoint(),
            ProviderClient::OpenRouter(p) => p.endpoint(),
        }
    }
}

#[async_trait]
impl CodeAnalyzer for ProviderClient {
    fn provider_id(&self) -> ProviderId {
        self.id()
    }

    async fn analyze(&self, code: &str, language: Option<&str>) -> Result<String, ProviderError> {
        match self {
            ProviderClient::Ollama(p) => p.analyze(code, language).await,
            ProviderClient::OpenRouter(p) => p.analyze(code, language).await,
        }
    }
}

/// Build the shared HTTP client.
pub fn http_client() -> Result<reqwest::Client, ProviderError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("codefixer/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
