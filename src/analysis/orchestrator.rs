//! End-to-end analysis of one snippet.

use std::sync::Arc;

use tracing::Instrument;

use super::{merge_issues, parse_model_output, sanitize};
use crate::detect;
use crate::error::Error;
use crate::prefs::{PreferencesStore, PrefsError};
use crate::provider::{CodeAnalyzer, ProviderClient, ProviderError};
use crate::ratelimit::RateLimiter;
use crate::types::{AnalysisRequest, AnalysisResult, ProviderConfig};

/// Runs the analysis pipeline against a shared rate limiter.
///
/// Cheap to clone; clones share the limiter and the HTTP connection pool.
#[derive(Clone)]
pub struct Orchestrator {
    limiter: Arc<RateLimiter>,
    http: reqwest::Client,
}

impl Orchestrator {
    pub fn new(limiter: Arc<RateLimiter>, http: reqwest::Client) -> Self {
        Self { limiter, http }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Analyze a snippet with the provider described by `config`.
    ///
    /// Provider failures propagate unchanged; nothing is retried and no
    /// partial result is returned.
    pub async fn run_analysis(
        &self,
        request: &AnalysisRequest,
        config: &ProviderConfig,
    ) -> Result<AnalysisResult, ProviderError> {
        let provider = ProviderClient::from_config(self.http.clone(), config);
        self.run_with(&provider, request).await
    }

    /// Analyze a snippet with an already-built analyzer.
    pub async fn run_with(
        &self,
        analyzer: &dyn CodeAnalyzer,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, ProviderError> {
        let span = tracing::info_span!(
            "analysis",
            provider = %analyzer.provider_id(),
            url = %request.source_url,
        );

        async {
            let code = sanitize(&request.code_snippet);

            self.limiter.acquire().await;

            let raw = analyzer.analyze(&code, request.language.as_deref()).await?;
            let model = parse_model_output(&raw);
            let heuristics = detect::detect(&code);

            tracing::info!(
                model_issues = model.issues.len(),
                heuristic_issues = heuristics.len(),
                "analysis complete"
            );
            Ok::<_, ProviderError>(merge_issues(model, heuristics))
        }
        .instrument(span)
        .await
    }

    /// Analyze using the stored preferences.
    ///
    /// The limiter is reconfigured from `rate_limit_per_min` before each call.
    pub async fn run_with_preferences(
        &self,
        store: &dyn PreferencesStore,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, Error> {
        let prefs = store.get().await?.ok_or(PrefsError::Unavailable)?;
        self.limiter.configure(prefs.rate_limit_per_min);
        Ok(self.run_analysis(request, &prefs.provider).await?)
    }
}
