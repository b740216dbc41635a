//! codefixer - code snippet analysis with language models.
//!
//! codefixer sends a code snippet to a pluggable language-model backend and
//! merges the model's findings with locally computed heuristic findings into
//! one issue report. Outbound requests pass through a client-side rate
//! limiter shared by the whole process.
//!
//! # Architecture
//!
//! - `ratelimit`: token-bucket admission gate with a FIFO waiter queue
//! - `provider`: HTTP backends (Ollama, OpenRouter) behind `CodeAnalyzer`
//! - `detect`: regex heuristics for common smells
//! - `analysis`: sanitizing, model output parsing, merging, and the
//!   `Orchestrator` that ties the pipeline together
//! - `prefs`: user preferences and their stores
//! - `report`: output formatting (pretty, JSON, markdown)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use codefixer::{AnalysisRequest, Orchestrator, ProviderConfig, ProviderId, RateLimiter};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = Orchestrator::new(
//!     Arc::new(RateLimiter::default()),
//!     codefixer::provider::http_client()?,
//! );
//! let request = AnalysisRequest::new("file://main.js", "JSON.parse(body)", None);
//! let result = orchestrator
//!     .run_analysis(&request, &ProviderConfig::new(ProviderId::Ollama))
//!     .await?;
//! println!("{} issues", result.issues.len());
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod detect;
pub mod error;
pub mod prefs;
pub mod provider;
pub mod ratelimit;
pub mod report;
pub mod source;
pub mod types;

pub use analysis::{merge_issues, parse_model_output, sanitize, Orchestrator};
pub use detect::detect;
pub use error::{Error, Result};
pub use prefs::{
    FilePreferencesStore, MemoryPreferencesStore, PreferencesStore, PrefsError, UserPreferences,
};
pub use provider::{CodeAnalyzer, ProviderClient, ProviderError};
pub use ratelimit::RateLimiter;
pub use types::{
    AnalysisRequest, AnalysisResult, Category, CodeIssue, ProviderConfig, ProviderId, Severity,
};
