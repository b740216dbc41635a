//! Core types shared by the analysis pipeline.
//!
//! Field names serialize in camelCase so results and preferences stay
//! compatible with the JSON the browser extension exchanges.

use serde::{Deserialize, Serialize};

/// Severity levels for issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// What kind of problem an issue describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "edge-cases")]
    EdgeCases,
    #[serde(rename = "time")]
    Time,
    #[serde(rename = "space")]
    Space,
    #[serde(rename = "style")]
    Style,
    #[serde(rename = "bug")]
    Bug,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::EdgeCases => "edge-cases",
            Category::Time => "time",
            Category::Space => "space",
            Category::Style => "style",
            Category::Bug => "bug",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "edge-cases" => Ok(Category::EdgeCases),
            "time" => Ok(Category::Time),
            "space" => Ok(Category::Space),
            "style" => Ok(Category::Style),
            "bug" => Ok(Category::Bug),
            _ => Err(format!("unknown category: {}", s)),
        }
    }
}

/// A single finding, either reported by the model or by a local heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeIssue {
    /// Unique within one result only.
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    /// 1-based line numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<usize>>,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Input to one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(alias = "url")]
    pub source_url: String,
    pub code_snippet: String,
    #[serde(default)]
    pub language: Option<String>,
}

impl AnalysisRequest {
    pub fn new(
        source_url: impl Into<String>,
        code_snippet: impl Into<String>,
        language: Option<String>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            code_snippet: code_snippet.into(),
            language,
        }
    }
}

/// Merged output of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub issues: Vec<CodeIssue>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_model_output: Option<String>,
}

impl AnalysisResult {
    /// Result with no findings that still carries the model's raw text.
    pub fn empty_with_raw(raw: &str) -> Self {
        Self {
            issues: Vec::new(),
            suggestions: Vec::new(),
            raw_model_output: Some(raw.to_string()),
        }
    }

    /// Count issues at the given severity.
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// Check if any issue is high severity.
    pub fn has_high_severity(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::High)
    }
}

/// Backend identifiers accepted in preferences.
///
/// Any unrecognized id in a stored preferences file reads as `Unknown`,
/// which dispatches like the other ids without a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[default]
    Ollama,
    OpenRouter,
    OpenAI,
    HuggingFace,
    None,
    #[serde(other)]
    Unknown,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Ollama => "ollama",
            ProviderId::OpenRouter => "openrouter",
            ProviderId::OpenAI => "openai",
            ProviderId::HuggingFace => "huggingface",
            ProviderId::None => "none",
            ProviderId::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(ProviderId::Ollama),
            "openrouter" => Ok(ProviderId::OpenRouter),
            "openai" => Ok(ProviderId::OpenAI),
            "huggingface" => Ok(ProviderId::HuggingFace),
            "none" => Ok(ProviderId::None),
            _ => Err(format!("unknown provider: {}", s)),
        }
    }
}

/// Which backend to call and how to reach it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub id: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(id: ProviderId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_uses_wire_names() {
        let issue = CodeIssue {
            id: "H-1".to_string(),
            title: "Potential division by zero".to_string(),
            description: "d".to_string(),
            severity: Severity::High,
            lines: None,
            category: Category::EdgeCases,
            suggestion: None,
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["category"], "edge-cases");
        assert_eq!(json["severity"], "high");
        assert!(json.get("lines").is_none());
        assert!(json.get("suggestion").is_none());
    }

    #[test]
    fn test_request_accepts_url_alias() {
        let req: AnalysisRequest = serde_json::from_str(
            r#"{"url":"https://example.com","codeSnippet":"x","language":null}"#,
        )
        .unwrap();
        assert_eq!(req.source_url, "https://example.com");
        assert_eq!(req.language, None);
    }

    #[test]
    fn test_provider_config_camel_case() {
        let cfg: ProviderConfig = serde_json::from_str(
            r#"{"id":"openrouter","apiKey":"k","baseUrl":"http://x"}"#,
        )
        .unwrap();
        assert_eq!(cfg.id, ProviderId::OpenRouter);
        assert_eq!(cfg.api_key.as_deref(), Some("k"));
        assert_eq!(cfg.base_url.as_deref(), Some("http://x"));
        assert_eq!(cfg.model, None);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("HIGH".parse::<Severity>(), Ok(Severity::High));
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn test_result_severity_counts() {
        let result = AnalysisResult {
            issues: vec![CodeIssue {
                id: "1".into(),
                title: "t".into(),
                description: String::new(),
                severity: Severity::High,
                lines: None,
                category: Category::Bug,
                suggestion: None,
            }],
            ..Default::default()
        };
        assert_eq!(result.count_severity(Severity::High), 1);
        assert_eq!(result.count_severity(Severity::Low), 0);
        assert!(result.has_high_severity());
    }

    #[test]
    fn test_unrecognized_provider_reads_as_unknown() {
        let config: ProviderConfig = serde_json::from_str(r#"{"id":"gemini"}"#).unwrap();
        assert_eq!(config.id, ProviderId::Unknown);
        // The command line stays strict.
        assert!("gemini".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("EDGE-CASES".parse::<Category>(), Ok(Category::EdgeCases));
        assert_eq!("style".parse::<Category>(), Ok(Category::Style));
        assert!("performance".parse::<Category>().is_err());
    }
}
