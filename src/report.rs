//! Output formatting for analysis results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: the `AnalysisResult` wire format for programmatic consumption
//! - Markdown: the plain-text digest used for "copy all"

use colored::*;
use serde::Serialize;

use crate::prefs::Theme;
use crate::types::{AnalysisResult, CodeIssue, Severity};

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pretty,
    Json,
    Markdown,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Format::Pretty),
            "json" => Ok(Format::Json),
            "markdown" | "md" => Ok(Format::Markdown),
            _ => Err(format!(
                "invalid format {:?}, must be 'pretty', 'json', or 'markdown'",
                s
            )),
        }
    }
}

/// Issues whose title or description contains `query`, ignoring case.
///
/// An empty query keeps everything.
pub fn filter_issues<'a>(result: &'a AnalysisResult, query: &str) -> Vec<&'a CodeIssue> {
    let needle = query.to_lowercase();
    result
        .issues
        .iter()
        .filter(|i| matches_needle(i, &needle))
        .collect()
}

/// Drop issues that do not match `query`, with the same rule as `filter_issues`.
pub fn retain_matching(result: &mut AnalysisResult, query: &str) {
    let needle = query.to_lowercase();
    result.issues.retain(|i| matches_needle(i, &needle));
}

fn matches_needle(issue: &CodeIssue, needle: &str) -> bool {
    issue.title.to_lowercase().contains(needle) || issue.description.to_lowercase().contains(needle)
}

/// Plain-text digest: one line per issue, then the suggestions.
pub fn to_markdown(result: &AnalysisResult) -> String {
    let mut lines = vec!["# Issues".to_string()];
    lines.extend(
        result
            .issues
            .iter()
            .map(|i| format!("- [{}] {}: {}", i.severity, i.title, i.description)),
    );
    lines.push(String::new());
    lines.push("# Suggestions".to_string());
    lines.extend(result.suggestions.iter().cloned());
    lines.join("\n")
}

/// JSON report: the result plus where it came from.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport<'a> {
    pub version: &'static str,
    pub source: &'a str,
    pub provider: &'a str,
    #[serde(flatten)]
    pub result: &'a AnalysisResult,
}

/// Write results in JSON format.
pub fn write_json(source: &str, provider: &str, result: &AnalysisResult) -> anyhow::Result<()> {
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION"),
        source,
        provider,
        result,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Options for the pretty printer.
#[derive(Debug, Clone, Default)]
pub struct PrettyOptions {
    pub theme: Theme,
    /// Only list issues matching this search string.
    pub query: Option<String>,
    /// Print the model's raw reply after the issues.
    pub show_raw: bool,
}

/// Write results as colored terminal output.
pub fn write_pretty(source: &str, provider: &str, result: &AnalysisResult, opts: &PrettyOptions) {
    println!();
    print!("  ");
    print!("{}", "codefixer".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Source:   ".dimmed());
    println!("{}", source);
    print!("  {}", "Provider: ".dimmed());
    println!("{}", provider);
    println!();

    write_summary(result);
    println!();

    let shown = filter_issues(result, opts.query.as_deref().unwrap_or(""));
    if !shown.is_empty() {
        write_issues(&shown, opts.theme);
    } else if !result.issues.is_empty() {
        println!("  {}", "No issues match the search.".dimmed());
        println!();
    }

    if !result.suggestions.is_empty() {
        println!("  {}", "General Suggestions:".bold());
        for s in &result.suggestions {
            println!("    - {}", s);
        }
        println!();
    }

    if opts.show_raw {
        if let Some(raw) = &result.raw_model_output {
            println!("  {}", "Model output:".bold());
            for line in raw.lines() {
                println!("    {}", line.dimmed());
            }
            println!();
        }
    }
}

fn write_summary(result: &AnalysisResult) {
    let total = result.issues.len();
    if total == 0 {
        println!("  {}", "✓ No issues found".green());
        return;
    }

    let plural = if total != 1 { "s" } else { "" };
    print!("  Found {} issue{}", total.to_string().bold(), plural);

    let counts: Vec<String> = [Severity::High, Severity::Medium, Severity::Low, Severity::Info]
        .iter()
        .filter_map(|s| {
            let n = result.count_severity(*s);
            (n > 0).then(|| format!("{} {}", n, s))
        })
        .collect();
    println!("  {}", format!("({})", counts.join(", ")).dimmed());
}

fn write_issues(issues: &[&CodeIssue], theme: Theme) {
    println!("  {} ({}):", "Issues".bold(), issues.len());
    println!();

    for issue in issues {
        write_severity_tag(issue.severity, theme);
        print!("   ");
        print!("{}", issue.title.bold());
        print!("  {}", format!("({})", issue.category).dimmed());
        println!();

        if !issue.description.is_empty() {
            println!("            {}", issue.description);
        }
        if let Some(lines) = issue.lines.as_ref().filter(|l| !l.is_empty()) {
            let joined: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
            println!("            {}", format!("Lines: {}", joined.join(", ")).dimmed());
        }
        if let Some(suggestion) = &issue.suggestion {
            for line in suggestion.lines() {
                println!("              {}", line.cyan());
            }
        }
        println!();
    }
}

fn write_severity_tag(severity: Severity, theme: Theme) {
    let tag = match severity {
        Severity::High => "HIGH ".red(),
        Severity::Medium => "MED  ".yellow(),
        Severity::Low => "LOW  ".green(),
        Severity::Info => "INFO ".blue(),
    };
    // Bright variants read better on dark backgrounds.
    let tag = match (theme, severity) {
        (Theme::Dark, Severity::High) => tag.bright_red(),
        (Theme::Dark, Severity::Medium) => tag.bright_yellow(),
        (Theme::Dark, Severity::Low) => tag.bright_green(),
        (Theme::Dark, Severity::Info) => tag.bright_blue(),
        _ => tag,
    };
    print!("    {} ", tag);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            issues: vec![
                CodeIssue {
                    id: "P1".into(),
                    title: "Nested loops detected".into(),
                    description: "Quadratic scan".into(),
                    severity: Severity::Medium,
                    lines: Some(vec![2]),
                    category: Category::Time,
                    suggestion: None,
                },
                CodeIssue {
                    id: "H-1".into(),
                    title: "Potential division by zero".into(),
                    description: "Validate divisors before division operations.".into(),
                    severity: Severity::High,
                    lines: None,
                    category: Category::EdgeCases,
                    suggestion: None,
                },
            ],
            suggestions: vec!["Add unit tests".into()],
            raw_model_output: Some("{}".into()),
        }
    }

    #[test]
    fn test_markdown_digest() {
        let text = to_markdown(&sample());
        assert_eq!(
            text,
            "# Issues\n\
             - [medium] Nested loops detected: Quadratic scan\n\
             - [high] Potential division by zero: Validate divisors before division operations.\n\
             \n\
             # Suggestions\n\
             Add unit tests"
        );
    }

    #[test]
    fn test_filter_matches_title_or_description() {
        let result = sample();
        assert_eq!(filter_issues(&result, "").len(), 2);
        let hits = filter_issues(&result, "QUADRATIC");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "P1");
        assert_eq!(filter_issues(&result, "division").len(), 1);
        assert!(filter_issues(&result, "memory").is_empty());
    }

    #[test]
    fn test_retain_ignores_shared_ids() {
        let mut result = sample();
        result.issues[1].id = result.issues[0].id.clone();
        retain_matching(&mut result, "division");
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].title, "Potential division by zero");
    }

    #[test]
    fn test_json_report_flattens_result() {
        let result = sample();
        let report = JsonReport {
            version: "0.0.0",
            source: "stdin",
            provider: "ollama",
            result: &result,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["provider"], "ollama");
        assert_eq!(json["issues"].as_array().unwrap().len(), 2);
        assert_eq!(json["rawModelOutput"], "{}");
        assert_eq!(json["issues"][1]["category"], "edge-cases");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("json".parse::<Format>(), Ok(Format::Json));
        assert_eq!("md".parse::<Format>(), Ok(Format::Markdown));
        assert!("sarif".parse::<Format>().is_err());
    }
}
