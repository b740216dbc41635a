//! Structured results from free-form model text.
//!
//! Models wrap their JSON in prose or code fences often enough that
//! unparseable output is treated as "no findings", never as an error.

use std::collections::HashSet;

use serde_json::Value;

use super::merge::{assign_unique_ids, MODEL_ID_PREFIX};
use crate::types::{AnalysisResult, Category, CodeIssue, Severity};

/// Extract issues and suggestions from raw model output.
///
/// Looks at the span from the first `{` to the last `}`. Anything that does
/// not parse yields an empty result. `raw_model_output` always carries the
/// original text.
pub fn parse_model_output(raw: &str) -> AnalysisResult {
    let Some(candidate) = json_span(raw) else {
        tracing::debug!("model output contains no JSON object");
        return AnalysisResult::empty_with_raw(raw);
    };

    let parsed: Value = match serde_json::from_str(candidate) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "model output is not valid JSON");
            return AnalysisResult::empty_with_raw(raw);
        }
    };

    AnalysisResult {
        issues: read_issues(&parsed),
        suggestions: read_suggestions(&parsed),
        raw_model_output: Some(raw.to_string()),
    }
}

/// Greedy span from the first `{` to the last `}`.
fn json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn read_issues(parsed: &Value) -> Vec<CodeIssue> {
    let Some(entries) = parsed.get("issues").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut issues: Vec<CodeIssue> = entries.iter().filter_map(read_issue).collect();
    assign_unique_ids(&mut issues, MODEL_ID_PREFIX, &mut HashSet::new());
    issues
}

/// Read one model issue, coercing loosely typed fields.
///
/// Only a missing or blank `title` drops the entry. Unknown severities map to
/// `info` and unknown categories to `bug`.
fn read_issue(entry: &Value) -> Option<CodeIssue> {
    let title = entry
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let Some(title) = title else {
        tracing::debug!("skipping model issue without a title");
        return None;
    };

    let id = match entry.get("id") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    let severity = entry
        .get("severity")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Severity>().ok())
        .unwrap_or(Severity::Info);
    let category = entry
        .get("category")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Category>().ok())
        .unwrap_or(Category::Bug);
    let lines = entry.get("lines").and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_u64)
            .filter_map(|n| usize::try_from(n).ok())
            .collect()
    });

    Some(CodeIssue {
        id,
        title: title.to_string(),
        description: text_field(entry, "description").unwrap_or_default(),
        severity,
        lines,
        category,
        suggestion: text_field(entry, "suggestion"),
    })
}

fn text_field(entry: &Value, key: &str) -> Option<String> {
    entry.get(key).and_then(Value::as_str).map(str::to_string)
}

fn read_suggestions(parsed: &Value) -> Vec<String> {
    parsed
        .get("suggestions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|s| s.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_well_formed_object() {
        let raw = r#"{"issues":[{"id":"P1","title":"Off by one","description":"loop bound","severity":"medium","category":"bug","lines":[3,4]}],"suggestions":["add tests"]}"#;
        let result = parse_model_output(raw);
        assert_eq!(result.issues.len(), 1);
        let issue = &result.issues[0];
        assert_eq!(issue.id, "P1");
        assert_eq!(issue.title, "Off by one");
        assert_eq!(issue.severity, Severity::Medium);
        assert_eq!(issue.category, Category::Bug);
        assert_eq!(issue.lines, Some(vec![3, 4]));
        assert_eq!(result.suggestions, vec!["add tests".to_string()]);
        assert_eq!(result.raw_model_output.as_deref(), Some(raw));
    }

    #[test]
    fn test_extracts_object_from_surrounding_prose() {
        let raw = "Here is my review:\n```json\n{\"issues\":[],\"suggestions\":[\"x\"]}\n```\nThanks!";
        let result = parse_model_output(raw);
        assert!(result.issues.is_empty());
        assert_eq!(result.suggestions, vec!["x".to_string()]);
        assert_eq!(result.raw_model_output.as_deref(), Some(raw));
    }

    #[test]
    fn test_no_object_degrades_to_empty() {
        let raw = "I could not analyze this code.";
        assert_eq!(parse_model_output(raw), AnalysisResult::empty_with_raw(raw));
    }

    #[test]
    fn test_invalid_json_degrades_to_empty() {
        let raw = "{issues: [oops}";
        assert_eq!(parse_model_output(raw), AnalysisResult::empty_with_raw(raw));

        // Greedy span covers both objects, which is not valid JSON.
        let two = r#"{"issues":[]} and {"suggestions":[]}"#;
        assert_eq!(parse_model_output(two), AnalysisResult::empty_with_raw(two));
    }

    #[test]
    fn test_closing_brace_before_opening() {
        let raw = "} nothing {";
        assert_eq!(parse_model_output(raw), AnalysisResult::empty_with_raw(raw));
    }

    #[test]
    fn test_unexpected_field_types_default_to_empty() {
        let raw = r#"{"issues":"none","suggestions":{"a":1}}"#;
        let result = parse_model_output(raw);
        assert!(result.issues.is_empty());
        assert!(result.suggestions.is_empty());
        assert_eq!(result.raw_model_output.as_deref(), Some(raw));
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let result = parse_model_output("{}");
        assert!(result.issues.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_only_untitled_entries_are_skipped() {
        let raw = r#"{"issues":[
            {"severity":"high","category":"bug"},
            {"title":"  ","severity":"high","category":"bug"},
            {"title":"Good","severity":"low","category":"style"},
            "not an object"
        ],"suggestions":["keep", 3, null]}"#;
        let result = parse_model_output(raw);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].title, "Good");
        assert_eq!(result.issues[0].id, "M-1");
        assert_eq!(result.suggestions, vec!["keep".to_string()]);
    }

    #[test]
    fn test_numeric_id_is_kept_as_text() {
        let raw = r#"{"issues":[{"id":1,"title":"Off by one","description":"d","severity":"high","category":"bug"}]}"#;
        let result = parse_model_output(raw);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].id, "1");
        assert_eq!(result.issues[0].severity, Severity::High);
    }

    #[test]
    fn test_unknown_severity_and_category_fall_back() {
        let raw = r#"{"issues":[
            {"id":"1","title":"Slow lookup","severity":"critical","category":"performance"},
            {"id":"2","title":"Missing fields"}
        ]}"#;
        let result = parse_model_output(raw);
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.issues[0].severity, Severity::Info);
        assert_eq!(result.issues[0].category, Category::Bug);
        assert_eq!(result.issues[1].description, "");
        assert_eq!(result.issues[1].lines, None);
    }

    #[test]
    fn test_severity_and_category_ignore_case() {
        let raw = r#"{"issues":[{"title":"T","severity":"HIGH","category":"Edge-Cases","lines":[2,"x",-1,5]}]}"#;
        let issue = &parse_model_output(raw).issues[0];
        assert_eq!(issue.severity, Severity::High);
        assert_eq!(issue.category, Category::EdgeCases);
        assert_eq!(issue.lines, Some(vec![2, 5]));
    }

    #[test]
    fn test_model_ids_made_unique() {
        let raw = r#"{"issues":[
            {"title":"A","severity":"low","category":"bug"},
            {"id":"M-1","title":"B","severity":"low","category":"bug"},
            {"id":"P1","title":"C","severity":"low","category":"bug"},
            {"id":"P1","title":"D","severity":"low","category":"bug"}
        ]}"#;
        let result = parse_model_output(raw);
        let ids: Vec<&str> = result.issues.iter().map(|i| i.id.as_str()).collect();
        // The blank id yields to the supplied M-1; the repeated P1 is renumbered.
        assert_eq!(ids, vec!["M-2", "M-1", "P1", "M-3"]);
    }
}
