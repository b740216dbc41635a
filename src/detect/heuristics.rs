//! Pattern-based code smells that need no model.
//!
//! Every check runs against the raw text, so results are best-effort: a
//! comment or string literal can trigger a check just like real code. The
//! checks are independent and always all evaluated, and each appends at most
//! one issue.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{Category, CodeIssue, Severity};

pub const NESTED_LOOPS: &str = "Nested loops detected";
pub const SORT_THEN_REVERSE: &str = "Redundant sort then reverse";
pub const ARRAY_ALLOCATION: &str = "Unnecessary array allocation";
pub const UNGUARDED_JSON_PARSE: &str = "JSON.parse without error handling";
pub const DIVISION_BY_ZERO: &str = "Potential division by zero";

lazy_static! {
    /// A loop header on a single line.
    static ref LOOP_LINE: Regex = Regex::new(r"for\s*\(|while\s*\(").unwrap();

    /// Two `for (` openings on the same line (`.` stops at newlines).
    static ref NESTED_FOR: Regex = Regex::new(r"for\s*\(.*for\s*\(").unwrap();

    static ref SORT_REVERSE: Regex = Regex::new(r"sort\(\)\.reverse\(\)").unwrap();

    static ref ARRAY_FILL: Regex = Regex::new(r"new\s+Array\(.*\)\.fill\(").unwrap();

    static ref MAP_CALL: Regex = Regex::new(r"map\(").unwrap();

    static ref JSON_PARSE: Regex = Regex::new(r"JSON\.parse\(").unwrap();

    /// A `try {` anywhere before a `JSON.parse`, across lines.
    static ref GUARDED_JSON_PARSE: Regex = Regex::new(r"(?s)try\s*\{.*JSON\.parse").unwrap();

    static ref DIVISION: Regex = Regex::new(r"\bdivision\b|/(\s*0)").unwrap();
}

/// What a single check reports when it fires.
struct Check {
    title: &'static str,
    description: &'static str,
    severity: Severity,
    category: Category,
    /// Returns `None` when the check does not fire, otherwise the matched
    /// 1-based lines if the check reports any.
    matcher: fn(&str, &[&str]) -> Option<Option<Vec<usize>>>,
}

/// Checks in reporting order.
static CHECKS: &[Check] = &[
    Check {
        title: NESTED_LOOPS,
        description: "Consider optimizing nested loops to reduce time complexity.",
        severity: Severity::Medium,
        category: Category::Time,
        matcher: nested_loops,
    },
    Check {
        title: SORT_THEN_REVERSE,
        description: "Use a comparator to sort descending instead of sorting then reversing.",
        severity: Severity::Low,
        category: Category::Time,
        matcher: sort_then_reverse,
    },
    Check {
        title: ARRAY_ALLOCATION,
        description: "Avoid large intermediate arrays; iterate once or use generators.",
        severity: Severity::Low,
        category: Category::Space,
        matcher: array_allocation,
    },
    Check {
        title: UNGUARDED_JSON_PARSE,
        description: "Wrap JSON.parse in try/catch to handle invalid input.",
        severity: Severity::Low,
        category: Category::EdgeCases,
        matcher: unguarded_json_parse,
    },
    Check {
        title: DIVISION_BY_ZERO,
        description: "Validate divisors before division operations.",
        severity: Severity::High,
        category: Category::EdgeCases,
        matcher: division_by_zero,
    },
];

/// Run every heuristic check over `code`.
///
/// Ids are `H-1`, `H-2`, ... numbered within this call only, so identical
/// input always yields an identical result.
pub fn detect(code: &str) -> Vec<CodeIssue> {
    let lines: Vec<&str> = code.split('\n').collect();
    let mut issues = Vec::new();

    for check in CHECKS {
        if let Some(matched_lines) = (check.matcher)(code, &lines) {
            issues.push(CodeIssue {
                id: format!("H-{}", issues.len() + 1),
                title: check.title.to_string(),
                description: check.description.to_string(),
                severity: check.severity,
                lines: matched_lines,
                category: check.category,
                suggestion: None,
            });
        }
    }

    tracing::trace!(count = issues.len(), "heuristic checks complete");
    issues
}

fn nested_loops(code: &str, lines: &[&str]) -> Option<Option<Vec<usize>>> {
    if !NESTED_FOR.is_match(code) {
        return None;
    }
    let loop_lines: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| LOOP_LINE.is_match(line))
        .map(|(i, _)| i + 1)
        .collect();
    if loop_lines.is_empty() {
        None
    } else {
        Some(Some(loop_lines))
    }
}

fn sort_then_reverse(code: &str, _lines: &[&str]) -> Option<Option<Vec<usize>>> {
    SORT_REVERSE.is_match(code).then_some(None)
}

fn array_allocation(code: &str, _lines: &[&str]) -> Option<Option<Vec<usize>>> {
    (ARRAY_FILL.is_match(code) && MAP_CALL.is_match(code)).then_some(None)
}

fn unguarded_json_parse(code: &str, _lines: &[&str]) -> Option<Option<Vec<usize>>> {
    (JSON_PARSE.is_match(code) && !GUARDED_JSON_PARSE.is_match(code)).then_some(None)
}

fn division_by_zero(code: &str, _lines: &[&str]) -> Option<Option<Vec<usize>>> {
    DIVISION.is_match(code).then_some(None)
}
