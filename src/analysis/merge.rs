//! Combining model findings with heuristic findings.

use std::collections::HashSet;

use crate::types::{AnalysisResult, CodeIssue};

/// Prefix for ids assigned to model issues.
pub(crate) const MODEL_ID_PREFIX: &str = "M";

/// Prefix for ids assigned to heuristic issues.
pub(crate) const HEURISTIC_ID_PREFIX: &str = "H";

/// Append heuristic issues whose title the model did not already report.
///
/// Titles compare case-sensitively. Model issues keep their order and come
/// first; suggestions and raw output are untouched. Ids in the merged result
/// are unique: a heuristic id the model already used is renumbered.
pub fn merge_issues(model: AnalysisResult, heuristics: Vec<CodeIssue>) -> AnalysisResult {
    let mut merged = model;
    let mut seen_ids = HashSet::new();
    assign_unique_ids(&mut merged.issues, MODEL_ID_PREFIX, &mut seen_ids);

    let titles: HashSet<&str> = merged.issues.iter().map(|i| i.title.as_str()).collect();
    let mut extra: Vec<CodeIssue> = heuristics
        .into_iter()
        .filter(|h| !titles.contains(h.title.as_str()))
        .collect();
    assign_unique_ids(&mut extra, HEURISTIC_ID_PREFIX, &mut seen_ids);

    merged.issues.extend(extra);
    merged
}

/// Give every issue an id not in `seen`, then record it there.
///
/// Non-empty ids are kept the first time they appear. Blank and repeated
/// ids get the lowest free `<prefix>-<n>` that no other issue in `issues`
/// already carries.
pub(crate) fn assign_unique_ids(
    issues: &mut [CodeIssue],
    prefix: &str,
    seen: &mut HashSet<String>,
) {
    let reserved: HashSet<String> = issues
        .iter()
        .filter(|i| !i.id.is_empty())
        .map(|i| i.id.clone())
        .collect();

    let mut next = 1usize;
    for issue in issues.iter_mut() {
        if !issue.id.is_empty() && !seen.contains(&issue.id) {
            seen.insert(issue.id.clone());
            continue;
        }
        let id = loop {
            let candidate = format!("{}-{}", prefix, next);
            next += 1;
            if !seen.contains(&candidate) && !reserved.contains(&candidate) {
                break candidate;
            }
        };
        tracing::debug!(old = %issue.id, new = %id, "renumbered issue id");
        seen.insert(id.clone());
        issue.id = id;
    }
}
