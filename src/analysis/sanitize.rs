//! Input pruning applied before a snippet leaves the process.

use lazy_static::lazy_static;
use regex::Regex;

/// Lines this long or longer are dropped (minified bundles, data blobs).
pub const MAX_LINE_CHARS: usize = 2000;

lazy_static! {
    /// A secret-looking key followed by `:` or `=`; the rest of the line is the value.
    static ref SECRET_ASSIGNMENT: Regex =
        Regex::new(r"(?i)(password|secret|token|api[_-]?key)\s*[:=].*").unwrap();
}

/// Drop overlong lines and redact secret-like assignments.
///
/// Redacted lines keep the key and replace everything after it with
/// `<key> = ***`.
pub fn sanitize(code: &str) -> String {
    let pruned = code
        .split('\n')
        .filter(|line| line.chars().count() < MAX_LINE_CHARS)
        .collect::<Vec<_>>()
        .join("\n");

    SECRET_ASSIGNMENT
        .replace_all(&pruned, "${1} = ***")
        .into_owned()
}
