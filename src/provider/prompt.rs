//! Review prompt shared by every provider.

/// Longest code prefix, in characters, sent to a model.
pub const MAX_CODE_CHARS: usize = 15_000;

const PREAMBLE: &str = "You are a senior code reviewer. Analyze the following code for correctness, edge cases, and performance (time and space).";
const OUTPUT_SCHEMA: &str = "Return a JSON with fields: issues[{id,title,description,severity,category,lines?}], suggestions[string].";
const STYLE: &str = "Keep explanations concise and actionable. Do not include any preamble.";

/// Build the review prompt for a snippet.
pub fn build_prompt(code: &str, language: Option<&str>) -> String {
    [
        PREAMBLE,
        OUTPUT_SCHEMA,
        STYLE,
        format!("Language: {}", language.unwrap_or("unknown")).as_str(),
        "Code:",
        "\"\"\"",
        truncate_chars(code, MAX_CODE_CHARS),
        "\"\"\"",
    ]
    .join("\n")
}

/// Slice to at most `max` characters without splitting a code point.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_language_and_code() {
        let prompt = build_prompt("let x = 1;", Some("rust"));
        assert!(prompt.contains("Language: rust"));
        assert!(prompt.contains("\"\"\"\nlet x = 1;\n\"\"\""));
        assert!(prompt.starts_with("You are a senior code reviewer."));
        assert!(prompt.contains("suggestions[string]"));
    }

    #[test]
    fn test_prompt_unknown_language() {
        let prompt = build_prompt("x", None);
        assert!(prompt.contains("Language: unknown"));
    }

    #[test]
    fn test_prompt_truncates_long_code() {
        let code = "a".repeat(MAX_CODE_CHARS + 500);
        let prompt = build_prompt(&code, None);
        let fenced = prompt.split("\"\"\"").nth(1).unwrap();
        assert_eq!(fenced.trim_matches('\n').len(), MAX_CODE_CHARS);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
