//! Reading snippets from disk or stdin.

use std::path::Path;

use tokio::io::AsyncReadExt;

/// A snippet ready to be analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// Where the code came from; used as the request's source URL.
    pub origin: String,
    pub code: String,
    pub language: Option<String>,
}

/// Read a snippet from `path`, or from stdin when `path` is `-`.
///
/// `language` overrides the guess made from the file extension.
pub async fn read_snippet(path: &Path, language: Option<String>) -> anyhow::Result<Snippet> {
    if path == Path::new("-") {
        let mut code = String::new();
        tokio::io::stdin().read_to_string(&mut code).await?;
        return Ok(Snippet {
            origin: "stdin".to_string(),
            code,
            language,
        });
    }

    let code = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("reading {}: {}", path.display(), e))?;
    let language = language.or_else(|| language_from_path(path).map(str::to_string));
    Ok(Snippet {
        origin: format!("file://{}", path.display()),
        code,
        language,
    })
}

/// Guess a language name from a file extension.
pub fn language_from_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let language = match ext.as_str() {
        "js" | "mjs" | "cjs" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "py" => "python",
        "rs" => "rust",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "scala" => "scala",
        "sh" | "bash" => "bash",
        _ => return None,
    };
    Some(language)
}
