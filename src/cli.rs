//! Command-line interface for codefixer.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::analysis::Orchestrator;
use crate::prefs::{
    ensure_defaults, FilePreferencesStore, MemoryPreferencesStore, PreferencesStore, Theme,
    UserPreferences,
};
use crate::provider::http_client;
use crate::ratelimit::{spawn_ticker, RateLimiter};
use crate::report::{self, Format, PrettyOptions};
use crate::source::read_snippet;
use crate::types::{AnalysisRequest, AnalysisResult, ProviderConfig, ProviderId};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// How often queued requests are re-checked against the rate limit window.
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Analyze code snippets with a language model and local heuristics.
///
/// Each snippet is sent to the configured provider (a local Ollama server by
/// default), and the model's findings are merged with pattern-based checks
/// for common smells like nested loops or unguarded JSON parsing.
#[derive(Parser)]
#[command(name = "codefixer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one or more source files (use - for stdin)
    ///
    /// Requests are rate limited per minute (see `prefs set --rate-limit`).
    /// Once a batch uses up the limit, the remaining files wait for the next
    /// full one-minute window before they are sent.
    #[command(visible_alias = "check")]
    Analyze(AnalyzeArgs),
    /// Write default preferences if none exist
    Init(InitArgs),
    /// Show or change stored preferences
    Prefs(PrefsArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Files to analyze; - reads from stdin
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Language of the code (default: guessed from the file extension)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Source URL to report instead of the file path
    #[arg(long)]
    pub url: Option<String>,

    /// Path to the preferences file (default: platform config directory)
    #[arg(short, long)]
    pub prefs: Option<PathBuf>,

    /// Provider to use for this run: ollama, openrouter, openai, huggingface, none
    #[arg(long)]
    pub provider: Option<ProviderId>,

    /// Model name for this run
    #[arg(short, long)]
    pub model: Option<String>,

    /// Provider base URL for this run
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key for hosted providers
    #[arg(long, env = "CODEFIXER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format: pretty, json, or markdown
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Only show issues whose title or description contains this text
    #[arg(short, long)]
    pub query: Option<String>,

    /// Print the raw model output (pretty format only)
    #[arg(long)]
    pub show_raw: bool,

    /// Exit non-zero when any high-severity issue is found
    #[arg(long)]
    pub fail_on_high: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Path to the preferences file (default: platform config directory)
    #[arg(short, long)]
    pub prefs: Option<PathBuf>,

    /// Overwrite existing preferences with the defaults
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the prefs command.
#[derive(Parser)]
pub struct PrefsArgs {
    /// Path to the preferences file (default: platform config directory)
    #[arg(short, long, global = true)]
    pub prefs: Option<PathBuf>,

    #[command(subcommand)]
    pub action: PrefsAction,
}

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Print the stored preferences (API key masked)
    Show,
    /// Print the preferences file location
    Path,
    /// Update stored preferences
    Set(PrefsSetArgs),
}

/// Fields accepted by `prefs set`.
#[derive(Parser)]
pub struct PrefsSetArgs {
    #[arg(long)]
    pub provider: Option<ProviderId>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub api_key: Option<String>,

    /// Requests allowed per minute
    #[arg(long)]
    pub rate_limit: Option<u32>,

    /// Color theme: light, dark, or system
    #[arg(long, value_parser = parse_theme)]
    pub theme: Option<Theme>,
}

fn parse_theme(s: &str) -> Result<Theme, String> {
    match s {
        "light" => Ok(Theme::Light),
        "dark" => Ok(Theme::Dark),
        "system" => Ok(Theme::System),
        _ => Err(format!(
            "invalid theme {:?}, must be 'light', 'dark', or 'system'",
            s
        )),
    }
}

fn open_store(path: Option<&PathBuf>) -> anyhow::Result<FilePreferencesStore> {
    match path {
        Some(p) => Ok(FilePreferencesStore::new(p)),
        None => Ok(FilePreferencesStore::default_location()?),
    }
}

/// Apply per-run provider overrides. Switching provider drops the stored
/// model and base URL since they belong to the previous backend.
fn apply_overrides(
    config: &mut ProviderConfig,
    provider: Option<ProviderId>,
    model: Option<&str>,
    base_url: Option<&str>,
    api_key: Option<&str>,
) {
    if let Some(id) = provider {
        if id != config.id {
            *config = ProviderConfig::new(id);
        }
    }
    if let Some(model) = model {
        config.model = Some(model.to_string());
    }
    if let Some(url) = base_url {
        config.base_url = Some(url.to_string());
    }
    if let Some(key) = api_key {
        config.api_key = Some(key.to_string());
    }
}

/// Keep only issues matching `query`.
fn narrow(mut result: AnalysisResult, query: &str) -> AnalysisResult {
    report::retain_matching(&mut result, query);
    result
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    let format: Format = match args.format.parse() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(analyze_all(args, format))
}

async fn analyze_all(args: &AnalyzeArgs, format: Format) -> anyhow::Result<i32> {
    let store = open_store(args.prefs.as_ref())?;
    let mut prefs = match store.get().await? {
        Some(p) => p,
        None => {
            tracing::info!(path = %store.path().display(), "no stored preferences, using defaults");
            UserPreferences::default()
        }
    };
    apply_overrides(
        &mut prefs.provider,
        args.provider,
        args.model.as_deref(),
        args.base_url.as_deref(),
        args.api_key.as_deref(),
    );
    prefs.validate()?;

    let provider_name = prefs.provider.id.to_string();
    let theme = prefs.theme;
    let limiter = Arc::new(RateLimiter::per_minute(prefs.rate_limit_per_min));
    let orchestrator = Orchestrator::new(Arc::clone(&limiter), http_client()?);
    // Overrides live only for this run; the file is left untouched.
    let session = MemoryPreferencesStore::with(prefs);
    let ticker = spawn_ticker(limiter, TICK_PERIOD);

    let mut exit_code = EXIT_SUCCESS;
    for path in &args.paths {
        let snippet = read_snippet(path, args.language.clone()).await?;
        if snippet.code.trim().is_empty() {
            eprintln!("Warning: {} is empty, skipping", snippet.origin);
            continue;
        }

        let source = args.url.clone().unwrap_or_else(|| snippet.origin.clone());
        let request = AnalysisRequest::new(source.clone(), snippet.code, snippet.language);
        let result = orchestrator.run_with_preferences(&session, &request).await?;

        if args.fail_on_high && result.has_high_severity() {
            exit_code = EXIT_FAILED;
        }

        match format {
            Format::Json => {
                let result = match &args.query {
                    Some(q) => narrow(result, q),
                    None => result,
                };
                report::write_json(&source, &provider_name, &result)?;
            }
            Format::Markdown => {
                let result = match &args.query {
                    Some(q) => narrow(result, q),
                    None => result,
                };
                println!("{}", report::to_markdown(&result));
            }
            Format::Pretty => {
                let opts = PrettyOptions {
                    theme,
                    query: args.query.clone(),
                    show_raw: args.show_raw,
                };
                report::write_pretty(&source, &provider_name, &result, &opts);
            }
        }
    }

    ticker.abort();
    Ok(exit_code)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    let store = open_store(args.prefs.as_ref())?;
    let runtime = tokio::runtime::Runtime::new()?;

    let existed = runtime.block_on(async {
        if args.force {
            store.set(&UserPreferences::default()).await?;
            return Ok::<_, anyhow::Error>(false);
        }
        let existed = store.get().await?.is_some();
        ensure_defaults(&store).await?;
        Ok(existed)
    })?;

    if existed {
        println!("Preferences already exist at {}", store.path().display());
        println!("Use --force to reset them to the defaults");
    } else {
        println!("Wrote default preferences to {}", store.path().display());
        println!();
        println!("Next steps:");
        println!("  1. Start a local model: ollama pull {}", crate::provider::OLLAMA_DEFAULT_MODEL);
        println!("  2. Run: codefixer analyze <file>");
    }

    Ok(EXIT_SUCCESS)
}

/// Run the prefs command.
pub fn run_prefs(args: &PrefsArgs) -> anyhow::Result<i32> {
    let store = open_store(args.prefs.as_ref())?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        match &args.action {
            PrefsAction::Path => println!("{}", store.path().display()),
            PrefsAction::Show => {
                let Some(prefs) = store.get().await? else {
                    eprintln!("Error: no preferences at {}", store.path().display());
                    eprintln!("Run 'codefixer init' to create them");
                    return Ok(EXIT_ERROR);
                };
                print!("{}", masked(prefs).to_yaml()?);
            }
            PrefsAction::Set(set) => {
                let mut prefs = store.get().await?.unwrap_or_default();
                apply_overrides(
                    &mut prefs.provider,
                    set.provider,
                    set.model.as_deref(),
                    set.base_url.as_deref(),
                    set.api_key.as_deref(),
                );
                if let Some(limit) = set.rate_limit {
                    prefs.rate_limit_per_min = limit;
                }
                if let Some(theme) = set.theme {
                    prefs.theme = theme;
                }
                store.set(&prefs).await?;
                println!("Saved preferences to {}", store.path().display());
            }
        }
        Ok::<_, anyhow::Error>(EXIT_SUCCESS)
    })
}

fn masked(mut prefs: UserPreferences) -> UserPreferences {
    if let Some(key) = prefs.provider.api_key.as_mut() {
        *key = "***".to_string();
    }
    prefs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, CodeIssue, Severity};

    #[test]
    fn test_cli_parses_analyze() {
        let cli = Cli::try_parse_from([
            "codefixer",
            "analyze",
            "a.js",
            "b.py",
            "--provider",
            "openrouter",
            "--format",
            "json",
            "--fail-on-high",
        ])
        .unwrap();
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.paths.len(), 2);
        assert_eq!(args.provider, Some(ProviderId::OpenRouter));
        assert_eq!(args.format, "json");
        assert!(args.fail_on_high);
    }

    #[test]
    fn test_cli_rejects_unknown_provider() {
        let parsed = Cli::try_parse_from(["codefixer", "analyze", "a.js", "--provider", "gemini"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_cli_parses_prefs_set() {
        let cli = Cli::try_parse_from([
            "codefixer",
            "prefs",
            "set",
            "--rate-limit",
            "5",
            "--theme",
            "dark",
        ])
        .unwrap();
        let Commands::Prefs(args) = cli.command else {
            panic!("expected prefs");
        };
        let PrefsAction::Set(set) = args.action else {
            panic!("expected set");
        };
        assert_eq!(set.rate_limit, Some(5));
        assert_eq!(set.theme, Some(Theme::Dark));
    }

    #[test]
    fn test_switching_provider_resets_backend_fields() {
        let mut config = UserPreferences::default().provider;
        apply_overrides(&mut config, Some(ProviderId::OpenRouter), None, None, Some("sk-1"));
        assert_eq!(config.id, ProviderId::OpenRouter);
        assert_eq!(config.model, None);
        assert_eq!(config.base_url, None);
        assert_eq!(config.api_key.as_deref(), Some("sk-1"));

        // Same provider keeps what is already there.
        apply_overrides(&mut config, Some(ProviderId::OpenRouter), Some("qwen/other"), None, None);
        assert_eq!(config.model.as_deref(), Some("qwen/other"));
        assert_eq!(config.api_key.as_deref(), Some("sk-1"));
    }

    fn issue(id: &str, title: &str) -> CodeIssue {
        CodeIssue {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            severity: Severity::Low,
            lines: None,
            category: Category::Style,
            suggestion: None,
        }
    }

    #[test]
    fn test_narrow_matches_text_not_ids() {
        let result = AnalysisResult {
            issues: vec![issue("H-1", "Off by one"), issue("H-1", "Nested loops detected")],
            suggestions: vec![],
            raw_model_output: None,
        };
        let narrowed = narrow(result, "nested");
        assert_eq!(narrowed.issues.len(), 1);
        assert_eq!(narrowed.issues[0].title, "Nested loops detected");
    }

    #[test]
    fn test_mask_hides_api_key() {
        let mut prefs = UserPreferences::default();
        prefs.provider.api_key = Some("sk-secret".to_string());
        assert_eq!(masked(prefs).provider.api_key.as_deref(), Some("***"));
    }

    #[test]
    fn test_run_init_and_prefs_set() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("preferences.yaml");

        let code = run_init(&InitArgs {
            prefs: Some(path.clone()),
            force: false,
        })
        .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            UserPreferences::from_yaml(&written).unwrap(),
            UserPreferences::default()
        );

        let code = run_prefs(&PrefsArgs {
            prefs: Some(path.clone()),
            action: PrefsAction::Set(PrefsSetArgs {
                provider: None,
                model: None,
                base_url: None,
                api_key: None,
                rate_limit: Some(3),
                theme: None,
            }),
        })
        .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
        let updated = UserPreferences::from_yaml(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(updated.rate_limit_per_min, 3);

        // init without --force leaves existing preferences alone.
        run_init(&InitArgs {
            prefs: Some(path.clone()),
            force: false,
        })
        .unwrap();
        let kept = UserPreferences::from_yaml(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(kept.rate_limit_per_min, 3);
    }

    #[test]
    fn test_prefs_set_rejects_zero_rate_limit() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = run_prefs(&PrefsArgs {
            prefs: Some(temp.path().join("p.yaml")),
            action: PrefsAction::Set(PrefsSetArgs {
                provider: None,
                model: None,
                base_url: None,
                api_key: None,
                rate_limit: Some(0),
                theme: None,
            }),
        });
        assert!(result.is_err());
    }
}
