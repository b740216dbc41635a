//! User preferences and the stores that persist them.
//!
//! Preferences are kept as YAML. The file store lives in the platform config
//! directory (e.g. `~/.config/codefixer/preferences.yaml` on Linux) unless a
//! path is given explicitly.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::ratelimit::DEFAULT_LIMIT_PER_MINUTE;
use crate::types::{ProviderConfig, ProviderId};

/// File name used inside the config directory.
pub const PREFERENCES_FILE: &str = "preferences.yaml";

/// Errors raised by preference stores.
#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("no preferences stored")]
    Unavailable,
    #[error("failed to access preferences at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse preferences: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid preferences: {0}")]
    Invalid(String),
}

/// Color theme for terminal output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Everything a user can configure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub theme: Theme,
    pub provider: ProviderConfig,
    /// Requests allowed per minute (default: 20)
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_min: u32,
}

fn default_rate_limit() -> u32 {
    DEFAULT_LIMIT_PER_MINUTE
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            provider: ProviderConfig {
                id: ProviderId::Ollama,
                api_key: None,
                model: Some(crate::provider::OLLAMA_DEFAULT_MODEL.to_string()),
                base_url: Some(crate::provider::OLLAMA_DEFAULT_BASE_URL.to_string()),
            },
            rate_limit_per_min: DEFAULT_LIMIT_PER_MINUTE,
        }
    }
}

impl UserPreferences {
    /// Parse preferences from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, PrefsError> {
        let prefs: UserPreferences = serde_yaml::from_str(content)?;
        prefs.validate()?;
        Ok(prefs)
    }

    /// Serialize preferences to YAML text.
    pub fn to_yaml(&self) -> Result<String, PrefsError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check values a store should refuse to persist.
    pub fn validate(&self) -> Result<(), PrefsError> {
        if self.rate_limit_per_min == 0 {
            return Err(PrefsError::Invalid(
                "rateLimitPerMin must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Async get/set access to persisted preferences.
#[async_trait]
pub trait PreferencesStore: Send + Sync {
    /// Stored preferences, or `None` when nothing has been saved yet.
    async fn get(&self) -> Result<Option<UserPreferences>, PrefsError>;

    async fn set(&self, prefs: &UserPreferences) -> Result<(), PrefsError>;
}

/// Seed default preferences when the store is empty.
///
/// Returns whatever is stored afterwards.
pub async fn ensure_defaults(store: &dyn PreferencesStore) -> Result<UserPreferences, PrefsError> {
    if let Some(existing) = store.get().await? {
        return Ok(existing);
    }
    let defaults = UserPreferences::default();
    store.set(&defaults).await?;
    tracing::info!("stored default preferences");
    Ok(defaults)
}

/// Preferences held in memory for the life of the process.
#[derive(Default)]
pub struct MemoryPreferencesStore {
    inner: RwLock<Option<UserPreferences>>,
}

impl MemoryPreferencesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(prefs: UserPreferences) -> Self {
        Self {
            inner: RwLock::new(Some(prefs)),
        }
    }
}

#[async_trait]
impl PreferencesStore for MemoryPreferencesStore {
    async fn get(&self) -> Result<Option<UserPreferences>, PrefsError> {
        Ok(self.inner.read().await.clone())
    }

    async fn set(&self, prefs: &UserPreferences) -> Result<(), PrefsError> {
        prefs.validate()?;
        *self.inner.write().await = Some(prefs.clone());
        Ok(())
    }
}

/// Preferences persisted as a YAML file.
pub struct FilePreferencesStore {
    path: PathBuf,
}

impl FilePreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform config directory.
    pub fn default_location() -> Result<Self, PrefsError> {
        let dirs = ProjectDirs::from("", "", "codefixer").ok_or_else(|| {
            PrefsError::Invalid("could not determine a config directory".to_string())
        })?;
        Ok(Self::new(dirs.config_dir().join(PREFERENCES_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PrefsError {
        PrefsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl PreferencesStore for FilePreferencesStore {
    async fn get(&self) -> Result<Option<UserPreferences>, PrefsError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        UserPreferences::from_yaml(&content).map(Some)
    }

    async fn set(&self, prefs: &UserPreferences) -> Result<(), PrefsError> {
        prefs.validate()?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error(e))?;
            }
        }
        let content = prefs.to_yaml()?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), "preferences saved");
        Ok(())
    }
}
