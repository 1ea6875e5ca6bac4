//! Configuration loading, validation, and management for PostGate.
//!
//! Loads configuration from `~/.postgate/config.toml` with environment
//! variable overrides. Validates all settings at startup.
//!
//! The two user-editable values that switch evaluation on (credential and
//! instruction prompt) are not part of this file; they live in the settings
//! store, see [`settings`].

pub mod settings;

pub use settings::{FileSettingsStore, InMemorySettings, Settings, SettingsStore};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.postgate/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Evaluation service endpoint and model
    #[serde(default)]
    pub provider: ProviderConfig,

    /// How submit controls and composers are recognised on the host page
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Override for the settings file location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature, provider default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            temperature: None,
        }
    }
}

/// Stable identifiers of the host page's elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// `data-testid` values of submit controls (exact match)
    #[serde(default = "default_submit_test_ids")]
    pub submit_test_ids: Vec<String>,

    /// `data-testid` prefix of composer elements
    #[serde(default = "default_composer_prefix")]
    pub composer_test_id_prefix: String,
}

fn default_submit_test_ids() -> Vec<String> {
    vec!["tweetButtonInline".into(), "tweetButton".into()]
}
fn default_composer_prefix() -> String {
    "tweetTextarea_".into()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            submit_test_ids: default_submit_test_ids(),
            composer_test_id_prefix: default_composer_prefix(),
        }
    }
}

impl SelectorConfig {
    /// Whether a `data-testid` names a submit control.
    pub fn is_submit_control(&self, test_id: &str) -> bool {
        self.submit_test_ids.iter().any(|id| id == test_id)
    }

    /// Whether a `data-testid` names a composer.
    pub fn is_composer(&self, test_id: &str) -> bool {
        test_id.starts_with(&self.composer_test_id_prefix)
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.postgate/config.toml).
    ///
    /// Environment overrides:
    /// - `POSTGATE_MODEL`
    /// - `POSTGATE_BASE_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(model) = std::env::var("POSTGATE_MODEL") {
            config.provider.model = model;
        }

        if let Ok(base_url) = std::env::var("POSTGATE_BASE_URL") {
            config.provider.base_url = base_url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".postgate")
    }

    /// Where the settings store lives for this configuration.
    pub fn settings_file(&self) -> PathBuf {
        self.settings_path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("settings.json"))
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "provider.model must not be empty".into(),
            ));
        }

        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "provider.base_url must not be empty".into(),
            ));
        }

        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "provider.timeout_secs must be > 0".into(),
            ));
        }

        if self.selectors.submit_test_ids.is_empty() {
            return Err(ConfigError::ValidationError(
                "selectors.submit_test_ids must list at least one id".into(),
            ));
        }

        if self.selectors.composer_test_id_prefix.is_empty() {
            return Err(ConfigError::ValidationError(
                "selectors.composer_test_id_prefix must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            selectors: SelectorConfig::default(),
            settings_path: None,
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
