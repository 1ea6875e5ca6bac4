//! Settings storage: the credential and instruction prompt.
//!
//! Reads are always fresh so that a `configure` run in another terminal is
//! picked up by a running session on its next submit.

use async_trait::async_trait;
use postgate_core::error::SettingsError;
use postgate_core::settings::{SettingKey, SettingsProvider};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

/// The persisted settings document.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "ps.systemPrompt", default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    #[serde(rename = "ps.apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Settings {
    pub fn new(system_prompt: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            system_prompt: Some(system_prompt.into()),
            api_key: Some(api_key.into()),
        }
    }

    /// Both values are required before saving; the prompt is checked first.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.system_prompt.as_deref().is_none_or(|s| s.trim().is_empty()) {
            return Err(SettingsError::Invalid("System prompt is required".into()));
        }
        if self.api_key.as_deref().is_none_or(|s| s.trim().is_empty()) {
            return Err(SettingsError::Invalid("OpenAI API key is required".into()));
        }
        Ok(())
    }

    fn value(&self, key: SettingKey) -> Option<String> {
        match key {
            SettingKey::ApiKey => self.api_key.clone(),
            SettingKey::SystemPrompt => self.system_prompt.clone(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("system_prompt", &self.system_prompt)
            .field(
                "api_key",
                &match self.api_key {
                    Some(_) => "[REDACTED]",
                    None => "None",
                },
            )
            .finish()
    }
}

/// A settings provider that can also persist new values.
#[async_trait]
pub trait SettingsStore: SettingsProvider {
    async fn save(&self, settings: Settings) -> Result<(), SettingsError>;
}

/// Settings kept in a JSON file (`~/.postgate/settings.json` by default).
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document. A missing file is an empty document.
    pub async fn read(&self) -> Result<Settings, SettingsError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No settings file yet");
                return Ok(Settings::default());
            }
            Err(e) => {
                return Err(SettingsError::ReadFailed {
                    path: self.path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        serde_json::from_str(&content).map_err(|e| SettingsError::ReadFailed {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl SettingsProvider for FileSettingsStore {
    async fn get(&self, key: SettingKey) -> Result<Option<String>, SettingsError> {
        Ok(self.read().await?.value(key))
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn save(&self, settings: Settings) -> Result<(), SettingsError> {
        settings.validate()?;

        let write_err = |reason: String| SettingsError::WriteFailed {
            path: self.path.display().to_string(),
            reason,
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| write_err(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(&settings).map_err(|e| write_err(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| write_err(e.to_string()))?;

        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

/// Settings held in memory, for tests and embedding.
#[derive(Default)]
pub struct InMemorySettings {
    inner: RwLock<Settings>,
}

impl InMemorySettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }

    /// Replace the stored values without validation.
    pub fn set(&self, settings: Settings) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = settings;
    }
}

#[async_trait]
impl SettingsProvider for InMemorySettings {
    async fn get(&self, key: SettingKey) -> Result<Option<String>, SettingsError> {
        Ok(self.inner.read().unwrap_or_else(|e| e.into_inner()).value(key))
    }
}

#[async_trait]
impl SettingsStore for InMemorySettings {
    async fn save(&self, settings: Settings) -> Result<(), SettingsError> {
        settings.validate()?;
        self.set(settings);
        Ok(())
    }
}
