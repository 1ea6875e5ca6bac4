//! Settings: the two user-supplied values that switch evaluation on.
//!
//! The gate never owns these. It reads them through a [`SettingsProvider`]
//! on every attempt so edits made elsewhere take effect on the next submit.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// The keys a settings provider must answer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingKey {
    /// Credential for the evaluation service.
    #[serde(rename = "ps.apiKey")]
    ApiKey,
    /// Instruction prompt sent as system context.
    #[serde(rename = "ps.systemPrompt")]
    SystemPrompt,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::ApiKey => "ps.apiKey",
            SettingKey::SystemPrompt => "ps.systemPrompt",
        }
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asynchronous, possibly-absent key/value settings.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn get(&self, key: SettingKey) -> Result<Option<String>, SettingsError>;
}

/// Configuration handed to the evaluator for a single attempt.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EvaluationConfig {
    pub credential: Option<String>,
    pub instruction_prompt: Option<String>,
}

impl EvaluationConfig {
    /// Build a config, treating empty strings as absent.
    pub fn new(credential: Option<String>, instruction_prompt: Option<String>) -> Self {
        Self {
            credential: credential.filter(|s| !s.is_empty()),
            instruction_prompt: instruction_prompt.filter(|s| !s.is_empty()),
        }
    }

    /// Read both keys from a settings provider.
    pub async fn load(provider: &dyn SettingsProvider) -> Result<Self, SettingsError> {
        let credential = provider.get(SettingKey::ApiKey).await?;
        let instruction_prompt = provider.get(SettingKey::SystemPrompt).await?;
        Ok(Self::new(credential, instruction_prompt))
    }

    /// Evaluation is opt-in: both values must be present.
    pub fn is_complete(&self) -> bool {
        self.credential.is_some() && self.instruction_prompt.is_some()
    }
}

impl std::fmt::Debug for EvaluationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationConfig")
            .field(
                "credential",
                &match self.credential {
                    Some(_) => "[REDACTED]",
                    None => "None",
                },
            )
            .field("instruction_prompt", &self.instruction_prompt)
            .finish()
    }
}
