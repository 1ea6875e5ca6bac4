//! The LLM-backed evaluator.
//!
//! Failures inside this evaluator never escape it: a network error, a bad
//! status, or a response that fails schema validation all come back as a
//! blocking verdict with a generic reason, which the user can still override.

use std::sync::Arc;

use async_trait::async_trait;
use postgate_config::ProviderConfig;
use postgate_core::error::{Error, ProviderError};
use postgate_core::provider::{ObjectRequest, ProviderFactory};
use postgate_core::{Draft, EvaluationConfig, Evaluator, Verdict};
use tracing::{debug, error, info};

use crate::openai_compat::OpenAiFactory;
use crate::schema::{self, SendabilityAssessment};

/// Asks a structured-output LLM whether a draft should be blocked.
pub struct LlmEvaluator {
    factory: Arc<dyn ProviderFactory>,
    model: String,
    temperature: Option<f32>,
}

impl LlmEvaluator {
    pub fn new(factory: Arc<dyn ProviderFactory>, model: impl Into<String>) -> Self {
        Self {
            factory,
            model: model.into(),
            temperature: None,
        }
    }

    /// An evaluator talking to the configured OpenAI-compatible endpoint.
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(Arc::new(OpenAiFactory::from_config(config)), &config.model)
            .with_temperature(config.temperature)
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn assess(
        &self,
        draft: &Draft,
        credential: Option<&str>,
        instruction_prompt: &str,
    ) -> Result<Verdict, Error> {
        let credential = credential
            .ok_or_else(|| ProviderError::NotConfigured("API key is not set".into()))?;
        let provider = self.factory.create(credential)?;

        let request = ObjectRequest {
            model: self.model.clone(),
            system: Some(instruction_prompt.to_string()),
            prompt: schema::evaluation_prompt(draft),
            schema_name: schema::SCHEMA_NAME.into(),
            schema: schema::json_schema(),
            temperature: self.temperature,
        };

        let response = provider.generate_object(request).await?;
        debug!(model = %response.model, "Evaluation response received");

        let assessment = SendabilityAssessment::from_value(response.object)?;
        Ok(assessment.into_verdict())
    }
}

#[async_trait]
impl Evaluator for LlmEvaluator {
    async fn evaluate(&self, draft: &Draft, config: &EvaluationConfig) -> Result<Verdict, Error> {
        let Some(instruction_prompt) = config.instruction_prompt.as_deref() else {
            debug!("No instruction prompt configured, allowing");
            return Ok(Verdict::allow());
        };

        match self
            .assess(draft, config.credential.as_deref(), instruction_prompt)
            .await
        {
            Ok(verdict) => {
                info!(
                    sendable = verdict.sendable,
                    score = ?verdict.score,
                    draft_len = draft.char_len(),
                    "Draft evaluated"
                );
                Ok(verdict)
            }
            Err(e) => {
                error!(error = %e, "Error evaluating sendability");
                Ok(Verdict::evaluation_error())
            }
        }
    }
}
