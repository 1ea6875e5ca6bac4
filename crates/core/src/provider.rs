//! Provider trait: the abstraction over structured-output LLM backends.
//!
//! A Provider knows how to send a system prompt plus a user prompt to an LLM
//! and get back a JSON object conforming to a caller-supplied JSON Schema.
//!
//! Implementations: OpenAI-compatible endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A request for a schema-constrained JSON object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRequest {
    /// The model to use (e.g., "gpt-4o-mini")
    pub model: String,

    /// System context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// The user prompt
    pub prompt: String,

    /// Name the schema is registered under in the request
    pub schema_name: String,

    /// JSON Schema the response object must satisfy
    pub schema: serde_json::Value,

    /// Temperature, provider default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A generated object, not yet validated against any domain type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectResponse {
    /// The parsed JSON object
    pub object: serde_json::Value,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a request and get a JSON object back.
    async fn generate_object(
        &self,
        request: ObjectRequest,
    ) -> std::result::Result<ObjectResponse, ProviderError>;

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

/// Builds a provider for a credential.
///
/// The credential is re-read on every evaluation, so providers are built per
/// call rather than once at startup.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, credential: &str) -> std::result::Result<Arc<dyn Provider>, ProviderError>;
}

impl<F> ProviderFactory for F
where
    F: Fn(&str) -> std::result::Result<Arc<dyn Provider>, ProviderError> + Send + Sync,
{
    fn create(&self, credential: &str) -> std::result::Result<Arc<dyn Provider>, ProviderError> {
        self(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Provider for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate_object(
            &self,
            request: ObjectRequest,
        ) -> std::result::Result<ObjectResponse, ProviderError> {
            Ok(ObjectResponse {
                object: serde_json::json!({ "prompt": request.prompt }),
                model: request.model,
                usage: None,
            })
        }
    }

    #[tokio::test]
    async fn closure_factory_builds_providers() {
        let factory = |key: &str| -> std::result::Result<Arc<dyn Provider>, ProviderError> {
            if key.is_empty() {
                Err(ProviderError::NotConfigured("empty key".into()))
            } else {
                Ok(Arc::new(Echo))
            }
        };
        assert!(factory.create("").is_err());

        let provider = factory.create("sk-test").unwrap();
        let response = provider
            .generate_object(ObjectRequest {
                model: "m".into(),
                system: None,
                prompt: "hi".into(),
                schema_name: "s".into(),
                schema: serde_json::json!({}),
                temperature: None,
            })
            .await
            .unwrap();
        assert_eq!(response.object["prompt"], "hi");
        assert!(provider.health_check().await.unwrap());
    }

    #[test]
    fn object_request_skips_absent_fields() {
        let req = ObjectRequest {
            model: "gpt-4o-mini".into(),
            system: None,
            prompt: "p".into(),
            schema_name: "s".into(),
            schema: serde_json::json!({"type": "object"}),
            temperature: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("system"));
        assert!(!json.contains("temperature"));
    }
}
