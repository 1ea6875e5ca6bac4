//! OpenAI-compatible provider implementation.
//!
//! Works with OpenAI and any endpoint that implements `/v1/chat/completions`
//! with `response_format: json_schema` structured outputs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use postgate_config::ProviderConfig;
use postgate_core::error::ProviderError;
use postgate_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// An OpenAI-compatible structured-output provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new(
            "openai",
            "https://api.openai.com/v1",
            api_key,
            Duration::from_secs(120),
        )
    }

    /// Build the chat-completions request body.
    fn request_body(request: &ObjectRequest) -> serde_json::Value {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ApiMessage {
                role: "system".into(),
                content: system.clone(),
            });
        }
        messages.push(ApiMessage {
            role: "user".into(),
            content: request.prompt.clone(),
        });

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": messages,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "strict": true,
                    "schema": request.schema,
                },
            },
        });

        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        body
    }

    /// Pull the generated object out of a chat-completions response.
    fn extract_object(api_response: ApiResponse) -> Result<ObjectResponse, ProviderError> {
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        if let Some(refusal) = choice.message.refusal {
            return Err(ProviderError::ApiError {
                status_code: 200,
                message: format!("Model refused: {refusal}"),
            });
        }

        let content = choice.message.content.ok_or_else(|| ProviderError::ApiError {
            status_code: 200,
            message: "Empty message content".into(),
        })?;

        let object = serde_json::from_str(&content).map_err(|e| ProviderError::ApiError {
            status_code: 200,
            message: format!("Failed to parse object: {e}"),
        })?;

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ObjectResponse {
            object,
            model: api_response.model,
            usage,
        })
    }
}

#[async_trait]
impl postgate_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_object(
        &self,
        request: ObjectRequest,
    ) -> std::result::Result<ObjectResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::request_body(&request);

        debug!(provider = %self.name, model = %request.model, "Sending structured completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        Self::extract_object(api_response)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

/// Builds [`OpenAiCompatProvider`]s from the configured endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiFactory {
    base_url: String,
    timeout: Duration,
}

impl OpenAiFactory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }
}

impl ProviderFactory for OpenAiFactory {
    fn create(&self, credential: &str) -> Result<Arc<dyn Provider>, ProviderError> {
        let provider = OpenAiCompatProvider::new("openai", &self.base_url, credential, self.timeout)?;
        Ok(Arc::new(provider))
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_request(system: Option<&str>) -> ObjectRequest {
        ObjectRequest {
            model: "gpt-4o-mini".into(),
            system: system.map(String::from),
            prompt: "Draft:\n\nhello".into(),
            schema_name: "sendability".into(),
            schema: serde_json::json!({"type": "object"}),
            temperature: None,
        }
    }

    #[test]
    fn openai_constructor() {
        let provider = OpenAiCompatProvider::openai("sk-test").unwrap();
        assert_eq!(provider.name(), "openai");
        assert!(provider.base_url.contains("api.openai.com"));
    }

    #[test]
    fn trailing_slash_trimmed() {
        let provider =
            OpenAiCompatProvider::new("local", "http://localhost:8080/v1/", "k", Duration::from_secs(5))
                .unwrap();
        assert_eq!(provider.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn body_carries_system_prompt_and_schema() {
        let body = OpenAiCompatProvider::request_body(&object_request(Some("Be strict")));
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Be strict");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "sendability");
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn body_without_system_has_single_message() {
        let body = OpenAiCompatProvider::request_body(&object_request(None));
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn extracts_object_from_content() {
        let data = r#"{
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{"message": {"role": "assistant", "content": "{\"isSendable\":true,\"score\":0}"}}],
            "usage": {"prompt_tokens": 40, "completion_tokens": 9, "total_tokens": 49}
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        let response = OpenAiCompatProvider::extract_object(parsed).unwrap();
        assert_eq!(response.object["isSendable"], true);
        assert_eq!(response.usage.unwrap().total_tokens, 49);
    }

    #[test]
    fn refusal_is_an_error() {
        let data = r#"{
            "model": "gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": null, "refusal": "I can't help"}}]
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        let err = OpenAiCompatProvider::extract_object(parsed).unwrap_err();
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn non_json_content_is_an_error() {
        let data = r#"{"model": "m", "choices": [{"message": {"content": "sure, sendable"}}]}"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert!(matches!(
            OpenAiCompatProvider::extract_object(parsed),
            Err(ProviderError::ApiError { status_code: 200, .. })
        ));
    }

    #[test]
    fn empty_choices_is_an_error() {
        let parsed: ApiResponse = serde_json::from_str(r#"{"model": "m", "choices": []}"#).unwrap();
        assert!(OpenAiCompatProvider::extract_object(parsed).is_err());
    }

    #[test]
    fn factory_uses_configured_endpoint() {
        let factory = OpenAiFactory::from_config(&ProviderConfig::default());
        let provider = factory.create("sk-test").unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
