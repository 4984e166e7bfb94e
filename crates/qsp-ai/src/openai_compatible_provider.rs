use crate::llm_provider::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use qsp_core::AnalysisError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for OpenAI-compatible providers (OpenAI, LM Studio, Ollama, etc.)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAICompatibleConfig {
    /// Base URL for the API (e.g., "http://localhost:1234/v1")
    pub base_url: String,
    /// Model to use
    pub model: String,
    /// Maximum context window
    pub context_window: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Optional API key (some providers require it, some don't)
    pub api_key: Option<String>,
    /// Provider name for display purposes
    pub provider_name: String,
}

impl Default for OpenAICompatibleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234/v1".to_string(),
            model: "local-model".to_string(),
            context_window: 128_000,
            timeout_secs: 120,
            api_key: None,
            provider_name: "openai-compatible".to_string(),
        }
    }
}

impl OpenAICompatibleConfig {
    /// Create config for custom endpoint
    pub fn custom(base_url: String, model: String, provider_name: String) -> Self {
        Self {
            base_url,
            model,
            provider_name,
            ..Default::default()
        }
    }
}

/// OpenAI-compatible LLM provider using the Chat Completions API
pub struct OpenAICompatibleProvider {
    config: OpenAICompatibleConfig,
    client: Client,
}

impl OpenAICompatibleProvider {
    /// Create a new OpenAI-compatible provider
    pub fn new(config: OpenAICompatibleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    fn build_request(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> ChatCompletionsRequest {
        ChatCompletionsRequest {
            model: self.config.model.clone(),
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.to_string(),
                    content: Some(m.content.clone()),
                })
                .collect(),
            temperature: Some(config.temperature),
            max_tokens: config.max_output_tokens,
            top_p: config.top_p,
            response_format: config.response_format.clone(),
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn generate_chat(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> LLMResult<LLMResponse> {
        let name = self.config.provider_name.as_str();
        let request = self.build_request(messages, config);

        let mut request_builder = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .header("Content-Type", "application/json")
            .json(&request);

        if let Some(api_key) = &self.config.api_key {
            request_builder =
                request_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request_builder
            .send()
            .await
            .map_err(|e| transport_error(name, e))?;

        if !response.status().is_success() {
            return Err(status_error(name, response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(name, e))?;
        let chat_response: ChatCompletionsResponse = serde_json::from_str(&body).map_err(|e| {
            AnalysisError::MalformedResponse(format!(
                "Failed to parse {} Chat Completions API response: {}",
                name, e
            ))
        })?;

        let choice = chat_response.choices.into_iter().next();
        let finish_reason = choice.as_ref().and_then(|c| c.finish_reason.clone());
        let content = choice.and_then(|c| c.message.content).unwrap_or_default();

        Ok(LLMResponse {
            content,
            total_tokens: chat_response.usage.as_ref().map(|u| u.total_tokens),
            prompt_tokens: chat_response.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: chat_response.usage.as_ref().map(|u| u.completion_tokens),
            finish_reason,
            model: chat_response
                .model
                .unwrap_or_else(|| self.config.model.clone()),
        })
    }

    fn provider_name(&self) -> &str {
        &self.config.provider_name
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn characteristics(&self) -> ProviderCharacteristics {
        ProviderCharacteristics {
            max_tokens: self.config.context_window,
            avg_latency_ms: 1500,
            supports_json_schema: true,
        }
    }
}

// API request/response types for Chat Completions API

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis_schema::analysis_response_format;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn custom_config_keeps_defaults() {
        let config = OpenAICompatibleConfig::custom(
            "http://localhost:11434/v1".to_string(),
            "llama3".to_string(),
            "ollama".to_string(),
        );
        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.provider_name, "ollama");
        assert_eq!(config.timeout_secs, 120);
        assert!(config.api_key.is_none());
    }

    #[tokio::test]
    async fn sends_json_schema_response_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-test",
                "response_format": {
                    "type": "json_schema",
                    "json_schema": { "name": "qsp_analysis", "strict": true }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "model": "gpt-test-2025",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "{\"ok\":true}" },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAICompatibleProvider::new(OpenAICompatibleConfig {
            base_url: format!("{}/v1", server.uri()),
            model: "gpt-test".to_string(),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        })
        .unwrap();

        let response = provider
            .generate_chat(
                &[Message::system("sys"), Message::user("hi")],
                &GenerationConfig {
                    response_format: Some(analysis_response_format()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(response.content, "{\"ok\":true}");
        assert_eq!(response.total_tokens, Some(7));
        assert_eq!(response.model, "gpt-test-2025");
    }

    #[tokio::test]
    async fn refusal_without_content_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "role": "assistant", "content": null, "refusal": "no" },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let provider = OpenAICompatibleProvider::new(OpenAICompatibleConfig {
            base_url: server.uri(),
            ..Default::default()
        })
        .unwrap();
        let response = provider.generate("hi").await.unwrap();
        assert!(response.content.is_empty());
    }

    #[tokio::test]
    async fn rate_limit_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let provider = OpenAICompatibleProvider::new(OpenAICompatibleConfig {
            base_url: server.uri(),
            ..Default::default()
        })
        .unwrap();
        let err = provider.generate("hi").await.unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Provider {
                status: Some(429),
                ..
            }
        ));
    }
}
