use crate::analysis_schema::to_gemini_schema;
use crate::llm_provider::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use qsp_core::AnalysisError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Configuration for the Google Gemini provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; an empty key makes every request fail with a provider error
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Model to use (e.g., "gemini-3-flash-preview")
    pub model: String,
    /// Maximum context window
    pub context_window: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .unwrap_or_default(),
            base_url: GEMINI_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            context_window: 1_000_000,
            timeout_secs: 120,
        }
    }
}

/// Google Gemini provider using the `generateContent` endpoint
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider. A missing key is not an error here; it
    /// surfaces on each request instead.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(messages: &[Message], config: &GenerationConfig) -> GeminiRequest {
        let system_text = messages
            .iter()
            .filter(|m| matches!(m.role, MessageRole::System))
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let system_instruction = (!system_text.is_empty()).then(|| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: Some(system_text),
            }],
        });

        let contents = messages
            .iter()
            .filter(|m| !matches!(m.role, MessageRole::System))
            .map(|m| GeminiContent {
                role: Some(
                    match m.role {
                        MessageRole::Assistant => "model",
                        _ => "user",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: Some(m.content.clone()),
                }],
            })
            .collect();

        let (response_mime_type, response_schema) = match &config.response_format {
            Some(ResponseFormat::JsonSchema { json_schema }) => (
                Some("application/json".to_string()),
                Some(to_gemini_schema(&json_schema.schema)),
            ),
            Some(ResponseFormat::JsonObject) => (Some("application/json".to_string()), None),
            Some(ResponseFormat::Text) | None => (None, None),
        };

        GeminiRequest {
            system_instruction,
            contents,
            generation_config: GeminiGenerationConfig {
                temperature: Some(config.temperature),
                max_output_tokens: config.max_output_tokens,
                top_p: config.top_p,
                response_mime_type,
                response_schema,
            },
        }
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn generate_chat(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> LLMResult<LLMResponse> {
        if self.config.api_key.trim().is_empty() {
            return Err(AnalysisError::provider(
                None,
                "Gemini API key is not configured. Set API_KEY environment variable.",
            ));
        }

        let request = Self::build_request(messages, config);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("gemini", e))?;

        if !response.status().is_success() {
            return Err(status_error("gemini", response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error("gemini", e))?;
        let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            AnalysisError::MalformedResponse(format!("Failed to parse Gemini API response: {e}"))
        })?;

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            tracing::warn!(reason, "Gemini blocked the prompt");
        }

        let candidate = parsed.candidates.into_iter().next();
        let finish_reason = candidate.as_ref().and_then(|c| c.finish_reason.clone());
        let content = candidate
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let usage = parsed.usage_metadata.unwrap_or_default();

        Ok(LLMResponse {
            content,
            total_tokens: usage.total_token_count,
            prompt_tokens: usage.prompt_token_count,
            completion_tokens: usage.candidates_token_count,
            finish_reason,
            model: parsed
                .model_version
                .unwrap_or_else(|| self.config.model.clone()),
        })
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn characteristics(&self) -> ProviderCharacteristics {
        ProviderCharacteristics {
            max_tokens: self.config.context_window,
            avg_latency_ms: 8000,
            supports_json_schema: true,
        }
    }
}

// Gemini API request/response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<usize>,
    candidates_token_count: Option<usize>,
    total_token_count: Option<usize>,
}
