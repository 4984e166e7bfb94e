//! Single-shot analysis requests against the configured provider.

use crate::analysis_schema::{
    analysis_response_format, strip_code_fence, task_instruction, QSP_SYSTEM_PROMPT,
};
use crate::llm_provider::{GenerationConfig, LLMProvider, Message};
use qsp_core::{AnalysisError, AnalysisResult, LlmConfig};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Sends the fixed QSP instruction plus one user input to the provider and
/// decodes the structured document it returns.
pub struct AnalysisGateway {
    provider: Arc<dyn LLMProvider>,
    generation: GenerationConfig,
}

impl AnalysisGateway {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self::with_generation(provider, GenerationConfig::default())
    }

    /// Use sampling settings from the loaded configuration.
    pub fn from_llm_config(provider: Arc<dyn LLMProvider>, config: &LlmConfig) -> Self {
        Self::with_generation(
            provider,
            GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: Some(config.max_output_tokens),
                ..GenerationConfig::default()
            },
        )
    }

    /// The response format is always forced to the analysis schema.
    pub fn with_generation(provider: Arc<dyn LLMProvider>, generation: GenerationConfig) -> Self {
        let generation = GenerationConfig {
            response_format: Some(analysis_response_format()),
            ..generation
        };
        Self {
            provider,
            generation,
        }
    }

    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Messages sent for `input_text`: the instruction block, then the
    /// task wrapped around the literal input.
    pub fn build_messages(input_text: &str) -> Vec<Message> {
        vec![
            Message::system(QSP_SYSTEM_PROMPT),
            Message::user(task_instruction(input_text)),
        ]
    }

    /// Request one analysis. Exactly one provider call is made; no retries.
    pub async fn request_analysis(
        &self,
        input_text: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "qsp_analysis",
            %request_id,
            provider = self.provider.provider_name(),
            model = self.provider.model_name(),
        );

        async move {
            debug!(input_chars = input_text.chars().count(), "requesting analysis");
            match self.call_provider(input_text).await {
                Ok((result, total_tokens)) => {
                    info!(
                        title = %result.title,
                        status = %result.status,
                        ?total_tokens,
                        "analysis ready"
                    );
                    Ok(result)
                }
                Err(err) => {
                    warn!(kind = ?err.kind(), "analysis request failed: {}", err);
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Returns the parsed document with the provider's total token usage.
    async fn call_provider(
        &self,
        input_text: &str,
    ) -> Result<(AnalysisResult, Option<usize>), AnalysisError> {
        let messages = Self::build_messages(input_text);
        let response = self
            .provider
            .generate_chat(&messages, &self.generation)
            .await?;

        debug!(finish_reason = ?response.finish_reason, "provider responded");

        let payload = strip_code_fence(&response.content);
        if payload.is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }
        let result = AnalysisResult::from_json(payload)?;
        Ok((result, response.total_tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_provider::{LLMResponse, LLMResult, MessageRole, ProviderCharacteristics};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use qsp_core::{AnalysisErrorKind, FailureClass, StabilityStatus};

    const VALID: &str = r#"{
        "title": "t", "coreVerse": "v", "analysisText": "a",
        "algebra": ["H = S"], "variables": [], "article": {
            "intro": "i", "forecasting": "f", "modeling": "m", "remedies": "r"
        },
        "status": "Safe", "recommendations": [], "disclaimer": "d"
    }"#;

    struct CannedProvider {
        reply: LLMResult<String>,
        calls: Mutex<Vec<(Vec<Message>, GenerationConfig)>>,
    }

    impl CannedProvider {
        fn new(reply: LLMResult<&str>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LLMProvider for CannedProvider {
        async fn generate_chat(
            &self,
            messages: &[Message],
            config: &GenerationConfig,
        ) -> LLMResult<LLMResponse> {
            self.calls.lock().push((messages.to_vec(), config.clone()));
            self.reply.clone().map(|content| LLMResponse {
                content,
                total_tokens: Some(1234),
                ..Default::default()
            })
        }

        fn provider_name(&self) -> &str {
            "canned"
        }

        fn model_name(&self) -> &str {
            "canned-1"
        }

        fn characteristics(&self) -> ProviderCharacteristics {
            ProviderCharacteristics {
                max_tokens: 1024,
                avg_latency_ms: 0,
                supports_json_schema: true,
            }
        }
    }

    #[tokio::test]
    async fn sends_literal_input_once_with_schema() {
        let provider = CannedProvider::new(Ok(VALID));
        let gateway = AnalysisGateway::new(provider.clone());

        let result = gateway.request_analysis("سورة الرعد").await.unwrap();
        assert_eq!(result.status, StabilityStatus::Safe);

        let calls = provider.calls.lock();
        assert_eq!(calls.len(), 1);
        let (messages, config) = &calls[0];
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[0].content, QSP_SYSTEM_PROMPT);
        assert!(messages[1].content.contains("\"سورة الرعد\""));
        assert_eq!(config.response_format, Some(analysis_response_format()));
    }

    #[tokio::test]
    async fn success_carries_token_usage() {
        let gateway = AnalysisGateway::new(CannedProvider::new(Ok(VALID)));
        let (result, total_tokens) = gateway.call_provider("x").await.unwrap();
        assert_eq!(result.title, "t");
        assert_eq!(total_tokens, Some(1234));
    }

    #[tokio::test]
    async fn fenced_payload_is_accepted() {
        let fenced = format!("```json\n{}\n```", VALID);
        let provider = CannedProvider::new(Ok(fenced.as_str()));
        let gateway = AnalysisGateway::new(provider);
        assert_eq!(gateway.request_analysis("x").await.unwrap().title, "t");
    }

    #[tokio::test]
    async fn blank_content_is_empty_response() {
        let gateway = AnalysisGateway::new(CannedProvider::new(Ok("  \n")));
        assert_eq!(
            gateway.request_analysis("x").await.unwrap_err(),
            AnalysisError::EmptyResponse
        );
    }

    #[tokio::test]
    async fn invalid_json_is_malformed() {
        let gateway = AnalysisGateway::new(CannedProvider::new(Ok("{\"title\": 3")));
        let err = gateway.request_analysis("x").await.unwrap_err();
        assert_eq!(err.kind(), AnalysisErrorKind::MalformedResponse);
        assert_eq!(err.failure_class(), FailureClass::Generic);
    }

    #[tokio::test]
    async fn transport_errors_pass_through_unchanged() {
        let provider = CannedProvider::new(Err(AnalysisError::Transport("reset".into())));
        let gateway = AnalysisGateway::new(provider.clone());
        let err = gateway.request_analysis("x").await.unwrap_err();
        assert_eq!(err, AnalysisError::Transport("reset".into()));
        assert_eq!(err.failure_class(), FailureClass::Network);
        assert_eq!(provider.calls.lock().len(), 1);
    }

    #[test]
    fn config_settings_keep_the_schema() {
        let gateway = AnalysisGateway::from_llm_config(
            CannedProvider::new(Ok(VALID)),
            &LlmConfig {
                temperature: 0.2,
                max_output_tokens: 2048,
                ..LlmConfig::default()
            },
        );
        assert_eq!(gateway.generation.temperature, 0.2);
        assert_eq!(gateway.generation.max_output_tokens, Some(2048));
        assert!(gateway.generation.response_format.is_some());
        assert_eq!(gateway.provider().provider_name(), "canned");
    }
}
