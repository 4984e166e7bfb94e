use crate::gemini_provider::{GeminiConfig, GeminiProvider};
use crate::llm_provider::*;
use crate::openai_compatible_provider::{OpenAICompatibleConfig, OpenAICompatibleProvider};
use anyhow::{anyhow, Context, Result};
use qsp_core::{LlmConfig, SUPPORTED_PROVIDERS};
use std::sync::Arc;

/// Factory for creating LLM providers based on configuration
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create an LLM provider from configuration
    pub fn create_from_config(config: &LlmConfig) -> Result<Arc<dyn LLMProvider>> {
        let provider_name = config.provider.to_lowercase();

        match provider_name.as_str() {
            "gemini" => Self::create_gemini_provider(config),
            "openai-compatible" => Self::create_openai_compatible_provider(config),
            _ => Err(anyhow!(
                "Unsupported LLM provider: {}. Available providers: {}",
                provider_name,
                SUPPORTED_PROVIDERS.join(", ")
            )),
        }
    }

    /// Create a Google Gemini provider. The key may be absent; requests then
    /// fail individually instead of at startup.
    fn create_gemini_provider(config: &LlmConfig) -> Result<Arc<dyn LLMProvider>> {
        let gemini_config = GeminiConfig {
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config.gemini_base_url.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            ..GeminiConfig::default()
        };

        let provider =
            GeminiProvider::new(gemini_config).context("Failed to create Gemini provider")?;
        Ok(Arc::new(provider))
    }

    /// Create a generic OpenAI-compatible provider
    fn create_openai_compatible_provider(config: &LlmConfig) -> Result<Arc<dyn LLMProvider>> {
        let base_url = config.openai_compatible_url.clone().ok_or_else(|| {
            anyhow!("OpenAI-compatible provider requires 'openai_compatible_url' in config")
        })?;

        let compat_config = OpenAICompatibleConfig {
            api_key: config.api_key.clone(),
            timeout_secs: config.timeout_secs,
            ..OpenAICompatibleConfig::custom(
                base_url,
                config.model.clone(),
                "openai-compatible".to_string(),
            )
        };

        let provider = OpenAICompatibleProvider::new(compat_config)
            .context("Failed to create OpenAI-compatible provider")?;
        Ok(Arc::new(provider))
    }
}
