pub mod analysis_schema;
pub mod gateway;
pub mod gemini_provider;
pub mod llm_factory;
pub mod llm_provider;
pub mod openai_compatible_provider;
pub mod session;

pub use analysis_schema::{analysis_response_format, analysis_response_schema, to_gemini_schema};
pub use gateway::AnalysisGateway;
pub use gemini_provider::{GeminiConfig, GeminiProvider};
pub use llm_factory::LLMProviderFactory;
pub use llm_provider::*;
pub use openai_compatible_provider::{OpenAICompatibleConfig, OpenAICompatibleProvider};
pub use session::AnalysisSession;
