use crate::locale::Locale;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for the QSP engine
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QspConfig {
    /// Analysis provider configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// User-facing presentation settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// Analysis provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider: "gemini" or "openai-compatible"
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// Model identifier (e.g., "gemini-3-flash-preview")
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; usually supplied through API_KEY in the environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Gemini API base URL
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Base URL for OpenAI-compatible endpoints (e.g., "http://localhost:1234/v1")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_compatible_url: Option<String>,

    /// Temperature for generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum output tokens
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_model(),
            api_key: None,
            gemini_base_url: default_gemini_base_url(),
            openai_compatible_url: None,
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Message language: "ar" or "en"
    #[serde(default)]
    pub locale: Locale,
}

pub const SUPPORTED_PROVIDERS: [&str; 2] = ["gemini", "openai-compatible"];

const LOG_LEVELS: [&str; 6] = ["off", "trace", "debug", "info", "warn", "error"];

fn is_log_level(level: &str) -> bool {
    LOG_LEVELS.iter().any(|l| l.eq_ignore_ascii_case(level))
}

fn default_llm_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}
fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_output_tokens() -> usize {
    16_384
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_log_level() -> String {
    "warn".to_string()
} // keep report output clean
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration manager with layered sources
pub struct ConfigManager {
    config: QspConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.qsp.toml)
    /// 3. Sensible defaults
    pub fn load() -> Result<Self, ConfigError> {
        info!("Loading QSP configuration...");

        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        Self::finish(config, config_path)
    }

    /// Load configuration from an explicit file, still applying .env and
    /// environment overrides on top.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        Self::load_dotenv();

        let config = Self::read_toml_file(path)?;
        Self::finish(config, Some(path.to_path_buf()))
    }

    fn finish(config: QspConfig, config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = Self::apply_env_overrides(config);
        Self::validate_config(&config)?;

        info!("Configuration loaded");
        match config_path {
            Some(ref path) => info!("   config file: {}", path.display()),
            None => info!("   config file: NONE (using defaults)"),
        }
        info!("   provider: {}", config.llm.provider);
        info!("   model: {}", config.llm.model);
        info!("   locale: {}", config.ui.locale);
        if config.llm.api_key.is_none() {
            warn!("No API key configured; every analysis request will fail");
        }

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load .env file if it exists
    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            } else {
                info!("Loaded .env file from current directory");
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".qsp.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .qsp.env: {}", e);
                } else {
                    info!("Loaded .qsp.env from home directory");
                }
            }
        }
    }

    /// Find and load config file
    /// Search order:
    /// 1. ./.qsp.toml (current directory)
    /// 2. ~/.qsp/config.toml (user config)
    /// 3. Use defaults
    fn load_config_file() -> Result<(QspConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".qsp.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        info!("No config file found, using defaults");
        Ok((QspConfig::default(), None))
    }

    /// Default location of the per-user config file
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".qsp").join("config.toml"))
    }

    fn read_toml_file(path: &Path) -> Result<QspConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(config: QspConfig) -> QspConfig {
        Self::apply_overrides(config, |key| std::env::var(key).ok())
    }

    fn apply_overrides(
        mut config: QspConfig,
        var: impl Fn(&str) -> Option<String>,
    ) -> QspConfig {
        if let Some(key) = ["API_KEY", "GEMINI_API_KEY", "OPENAI_API_KEY"]
            .into_iter()
            .filter_map(|name| var(name))
            .find(|k| !k.trim().is_empty())
        {
            config.llm.api_key = Some(key);
        }
        if let Some(provider) = var("QSP_LLM_PROVIDER") {
            config.llm.provider = provider.to_lowercase();
        }
        if let Some(model) = var("QSP_MODEL") {
            config.llm.model = model;
        }
        if let Some(url) = var("QSP_BASE_URL") {
            if config.llm.provider == "openai-compatible" {
                config.llm.openai_compatible_url = Some(url);
            } else {
                config.llm.gemini_base_url = url;
            }
        }
        if let Some(timeout) = var("QSP_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => config.llm.timeout_secs = secs,
                Err(_) => warn!("Ignoring invalid QSP_TIMEOUT_SECS: {}", timeout),
            }
        }
        if let Some(locale) = var("QSP_LOCALE") {
            match locale.parse() {
                Ok(l) => config.ui.locale = l,
                Err(e) => warn!("Ignoring QSP_LOCALE: {}", e),
            }
        }
        config
    }

    /// Validate configuration
    fn validate_config(config: &QspConfig) -> Result<(), ConfigError> {
        if !SUPPORTED_PROVIDERS.contains(&config.llm.provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid LLM provider: {}. Must be one of: {}",
                config.llm.provider,
                SUPPORTED_PROVIDERS.join(", ")
            )));
        }

        if config.llm.provider == "openai-compatible" && config.llm.openai_compatible_url.is_none()
        {
            return Err(ConfigError::ValidationError(
                "openai-compatible provider requires 'openai_compatible_url'".to_string(),
            ));
        }

        if config.llm.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        // a full filter directive ("qsp_ai=debug,warn") is left to the subscriber
        let level = config.logging.level.trim();
        if !level.contains('=') && !level.contains(',') && !is_log_level(level) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log level: {}. Must be one of: {}",
                level,
                LOG_LEVELS.join(", ")
            )));
        }

        match config.logging.format.as_str() {
            "pretty" | "compact" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, compact",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &QspConfig {
        &self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Create a default config file
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = QspConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}
