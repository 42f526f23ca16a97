use std::time::Duration;

use clap::{Args, ValueEnum};

use crate::error::ConfigError;
use crate::prompt::PromptStyle;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Wire dialect of the completion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Backend {
    /// OpenAI-compatible chat completions (Groq, OpenAI, the mock server).
    #[default]
    Openai,
    /// Ollama's /api/generate.
    Ollama,
}

/// Everything the pipeline needs, built once at startup.
#[derive(Clone)]
pub struct PipelineConfig {
    pub api_key: Option<String>,
    pub model_name: String,
    pub default_temperature: f32,
    pub base_url: String,
    pub backend: Backend,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub prompt_style: PromptStyle,
}

impl std::fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model_name", &self.model_name)
            .field("default_temperature", &self.default_temperature)
            .field("base_url", &self.base_url)
            .field("backend", &self.backend)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("prompt_style", &self.prompt_style)
            .finish()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: DEFAULT_MODEL.to_string(),
            default_temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.to_string(),
            backend: Backend::Openai,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            prompt_style: PromptStyle::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::TemperatureOutOfRange(self.default_temperature));
        }
        // Hosted OpenAI-style endpoints reject anonymous calls; local ones don't care.
        if self.backend == Backend::Openai
            && self.api_key.is_none()
            && self.base_url == DEFAULT_BASE_URL
        {
            return Err(ConfigError::MissingApiKey(self.base_url.clone()));
        }
        Ok(())
    }
}

/// Completion-service options shared by the server and the CLI.
#[derive(Debug, Clone, Args)]
pub struct LlmArgs {
    /// API key for the completion service
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name override
    #[arg(long, env = "GROQ_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Completion endpoint URL
    #[arg(long, env = "LLM_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Wire dialect of the completion endpoint
    #[arg(long, env = "LLM_BACKEND", value_enum, default_value_t = Backend::Openai)]
    pub backend: Backend,

    /// Sampling temperature
    #[arg(long, env = "LLM_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Response token budget
    #[arg(long, env = "LLM_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub llm_timeout: u64,

    /// Instruction template
    #[arg(long, env = "PROMPT_STYLE", value_enum, default_value_t = PromptStyle::Detailed)]
    pub prompt_style: PromptStyle,
}

impl LlmArgs {
    pub fn into_config(self) -> Result<PipelineConfig, ConfigError> {
        let config = PipelineConfig {
            api_key: self.api_key.filter(|k| !k.trim().is_empty()),
            model_name: self.model,
            default_temperature: self.temperature,
            base_url: self.base_url,
            backend: self.backend,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.llm_timeout),
            prompt_style: self.prompt_style,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hosted_endpoint_needs_a_key() {
        let config = PipelineConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingApiKey(_))));

        let local = PipelineConfig {
            base_url: "http://127.0.0.1:8081/v1/chat/completions".into(),
            ..PipelineConfig::default()
        };
        assert!(local.validate().is_ok());
    }

    #[test]
    fn temperature_must_be_in_range() {
        let config = PipelineConfig {
            api_key: Some("k".into()),
            default_temperature: 3.5,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TemperatureOutOfRange(t)) if t == 3.5
        ));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = PipelineConfig {
            api_key: Some("gsk_secret".into()),
            ..PipelineConfig::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("gsk_secret"));
        assert!(printed.contains("[REDACTED]"));
    }
}
