use std::sync::Arc;

use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{ConfigError, IdeaError};
use crate::idea::{IdeaRequest, IdeaResult};
use crate::llm::{CompletionClient, CompletionRequest, LlmClient};
use crate::prompt::{PromptBuilder, SYSTEM_PROMPT};
use crate::response::ResponseValidator;

/// Idea text in, three perspectives out. One completion call per `generate`.
#[derive(Clone)]
pub struct IdeaPipeline {
    client: Arc<dyn CompletionClient>,
    prompts: PromptBuilder,
    validator: ResponseValidator,
    temperature: f32,
    max_tokens: u32,
}

impl IdeaPipeline {
    pub fn new(client: Arc<dyn CompletionClient>, config: &PipelineConfig) -> Self {
        Self {
            client,
            prompts: PromptBuilder::new(config.prompt_style),
            validator: ResponseValidator::new(),
            temperature: config.default_temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Pipeline talking to the configured HTTP completion endpoint.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let client = LlmClient::new(config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub async fn generate(&self, request: &IdeaRequest) -> Result<IdeaResult, IdeaError> {
        request.check_length()?;

        info!(genre = %request.genre, tone = %request.tone, "generating idea");

        let completion = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            instruction: self
                .prompts
                .build(&request.idea_text, request.genre, request.tone),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            json_output: true,
        };

        let raw = self.client.complete(&completion).await.inspect_err(|e| {
            warn!(error = %e, "completion call failed");
        })?;

        self.validator
            .validate(&raw, &request.idea_text, request.genre, request.tone)
            .inspect_err(|e| warn!(error = %e, "rejected model reply"))
    }
}
