use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{Backend, PipelineConfig};
use crate::error::{ConfigError, IdeaError};

/// One call's worth of input for the completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub instruction: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the service for JSON-formatted output.
    pub json_output: bool,
}

/// Hosted text completion, reached over the network.
///
/// Implementations make exactly one attempt and return the reply text, or
/// [`IdeaError::TransportFailure`] when there is no usable reply.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, IdeaError>;
}

#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    backend: Backend,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("backend", &self.backend)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl LlmClient {
    pub fn new(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            model: config.model_name.clone(),
            api_key: config.api_key.clone(),
            backend: config.backend,
        })
    }

    async fn call_chat_completions(&self, request: &CompletionRequest) -> Result<String, IdeaError> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: [ChatMessage<'a>; 2],
            temperature: f32,
            max_tokens: u32,
            #[serde(skip_serializing_if = "Option::is_none")]
            response_format: Option<ResponseFormat>,
        }

        #[derive(Serialize)]
        struct ChatMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct ResponseFormat {
            #[serde(rename = "type")]
            kind: &'static str,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            #[serde(default)]
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }

        #[derive(Deserialize)]
        struct ChoiceMessage {
            #[serde(default)]
            content: Option<String>,
        }

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.instruction,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_output.then_some(ResponseFormat { kind: "json_object" }),
        };

        let mut builder = self.http.post(&self.base_url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder.send().await.map_err(|e| {
            IdeaError::TransportFailure(format!("HTTP error: {e}. URL: {}", self.base_url))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(IdeaError::TransportFailure(format!("HTTP error {status}: {error_text}")));
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| IdeaError::TransportFailure(format!("unreadable completion body: {e}")))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        non_empty(content)
    }

    async fn call_ollama(&self, request: &CompletionRequest) -> Result<String, IdeaError> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            system: &'a str,
            prompt: &'a str,
            stream: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            format: Option<&'static str>,
            options: OllamaOptions,
        }

        #[derive(Serialize)]
        struct OllamaOptions {
            temperature: f32,
            num_predict: u32,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            #[serde(default)]
            response: String,
        }

        let resp = self
            .http
            .post(&self.base_url)
            .json(&OllamaRequest {
                model: &self.model,
                system: &request.system,
                prompt: &request.instruction,
                stream: false,
                format: request.json_output.then_some("json"),
                options: OllamaOptions {
                    temperature: request.temperature,
                    num_predict: request.max_tokens,
                },
            })
            .send()
            .await
            .map_err(|e| {
                IdeaError::TransportFailure(format!("Ollama HTTP error: {e}. URL: {}", self.base_url))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(IdeaError::TransportFailure(format!(
                "Ollama HTTP error {status}: {error_text}"
            )));
        }

        let body: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| IdeaError::TransportFailure(format!("unreadable Ollama body: {e}")))?;
        non_empty(body.response)
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, IdeaError> {
        debug!(
            backend = ?self.backend,
            model = %self.model,
            instruction_len = request.instruction.len(),
            "calling completion service"
        );
        match self.backend {
            Backend::Openai => self.call_chat_completions(request).await,
            Backend::Ollama => self.call_ollama(request).await,
        }
    }
}

fn non_empty(content: String) -> Result<String, IdeaError> {
    if content.trim().is_empty() {
        return Err(IdeaError::TransportFailure("Empty response from model".to_string()));
    }
    Ok(content)
}
