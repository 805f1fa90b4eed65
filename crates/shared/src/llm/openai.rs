use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::config::optional_trimmed_env;

use super::gateway::{
    CompletionFuture, CompletionGateway, CompletionRequest, CompletionResponse, LlmGatewayError,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4.1-nano";

#[derive(Debug, Clone)]
pub struct OpenAiGatewayConfig {
    pub chat_completions_url: String,
    pub api_key: String,
    pub model: String,
}

impl OpenAiGatewayConfig {
    pub fn from_env() -> Result<Self, OpenAiConfigError> {
        let api_key = optional_trimmed_env("LLM_API_KEY")
            .ok_or_else(|| OpenAiConfigError::MissingVar("LLM_API_KEY".to_string()))?;
        let base_url =
            optional_trimmed_env("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(OpenAiConfigError::InvalidConfiguration(
                "LLM_BASE_URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            chat_completions_url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model: optional_trimmed_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

#[derive(Debug, Error)]
pub enum OpenAiConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to build completion http client: {0}")]
    HttpClient(String),
}

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// Each request is sent exactly once: no retry, no fallback model, and no
/// client-side timeout. A hung provider call blocks the calling operation.
#[derive(Clone)]
pub struct OpenAiGateway {
    client: reqwest::Client,
    config: OpenAiGatewayConfig,
}

impl OpenAiGateway {
    pub fn new(config: OpenAiGatewayConfig) -> Result<Self, OpenAiConfigError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| OpenAiConfigError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    async fn send_once(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmGatewayError> {
        let request_body = json!({
            "model": self.config.model,
            "messages": request.messages,
            "temperature": request.temperature,
        });

        debug!(
            model = %self.config.model,
            message_count = request.messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(&self.config.chat_completions_url)
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    LlmGatewayError::Timeout
                } else {
                    LlmGatewayError::ProviderFailure("request_unavailable".to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|_| {
            LlmGatewayError::InvalidProviderPayload("response_body_read_failed".to_string())
        })?;

        if !status.is_success() {
            return Err(LlmGatewayError::ProviderFailure(format!(
                "status_{}",
                status.as_u16()
            )));
        }

        let parsed: ChatCompletionBody = serde_json::from_str(&body).map_err(|_| {
            LlmGatewayError::InvalidProviderPayload("response_body_not_json".to_string())
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(CompletionResponse {
            model: parsed.model.unwrap_or_else(|| self.config.model.clone()),
            text,
        })
    }
}

impl CompletionGateway for OpenAiGateway {
    fn complete<'a>(&'a self, request: CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(async move { self.send_once(&request).await })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionBody {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    #[serde(default)]
    content: Option<String>,
}
