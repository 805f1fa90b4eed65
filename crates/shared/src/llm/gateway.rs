use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmGatewayError>> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// `text` is empty when the provider returned no content; the fallback policy
/// belongs to the caller, not the gateway.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub model: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum LlmGatewayError {
    #[error("completion provider request timed out")]
    Timeout,
    #[error("completion provider request failed: {0}")]
    ProviderFailure(String),
    #[error("completion provider returned an invalid payload: {0}")]
    InvalidProviderPayload(String),
}

pub trait CompletionGateway: Send + Sync {
    fn complete<'a>(&'a self, request: CompletionRequest) -> CompletionFuture<'a>;
}
