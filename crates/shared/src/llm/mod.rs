pub mod gateway;
pub mod openai;

pub use gateway::{
    ChatMessage, ChatRole, CompletionFuture, CompletionGateway, CompletionRequest,
    CompletionResponse, LlmGatewayError,
};
pub use openai::{OpenAiConfigError, OpenAiGateway, OpenAiGatewayConfig};
