#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use shared::llm::{
    CompletionFuture, CompletionGateway, CompletionRequest, CompletionResponse, LlmGatewayError,
};

const SCRIPTED_MODEL: &str = "scripted-test-model";

/// Completion gateway that replays a scripted queue of outcomes, one per
/// request, and records every request it sees.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    replies: Arc<Mutex<VecDeque<Result<CompletionResponse, LlmGatewayError>>>>,
    seen_requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, text: &str) {
        self.replies
            .lock()
            .expect("scripted replies lock should not be poisoned")
            .push_back(Ok(CompletionResponse {
                model: SCRIPTED_MODEL.to_string(),
                text: text.to_string(),
            }));
    }

    pub fn push_failure(&self, detail: &str) {
        self.replies
            .lock()
            .expect("scripted replies lock should not be poisoned")
            .push_back(Err(LlmGatewayError::ProviderFailure(detail.to_string())));
    }

    pub fn seen_requests(&self) -> Vec<CompletionRequest> {
        self.seen_requests
            .lock()
            .expect("seen requests lock should not be poisoned")
            .clone()
    }
}

impl CompletionGateway for ScriptedGateway {
    fn complete<'a>(&'a self, request: CompletionRequest) -> CompletionFuture<'a> {
        self.seen_requests
            .lock()
            .expect("seen requests lock should not be poisoned")
            .push(request);

        let outcome = self
            .replies
            .lock()
            .expect("scripted replies lock should not be poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmGatewayError::ProviderFailure(
                    "no scripted reply queued".to_string(),
                ))
            });

        Box::pin(async move { outcome })
    }
}
