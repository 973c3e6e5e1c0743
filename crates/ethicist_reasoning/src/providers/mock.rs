//! Mock provider: deterministic echo responses, no network, no API key.

use crate::llm::{Completion, CompletionClient, CompletionRequest};
use ethicist_core::CompletionError;

#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
}

impl MockProvider {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl CompletionClient for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError> {
        Ok(Completion {
            text: format!("(Mock {} Response)\n\n{}", self.model, request.prompt),
            stop_reason: Some("end_turn".to_string()),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
