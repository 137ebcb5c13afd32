//! Deterministic provider that replays stored answers by question id

use async_trait::async_trait;
use std::collections::HashMap;

use super::traits::{CompletionRequest, CompletionResponse, LLMProvider, ProviderResult};

/// Answers keyed by question id; unknown ids get an empty answer
pub struct MockProvider {
    answers_by_id: HashMap<String, String>,
}

impl MockProvider {
    pub fn new(answers_by_id: HashMap<String, String>) -> Self {
        tracing::info!("Initialized mock provider with {} pre-loaded answers", answers_by_id.len());
        Self { answers_by_id }
    }

    pub fn len(&self) -> usize {
        self.answers_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers_by_id.is_empty()
    }
}

#[async_trait]
impl LLMProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<CompletionResponse> {
        let content = match &request.item_id {
            Some(id) => self.answers_by_id.get(id).cloned().unwrap_or_default(),
            None => {
                tracing::warn!("Mock provider called without an item id");
                String::new()
            }
        };

        Ok(CompletionResponse {
            content,
            model: request.model.clone().unwrap_or_else(|| "mock".to_string()),
            input_tokens: 0,
            output_tokens: 0,
            finish_reason: "stop".to_string(),
            latency_ms: 0,
        })
    }
}
