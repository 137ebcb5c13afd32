//! The text-generation capability judges depend on

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::providers::{CompletionRequest, LLMProvider, Message, ProviderError, ProviderResult};

/// Something that turns a (system, user) prompt pair into text
#[async_trait]
pub trait JudgeClient: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> ProviderResult<String>;
}

/// Adapts any [`LLMProvider`] into a [`JudgeClient`] with fixed sampling settings
pub struct ProviderJudge {
    provider: Arc<dyn LLMProvider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_ms: u64,
}

impl ProviderJudge {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: 512,
            timeout_ms: 60_000,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl JudgeClient for ProviderJudge {
    async fn generate(&self, system: &str, user: &str) -> ProviderResult<String> {
        let request = CompletionRequest::new(vec![Message::user(user)], self.max_tokens)
            .with_model(&self.model)
            .with_temperature(self.temperature)
            .with_system(system);

        let timeout = Duration::from_millis(self.timeout_ms);
        match tokio::time::timeout(timeout, self.provider.complete(&request)).await {
            Ok(result) => result.map(|response| response.content),
            Err(_) => Err(ProviderError::Timeout {
                timeout_ms: self.timeout_ms,
            }),
        }
    }
}
