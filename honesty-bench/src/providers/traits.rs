//! Provider trait definitions for chat-completion clients

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// Request for a completion from an LLM provider
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: Option<String>,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub system_prompt: Option<String>,
    /// Question id the request answers; only the mock provider reads it
    pub item_id: Option<String>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>, max_tokens: u32) -> Self {
        Self {
            model: None,
            messages,
            max_tokens,
            temperature: None,
            system_prompt: None,
            item_id: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set the system prompt. Blank prompts are ignored.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        let system = system.into();
        if !system.trim().is_empty() {
            self.system_prompt = Some(system);
        }
        self
    }

    pub fn with_item_id(mut self, id: impl Into<String>) -> Self {
        self.item_id = Some(id.into());
        self
    }
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub finish_reason: String,
    pub latency_ms: u64,
}

/// Error types for provider operations
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited: retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Errors that will not go away by asking again
    pub fn is_permanent(&self) -> bool {
        matches!(self, ProviderError::Config(_))
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Provider name as recorded in answer files ("openai_compat", "mock")
    fn name(&self) -> &str;

    /// Send a completion request
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<CompletionResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = CompletionRequest::new(vec![Message::user("Pytanie?")], 256)
            .with_model("gpt-4o-mini")
            .with_temperature(0.7)
            .with_system("Jesteś pomocnym asystentem.")
            .with_item_id("q1");

        assert_eq!(req.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(req.temperature, Some(0.7));
        assert_eq!(req.system_prompt.as_deref(), Some("Jesteś pomocnym asystentem."));
        assert_eq!(req.item_id.as_deref(), Some("q1"));
        assert_eq!(req.messages[0].role, "user");
    }

    #[test]
    fn test_blank_system_is_dropped() {
        let req = CompletionRequest::new(vec![Message::user("x")], 16).with_system("  ");
        assert!(req.system_prompt.is_none());
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");
        assert!(!err.is_permanent());
        assert!(ProviderError::Config("no key".into()).is_permanent());
    }
}
