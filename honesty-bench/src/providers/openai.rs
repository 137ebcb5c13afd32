//! Client for OpenAI-compatible Chat Completions APIs

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::traits::{
    CompletionRequest, CompletionResponse, LLMProvider, Message, ProviderError, ProviderResult,
};
use crate::runner::rate_limiter::RateLimiter;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub const API_KEY_ENV: &str = "LLM_API_KEY";
pub const BASE_URL_ENV: &str = "LLM_BASE_URL";

/// Chat Completions client for any OpenAI-compatible endpoint
pub struct OpenAICompatClient {
    api_key: String,
    base_url: String,
    http_client: Client,
    rate_limiter: RateLimiter,
    default_model: String,
}

impl OpenAICompatClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client: Client::new(),
            rate_limiter: RateLimiter::new(500, 200_000),
            default_model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create from `LLM_API_KEY` (required) and `LLM_BASE_URL` (optional)
    pub fn from_env() -> ProviderResult<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::Config(format!("Missing env var {}", API_KEY_ENV)))?;

        let mut client = Self::new(api_key);
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                client = client.with_base_url(url.trim());
            }
        }
        tracing::debug!("API base URL: {}", client.base_url);
        Ok(client)
    }

    /// Set custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set custom rate limits
    pub fn with_rate_limits(mut self, rpm: u32, tpm: u32) -> Self {
        self.rate_limiter = RateLimiter::new(rpm, tpm);
        self
    }

    /// Set default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Model used when the request does not name one
    pub fn default_model(&self) -> &str {
        &self.default_model
    }
}

/// gpt-5, o1 and o3 families: no system role, no temperature,
/// `max_completion_tokens` instead of `max_tokens`
pub fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5") || model.starts_with("o1") || model.starts_with("o3")
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

fn build_chat_request(model: String, request: &CompletionRequest) -> ChatRequest {
    if is_reasoning_model(&model) {
        // System prompt is folded into the first user message
        let mut messages = request.messages.clone();
        if let Some(system) = &request.system_prompt {
            match messages.iter_mut().find(|m| m.role == "user") {
                Some(first) => first.content = format!("{}\n\n{}", system, first.content),
                None => messages.insert(0, Message::user(system.clone())),
            }
        }
        ChatRequest {
            model,
            messages,
            max_tokens: None,
            max_completion_tokens: Some(request.max_tokens),
            temperature: None,
        }
    } else {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system_prompt {
            messages.push(Message::system(system.clone()));
        }
        messages.extend(request.messages.iter().cloned());
        ChatRequest {
            model,
            messages,
            max_tokens: Some(request.max_tokens),
            max_completion_tokens: None,
            temperature: request.temperature,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[async_trait]
impl LLMProvider for OpenAICompatClient {
    fn name(&self) -> &str {
        "openai_compat"
    }

    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<CompletionResponse> {
        let _guard = self.rate_limiter.acquire().await;
        self.rate_limiter.wait_for_token_capacity(request.max_tokens).await;

        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());
        let body = build_chat_request(model, request);
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!("Calling API: {} (model={})", url, body.model);
        let start = Instant::now();

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let status = response.status();
        tracing::debug!("API call completed in {}ms (HTTP {})", latency_ms, status.as_u16());

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok());
            let retry_after = retry_after_ms(retry_after);

            // Quota exhaustion also comes back as 429 but never clears on retry
            let body = response.text().await.unwrap_or_default();
            if let Ok(error) = serde_json::from_str::<ApiError>(&body) {
                let error_type = error.error.error_type.as_deref().unwrap_or("");
                if error_type == "insufficient_quota" {
                    return Err(ProviderError::Config(format!(
                        "Quota exceeded: {}",
                        error.error.message
                    )));
                }
            }

            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("API error: HTTP {} - {}", status.as_u16(), truncate(&body, 500));
            let message = match serde_json::from_str::<ApiError>(&body) {
                Ok(error) => error.error.message,
                Err(_) => format!("HTTP {} from {}: {}", status.as_u16(), url, truncate(&body, 1000)),
            };

            if status == 401 || status == 403 {
                return Err(ProviderError::Config(format!(
                    "Auth error ({}): {}",
                    status.as_u16(),
                    message
                )));
            }

            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: ChatResponse = response.json().await?;

        let (input_tokens, output_tokens) = api_response
            .usage
            .as_ref()
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));
        self.rate_limiter.record_tokens(input_tokens + output_tokens).await;

        let choice = api_response
            .choices
            .first()
            .ok_or_else(|| ProviderError::Parse("Unexpected response schema: no choices".to_string()))?;
        let content = choice
            .message
            .content
            .as_deref()
            .ok_or_else(|| ProviderError::Parse("Unexpected response schema: no message content".to_string()))?
            .trim()
            .to_string();

        tracing::debug!("Generated answer ({} chars)", content.chars().count());

        Ok(CompletionResponse {
            content,
            model: api_response.model,
            input_tokens,
            output_tokens,
            finish_reason: choice.finish_reason.clone().unwrap_or_else(|| "unknown".to_string()),
            latency_ms,
        })
    }
}

/// `retry-after` header seconds as milliseconds, 60s when absent or unparsable
fn retry_after_ms(header: Option<&str>) -> u64 {
    header
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(60)
        .saturating_mul(1000)
}
