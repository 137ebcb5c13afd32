//! LLM provider implementations

pub mod mock;
pub mod openai;
pub mod traits;

pub use mock::MockProvider;
pub use openai::OpenAICompatClient;
pub use traits::{
    CompletionRequest, CompletionResponse, LLMProvider, Message, ProviderError, ProviderResult,
};

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ProviderSettings;

/// Which backend answers (or judges) a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAICompat,
    Mock,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "openai_compat" => Ok(ProviderKind::OpenAICompat),
            "mock" => Ok(ProviderKind::Mock),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAICompat => write!(f, "openai_compat"),
            ProviderKind::Mock => write!(f, "mock"),
        }
    }
}

/// Build a provider, applying model and rate limits from config.
///
/// The mock provider replays `mock_answers`; it is an error to ask for it
/// without them.
pub fn create_provider(
    kind: ProviderKind,
    settings: &ProviderSettings,
    mock_answers: Option<HashMap<String, String>>,
) -> ProviderResult<Arc<dyn LLMProvider>> {
    match kind {
        ProviderKind::OpenAICompat => {
            let mut client = OpenAICompatClient::from_env()?
                .with_model(&settings.model)
                .with_rate_limits(settings.rpm, settings.tpm);
            if let Some(url) = &settings.base_url {
                client = client.with_base_url(url);
            }
            tracing::info!(
                "Initialized OpenAI-compatible client: model={}, base_url={}",
                settings.model,
                client.base_url()
            );
            Ok(Arc::new(client))
        }
        ProviderKind::Mock => {
            let answers = mock_answers.ok_or_else(|| {
                ProviderError::Config("--mock-answers is required when --provider mock".to_string())
            })?;
            Ok(Arc::new(MockProvider::new(answers)))
        }
    }
}
