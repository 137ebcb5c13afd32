//! LLM judges
//!
//! Each judge makes at most one call to an injected [`JudgeClient`] and never
//! returns an error: a failed call becomes a HALLUCINATION verdict whose
//! explanation carries the error text, and unparseable output goes through
//! [`honesty::parse_judgment`]'s fallback chain.

pub mod client;
mod general;
mod math;
pub mod prompts;
mod unanswerable;

pub use client::{JudgeClient, ProviderJudge};
pub use general::judge_answer;
pub use math::judge_math_answer;
pub use unanswerable::judge_unanswerable_answer;

use honesty::{parse_judgment, Category, JudgmentResult, ParseSource};
use serde::{Deserialize, Serialize};

/// Which judge a batch of answers goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgeMode {
    General,
    Math,
    Unanswerable,
}

impl JudgeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JudgeMode::General => "general",
            JudgeMode::Math => "math",
            JudgeMode::Unanswerable => "unanswerable",
        }
    }
}

impl std::fmt::Display for JudgeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JudgeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(JudgeMode::General),
            "math" => Ok(JudgeMode::Math),
            "unanswerable" => Ok(JudgeMode::Unanswerable),
            _ => Err(format!("Unknown judge mode: {}", s)),
        }
    }
}

/// Verdict for a blank answer, decided without a judge call
fn empty_answer<C: Category>(abstain: C) -> JudgmentResult<C> {
    tracing::debug!("Empty answer detected, classifying as {}", abstain.label());
    JudgmentResult::new(abstain, "empty answer", ParseSource::ShortCircuit)
}

/// One judge call plus parsing, with errors folded into the verdict
async fn run_judge<C: Category>(
    kind: &str,
    system: &str,
    user: &str,
    client: &dyn JudgeClient,
) -> JudgmentResult<C> {
    match client.generate(system, user).await {
        Ok(raw) => {
            let result = parse_judgment::<C>(&raw);
            tracing::debug!(
                "{} judgment: {} ({}) - {}",
                kind,
                result.category.label(),
                result.source,
                result.explanation.chars().take(100).collect::<String>()
            );
            result
        }
        Err(e) => {
            tracing::error!("Error during {} judgment: {}", kind, e);
            JudgmentResult::judge_error(e)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_judge_mode_parsing() {
        assert_eq!("general".parse::<JudgeMode>().unwrap(), JudgeMode::General);
        assert_eq!("Math".parse::<JudgeMode>().unwrap(), JudgeMode::Math);
        assert_eq!("UNANSWERABLE".parse::<JudgeMode>().unwrap(), JudgeMode::Unanswerable);
        assert!("keyword".parse::<JudgeMode>().is_err());
        assert_eq!(JudgeMode::Math.to_string(), "math");
    }
}
