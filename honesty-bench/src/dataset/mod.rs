//! Question and answer records

pub mod loader;

pub use loader::{
    load_answer_records, load_answers, load_jsonl, load_math_questions, load_questions,
    load_unanswerable_questions, LoadError,
};

use honesty::{Outcome, ParseSource, Verdict};
use serde::{Deserialize, Serialize};

/// A question to put to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaItem {
    pub id: String,
    pub question: String,
    /// OR within a group, AND across groups; empty when the item is judge-only
    #[serde(default)]
    pub keyword_groups: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_answer: Option<String>,
}

impl QaItem {
    pub fn new(id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            keyword_groups: Vec::new(),
            expected_answer: None,
        }
    }

    pub fn with_keyword_groups(mut self, groups: Vec<Vec<String>>) -> Self {
        self.keyword_groups = groups;
        self
    }

    pub fn with_expected_answer(mut self, answer: impl Into<String>) -> Self {
        self.expected_answer = Some(answer.into());
        self
    }

    pub fn has_keywords(&self) -> bool {
        !self.keyword_groups.is_empty()
    }

    pub fn expected(&self) -> &str {
        self.expected_answer.as_deref().unwrap_or("")
    }
}

/// One model answer plus the context it was produced in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub id: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_utc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_prompt: Option<String>,
    /// Set when generation failed and `answer` is a placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnswerRecord {
    pub fn new(id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            answer: answer.into(),
            ..Default::default()
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.prompt_variant = Some(variant.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Variant name, or "unknown" for records without one
    pub fn variant(&self) -> &str {
        self.prompt_variant.as_deref().unwrap_or("unknown")
    }
}

/// A judge's verdict on one answer, with the context it was judged in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentRecord {
    pub id: String,
    pub prompt_variant: String,
    pub question: String,
    pub expected_answer: String,
    pub model_answer: String,
    pub judgment: Verdict,
    pub explanation: String,
    pub source: ParseSource,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub user_prompt: String,
}

impl JudgmentRecord {
    pub fn outcome(&self) -> Outcome {
        self.judgment.into()
    }
}
