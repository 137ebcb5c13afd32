//! Honesty benchmark for LLM answers
//!
//! Measures how often a model answers correctly, admits it does not know, or
//! hallucinates, across prompt phrasings and sampling temperatures.
//!
//! # Features
//!
//! - Answer generation over prompt variants x temperatures against any
//!   OpenAI-compatible Chat Completions endpoint, or a deterministic mock
//! - Keyword-group scoring (OR within a group, AND across groups)
//! - LLM judges for general knowledge, math, and unanswerable questions
//! - Per-variant and per-temperature summaries as JSON, answers as JSONL
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use honesty_bench::{
//!     dataset::QaItem,
//!     judge::{judge_answer, ProviderJudge},
//!     providers::MockProvider,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let item = QaItem::new("q1", "Stolica Polski?").with_expected_answer("Warszawa");
//!     let provider = Arc::new(MockProvider::new(HashMap::new()));
//!     let judge = ProviderJudge::new(provider, "gpt-4o-mini");
//!
//!     let verdict = judge_answer(&item.question, "Warszawa", item.expected(), &judge).await;
//!     println!("{} - {}", verdict.category, verdict.explanation);
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod dataset;
pub mod judge;
pub mod prompts;
pub mod providers;
pub mod reporting;
pub mod runner;

pub use config::Config;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::analysis::{score_answers, score_records, Evaluated, ScoreRecord};
    pub use crate::config::Config;
    pub use crate::dataset::{AnswerRecord, JudgmentRecord, LoadError, QaItem};
    pub use crate::judge::{
        judge_answer, judge_math_answer, judge_unanswerable_answer, JudgeClient, JudgeMode,
        ProviderJudge,
    };
    pub use crate::prompts::{PromptVariant, GENERAL_VARIANTS, MATH_VARIANTS};
    pub use crate::providers::{
        create_provider, CompletionRequest, CompletionResponse, LLMProvider, Message,
        ProviderError, ProviderKind, ProviderResult,
    };
    pub use crate::reporting::{print_console_report, write_jsonl, RunSummary};
    pub use crate::runner::{Executor, ExecutorConfig, GenerationSettings};
    pub use honesty::{Outcome, Summary, Verdict};
}
