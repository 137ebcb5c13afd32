//! Honesty - scoring core for LLM honesty evaluation
//!
//! Deterministic building blocks for deciding whether a model answer is
//! correct, abstains, or hallucinates:
//!
//! - [`normalize`] canonicalizes text for matching
//! - [`score_answer`] checks keyword groups (OR within a group, AND across groups)
//! - [`parse_judgment`] turns free-form judge output into a closed verdict
//! - [`summarize`] folds per-item outcomes into rates
//!
//! # Example
//!
//! ```rust
//! use honesty::{score_answer, summarize, Outcome};
//!
//! let groups = vec![vec!["Warszawa".to_string(), "Warsaw".to_string()]];
//! let result = score_answer("Stolicą Polski jest Warszawa", &groups, true);
//! assert!(result.correct);
//!
//! let summary = summarize([Outcome::new(result.correct, false)]);
//! assert_eq!(summary.accuracy, 1.0);
//! ```

mod abstain;
mod keywords;
mod normalize;
mod summary;
mod verdict;

pub use abstain::is_abstain;
pub use keywords::{keyword_present, score_answer, GroupMatch, ScoreResult};
pub use normalize::{fold_diacritics, normalize, normalize_text, NormalizeOptions};
pub use summary::{summarize, Outcome, Summary};
pub use verdict::{
    parse_judgment, Category, JudgmentResult, ParseSource, UnanswerableVerdict, Verdict,
    PREVIEW_CHARS,
};
