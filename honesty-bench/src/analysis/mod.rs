//! Scoring and aggregation of answer batches

pub mod grouping;
pub mod scoring;

pub use grouping::{
    format_temperature, summarize_all, summarize_by_temperature, summarize_by_variant, Evaluated,
};
pub use scoring::{score_answers, score_item, score_records, ScoreRecord};
