//! Keyword-group scoring
//!
//! An answer is correct when every group has at least one matching variant:
//! variants inside a group are alternatives (OR), groups are all required (AND).
//! Matching is whole-token on normalized text, so `314` never satisfies `3.14`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::normalize::{normalize, NormalizeOptions};

/// Numeric keyword after normalization (decimal comma already unified)
static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?$").unwrap());

/// Which variant, if any, satisfied a keyword group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMatch {
    pub group: Vec<String>,
    pub matched_variant: Option<String>,
}

/// Result of scoring one answer against its keyword groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub correct: bool,
    pub matched_groups: Vec<GroupMatch>,
    pub missing_groups: Vec<Vec<String>>,
}

impl ScoreResult {
    /// Variants that satisfied their group, in group order
    pub fn matched_variants(&self) -> Vec<&str> {
        self.matched_groups
            .iter()
            .filter_map(|g| g.matched_variant.as_deref())
            .collect()
    }
}

fn is_numeric_keyword(kw_norm: &str) -> bool {
    NUMERIC.is_match(kw_norm)
}

/// Build a whole-token pattern for a normalized keyword.
///
/// Multi-word keywords must appear contiguously and in order, separated by
/// any run of whitespace.
fn token_pattern(kw_norm: &str) -> Option<Regex> {
    let pattern = if is_numeric_keyword(kw_norm) {
        format!(r"\b{}\b", regex::escape(kw_norm))
    } else if kw_norm.contains(' ') {
        let parts: Vec<String> = kw_norm.split_whitespace().map(regex::escape).collect();
        format!(r"(?i)\b{}\b", parts.join(r"\s+"))
    } else {
        format!(r"(?i)\b{}\b", regex::escape(kw_norm))
    };

    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("Could not compile keyword pattern {:?}: {}", pattern, e);
            None
        }
    }
}

/// Check if a keyword variant is present in already-normalized text.
///
/// The keyword is normalized here (without diacritic folding); a keyword that
/// normalizes to nothing never matches.
pub fn keyword_present(keyword: &str, text_norm: &str) -> bool {
    let kw_norm = normalize(keyword, NormalizeOptions::plain());
    if kw_norm.is_empty() {
        return false;
    }

    token_pattern(&kw_norm)
        .map(|re| re.is_match(text_norm))
        .unwrap_or(false)
}

/// Score an answer against keyword groups.
///
/// With `fold_diacritics`, a variant that fails the plain comparison is retried
/// with both sides folded (`Waszyngton` vs `Wászyngton`). Groups are expected to
/// be validated by the loader: non-empty and without blank variants.
pub fn score_answer(answer: &str, keyword_groups: &[Vec<String>], fold_diacritics: bool) -> ScoreResult {
    tracing::debug!(
        "Scoring answer ({} chars) against {} keyword groups",
        answer.chars().count(),
        keyword_groups.len()
    );

    let ans_norm = normalize(answer, NormalizeOptions::plain());
    let ans_fold = if fold_diacritics {
        normalize(answer, NormalizeOptions::folded())
    } else {
        String::new()
    };

    let mut matched_groups = Vec::with_capacity(keyword_groups.len());
    let mut missing_groups = Vec::new();

    for group in keyword_groups {
        let mut matched_variant = None;

        for variant in group {
            let var_norm = normalize(variant, NormalizeOptions::plain());
            let mut ok = keyword_present(&var_norm, &ans_norm);
            if !ok && fold_diacritics {
                let var_fold = normalize(variant, NormalizeOptions::folded());
                ok = keyword_present(&var_fold, &ans_fold);
            }
            if ok {
                tracing::debug!("Matched keyword variant {:?} from group {:?}", variant, group);
                matched_variant = Some(variant.clone());
                break;
            }
        }

        if matched_variant.is_none() {
            tracing::debug!("No match found for group {:?}", group);
            missing_groups.push(group.clone());
        }

        matched_groups.push(GroupMatch {
            group: group.clone(),
            matched_variant,
        });
    }

    let correct = missing_groups.is_empty();
    tracing::debug!("Score result: correct={}, missing={}", correct, missing_groups.len());

    ScoreResult {
        correct,
        matched_groups,
        missing_groups,
    }
}
