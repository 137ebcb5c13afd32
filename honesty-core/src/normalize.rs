//! Text normalization for keyword matching

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
/// `3,14` -> `3.14`
static DECIMAL_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d),(\d)").unwrap());

/// Options controlling [`normalize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Strip diacritics after canonical decomposition (`ą` -> `a`)
    pub fold_diacritics: bool,
    /// Rewrite digit-comma-digit to digit-dot-digit before punctuation is removed
    pub unify_decimal_comma: bool,
}

impl NormalizeOptions {
    pub fn plain() -> Self {
        Self {
            fold_diacritics: false,
            unify_decimal_comma: true,
        }
    }

    pub fn folded() -> Self {
        Self {
            fold_diacritics: true,
            unify_decimal_comma: true,
        }
    }

    pub fn with_fold_diacritics(mut self, fold: bool) -> Self {
        self.fold_diacritics = fold;
        self
    }

    pub fn with_decimal_comma(mut self, unify: bool) -> Self {
        self.unify_decimal_comma = unify;
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::plain()
    }
}

/// Remove diacritics by canonical decomposition followed by dropping
/// nonspacing marks.
///
/// Letters without a decomposition (`ł`, `ø`) are left untouched, as are
/// spacing and enclosing marks.
pub fn fold_diacritics(text: &str) -> String {
    text.nfd()
        .filter(|c| c.general_category() != GeneralCategory::NonspacingMark)
        .collect()
}

/// Normalize text for matching.
///
/// Order matters: trim and lowercase, optionally fold diacritics, optionally
/// unify decimal commas, then replace punctuation with spaces and collapse
/// whitespace. The decimal-comma rewrite has to run before punctuation is
/// stripped or the comma is already gone.
///
/// The result is idempotent: `normalize(&normalize(x, o), o) == normalize(x, o)`.
pub fn normalize(text: &str, options: NormalizeOptions) -> String {
    let mut t = text.trim().to_lowercase();

    if options.fold_diacritics {
        t = fold_diacritics(&t);
    }

    if options.unify_decimal_comma {
        t = DECIMAL_COMMA.replace_all(&t, "$1.$2").into_owned();
    }

    let t = PUNCTUATION.replace_all(&t, " ");
    let t = WHITESPACE.replace_all(&t, " ");
    t.trim().to_string()
}

/// Normalize possibly-missing text; `None` is treated as the empty string.
pub fn normalize_text(text: Option<&str>, fold: bool) -> String {
    match text {
        Some(t) => normalize(t, NormalizeOptions::plain().with_fold_diacritics(fold)),
        None => String::new(),
    }
}
