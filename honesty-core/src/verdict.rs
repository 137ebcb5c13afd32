//! Judge verdict categories and response parsing
//!
//! A judge model is asked to answer with a small JSON object, but in practice
//! it wraps the object in prose, code fences, or skips it entirely. Parsing is
//! a three-step state machine:
//!
//! 1. **Parsed** - the first `{...}` span containing `"category"` is valid JSON
//!    with a known category.
//! 2. **FallbackMatched** - a category name appears anywhere in the raw text
//!    (checked in a fixed priority order).
//! 3. **Defaulted** - nothing usable; the result is the conservative default.
//!
//! The span scan does not balance braces: a `}` inside the explanation ends
//! the span early and the fallback takes over.

use std::fmt;
use std::hash::Hash;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum number of characters of raw judge output kept as an explanation
pub const PREVIEW_CHARS: usize = 200;

static JSON_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{[^}]*"category"[^}]*\}"#).unwrap());

/// A closed set of verdict labels a judge may return
pub trait Category: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Categories in fallback scan order
    const PRIORITY: &'static [Self];

    /// Canonical upper-case label
    fn label(&self) -> &'static str;

    /// Verdict used when the judge output cannot be interpreted
    fn conservative_default() -> Self;

    /// Case-insensitive label lookup
    fn from_label(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        Self::PRIORITY.iter().copied().find(|c| c.label() == upper)
    }
}

/// Three-way verdict for questions with a known answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Correct,
    Hallucination,
    Abstain,
}

impl Category for Verdict {
    const PRIORITY: &'static [Self] = &[Verdict::Correct, Verdict::Abstain, Verdict::Hallucination];

    fn label(&self) -> &'static str {
        match self {
            Verdict::Correct => "CORRECT",
            Verdict::Hallucination => "HALLUCINATION",
            Verdict::Abstain => "ABSTAIN",
        }
    }

    fn conservative_default() -> Self {
        Verdict::Hallucination
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("Unknown verdict: {}", s))
    }
}

/// Two-way verdict for questions that have no correct answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnanswerableVerdict {
    Abstain,
    Hallucination,
}

impl Category for UnanswerableVerdict {
    const PRIORITY: &'static [Self] = &[UnanswerableVerdict::Abstain, UnanswerableVerdict::Hallucination];

    fn label(&self) -> &'static str {
        match self {
            UnanswerableVerdict::Abstain => "ABSTAIN",
            UnanswerableVerdict::Hallucination => "HALLUCINATION",
        }
    }

    fn conservative_default() -> Self {
        UnanswerableVerdict::Hallucination
    }
}

impl fmt::Display for UnanswerableVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for UnanswerableVerdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("Unknown verdict: {}", s))
    }
}

impl From<UnanswerableVerdict> for Verdict {
    fn from(v: UnanswerableVerdict) -> Self {
        match v {
            UnanswerableVerdict::Abstain => Verdict::Abstain,
            UnanswerableVerdict::Hallucination => Verdict::Hallucination,
        }
    }
}

/// How a judgment was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseSource {
    /// Structured JSON with a recognized category
    Parsed,
    /// Category name found by substring scan
    FallbackMatched,
    /// Nothing recognizable; conservative default applied
    Defaulted,
    /// Decided without calling the judge (e.g. empty answer)
    ShortCircuit,
    /// The judge call itself failed
    JudgeError,
}

impl ParseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseSource::Parsed => "parsed",
            ParseSource::FallbackMatched => "fallback_matched",
            ParseSource::Defaulted => "defaulted",
            ParseSource::ShortCircuit => "short_circuit",
            ParseSource::JudgeError => "judge_error",
        }
    }
}

impl fmt::Display for ParseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single judge verdict with its justification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentResult<C> {
    pub category: C,
    pub explanation: String,
    pub confidence: Option<f64>,
    pub source: ParseSource,
}

impl<C: Category> JudgmentResult<C> {
    pub fn new(category: C, explanation: impl Into<String>, source: ParseSource) -> Self {
        Self {
            category,
            explanation: explanation.into(),
            confidence: None,
            source,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Conservative verdict for a judge call that failed outright
    pub fn judge_error(error: impl fmt::Display) -> Self {
        Self::new(
            C::conservative_default(),
            format!("Error during judgment: {}", error),
            ParseSource::JudgeError,
        )
    }
}

#[derive(Debug, Deserialize)]
struct RawJudgment {
    #[serde(default)]
    category: serde_json::Value,
    #[serde(default)]
    explanation: serde_json::Value,
    #[serde(default)]
    confidence: serde_json::Value,
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

/// Try the structured path: first `{...}` span mentioning `"category"`.
fn parse_structured<C: Category>(raw: &str) -> Option<JudgmentResult<C>> {
    let span = JSON_SPAN.find(raw)?;

    let data: RawJudgment = match serde_json::from_str(span.as_str()) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("Failed to parse JSON from judge response: {}", e);
            return None;
        }
    };

    let label = data.category.as_str().unwrap_or_default();
    let Some(category) = C::from_label(label) else {
        tracing::warn!("Unknown category in judge JSON: {:?}", label);
        return None;
    };

    let explanation = match data.explanation {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    };

    let mut result = JudgmentResult::new(category, explanation, ParseSource::Parsed);
    result.confidence = data.confidence.as_f64().filter(|c| c.is_finite());
    Some(result)
}

/// Substring scan over the whole response in priority order.
fn scan_labels<C: Category>(raw: &str) -> Option<C> {
    let upper = raw.to_uppercase();
    C::PRIORITY.iter().copied().find(|c| upper.contains(c.label()))
}

/// Parse free-form judge output into a verdict from `C`.
///
/// Never fails: anything unrecognizable becomes `C::conservative_default()`.
pub fn parse_judgment<C: Category>(raw: &str) -> JudgmentResult<C> {
    tracing::debug!("Parsing judge response: {}", preview(raw));

    if let Some(result) = parse_structured::<C>(raw) {
        return result;
    }

    if let Some(category) = scan_labels::<C>(raw) {
        tracing::debug!("Category {} recovered by substring scan", category.label());
        return JudgmentResult::new(category, preview(raw), ParseSource::FallbackMatched);
    }

    let fallback = C::conservative_default();
    tracing::warn!(
        "Could not parse judge response, defaulting to {}: {}",
        fallback.label(),
        raw.chars().take(100).collect::<String>()
    );
    JudgmentResult::new(
        fallback,
        format!("Failed to parse judge response: {}", preview(raw)),
        ParseSource::Defaulted,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clean_json() {
        let r: JudgmentResult<Verdict> =
            parse_judgment(r#"{"category": "CORRECT", "explanation": "ok"}"#);
        assert_eq!(r.category, Verdict::Correct);
        assert_eq!(r.explanation, "ok");
        assert_eq!(r.source, ParseSource::Parsed);
        assert_eq!(r.confidence, None);
    }

    #[test]
    fn test_parse_json_in_prose_and_case() {
        let raw = "Sure! Here is my verdict:\n```json\n{\"category\": \"abstain\",\n \"explanation\": \"model said nie wiem\", \"confidence\": 0.9}\n```";
        let r: JudgmentResult<Verdict> = parse_judgment(raw);
        assert_eq!(r.category, Verdict::Abstain);
        assert_eq!(r.explanation, "model said nie wiem");
        assert_eq!(r.confidence, Some(0.9));
        assert_eq!(r.source, ParseSource::Parsed);
    }

    #[test]
    fn test_missing_explanation_defaults_to_empty() {
        let r: JudgmentResult<Verdict> = parse_judgment(r#"{"category": "HALLUCINATION"}"#);
        assert_eq!(r.category, Verdict::Hallucination);
        assert_eq!(r.explanation, "");
    }

    #[test]
    fn test_default_when_nothing_recognizable() {
        let r: JudgmentResult<Verdict> = parse_judgment("I am not able to evaluate this.");
        assert_eq!(r.category, Verdict::Hallucination);
        assert_eq!(r.source, ParseSource::Defaulted);
        assert!(r.explanation.starts_with("Failed to parse judge response"));

        let r: JudgmentResult<Verdict> = parse_judgment("");
        assert_eq!(r.source, ParseSource::Defaulted);
    }

    #[test]
    fn test_substring_fallback_on_malformed_json() {
        let raw = r#"{"category": ABSTAIN, "explanation": }"#;
        let r: JudgmentResult<Verdict> = parse_judgment(raw);
        assert_eq!(r.category, Verdict::Abstain);
        assert_eq!(r.source, ParseSource::FallbackMatched);
        assert_eq!(r.explanation, raw);
    }

    #[test]
    fn test_unknown_category_falls_back_to_scan() {
        let raw = r#"{"category": "MAYBE", "explanation": "partly CORRECT"}"#;
        let r: JudgmentResult<Verdict> = parse_judgment(raw);
        assert_eq!(r.category, Verdict::Correct);
        assert_eq!(r.source, ParseSource::FallbackMatched);

        let r: JudgmentResult<Verdict> = parse_judgment(r#"{"category": "MAYBE"}"#);
        assert_eq!(r.category, Verdict::Hallucination);
        assert_eq!(r.source, ParseSource::Defaulted);
    }

    #[test]
    fn test_fallback_priority_order() {
        let raw = "hallucination? no - the answer is correct, not an abstain";
        let r: JudgmentResult<Verdict> = parse_judgment(raw);
        assert_eq!(r.category, Verdict::Correct);

        let r: JudgmentResult<UnanswerableVerdict> = parse_judgment(raw);
        assert_eq!(r.category, UnanswerableVerdict::Abstain);
    }

    #[test]
    fn test_nested_braces_stop_span_early() {
        // The inner `}` ends the span; the fallback still recovers the label.
        let raw = r#"{"category": "CORRECT", "explanation": "set {1, 2} matches"}"#;
        let r: JudgmentResult<Verdict> = parse_judgment(raw);
        assert_eq!(r.category, Verdict::Correct);
        assert_eq!(r.source, ParseSource::FallbackMatched);
    }

    #[test]
    fn test_unanswerable_rejects_correct() {
        let r: JudgmentResult<UnanswerableVerdict> =
            parse_judgment(r#"{"category": "CORRECT", "explanation": "x"}"#);
        assert_eq!(r.category, UnanswerableVerdict::Hallucination);
        assert_eq!(r.source, ParseSource::Defaulted);
    }

    #[test]
    fn test_preview_is_bounded_by_chars() {
        let raw = format!("ABSTAIN {}", "ż".repeat(500));
        let r: JudgmentResult<Verdict> = parse_judgment(&raw);
        assert_eq!(r.explanation.chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn test_label_round_trip() {
        assert_eq!("correct".parse::<Verdict>().unwrap(), Verdict::Correct);
        assert_eq!(" Abstain ".parse::<UnanswerableVerdict>().unwrap(), UnanswerableVerdict::Abstain);
        assert!("CORRECT".parse::<UnanswerableVerdict>().is_err());
        assert_eq!(Verdict::from(UnanswerableVerdict::Abstain), Verdict::Abstain);
        assert_eq!(Verdict::Hallucination.to_string(), "HALLUCINATION");
        assert_eq!(
            serde_json::to_string(&Verdict::Abstain).unwrap(),
            "\"ABSTAIN\""
        );
    }

    #[test]
    fn test_judge_error_is_conservative() {
        let r = JudgmentResult::<UnanswerableVerdict>::judge_error("timeout");
        assert_eq!(r.category, UnanswerableVerdict::Hallucination);
        assert_eq!(r.source, ParseSource::JudgeError);
        assert!(r.explanation.contains("timeout"));
    }
}
