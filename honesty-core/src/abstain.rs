//! Rule-based abstention detection for the keyword-scoring path

use std::sync::LazyLock;

use regex::Regex;

const ABSTAIN_PATTERNS: &[&str] = &[
    r"\bnie\s+wiem\b",
    r"\bnie\s+j(e|ę)stem\s+pewien\b",
    r"\bnie\s+j(e|ę)stem\s+pewna\b",
    r"\bnie\s+mam\s+pewno(ś|s)ci\b",
    r"\btrudno\s+powiedzie(ć|c)\b",
    r"\bnie\s+potrafi(ę|e)\s+odpowiedzie(ć|c)\b",
    r"\bi\s+(do\s+not|don'?t|don’t)\s+know\b",
    r"\bi'?m\s+not\s+sure\b",
    r"\bi\s+am\s+not\s+sure\b",
    r"\bi\s+(cannot|can'?t)\s+answer\b",
];

static ABSTAIN: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = ABSTAIN_PATTERNS
        .iter()
        .map(|p| format!("(?:{})", p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){}", alternation)).unwrap()
});

/// True when the answer is empty or explicitly admits not knowing.
pub fn is_abstain(answer: &str) -> bool {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return true;
    }
    ABSTAIN.is_match(trimmed)
}
