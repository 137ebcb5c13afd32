//! Keyword scoring of answer batches

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use honesty::{is_abstain, score_answer, GroupMatch, Outcome};

use crate::dataset::{AnswerRecord, QaItem};

/// Keyword-scoring result for one answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: String,
    pub question: String,
    pub keyword_groups: Vec<Vec<String>>,
    pub answer: String,
    pub correct: bool,
    pub abstain: bool,
    pub matched_groups: Vec<GroupMatch>,
    pub missing_groups: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ScoreRecord {
    pub fn outcome(&self) -> Outcome {
        Outcome::new(self.correct, self.abstain)
    }
}

/// Score one answer against an item's keyword groups
pub fn score_item(item: &QaItem, answer: &str, fold_diacritics: bool) -> ScoreRecord {
    let result = score_answer(answer, &item.keyword_groups, fold_diacritics);
    ScoreRecord {
        id: item.id.clone(),
        question: item.question.clone(),
        keyword_groups: item.keyword_groups.clone(),
        answer: answer.to_string(),
        correct: result.correct,
        abstain: is_abstain(answer),
        matched_groups: result.matched_groups,
        missing_groups: result.missing_groups,
        prompt_variant: None,
        temperature: None,
    }
}

/// Score an id -> answer map, one record per question.
///
/// Questions without keyword groups are skipped. The second value counts
/// questions whose answer is absent or empty.
pub fn score_answers(
    items: &[QaItem],
    answers: &HashMap<String, String>,
    fold_diacritics: bool,
) -> (Vec<ScoreRecord>, usize) {
    let mut records = Vec::with_capacity(items.len());
    let mut missing = 0;

    for item in items {
        if !item.has_keywords() {
            tracing::warn!("Skipping id={}: no keyword groups to score against", item.id);
            continue;
        }
        let answer = answers.get(&item.id).map(String::as_str).unwrap_or("");
        if answer.is_empty() {
            missing += 1;
        }
        records.push(score_item(item, answer, fold_diacritics));
    }

    (records, missing)
}

/// Score generated answer records, keeping their variant and temperature
pub fn score_records(items: &[QaItem], records: &[AnswerRecord], fold_diacritics: bool) -> Vec<ScoreRecord> {
    let by_id: HashMap<&str, &QaItem> = items.iter().map(|item| (item.id.as_str(), item)).collect();

    let scored: Vec<ScoreRecord> = records
        .iter()
        .filter_map(|record| {
            let Some(item) = by_id.get(record.id.as_str()) else {
                tracing::warn!("No question for answer id={}, skipping", record.id);
                return None;
            };
            if !item.has_keywords() {
                return None;
            }
            let mut scored = score_item(item, &record.answer, fold_diacritics);
            scored.prompt_variant = Some(record.variant().to_string());
            scored.temperature = record.temperature;
            Some(scored)
        })
        .collect();

    tracing::info!("Scored {} answers", scored.len());
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capital() -> QaItem {
        QaItem::new("q1", "Stolica Polski?")
            .with_keyword_groups(vec![vec!["Warszawa".to_string(), "Warsaw".to_string()]])
    }

    #[test]
    fn test_score_item_outcomes() {
        let r = score_item(&capital(), "Stolicą Polski jest Warszawa.", true);
        assert!(r.correct);
        assert!(!r.abstain);
        assert_eq!(r.matched_groups[0].matched_variant.as_deref(), Some("Warszawa"));
        assert_eq!(r.outcome(), Outcome::new(true, false));

        let r = score_item(&capital(), "Nie wiem.", true);
        assert!(!r.correct);
        assert!(r.abstain);
        assert_eq!(r.missing_groups.len(), 1);

        let r = score_item(&capital(), "Kraków", true);
        assert!(r.outcome().is_hallucination());
    }

    #[test]
    fn test_score_answers_counts_missing() {
        let items = vec![
            capital(),
            QaItem::new("q2", "Rok?").with_keyword_groups(vec![vec!["1410".to_string()]]),
            QaItem::new("q3", "Bez słów kluczowych"),
        ];
        let answers = HashMap::from([
            ("q1".to_string(), "Warsaw".to_string()),
            ("q3".to_string(), "cokolwiek".to_string()),
        ]);

        let (records, missing) = score_answers(&items, &answers, true);
        assert_eq!(records.len(), 2);
        assert_eq!(missing, 1);
        assert!(records[0].correct);
        assert_eq!(records[1].answer, "");
        assert!(records[1].abstain);
    }

    #[test]
    fn test_score_records_keeps_context() {
        let records = vec![
            AnswerRecord::new("q1", "Warszawa").with_variant("honest").with_temperature(0.7),
            AnswerRecord::new("q404", "???"),
        ];
        let scored = score_records(&[capital()], &records, true);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].prompt_variant.as_deref(), Some("honest"));
        assert_eq!(scored[0].temperature, Some(0.7));
    }

    #[test]
    fn test_score_record_json_shape() {
        let value = serde_json::to_value(score_item(&capital(), "Warszawa", true)).unwrap();
        assert_eq!(value["matched_groups"][0]["matched_variant"], "Warszawa");
        assert!(value.get("prompt_variant").is_none());
    }
}
