//! Grouping per-answer outcomes into summaries

use indexmap::IndexMap;

use honesty::{summarize, Outcome, Summary};

use super::ScoreRecord;
use crate::dataset::JudgmentRecord;

/// A per-answer result that can be grouped by variant and temperature
pub trait Evaluated {
    fn variant(&self) -> &str;
    fn temperature(&self) -> Option<f32>;
    fn outcome(&self) -> Outcome;
}

impl Evaluated for ScoreRecord {
    fn variant(&self) -> &str {
        self.prompt_variant.as_deref().unwrap_or("unknown")
    }

    fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    fn outcome(&self) -> Outcome {
        ScoreRecord::outcome(self)
    }
}

impl Evaluated for JudgmentRecord {
    fn variant(&self) -> &str {
        &self.prompt_variant
    }

    fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    fn outcome(&self) -> Outcome {
        JudgmentRecord::outcome(self)
    }
}

/// Temperature key as written in summaries: `0.0`, `0.7`, or `unknown`
pub fn format_temperature(temperature: Option<f32>) -> String {
    match temperature {
        Some(t) => format!("{:?}", t),
        None => "unknown".to_string(),
    }
}

/// Summary over every row
pub fn summarize_all<R: Evaluated>(rows: &[R]) -> Summary {
    summarize(rows.iter().map(Evaluated::outcome))
}

/// One summary per prompt variant, in first-seen order
pub fn summarize_by_variant<R: Evaluated>(rows: &[R]) -> IndexMap<String, Summary> {
    let mut groups: IndexMap<String, Vec<Outcome>> = IndexMap::new();
    for row in rows {
        groups.entry(row.variant().to_string()).or_default().push(row.outcome());
    }
    groups
        .into_iter()
        .map(|(variant, outcomes)| (variant, summarize(outcomes)))
        .collect()
}

/// Summaries keyed by temperature, then by prompt variant, in first-seen order
pub fn summarize_by_temperature<R: Evaluated>(rows: &[R]) -> IndexMap<String, IndexMap<String, Summary>> {
    let mut groups: IndexMap<String, IndexMap<String, Vec<Outcome>>> = IndexMap::new();
    for row in rows {
        groups
            .entry(format_temperature(row.temperature()))
            .or_default()
            .entry(row.variant().to_string())
            .or_default()
            .push(row.outcome());
    }

    let summaries: IndexMap<String, IndexMap<String, Summary>> = groups
        .into_iter()
        .map(|(temp, per_variant)| {
            let per_variant = per_variant
                .into_iter()
                .map(|(variant, outcomes)| (variant, summarize(outcomes)))
                .collect();
            (temp, per_variant)
        })
        .collect();

    for (temp, per_variant) in &summaries {
        for (variant, s) in per_variant {
            tracing::debug!(
                "Temperature={}, Variant={}: acc={:.3}, abstain={:.3}, halluc={:.3}",
                temp,
                variant,
                s.accuracy,
                s.abstain_rate,
                s.hallucination_rate
            );
        }
    }
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(variant: &str, temperature: Option<f32>, correct: bool, abstain: bool) -> ScoreRecord {
        ScoreRecord {
            id: "q".to_string(),
            question: "?".to_string(),
            keyword_groups: vec![vec!["x".to_string()]],
            answer: String::new(),
            correct,
            abstain,
            matched_groups: Vec::new(),
            missing_groups: Vec::new(),
            prompt_variant: Some(variant.to_string()),
            temperature,
        }
    }

    #[test]
    fn test_format_temperature() {
        assert_eq!(format_temperature(Some(0.0)), "0.0");
        assert_eq!(format_temperature(Some(0.7)), "0.7");
        assert_eq!(format_temperature(Some(1.0)), "1.0");
        assert_eq!(format_temperature(None), "unknown");
    }

    #[test]
    fn test_by_variant_keeps_first_seen_order() {
        let rows = vec![
            row("honest", Some(0.0), true, false),
            row("baseline", Some(0.0), false, true),
            row("honest", Some(0.0), false, false),
        ];
        let by_variant = summarize_by_variant(&rows);
        let keys: Vec<_> = by_variant.keys().cloned().collect();
        assert_eq!(keys, ["honest", "baseline"]);
        assert_eq!(by_variant["honest"].n, 2);
        assert_eq!(by_variant["honest"].accuracy, 0.5);
        assert_eq!(by_variant["baseline"].abstain_rate, 1.0);
    }

    #[test]
    fn test_by_temperature_then_variant() {
        let rows = vec![
            row("baseline", Some(0.0), true, false),
            row("honest", Some(0.0), false, true),
            row("baseline", Some(0.7), false, false),
        ];
        let grouped = summarize_by_temperature(&rows);
        let temps: Vec<_> = grouped.keys().cloned().collect();
        assert_eq!(temps, ["0.0", "0.7"]);
        assert_eq!(grouped["0.0"].len(), 2);
        assert_eq!(grouped["0.7"]["baseline"].hallucination_rate, 1.0);

        let overall = summarize_all(&rows);
        assert_eq!(overall.n, 3);
        assert_eq!(overall.correct, 1);
    }

    #[test]
    fn test_empty_rows() {
        let rows: Vec<ScoreRecord> = Vec::new();
        assert!(summarize_by_variant(&rows).is_empty());
        assert_eq!(summarize_all(&rows), Summary::default());
    }
}
