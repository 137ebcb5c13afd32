//! Results reporting

pub mod jsonl;

pub use jsonl::write_jsonl;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use honesty::Summary;

use crate::analysis::{summarize_all, summarize_by_temperature, summarize_by_variant, Evaluated};

/// Settings a run was made with, as recorded in its summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSettingsSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub temperatures: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// JSON summary written next to a run's per-answer records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub created_utc: String,
    /// `keyword`, `general`, `math` or `unanswerable`
    pub mode: String,
    pub questions_path: String,
    pub answers_path: String,
    pub config: RunSettingsSnapshot,
    pub total_questions: usize,
    pub total_evaluations: usize,
    pub missing_answers: usize,
    pub prompt_variants: Vec<String>,
    pub overall: Summary,
    pub by_variant: IndexMap<String, Summary>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub by_temperature: IndexMap<String, IndexMap<String, Summary>>,
}

impl RunSummary {
    /// Summarize evaluated rows overall, per variant and per temperature
    pub fn from_rows<R: Evaluated>(run_id: impl Into<String>, mode: impl Into<String>, rows: &[R]) -> Self {
        let by_variant = summarize_by_variant(rows);
        let by_temperature = if rows.iter().any(|r| r.temperature().is_some()) {
            summarize_by_temperature(rows)
        } else {
            IndexMap::new()
        };

        Self {
            run_id: run_id.into(),
            created_utc: chrono::Utc::now().to_rfc3339(),
            mode: mode.into(),
            questions_path: String::new(),
            answers_path: String::new(),
            config: RunSettingsSnapshot::default(),
            total_questions: 0,
            total_evaluations: rows.len(),
            missing_answers: 0,
            prompt_variants: by_variant.keys().cloned().collect(),
            overall: summarize_all(rows),
            by_variant,
            by_temperature,
        }
    }

    pub fn with_paths(mut self, questions: &Path, answers: &Path) -> Self {
        self.questions_path = absolute(questions);
        self.answers_path = absolute(answers);
        self
    }

    pub fn with_config(mut self, config: RunSettingsSnapshot) -> Self {
        self.config = config;
        self
    }

    pub fn with_counts(mut self, total_questions: usize, missing_answers: usize) -> Self {
        self.total_questions = total_questions;
        self.missing_answers = missing_answers;
        self
    }

    /// Write to JSON file
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)?;
        tracing::info!("Summary saved to {}", path.display());
        Ok(())
    }
}

fn absolute(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

fn print_rates(indent: &str, s: &Summary) {
    println!("{}Correct:        {:6.1}% ({}/{})", indent, s.accuracy * 100.0, s.correct, s.n);
    println!("{}Hallucination:  {:6.1}% ({}/{})", indent, s.hallucination_rate * 100.0, s.hallucinated, s.n);
    println!("{}Abstain:        {:6.1}% ({}/{})", indent, s.abstain_rate * 100.0, s.abstained, s.n);
}

/// Generate a console report
pub fn print_console_report(summary: &RunSummary) {
    println!("\n{:=<70}", "");
    println!("EVALUATION SUMMARY ({})", summary.mode);
    println!("{:=<70}", "");
    println!("Run: {}", summary.run_id);
    if summary.total_questions > 0 {
        println!("Total questions: {}", summary.total_questions);
    }
    println!("Prompt variants: {}", summary.prompt_variants.join(", "));
    println!("Total evaluations: {}", summary.total_evaluations);
    println!("Missing answers: {}", summary.missing_answers);

    println!("\nOVERALL RESULTS (all variants combined):");
    print_rates("  ", &summary.overall);

    println!("\nRESULTS BY PROMPT VARIANT:");
    for (variant, s) in &summary.by_variant {
        println!("\n  {}:", variant.to_uppercase());
        print_rates("    ", s);
    }

    if !summary.by_temperature.is_empty() {
        println!("\nSummary by temperature and prompt variant:");
        for (temp, per_variant) in &summary.by_temperature {
            println!("Temperature={}", temp);
            for (variant, s) in per_variant {
                println!(
                    "  - {}: acc={:.3}, abstain={:.3}, halluc={:.3} (n={})",
                    variant, s.accuracy, s.abstain_rate, s.hallucination_rate, s.n
                );
            }
        }
    }

    println!("\n{:=<70}", "");
}
