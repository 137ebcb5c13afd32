//! JSONL loading and validation
//!
//! Validation is strict: a missing required field, a duplicate id or an empty
//! keyword group aborts the load with an error naming the record.

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::{AnswerRecord, QaItem};

type Row = Map<String, Value>;

/// Error type for dataset loading
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON on line {line}: {message}")]
    Json { line: usize, message: String },

    #[error("Missing '{field}' at record #{record}{}", id_suffix(.id))]
    MissingField {
        record: usize,
        field: &'static str,
        id: Option<String>,
    },

    #[error("Duplicate id={0}")]
    DuplicateId(String),

    #[error("{reason} at id={id}")]
    InvalidKeywords { id: String, reason: String },
}

fn id_suffix(id: &Option<String>) -> String {
    match id {
        Some(id) => format!(" (id={})", id),
        None => String::new(),
    }
}

/// Read a JSONL file into JSON objects. Blank lines are skipped.
pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Vec<Row>, LoadError> {
    let path = path.as_ref();
    tracing::debug!("Loading JSONL from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    let rows = parse_jsonl(&content)?;
    tracing::debug!("Loaded {} records from {}", rows.len(), path.display());
    Ok(rows)
}

fn parse_jsonl(content: &str) -> Result<Vec<Row>, LoadError> {
    let mut rows = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).map_err(|e| LoadError::Json {
            line: i + 1,
            message: e.to_string(),
        })?;
        match value {
            Value::Object(obj) => rows.push(obj),
            _ => {
                return Err(LoadError::Json {
                    line: i + 1,
                    message: "expected a JSON object".to_string(),
                })
            }
        }
    }
    Ok(rows)
}

/// Render a scalar as text; ids may be numbers in hand-written files
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn required(row: &Row, field: &'static str, record: usize, id: Option<&str>) -> Result<String, LoadError> {
    row.get(field).and_then(as_text).ok_or_else(|| LoadError::MissingField {
        record,
        field,
        id: id.map(String::from),
    })
}

fn optional_text(row: &Row, field: &str) -> Option<String> {
    row.get(field)
        .and_then(as_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(String::from))
        .collect()
}

fn trimmed(list: Vec<String>) -> Vec<String> {
    list.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn invalid(id: &str, reason: &str) -> LoadError {
    LoadError::InvalidKeywords {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

/// `keyword_groups` wins over the legacy flat `keywords` list (one
/// single-variant group per keyword).
fn keyword_groups(row: &Row, id: &str) -> Result<Vec<Vec<String>>, LoadError> {
    if let Some(kg) = row.get("keyword_groups").filter(|v| !v.is_null()) {
        let raw = kg
            .as_array()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| invalid(id, "'keyword_groups' must be a non-empty list"))?;

        let mut groups = Vec::with_capacity(raw.len());
        for group in raw {
            let variants = string_list(group)
                .ok_or_else(|| invalid(id, "Each group in 'keyword_groups' must be a list of strings"))?;
            let cleaned = trimmed(variants);
            if cleaned.is_empty() {
                return Err(invalid(id, "Empty group in 'keyword_groups'"));
            }
            groups.push(cleaned);
        }
        return Ok(groups);
    }

    if let Some(kw) = row.get("keywords").filter(|v| !v.is_null()) {
        let keywords = string_list(kw).ok_or_else(|| invalid(id, "'keywords' must be a list of strings"))?;
        let cleaned = trimmed(keywords);
        if cleaned.is_empty() {
            return Err(invalid(id, "'keywords' is empty"));
        }
        return Ok(cleaned.into_iter().map(|k| vec![k]).collect());
    }

    tracing::warn!("No 'keyword_groups' or 'keywords' at id={}, keyword scoring will be skipped", id);
    Ok(Vec::new())
}

/// id + question, with the duplicate check shared by every question loader
fn item_header(row: &Row, record: usize, seen: &mut HashSet<String>) -> Result<QaItem, LoadError> {
    let id = required(row, "id", record, None)?;
    let question = required(row, "question", record, Some(&id))?;
    if !seen.insert(id.clone()) {
        tracing::error!("Duplicate id={}", id);
        return Err(LoadError::DuplicateId(id));
    }
    Ok(QaItem::new(id, question.trim()))
}

/// Load general-knowledge questions
pub fn load_questions(path: impl AsRef<Path>) -> Result<Vec<QaItem>, LoadError> {
    tracing::info!("Loading questions from {}", path.as_ref().display());
    let rows = load_jsonl(path)?;
    let items = parse_questions(&rows)?;
    tracing::info!("Successfully loaded {} questions", items.len());
    Ok(items)
}

fn parse_questions(rows: &[Row]) -> Result<Vec<QaItem>, LoadError> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let mut item = item_header(row, idx + 1, &mut seen)?;
        item.keyword_groups = keyword_groups(row, &item.id)?;
        item.expected_answer = optional_text(row, "expected_answer");
        items.push(item);
    }
    Ok(items)
}

/// Load math questions; `expected_answer` is required, keywords are ignored
pub fn load_math_questions(path: impl AsRef<Path>) -> Result<Vec<QaItem>, LoadError> {
    tracing::info!("Loading math questions from {}", path.as_ref().display());
    let rows = load_jsonl(path)?;

    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let mut item = item_header(row, idx + 1, &mut seen)?;
        let expected = optional_text(row, "expected_answer").ok_or_else(|| LoadError::MissingField {
            record: idx + 1,
            field: "expected_answer",
            id: Some(item.id.clone()),
        })?;
        item.expected_answer = Some(expected);
        items.push(item);
    }
    tracing::info!("Successfully loaded {} math questions", items.len());
    Ok(items)
}

/// Load questions that have no correct answer; only id and question are read
pub fn load_unanswerable_questions(path: impl AsRef<Path>) -> Result<Vec<QaItem>, LoadError> {
    tracing::info!("Loading unanswerable questions from {}", path.as_ref().display());
    let rows = load_jsonl(path)?;

    let mut seen = HashSet::new();
    let items = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| item_header(row, idx + 1, &mut seen))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!("Successfully loaded {} unanswerable questions", items.len());
    Ok(items)
}

/// Load answer records, keeping all metadata
pub fn load_answer_records(path: impl AsRef<Path>) -> Result<Vec<AnswerRecord>, LoadError> {
    tracing::info!("Loading answers from {}", path.as_ref().display());
    let rows = load_jsonl(path)?;
    let records = parse_answer_records(&rows)?;
    tracing::info!("Successfully loaded {} answer records", records.len());
    Ok(records)
}

fn parse_answer_records(rows: &[Row]) -> Result<Vec<AnswerRecord>, LoadError> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let id = required(row, "id", idx + 1, None)?;
            if !row.contains_key("answer") {
                return Err(LoadError::MissingField {
                    record: idx + 1,
                    field: "answer",
                    id: Some(id),
                });
            }
            let answer = row.get("answer").and_then(as_text).unwrap_or_default();

            Ok(AnswerRecord {
                id,
                answer,
                run_id: optional_text(row, "run_id"),
                ts_utc: optional_text(row, "ts_utc"),
                provider: optional_text(row, "provider"),
                model: optional_text(row, "model"),
                temperature: row.get("temperature").and_then(Value::as_f64).map(|t| t as f32),
                max_tokens: row.get("max_tokens").and_then(Value::as_u64).map(|t| t as u32),
                prompt_variant: optional_text(row, "prompt_variant"),
                question: optional_text(row, "question"),
                expected_answer: optional_text(row, "expected_answer"),
                user_prompt: optional_text(row, "user_prompt"),
                error: optional_text(row, "error"),
            })
        })
        .collect()
}

/// Load answers as an id -> answer map; a later row for the same id wins
pub fn load_answers(path: impl AsRef<Path>) -> Result<HashMap<String, String>, LoadError> {
    let records = load_answer_records(path)?;
    Ok(records.into_iter().map(|r| (r.id, r.answer)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_load_questions_basic() {
        let file = write_file(&[
            r#"{"id": "q1", "question": " Stolica Polski? ", "keyword_groups": [["Warszawa", " Warsaw ", ""]], "expected_answer": "Warszawa"}"#,
            "",
            r#"{"id": 2, "question": "Rok bitwy pod Grunwaldem?", "keywords": ["1410"]}"#,
        ]);
        let items = load_questions(file.path()).unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].question, "Stolica Polski?");
        assert_eq!(items[0].keyword_groups, vec![vec!["Warszawa".to_string(), "Warsaw".to_string()]]);
        assert_eq!(items[0].expected(), "Warszawa");

        assert_eq!(items[1].id, "2");
        assert_eq!(items[1].keyword_groups, vec![vec!["1410".to_string()]]);
        assert_eq!(items[1].expected_answer, None);
    }

    #[test]
    fn test_missing_keywords_is_judge_only() {
        let file = write_file(&[r#"{"id": "q1", "question": "?"}"#]);
        let items = load_questions(file.path()).unwrap();
        assert!(!items[0].has_keywords());
    }

    #[test]
    fn test_invalid_json_reports_line() {
        let file = write_file(&[r#"{"id": "q1", "question": "?"}"#, "", "{not json"]);
        match load_questions(file.path()) {
            Err(LoadError::Json { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected JSON error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_fields() {
        let file = write_file(&[r#"{"question": "?"}"#]);
        let err = load_questions(file.path()).unwrap_err();
        assert_eq!(err.to_string(), "Missing 'id' at record #1");

        let file = write_file(&[r#"{"id": "a", "question": "?"}"#, r#"{"id": "b"}"#]);
        let err = load_questions(file.path()).unwrap_err();
        assert_eq!(err.to_string(), "Missing 'question' at record #2 (id=b)");
    }

    #[test]
    fn test_duplicate_id() {
        let file = write_file(&[
            r#"{"id": "q1", "question": "a"}"#,
            r#"{"id": "q1", "question": "b"}"#,
        ]);
        assert!(matches!(load_questions(file.path()), Err(LoadError::DuplicateId(id)) if id == "q1"));
    }

    #[test]
    fn test_empty_groups_rejected() {
        for bad in [
            r#"{"id": "q1", "question": "?", "keyword_groups": []}"#,
            r#"{"id": "q1", "question": "?", "keyword_groups": [["  ", ""]]}"#,
            r#"{"id": "q1", "question": "?", "keyword_groups": [["ok"], []]}"#,
            r#"{"id": "q1", "question": "?", "keyword_groups": [["ok", 3]]}"#,
            r#"{"id": "q1", "question": "?", "keywords": [" "]}"#,
        ] {
            let file = write_file(&[bad]);
            match load_questions(file.path()) {
                Err(LoadError::InvalidKeywords { id, .. }) => assert_eq!(id, "q1"),
                other => panic!("expected keyword error for {}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_math_requires_expected_answer() {
        let file = write_file(&[
            r#"{"id": "m1", "question": "1/2 + 1/4?", "expected_answer": "3/4"}"#,
            r#"{"id": "m2", "question": "2+2?"}"#,
        ]);
        let err = load_math_questions(file.path()).unwrap_err();
        assert_eq!(err.to_string(), "Missing 'expected_answer' at record #2 (id=m2)");

        let file = write_file(&[r#"{"id": "m1", "question": "1/2 + 1/4?", "expected_answer": 0.75}"#]);
        let items = load_math_questions(file.path()).unwrap();
        assert_eq!(items[0].expected(), "0.75");
        assert!(!items[0].has_keywords());
    }

    #[test]
    fn test_unanswerable_needs_only_id_and_question() {
        let file = write_file(&[
            r#"{"id": "u1", "question": "Jaki będzie kurs euro za 10 lat?", "keyword_groups": []}"#,
        ]);
        let items = load_unanswerable_questions(file.path()).unwrap();
        assert_eq!(items.len(), 1);
        assert!(!items[0].has_keywords());
    }

    #[test]
    fn test_load_answer_records() {
        let file = write_file(&[
            r#"{"id": "q1", "answer": "Warszawa", "prompt_variant": "honest", "temperature": 0.7, "model": "gpt-4o-mini"}"#,
            r#"{"id": "q2", "answer": "", "temperature": ""}"#,
        ]);
        let records = load_answer_records(file.path()).unwrap();
        assert_eq!(records[0].variant(), "honest");
        assert_eq!(records[0].temperature, Some(0.7));
        assert_eq!(records[0].model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(records[1].answer, "");
        assert_eq!(records[1].temperature, None);
        assert_eq!(records[1].variant(), "unknown");
    }

    #[test]
    fn test_answers_require_answer_field() {
        let file = write_file(&[r#"{"id": "q1"}"#]);
        let err = load_answers(file.path()).unwrap_err();
        assert_eq!(err.to_string(), "Missing 'answer' at record #1 (id=q1)");
    }

    #[test]
    fn test_load_answers_map() {
        let file = write_file(&[
            r#"{"id": "q1", "answer": "first"}"#,
            r#"{"id": "q1", "answer": "second"}"#,
        ]);
        let answers = load_answers(file.path()).unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers["q1"], "second");
    }

    #[test]
    fn test_non_object_line() {
        assert!(matches!(parse_jsonl("[1, 2]"), Err(LoadError::Json { line: 1, .. })));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(load_jsonl("/no/such/file.jsonl"), Err(LoadError::Io(_))));
    }
}
