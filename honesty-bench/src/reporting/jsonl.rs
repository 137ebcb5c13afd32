//! JSON Lines output

use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write one JSON object per line, creating parent directories.
///
/// Non-ASCII text is written as-is.
pub fn write_jsonl<T: Serialize>(path: impl AsRef<Path>, records: &[T]) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut out = BufWriter::new(File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut out, record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{load_answer_records, AnswerRecord};

    #[test]
    fn test_write_then_load_answers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/run/answers.jsonl");
        let records = vec![
            AnswerRecord::new("q1", "Zażółć gęślą jaźń").with_variant("honest").with_temperature(0.0),
            AnswerRecord::new("q2", ""),
        ];
        write_jsonl(&path, &records).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Zażółć gęślą jaźń"));

        let loaded = load_answer_records(&path).unwrap();
        assert_eq!(loaded[0].variant(), "honest");
        assert_eq!(loaded[0].temperature, Some(0.0));
        assert_eq!(loaded[1].answer, "");
    }

    #[test]
    fn test_empty_batch_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");
        write_jsonl::<AnswerRecord>(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
