use shared::RawRecord;
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to read batch file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported batch document: {0}")]
    UnsupportedShape(&'static str),
}

pub fn load_batch_file(path: &Path) -> Result<Vec<RawRecord>, BatchError> {
    let content = fs::read_to_string(path)?;
    parse_batch(&content)
}

/// Accepts a JSON array of objects, an object with a `results` array, or
/// JSON Lines. Entries that are not objects are skipped.
pub fn parse_batch(content: &str) -> Result<Vec<RawRecord>, BatchError> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        let value: Value =
            serde_json::from_str(content).map_err(|source| BatchError::Json { line: 1, source })?;
        return Ok(collect_objects(value));
    }

    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(mut doc)) => match doc.remove("results") {
            Some(results @ Value::Array(_)) => Ok(collect_objects(results)),
            Some(_) => Err(BatchError::UnsupportedShape("`results` is not an array")),
            // A single-line document is one JSONL record.
            None => Ok(vec![doc]),
        },
        Ok(_) => Err(BatchError::UnsupportedShape("expected an array or an object")),
        Err(_) => parse_lines(content),
    }
}

fn parse_lines(content: &str) -> Result<Vec<RawRecord>, BatchError> {
    let mut records = Vec::new();
    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .map_err(|source| BatchError::Json { line: n + 1, source })?;
        match value {
            Value::Object(record) => records.push(record),
            other => log::warn!("Skipping non-object entry on line {}: {}", n + 1, other),
        }
    }
    Ok(records)
}

fn collect_objects(value: Value) -> Vec<RawRecord> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match item {
            Value::Object(record) => Some(record),
            other => {
                log::warn!("Skipping non-object entry at index {}: {}", i, other);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn array_document() {
        let records = parse_batch(r#"[{"id": 1}, 5, {"id": 2}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["id"], 2);
    }

    #[test]
    fn results_document() {
        let records =
            parse_batch(r#"{"preview": false, "results": [{"edr_process_id": "7"}]}"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["edr_process_id"], "7");
    }

    #[test]
    fn json_lines() {
        let content = "{\"id\": \"1\"}\n\n{\"id\": \"2\", \"parentId\": \"1\"}\n\"noise\"\n";
        let records = parse_batch(content).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn single_object_is_one_record() {
        assert_eq!(parse_batch(r#"{"id": "1"}"#).unwrap().len(), 1);
    }

    #[test]
    fn errors() {
        assert!(matches!(
            parse_batch(r#"{"results": 3}"#),
            Err(BatchError::UnsupportedShape(_))
        ));
        assert!(matches!(parse_batch("42"), Err(BatchError::UnsupportedShape(_))));
        assert!(matches!(
            parse_batch("{\"id\": 1}\n{broken"),
            Err(BatchError::Json { line: 2, .. })
        ));
        assert!(matches!(parse_batch("[1, "), Err(BatchError::Json { .. })));
        assert!(parse_batch("  \n").unwrap().is_empty());
    }

    #[test]
    fn reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"[{{"edr_provider": "defender", "ProcessId": "4"}}]"#).unwrap();
        let records = load_batch_file(file.path()).unwrap();
        assert_eq!(records[0]["ProcessId"], "4");

        let missing = file.path().with_extension("missing");
        assert!(matches!(load_batch_file(&missing), Err(BatchError::Io(_))));
    }
}
