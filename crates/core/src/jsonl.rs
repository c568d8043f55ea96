//! Newline-delimited JSON loading.
//!
//! A run log is one JSON value per line:
//! ```jsonl
//! {"type":"SystemMessage","timestamp":"2026-02-28T12:00:00Z","data":{"model":"claude-3"}}
//! {"type":"ResultMessage","timestamp":"2026-02-28T12:00:42Z","data":{"usage":{...}}}
//! ```
//! The whole file is read into memory before anything else runs. Blank lines
//! are skipped; any other line that is not valid JSON aborts the load.

use serde_json::Value;
use std::io::{self, BufRead};
use std::path::Path;

/// Error types for JSONL operations
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum JsonlError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error at line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },
}

/// Read every non-blank line of `reader` as a JSON value.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<Value>, JsonlError> {
    let mut records = Vec::new();
    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| JsonlError::Json {
            line: idx + 1,
            source: e,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Open `path` and read it with [`read_records`].
pub fn read_records_from_path(path: &Path) -> Result<Vec<Value>, JsonlError> {
    let file = std::fs::File::open(path)?;
    let records = read_records(io::BufReader::new(file))?;
    tracing::debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}
