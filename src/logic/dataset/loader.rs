//! CSV dataset loader

use std::path::Path;

use sha2::{Digest, Sha256};

use super::{Dataset, Value};
use crate::logic::error::{PipelineError, PipelineResult};

/// Cell contents treated as missing, on top of blank cells
const MISSING_TOKENS: &[&str] = &["?", "na", "n/a", "nan", "null", "none"];

pub struct LoadedDataset {
    pub dataset: Dataset,
    pub sha256: String,
}

/// Read a headed CSV file into a `Dataset`
pub fn load_csv(path: impl AsRef<Path>) -> PipelineResult<LoadedDataset> {
    let path = path.as_ref();
    let load_err = |reason: String| PipelineError::DatasetLoad {
        path: path.display().to_string(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|e| load_err(e.to_string()))?;
    let sha256 = hex::encode(Sha256::digest(&bytes));
    let dataset = parse_csv(bytes.as_slice()).map_err(|e| match e {
        PipelineError::DatasetLoad { reason, .. } => load_err(reason),
        other => other,
    })?;

    Ok(LoadedDataset { dataset, sha256 })
}

/// Parse CSV text with a header row
pub fn parse_csv<R: std::io::Read>(reader: R) -> PipelineResult<Dataset> {
    let load_err = |reason: String| PipelineError::DatasetLoad {
        path: "<reader>".to_string(),
        reason,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = rdr
        .headers()
        .map_err(|e| load_err(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return Err(load_err("missing header row".to_string()));
    }

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| load_err(format!("record {}: {}", i + 1, e)))?;
        rows.push(record.iter().map(parse_cell).collect());
    }

    if rows.is_empty() {
        return Err(load_err("dataset has a header but no records".to_string()));
    }

    Dataset::new(columns, rows)
}

fn parse_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if MISSING_TOKENS.iter().any(|t| trimmed.eq_ignore_ascii_case(t)) {
        return Value::Missing;
    }
    Value::parse(trimmed)
}
