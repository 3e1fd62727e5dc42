//! Dataset Module - tabular training data
//!
//! Loads the questionnaire dataset from CSV. When the file is missing or
//! corrupt the service falls back to an embedded synthetic dataset so it can
//! still start; the chosen `DataSource` is reported at startup and on
//! `/health`.

pub mod value;
pub mod loader;
pub mod synthetic;

#[cfg(test)]
mod tests;

use serde::Serialize;

use super::error::{PipelineError, PipelineResult};
pub use value::{Record, Value};

/// Ordered records sharing one field set, stored row-major.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> PipelineResult<Self> {
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(PipelineError::DatasetLoad {
                path: "<memory>".to_string(),
                reason: format!(
                    "row {} has {} fields, expected {}",
                    i,
                    row.len(),
                    columns.len()
                ),
            });
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, in row order
    pub fn column(&self, index: usize) -> Vec<&Value> {
        self.rows.iter().map(|r| &r[index]).collect()
    }

    /// Row as a name → value mapping
    pub fn record(&self, index: usize) -> Option<Record> {
        self.rows.get(index).map(|row| {
            self.columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect()
        })
    }

    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let missing = self.rows.iter().filter(|r| r[i].is_missing()).count();
                (name.clone(), missing)
            })
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

/// Where the training data came from
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    File { path: String, sha256: String, rows: usize },
    Synthetic { reason: String, rows: usize },
}

impl DataSource {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, DataSource::Synthetic { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataSource::File { .. } => "file",
            DataSource::Synthetic { .. } => "synthetic",
        }
    }
}

/// Load the dataset at `path`, or the synthetic one if that fails.
///
/// Falling back is logged at `warn`; the chosen source is returned alongside
/// the data.
pub fn load_or_synthetic(path: &str) -> PipelineResult<(Dataset, DataSource)> {
    match loader::load_csv(path) {
        Ok(loaded) => {
            tracing::info!(
                "Loaded {} records from {} (sha256 {})",
                loaded.dataset.len(),
                path,
                &loaded.sha256[..12]
            );
            let source = DataSource::File {
                path: path.to_string(),
                sha256: loaded.sha256,
                rows: loaded.dataset.len(),
            };
            Ok((loaded.dataset, source))
        }
        Err(e) => {
            tracing::warn!("{}. Falling back to synthetic dataset", e);
            let dataset = synthetic::dataset()?;
            let source = DataSource::Synthetic {
                reason: e.to_string(),
                rows: dataset.len(),
            };
            Ok((dataset, source))
        }
    }
}
