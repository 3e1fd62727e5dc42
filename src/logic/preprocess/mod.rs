//! Preprocessing Pipeline
//!
//! `fit` cleans the dataset, freezes the feature schema and learns one
//! encoder per categorical field plus a scaler for numeric fields.
//! `transform` turns a single record into a model-ready vector with the same
//! fitted state. It never fails: missing or malformed inputs degrade to
//! defaults and are listed in a `TransformReport`.
//!
//! # Column kinds
//! A field is categorical when any value is non-numeric or it has at most
//! `CATEGORICAL_MAX_DISTINCT` distinct values; numeric otherwise.

pub mod layout;
pub mod vector;
pub mod encoder;
pub mod scaler;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet};

use ndarray::Array2;
use serde::Serialize;

use super::dataset::{Dataset, Record, Value};
use super::error::{PipelineError, PipelineResult};
pub use encoder::CategoricalEncoder;
pub use layout::{canonical_key, FeatureKind, FeatureSchema, FeatureSpec};
pub use scaler::NumericScaler;
pub use vector::FeatureVector;

// ============================================================================
// CONSTANTS
// ============================================================================

pub const CATEGORICAL_MAX_DISTINCT: usize = 10;
pub const MIN_TRAINING_ROWS: usize = 10;
pub const UNKNOWN_CATEGORY: &str = "Unknown";

// ============================================================================
// TYPES
// ============================================================================

/// Which dataset columns are the label and the record identifier
#[derive(Debug, Clone, Serialize)]
pub struct DatasetColumns {
    pub label: String,
    pub id: Option<String>,
}

impl Default for DatasetColumns {
    fn default() -> Self {
        Self {
            label: "Depression".to_string(),
            id: Some("id".to_string()),
        }
    }
}

/// Fitted preprocessing state. Immutable once built.
#[derive(Debug, Clone)]
pub struct FittedPipeline {
    schema: FeatureSchema,
    encoders: BTreeMap<String, CategoricalEncoder>,
    scaler: NumericScaler,
}

/// One cleaned training column
#[derive(Debug, Clone)]
pub struct TrainingColumn {
    pub name: String,
    pub kind: FeatureKind,
    /// Cleaned values (missing filled)
    pub raw: Vec<Value>,
    /// Category codes or unscaled numbers
    pub encoded: Vec<f64>,
}

/// Cleaned training data in schema order
#[derive(Debug, Clone)]
pub struct TrainingTable {
    pub columns: Vec<TrainingColumn>,
    pub labels: Vec<u8>,
    /// rows × features, categorical codes and scaled numerics
    pub matrix: Array2<f64>,
}

impl TrainingTable {
    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&y| y == 1).count()
    }
}

/// Degradations applied while transforming one record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformReport {
    /// Absent fields replaced by their default
    pub defaulted: Vec<String>,
    /// (field, value) pairs not seen during fitting
    pub unseen_categories: Vec<(String, String)>,
    /// Numeric fields whose value could not be read as a number
    pub coerced: Vec<String>,
}

impl TransformReport {
    pub fn is_clean(&self) -> bool {
        self.defaulted.is_empty() && self.unseen_categories.is_empty() && self.coerced.is_empty()
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        for f in &self.defaulted {
            out.push(format!("'{}' missing, default used", f));
        }
        for (f, v) in &self.unseen_categories {
            out.push(format!("'{}' value '{}' not seen in training, fallback used", f, v));
        }
        for f in &self.coerced {
            out.push(format!("'{}' is not numeric, 0 used", f));
        }
        out
    }
}

// ============================================================================
// FIT
// ============================================================================

/// Parse a label cell to {0, 1}
pub fn parse_label(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) if *n == 0.0 => Some(0),
        Value::Number(_) => Some(1),
        Value::Text(s) => match s.to_ascii_lowercase().as_str() {
            "yes" | "true" | "y" => Some(1),
            "no" | "false" | "n" => Some(0),
            _ => None,
        },
        Value::Missing => None,
    }
}

/// Fit the pipeline on a raw dataset
pub fn fit(
    dataset: &Dataset,
    columns: &DatasetColumns,
) -> PipelineResult<(FittedPipeline, TrainingTable)> {
    let label_idx = dataset.column_index(&columns.label).ok_or_else(|| {
        PipelineError::InsufficientData(format!("label column '{}' not found", columns.label))
    })?;

    // Records without a label cannot be trained on; other cells are filled below
    let mut kept = Vec::with_capacity(dataset.len());
    let mut labels = Vec::with_capacity(dataset.len());
    for (row, v) in dataset.column(label_idx).into_iter().enumerate() {
        if v.is_missing() {
            continue;
        }
        let y = parse_label(v).ok_or_else(|| {
            PipelineError::InsufficientData(format!(
                "label '{}' at record {} is not a binary outcome",
                v, row
            ))
        })?;
        kept.push(row);
        labels.push(y);
    }

    let unlabeled = dataset.len() - kept.len();
    if unlabeled > 0 {
        tracing::warn!(
            "Dropping {} record(s) with a missing '{}' label",
            unlabeled,
            columns.label
        );
    }

    if labels.len() < MIN_TRAINING_ROWS {
        return Err(PipelineError::InsufficientData(format!(
            "{} labeled records, at least {} required",
            labels.len(),
            MIN_TRAINING_ROWS
        )));
    }

    let positives = labels.iter().filter(|&&y| y == 1).count();
    if positives == 0 || positives == labels.len() {
        return Err(PipelineError::InsufficientData(format!(
            "label '{}' has a single class",
            columns.label
        )));
    }

    tracing::info!(
        "Dataset shape: {} records x {} columns, {} positive ({:.1}%)",
        labels.len(),
        dataset.columns().len(),
        positives,
        positives as f64 * 100.0 / labels.len() as f64
    );
    for (name, missing) in dataset.missing_counts() {
        tracing::debug!("Missing values in '{}': {}", name, missing);
    }

    let is_id = |name: &str| {
        columns
            .id
            .as_deref()
            .is_some_and(|id| name.eq_ignore_ascii_case(id))
    };

    let mut specs = Vec::new();
    let mut training_columns = Vec::new();
    let mut encoders = BTreeMap::new();
    let mut scaler = NumericScaler::new();

    for (idx, name) in dataset.columns().iter().enumerate() {
        if idx == label_idx || is_id(name) {
            continue;
        }

        let cells = dataset.column(idx);
        let values: Vec<Value> = kept.iter().map(|&row| cells[row].clone()).collect();
        let kind = detect_kind(&values);
        let raw = fill_missing(values, kind);

        let encoded = match kind {
            FeatureKind::Categorical => {
                let encoder = CategoricalEncoder::fit(&raw);
                let codes = raw
                    .iter()
                    .map(|v| encoder.encode(v).unwrap_or(encoder.fallback_code()) as f64)
                    .collect();
                encoders.insert(name.clone(), encoder);
                codes
            }
            FeatureKind::Numeric => {
                let numbers: Vec<f64> = raw.iter().map(|v| v.as_number().unwrap_or(0.0)).collect();
                scaler.fit_column(name, &numbers);
                numbers
            }
        };

        specs.push(FeatureSpec { name: name.clone(), kind });
        training_columns.push(TrainingColumn { name: name.clone(), kind, raw, encoded });
    }

    let (numeric, categorical): (Vec<_>, Vec<_>) = specs
        .iter()
        .partition(|s| s.kind == FeatureKind::Numeric);
    tracing::info!(
        "Numeric columns: {:?}",
        numeric.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
    );
    tracing::info!(
        "Categorical columns: {:?}",
        categorical.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
    );

    let schema = FeatureSchema::new(specs);
    let matrix = build_matrix(&training_columns, &scaler, labels.len());

    let pipeline = FittedPipeline { schema, encoders, scaler };
    let table = TrainingTable {
        columns: training_columns,
        labels,
        matrix,
    };

    Ok((pipeline, table))
}

fn detect_kind(values: &[Value]) -> FeatureKind {
    let mut distinct = BTreeSet::new();
    for v in values {
        match v {
            Value::Text(_) => return FeatureKind::Categorical,
            Value::Number(_) => {
                distinct.insert(v.key());
            }
            Value::Missing => {}
        }
    }

    if distinct.len() <= CATEGORICAL_MAX_DISTINCT {
        FeatureKind::Categorical
    } else {
        FeatureKind::Numeric
    }
}

fn fill_missing(values: Vec<Value>, kind: FeatureKind) -> Vec<Value> {
    if !values.iter().any(Value::is_missing) {
        return values;
    }

    let fill = match kind {
        FeatureKind::Categorical => column_mode(&values)
            .unwrap_or_else(|| Value::Text(UNKNOWN_CATEGORY.to_string())),
        FeatureKind::Numeric => {
            let numbers: Vec<f64> = values.iter().filter_map(Value::as_number).collect();
            Value::Number(median(&numbers))
        }
    };

    values
        .into_iter()
        .map(|v| if v.is_missing() { fill.clone() } else { v })
        .collect()
}

/// Most frequent non-missing value; ties go to the smallest key
fn column_mode(values: &[Value]) -> Option<Value> {
    let mut counts: BTreeMap<String, (usize, &Value)> = BTreeMap::new();
    for v in values.iter().filter(|v| !v.is_missing()) {
        counts.entry(v.key()).or_insert((0, v)).0 += 1;
    }

    counts
        .into_iter()
        .rev()
        .max_by_key(|(_, (n, _))| *n)
        .map(|(_, (_, v))| v.clone())
}

fn median(numbers: &[f64]) -> f64 {
    if numbers.is_empty() {
        return 0.0;
    }
    let mut sorted = numbers.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn build_matrix(columns: &[TrainingColumn], scaler: &NumericScaler, rows: usize) -> Array2<f64> {
    let mut matrix = Array2::<f64>::zeros((rows, columns.len()));
    for (j, col) in columns.iter().enumerate() {
        for (i, &x) in col.encoded.iter().enumerate() {
            matrix[[i, j]] = match col.kind {
                FeatureKind::Categorical => x,
                FeatureKind::Numeric => scaler.transform(&col.name, x),
            };
        }
    }
    matrix
}

// ============================================================================
// TRANSFORM
// ============================================================================

impl FittedPipeline {
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn encoder(&self, field: &str) -> Option<&CategoricalEncoder> {
        self.encoders.get(field)
    }

    pub fn scaler(&self) -> &NumericScaler {
        &self.scaler
    }

    /// Rewrite categorical values to their learned spelling when they differ
    /// only in letter case.
    pub fn match_categories(&self, record: &mut Record) {
        for (name, value) in record.iter_mut() {
            let Some(class) = self.encoders.get(name).and_then(|e| e.class_of(value)) else {
                continue;
            };
            if class != value.key() {
                *value = Value::parse(class);
            }
        }
    }

    /// Build the feature vector for one record keyed by training column names.
    ///
    /// Output order always matches the schema.
    pub fn transform(&self, record: &Record) -> (FeatureVector, TransformReport) {
        let mut report = TransformReport::default();
        let mut values = Vec::with_capacity(self.schema.len());

        for spec in self.schema.features() {
            let value = record.get(&spec.name).filter(|v| !v.is_missing());

            let x = match spec.kind {
                FeatureKind::Categorical => {
                    let Some(encoder) = self.encoders.get(&spec.name) else {
                        values.push(0.0);
                        continue;
                    };
                    let code = match value {
                        None => {
                            report.defaulted.push(spec.name.clone());
                            encoder.mode_code()
                        }
                        Some(v) => encoder.encode(v).unwrap_or_else(|| {
                            report.unseen_categories.push((spec.name.clone(), v.key()));
                            encoder.fallback_code()
                        }),
                    };
                    code as f64
                }
                FeatureKind::Numeric => {
                    let raw = match value {
                        None => {
                            report.defaulted.push(spec.name.clone());
                            0.0
                        }
                        Some(v) => v.as_number().unwrap_or_else(|| {
                            report.coerced.push(spec.name.clone());
                            0.0
                        }),
                    };
                    self.scaler.transform(&spec.name, raw)
                }
            };

            values.push(x);
        }

        if !report.is_clean() {
            tracing::debug!("Transform degraded: {:?}", report);
        }

        (FeatureVector::new(&self.schema, values), report)
    }
}
