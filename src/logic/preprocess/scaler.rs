//! Numeric scaler (standardization)

use std::collections::BTreeMap;

use serde::Serialize;

/// Below this the column is treated as constant
pub const STD_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleParams {
    pub mean: f64,
    pub std: f64,
}

impl ScaleParams {
    /// Population mean/std. A constant column gets `std = 1.0`.
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self { mean: 0.0, std: 1.0 };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        Self {
            mean,
            std: if std < STD_EPSILON { 1.0 } else { std },
        }
    }

    pub fn apply(&self, x: f64) -> f64 {
        (x - self.mean) / self.std
    }
}

/// Per-field standardization, fitted once
#[derive(Debug, Clone, Default, Serialize)]
pub struct NumericScaler {
    columns: BTreeMap<String, ScaleParams>,
}

impl NumericScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit_column(&mut self, name: &str, values: &[f64]) -> ScaleParams {
        let params = ScaleParams::fit(values);
        self.columns.insert(name.to_string(), params);
        params
    }

    pub fn params(&self, name: &str) -> Option<ScaleParams> {
        self.columns.get(name).copied()
    }

    /// Unknown columns pass through unchanged
    pub fn transform(&self, name: &str, x: f64) -> f64 {
        match self.columns.get(name) {
            Some(p) => p.apply(x),
            None => x,
        }
    }
}
