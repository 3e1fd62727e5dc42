//! Nearest-centroid classifier
//!
//! Light alternative to boosting. Has no probability output, so callers get
//! the label as probability.

use ndarray::{Array1, Array2, Axis};

use super::classifier::Classifier;
use crate::logic::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone)]
pub struct NearestCentroidClassifier {
    layout_hash: u32,
    centroids: [Array1<f64>; 2],
}

impl NearestCentroidClassifier {
    pub fn fit(x: &Array2<f64>, y: &[u8], layout_hash: u32) -> PipelineResult<Self> {
        if x.nrows() != y.len() {
            return Err(PipelineError::InsufficientData(format!(
                "{} rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }

        let centroid = |class: u8| -> PipelineResult<Array1<f64>> {
            let rows: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
            x.select(Axis(0), &rows).mean_axis(Axis(0)).ok_or_else(|| {
                PipelineError::InsufficientData(format!("no training rows for class {}", class))
            })
        };

        Ok(Self {
            layout_hash,
            centroids: [centroid(0)?, centroid(1)?],
        })
    }

    fn distance(&self, class: usize, features: &[f64]) -> f64 {
        self.centroids[class]
            .iter()
            .zip(features)
            .map(|(c, x)| (c - x).powi(2))
            .sum()
    }
}

impl Classifier for NearestCentroidClassifier {
    fn name(&self) -> &'static str {
        "nearest_centroid"
    }

    fn layout_hash(&self) -> u32 {
        self.layout_hash
    }

    fn n_features(&self) -> usize {
        self.centroids[0].len()
    }

    fn predict(&self, features: &[f64]) -> u8 {
        u8::from(self.distance(1, features) < self.distance(0, features))
    }
}
