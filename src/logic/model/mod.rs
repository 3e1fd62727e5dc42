//! Model Module - classifier training and inference
//!
//! Training runs once at startup on a stratified split of the training
//! table; the held-out part only feeds the reported metrics.

pub mod classifier;
pub mod boosting;
pub mod centroid;
pub mod evaluation;

use ndarray::{Array2, Axis};
use serde::Serialize;
use validator::Validate;

use super::error::{PipelineError, PipelineResult};
use super::preprocess::TrainingTable;
pub use boosting::{BoostingParams, GradientBoostingClassifier};
pub use centroid::NearestCentroidClassifier;
pub use classifier::{classify, Classifier, ClassifierKind, Prediction};
pub use evaluation::{stratified_folds, stratified_split, Metrics};

/// Training hyper-parameters, checked before fitting
#[derive(Debug, Clone, Serialize, Validate)]
pub struct TrainingParams {
    pub classifier: ClassifierKind,

    #[validate(range(min = 1, max = 5000))]
    pub n_estimators: usize,

    #[validate(range(min = 0.001, max = 1.0))]
    pub learning_rate: f64,

    #[validate(range(min = 1, max = 12))]
    pub max_depth: usize,

    #[validate(range(min = 0.0, max = 0.5))]
    pub test_fraction: f64,

    /// Cross-validation folds on the training rows; below 2 disables
    #[validate(range(max = 20))]
    pub cv_folds: usize,

    pub seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        let boosting = BoostingParams::default();
        Self {
            classifier: ClassifierKind::GradientBoosting,
            n_estimators: boosting.n_estimators,
            learning_rate: boosting.learning_rate,
            max_depth: boosting.max_depth,
            test_fraction: 0.2,
            cv_folds: 5,
            seed: 42,
        }
    }
}

impl TrainingParams {
    fn boosting(&self) -> BoostingParams {
        BoostingParams {
            n_estimators: self.n_estimators,
            learning_rate: self.learning_rate,
            max_depth: self.max_depth,
            ..BoostingParams::default()
        }
    }
}

pub struct TrainedModel {
    pub classifier: Box<dyn Classifier>,
    pub metrics: Option<Metrics>,
    pub train_size: usize,
}

/// Fit the configured classifier and score it on the holdout rows
pub fn train(
    table: &TrainingTable,
    layout_hash: u32,
    params: &TrainingParams,
) -> PipelineResult<TrainedModel> {
    params
        .validate()
        .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;

    let (train_idx, test_idx) = stratified_split(&table.labels, params.test_fraction, params.seed);
    let x_train = table.matrix.select(Axis(0), &train_idx);
    let y_train: Vec<u8> = train_idx.iter().map(|&i| table.labels[i]).collect();

    tracing::info!(
        "Training {} on {} rows ({} held out)",
        params.classifier.as_str(),
        train_idx.len(),
        test_idx.len()
    );

    let classifier = fit_classifier(&x_train, &y_train, layout_hash, params)?;

    let truth: Vec<u8> = test_idx.iter().map(|&i| table.labels[i]).collect();
    let predicted: Vec<u8> = test_idx
        .iter()
        .map(|&i| {
            let row = table.matrix.row(i).to_vec();
            classifier.predict(&row)
        })
        .collect();
    let cv_score = cross_val_accuracy(&x_train, &y_train, layout_hash, params);
    let metrics = Metrics::compute(&truth, &predicted).map(|m| Metrics { cv_score, ..m });

    match &metrics {
        Some(m) => tracing::info!(
            "Holdout metrics: accuracy {:.4}, precision {:.4}, recall {:.4}, f1 {:.4}, cv {}",
            m.accuracy,
            m.precision,
            m.recall,
            m.f1_score,
            m.cv_score.map_or_else(|| "n/a".to_string(), |s| format!("{:.4}", s))
        ),
        None => tracing::warn!("No holdout rows, metrics unavailable"),
    }

    Ok(TrainedModel {
        classifier,
        metrics,
        train_size: train_idx.len(),
    })
}

fn fit_classifier(
    x: &Array2<f64>,
    y: &[u8],
    layout_hash: u32,
    params: &TrainingParams,
) -> PipelineResult<Box<dyn Classifier>> {
    Ok(match params.classifier {
        ClassifierKind::GradientBoosting => Box::new(GradientBoostingClassifier::fit(
            x,
            y,
            layout_hash,
            &params.boosting(),
        )?),
        ClassifierKind::NearestCentroid => {
            Box::new(NearestCentroidClassifier::fit(x, y, layout_hash)?)
        }
    })
}

/// Mean accuracy over stratified folds of the training rows.
///
/// `None` when disabled, when a class has fewer rows than folds, or when a
/// fold fails to fit.
fn cross_val_accuracy(
    x: &Array2<f64>,
    y: &[u8],
    layout_hash: u32,
    params: &TrainingParams,
) -> Option<f64> {
    let k = params.cv_folds;
    if k < 2 {
        return None;
    }
    let smallest = [0u8, 1u8]
        .iter()
        .map(|&c| y.iter().filter(|&&v| v == c).count())
        .min()
        .unwrap_or(0);
    if smallest < k {
        tracing::warn!(
            "Skipping {}-fold cross-validation: smallest class has {} rows",
            k,
            smallest
        );
        return None;
    }

    let mut total = 0.0;
    for held in stratified_folds(y, k, params.seed) {
        let fit_idx: Vec<usize> = (0..y.len()).filter(|i| held.binary_search(i).is_err()).collect();
        let y_fit: Vec<u8> = fit_idx.iter().map(|&i| y[i]).collect();
        let model = match fit_classifier(&x.select(Axis(0), &fit_idx), &y_fit, layout_hash, params) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Cross-validation fold failed to fit: {}", e);
                return None;
            }
        };

        let correct = held
            .iter()
            .filter(|&&i| model.predict(&x.row(i).to_vec()) == y[i])
            .count();
        total += correct as f64 / held.len() as f64;
    }

    Some(total / k as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::dataset::synthetic;
    use crate::logic::preprocess::{fit, DatasetColumns};

    fn table() -> (TrainingTable, u32) {
        let (pipeline, table) = fit(&synthetic::dataset().unwrap(), &DatasetColumns::default()).unwrap();
        (table, pipeline.schema().layout_hash())
    }

    #[test]
    fn test_train_boosting_on_synthetic_data() {
        let (table, hash) = table();
        let model = train(&table, hash, &TrainingParams::default()).unwrap();

        assert_eq!(model.classifier.name(), "gradient_boosting");
        assert_eq!(model.classifier.layout_hash(), hash);
        assert_eq!(model.classifier.n_features(), table.columns.len());
        assert!(model.metrics.is_some());
        assert!(model.train_size < table.n_rows());
    }

    #[test]
    fn test_cross_validation_score_reported() {
        let (table, hash) = table();
        let model = train(&table, hash, &TrainingParams::default()).unwrap();

        let cv = model.metrics.unwrap().cv_score.unwrap();
        assert!((0.0..=1.0).contains(&cv));
    }

    #[test]
    fn test_cross_validation_disabled_or_too_few_rows() {
        let (table, hash) = table();
        let disabled = TrainingParams {
            cv_folds: 0,
            ..TrainingParams::default()
        };
        let model = train(&table, hash, &disabled).unwrap();
        assert!(model.metrics.unwrap().cv_score.is_none());

        // 10 training rows per class cannot fill 12 folds
        let too_many = TrainingParams {
            cv_folds: 12,
            ..TrainingParams::default()
        };
        let model = train(&table, hash, &too_many).unwrap();
        assert!(model.metrics.unwrap().cv_score.is_none());
    }

    #[test]
    fn test_train_centroid() {
        let (table, hash) = table();
        let params = TrainingParams {
            classifier: ClassifierKind::NearestCentroid,
            ..TrainingParams::default()
        };
        let model = train(&table, hash, &params).unwrap();

        assert_eq!(model.classifier.name(), "nearest_centroid");
        assert!(model.classifier.feature_importances().is_none());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let (table, hash) = table();
        let params = TrainingParams {
            learning_rate: 5.0,
            ..TrainingParams::default()
        };
        assert!(matches!(
            train(&table, hash, &params),
            Err(PipelineError::InvalidConfig(_))
        ));
    }
}
