//! Classifier contract
//!
//! A trained classifier is opaque to the rest of the service: it maps a
//! feature vector to a label and, when it can, a class-1 probability.

use std::str::FromStr;

use serde::Serialize;

use crate::logic::error::{PipelineError, PipelineResult};
use crate::logic::preprocess::FeatureVector;

pub trait Classifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Layout hash of the schema the model was trained on
    fn layout_hash(&self) -> u32;

    fn n_features(&self) -> usize;

    fn predict(&self, features: &[f64]) -> u8;

    /// Class-1 probability, if the model produces one
    fn predict_proba(&self, _features: &[f64]) -> Option<f64> {
        None
    }

    /// Per-feature importances in schema order, if the model has them
    fn feature_importances(&self) -> Option<Vec<f64>> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    GradientBoosting,
    NearestCentroid,
}

impl ClassifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierKind::GradientBoosting => "gradient_boosting",
            ClassifierKind::NearestCentroid => "nearest_centroid",
        }
    }
}

impl FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gradient_boosting" | "gradient-boosting" | "gbm" => Ok(ClassifierKind::GradientBoosting),
            "nearest_centroid" | "nearest-centroid" | "centroid" => Ok(ClassifierKind::NearestCentroid),
            other => Err(format!("unknown classifier '{}'", other)),
        }
    }
}

/// Discrete label plus class-1 probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub label: u8,
    pub probability: f64,
    /// False when `probability` was derived from the label
    pub calibrated: bool,
}

/// Run one vector through the classifier.
///
/// Without a probability output the probability is the label itself
/// (`0.0` or `1.0`).
pub fn classify(vector: &FeatureVector, classifier: &dyn Classifier) -> PipelineResult<Prediction> {
    if vector.layout_hash != classifier.layout_hash() {
        return Err(PipelineError::Inference(format!(
            "feature layout {:08x} does not match model layout {:08x}",
            vector.layout_hash,
            classifier.layout_hash()
        )));
    }
    if vector.len() != classifier.n_features() {
        return Err(PipelineError::Inference(format!(
            "expected {} features, got {}",
            classifier.n_features(),
            vector.len()
        )));
    }
    if let Some(i) = vector.as_slice().iter().position(|x| !x.is_finite()) {
        return Err(PipelineError::Inference(format!("feature {} is not finite", i)));
    }

    let features = vector.as_slice();
    let label = classifier.predict(features);
    let prediction = match classifier.predict_proba(features) {
        Some(p) => Prediction {
            label,
            probability: p.clamp(0.0, 1.0),
            calibrated: true,
        },
        None => Prediction {
            label,
            probability: label as f64,
            calibrated: false,
        },
    };

    Ok(prediction)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        label: u8,
        proba: Option<f64>,
    }

    impl Classifier for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn layout_hash(&self) -> u32 {
            7
        }
        fn n_features(&self) -> usize {
            2
        }
        fn predict(&self, _features: &[f64]) -> u8 {
            self.label
        }
        fn predict_proba(&self, _features: &[f64]) -> Option<f64> {
            self.proba
        }
    }

    fn vector(values: Vec<f64>) -> FeatureVector {
        FeatureVector { layout_hash: 7, values }
    }

    #[test]
    fn test_probability_falls_back_to_label() {
        let clf = Fixed { label: 1, proba: None };
        let p = classify(&vector(vec![0.0, 1.0]), &clf).unwrap();
        assert_eq!(p.label, 1);
        assert_eq!(p.probability, 1.0);
        assert!(!p.calibrated);

        let clf = Fixed { label: 0, proba: None };
        assert_eq!(classify(&vector(vec![0.0, 1.0]), &clf).unwrap().probability, 0.0);
    }

    #[test]
    fn test_probability_passthrough() {
        let clf = Fixed { label: 1, proba: Some(0.73) };
        let p = classify(&vector(vec![0.0, 1.0]), &clf).unwrap();
        assert_eq!(p.probability, 0.73);
        assert!(p.calibrated);
    }

    #[test]
    fn test_shape_mismatch_is_inference_error() {
        let clf = Fixed { label: 1, proba: None };
        assert!(matches!(
            classify(&vector(vec![0.0]), &clf),
            Err(PipelineError::Inference(_))
        ));

        let wrong_layout = FeatureVector { layout_hash: 8, values: vec![0.0, 0.0] };
        assert!(classify(&wrong_layout, &clf).is_err());

        assert!(classify(&vector(vec![0.0, f64::NAN]), &clf).is_err());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("gradient_boosting".parse::<ClassifierKind>(), Ok(ClassifierKind::GradientBoosting));
        assert_eq!("Centroid".parse::<ClassifierKind>(), Ok(ClassifierKind::NearestCentroid));
        assert!("svm".parse::<ClassifierKind>().is_err());
    }
}
