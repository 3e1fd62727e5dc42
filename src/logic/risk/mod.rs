//! Risk Scoring Engine
//!
//! Weighted rule-based score that accompanies the classifier output.

pub mod weights;
pub mod scorer;
pub mod presets;


pub use presets::StaticPreset;
pub use scorer::{
    DataDrivenScorer, RiskScoreBreakdown, RiskScorer, ScoringMode, StaticTableScorer,
};
pub use weights::{fit_weights, FeatureStats, RiskThresholds};

use serde::Serialize;

/// Coarse band for a normalized score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score > 70.0 {
            RiskLevel::Critical
        } else if score > 50.0 {
            RiskLevel::High
        } else if score > 30.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

pub const RECOMMENDATION_THRESHOLD: f64 = 50.0;
pub const RECOMMENDATION: &str =
    "Your responses indicate elevated risk. Please consider consulting a mental health professional.";

/// Consultation advice, attached only above the threshold
pub fn recommendation(score: f64) -> Option<&'static str> {
    (score > RECOMMENDATION_THRESHOLD).then_some(RECOMMENDATION)
}
