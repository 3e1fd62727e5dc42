//! Assessment response model

use serde::Serialize;
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::logic::risk::{RiskLevel, RiskScoreBreakdown};
use crate::logic::Assessment;

#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    pub status: &'static str,
    pub assessment_id: Uuid,
    pub prediction: u8,
    pub prediction_label: &'static str,
    pub probability: f64,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<&'static str>,
    pub scoring_mode: String,
    pub breakdown: RiskScoreBreakdown,
    pub warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl AssessmentResponse {
    pub fn new(assessment: Assessment, scoring_mode: String) -> Self {
        let prediction = assessment.prediction.label;
        Self {
            status: "success",
            assessment_id: Uuid::new_v4(),
            prediction,
            prediction_label: if prediction == 1 { "Depression" } else { "No Depression" },
            probability: assessment.prediction.probability,
            risk_score: round2(assessment.risk_score),
            risk_level: assessment.risk_level,
            recommendation: assessment.recommendation,
            scoring_mode,
            breakdown: assessment.breakdown,
            warnings: assessment.warnings,
            created_at: Utc::now(),
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
