//! Prediction handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;

use crate::logic::questionnaire;
use crate::models::AssessmentResponse;
use crate::{AppResult, AppState};

/// Assess one questionnaire
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<AssessmentResponse>> {
    let Json(body) = payload?;
    let answers = questionnaire::sanitize(&body)?;

    let assessment = state.bundle.assess(&answers)?;
    let response = AssessmentResponse::new(assessment, state.bundle.scorer().describe());

    tracing::info!(
        "Assessment {}: prediction {}, risk {:.1} ({})",
        response.assessment_id,
        response.prediction,
        response.risk_score,
        response.risk_level.as_str()
    );
    if !response.warnings.is_empty() {
        tracing::debug!("Assessment {} warnings: {:?}", response.assessment_id, response.warnings);
    }

    Ok(Json(response))
}
