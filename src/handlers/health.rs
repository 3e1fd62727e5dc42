//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    data_source: &'static str,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        data_source: state.bundle.data_source().label(),
    })
}

/// Service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "Student Depression Risk API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "GET /": "This banner",
            "GET /health": "Liveness and data source",
            "POST /api/predict": "Assess a questionnaire",
            "POST /predict": "Alias of /api/predict",
            "GET /model-info": "Schema, metrics and risk weights"
        }
    }))
}
