//! Model info handler

use axum::{extract::State, Json};

use crate::models::{ModelInfoResponse, SchemaInfo};
use crate::AppState;

pub async fn info(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    let bundle = &state.bundle;
    let schema = bundle.schema();

    Json(ModelInfoResponse {
        status: "success",
        model_type: bundle.classifier().name(),
        scoring_mode: bundle.scorer().describe(),
        schema: SchemaInfo {
            version: schema.version(),
            layout_hash: format!("{:08x}", schema.layout_hash()),
            features: schema.features().to_vec(),
        },
        training: bundle.report().clone(),
        risk_weights: bundle
            .scorer()
            .weights()
            .iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        data_source: bundle.data_source().clone(),
    })
}
