//! Model info response

use std::collections::BTreeMap;

use serde::Serialize;

use crate::logic::dataset::DataSource;
use crate::logic::preprocess::FeatureSpec;
use crate::logic::TrainingReport;

#[derive(Debug, Serialize)]
pub struct SchemaInfo {
    pub version: u8,
    pub layout_hash: String,
    pub features: Vec<FeatureSpec>,
}

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub status: &'static str,
    pub model_type: &'static str,
    pub scoring_mode: String,
    pub schema: SchemaInfo,
    pub training: TrainingReport,
    pub risk_weights: BTreeMap<String, f64>,
    pub data_source: DataSource,
}
