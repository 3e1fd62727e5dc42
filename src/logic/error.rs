//! Pipeline errors
//!
//! Training-time errors fail loud. Per-request degradations (missing field,
//! unseen category) never reach this type; they are recorded in a
//! `TransformReport` instead.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Dataset file missing or unreadable. Recovered by the synthetic fallback.
    #[error("failed to load dataset from {path}: {reason}")]
    DatasetLoad { path: String, reason: String },

    /// Not enough rows or classes to fit. Fatal at startup.
    #[error("insufficient training data: {0}")]
    InsufficientData(String),

    /// Training parameters rejected before fitting.
    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),

    /// Vector shape/type does not match the fitted classifier.
    #[error("inference failed: {0}")]
    Inference(String),
}

impl PipelineError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PipelineError::DatasetLoad { .. })
    }
}
