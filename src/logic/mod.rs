//! Core logic: preprocessing, classification and risk scoring.
//!
//! Nothing here knows about HTTP. Handlers sanitize a request into
//! `questionnaire::Answers` and call `ModelBundle::assess`.

pub mod error;
pub mod dataset;
pub mod preprocess;
pub mod model;
pub mod risk;
pub mod questionnaire;
pub mod bundle;

pub use bundle::{Assessment, BundleOptions, ModelBundle, TrainingReport};
pub use error::PipelineError;
