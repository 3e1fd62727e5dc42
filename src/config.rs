//! Configuration module

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::logic::model::{ClassifierKind, TrainingParams};
use crate::logic::preprocess::DatasetColumns;
use crate::logic::risk::{ScoringMode, StaticPreset};
use crate::logic::BundleOptions;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Training CSV
    pub dataset_path: String,

    pub label_column: String,

    /// Record identifier column, excluded from features. Empty disables.
    pub id_column: Option<String>,

    pub scoring_mode: ScoringMode,

    /// Point table used when `scoring_mode` is static
    pub static_preset: StaticPreset,

    pub training: TrainingParams,

    /// Allowed CORS origins. Empty means any.
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = TrainingParams::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),

            dataset_path: env::var("DATASET_PATH")
                .unwrap_or_else(|_| "Student Depression Dataset.csv".to_string()),

            label_column: env::var("LABEL_COLUMN")
                .unwrap_or_else(|_| "Depression".to_string()),

            id_column: match env::var("ID_COLUMN") {
                Ok(v) if v.trim().is_empty() => None,
                Ok(v) => Some(v),
                Err(_) => Some("id".to_string()),
            },

            scoring_mode: parse_var("SCORING_MODE", ScoringMode::DataDriven),

            static_preset: parse_var("STATIC_PRESET", StaticPreset::Standard),

            training: TrainingParams {
                classifier: parse_var("CLASSIFIER", ClassifierKind::GradientBoosting),
                n_estimators: parse_var("N_ESTIMATORS", defaults.n_estimators),
                learning_rate: parse_var("LEARNING_RATE", defaults.learning_rate),
                max_depth: parse_var("MAX_DEPTH", defaults.max_depth),
                test_fraction: parse_var("TEST_FRACTION", defaults.test_fraction),
                cv_folds: parse_var("CV_FOLDS", defaults.cv_folds),
                seed: parse_var("RANDOM_SEED", defaults.seed),
            },

            cors_origins: parse_origins(&env::var("CORS_ORIGINS").unwrap_or_default()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bundle_options(&self) -> BundleOptions {
        BundleOptions {
            columns: DatasetColumns {
                label: self.label_column.clone(),
                id: self.id_column.clone(),
            },
            training: self.training.clone(),
            scoring: self.scoring_mode,
            preset: self.static_preset,
        }
    }
}

/// Read and parse a variable, keeping the default on absence or a bad value
fn parse_var<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            tracing::warn!("Ignoring {}={:?}: {}", key, raw, e);
            default
        }),
        Err(_) => default,
    }
}

/// Comma-separated origins; `*` anywhere means any origin
fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|o| o == "*") {
        Vec::new()
    } else {
        origins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:5173, https://app.example.org"),
            vec!["http://localhost:5173", "https://app.example.org"]
        );
        assert!(parse_origins("").is_empty());
        assert!(parse_origins("http://a.test,*").is_empty());
    }

    #[test]
    fn test_parse_var_falls_back_on_garbage() {
        env::set_var("DEPRESSION_RISK_TEST_DEPTH", "deep");
        assert_eq!(parse_var("DEPRESSION_RISK_TEST_DEPTH", 3usize), 3);
        env::set_var("DEPRESSION_RISK_TEST_DEPTH", " 5 ");
        assert_eq!(parse_var("DEPRESSION_RISK_TEST_DEPTH", 3usize), 5);
        assert_eq!(parse_var("DEPRESSION_RISK_TEST_UNSET", 0.2), 0.2);
    }
}
