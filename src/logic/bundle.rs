//! Model bundle
//!
//! Everything fitted at startup, frozen together: preprocessing state,
//! classifier, risk scorer and the training report. Built once, then shared
//! read-only by every request.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::dataset::{DataSource, Dataset};
use super::error::PipelineResult;
use super::model::{self, classify, Classifier, Metrics, Prediction, TrainingParams};
use super::preprocess::{self, DatasetColumns, FeatureSchema, FittedPipeline};
use super::questionnaire::{Answers, QUESTIONNAIRE};
use super::risk::{
    fit_weights, recommendation, DataDrivenScorer, FeatureStats, RiskLevel, RiskScoreBreakdown,
    RiskScorer, RiskThresholds, ScoringMode, StaticPreset, StaticTableScorer,
};

#[derive(Debug, Clone)]
pub struct BundleOptions {
    pub columns: DatasetColumns,
    pub training: TrainingParams,
    pub scoring: ScoringMode,
    pub preset: StaticPreset,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            columns: DatasetColumns::default(),
            training: TrainingParams::default(),
            scoring: ScoringMode::DataDriven,
            preset: StaticPreset::Standard,
        }
    }
}

/// What training produced, for `/model-info`
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub classifier: &'static str,
    pub params: TrainingParams,
    pub metrics: Option<Metrics>,
    pub feature_importances: Option<BTreeMap<String, f64>>,
    pub feature_stats: BTreeMap<String, FeatureStats>,
    pub rows: usize,
    pub positives: usize,
    pub train_size: usize,
    pub trained_at: DateTime<Utc>,
}

/// Outcome of one questionnaire
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub prediction: Prediction,
    pub breakdown: RiskScoreBreakdown,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub recommendation: Option<&'static str>,
    pub warnings: Vec<String>,
}

pub struct ModelBundle {
    pipeline: FittedPipeline,
    classifier: Box<dyn Classifier>,
    scorer: Box<dyn RiskScorer>,
    report: TrainingReport,
    data_source: DataSource,
}

impl ModelBundle {
    /// Fit every component on `dataset`
    pub fn fit(dataset: &Dataset, data_source: DataSource, options: &BundleOptions) -> PipelineResult<Self> {
        let (pipeline, table) = preprocess::fit(dataset, &options.columns)?;
        let schema = pipeline.schema();
        let trained = model::train(&table, schema.layout_hash(), &options.training)?;

        let (weights, thresholds, feature_stats) = fit_weights(&table);
        let scorer: Box<dyn RiskScorer> = match options.scoring {
            ScoringMode::DataDriven => {
                let thresholds = with_declared_indicators(thresholds, schema);
                Box::new(DataDrivenScorer::new(weights, thresholds))
            }
            ScoringMode::Static => Box::new(StaticTableScorer::new(options.preset)),
        };

        let feature_importances = trained.classifier.feature_importances().map(|imp| {
            schema
                .names()
                .map(str::to_string)
                .zip(imp)
                .collect::<BTreeMap<_, _>>()
        });

        let report = TrainingReport {
            classifier: trained.classifier.name(),
            params: options.training.clone(),
            metrics: trained.metrics,
            feature_importances,
            feature_stats,
            rows: table.n_rows(),
            positives: table.positives(),
            train_size: trained.train_size,
            trained_at: Utc::now(),
        };

        tracing::info!(
            "Model ready: {} on {} rows ({} data), scoring {}",
            report.classifier,
            report.rows,
            data_source.label(),
            scorer.describe()
        );

        Ok(Self {
            pipeline,
            classifier: trained.classifier,
            scorer,
            report,
            data_source,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.pipeline.schema()
    }

    pub fn pipeline(&self) -> &FittedPipeline {
        &self.pipeline
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn scorer(&self) -> &dyn RiskScorer {
        self.scorer.as_ref()
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    pub fn data_source(&self) -> &DataSource {
        &self.data_source
    }

    /// Classify and score one set of answers
    pub fn assess(&self, answers: &Answers) -> PipelineResult<Assessment> {
        let mut record = answers.remap(self.schema());
        self.pipeline.match_categories(&mut record);
        let (vector, report) = self.pipeline.transform(&record);
        let prediction = classify(&vector, self.classifier.as_ref())?;
        let breakdown = self.scorer.score(&record);

        let mut warnings: Vec<String> = answers
            .dropped()
            .iter()
            .map(|f| format!("'{}' is not a questionnaire field, ignored", f))
            .collect();
        warnings.extend(report.warnings());

        let risk_score = breakdown.normalized;
        Ok(Assessment {
            prediction,
            breakdown,
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            recommendation: recommendation(risk_score),
            warnings,
        })
    }
}

/// Add the questionnaire's known risk answers to the fitted thresholds
fn with_declared_indicators(mut thresholds: RiskThresholds, schema: &FeatureSchema) -> RiskThresholds {
    for spec in QUESTIONNAIRE.iter().filter(|f| !f.high_risk.is_empty()) {
        if let Some(column) = schema.resolve(spec.name) {
            thresholds.insert(column, spec.high_risk.iter().map(|v| v.to_string()));
        }
    }
    thresholds
}
