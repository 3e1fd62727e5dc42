//! Risk scorers
//!
//! `RiskScorer` turns one cleaned record into a weighted breakdown and a
//! 0-100 score. Two implementations: fitted weights (`DataDrivenScorer`) and
//! a fixed point table (`StaticTableScorer`).

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;

use super::presets::{ScoringTable, StaticPreset};
use super::weights::{RiskThresholds, RiskWeights};
use crate::logic::dataset::{Record, Value};
use crate::logic::preprocess::canonical_key;

/// Contribution of a non-high-risk value, relative to its weight
pub const BASELINE_FACTOR: f64 = 0.2;
pub const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    DataDriven,
    Static,
}

impl ScoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMode::DataDriven => "data_driven",
            ScoringMode::Static => "static",
        }
    }
}

impl FromStr for ScoringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "data_driven" | "data-driven" | "model" => Ok(ScoringMode::DataDriven),
            "static" | "rules" => Ok(ScoringMode::Static),
            other => Err(format!("unknown scoring mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorScore {
    pub value: Value,
    pub weight: f64,
    pub is_high_risk: bool,
    pub contribution: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskScoreBreakdown {
    pub factors: BTreeMap<String, FactorScore>,
    pub total: f64,
    pub max_possible: f64,
    /// In [0, 100]
    pub normalized: f64,
}

pub trait RiskScorer: Send + Sync {
    fn mode(&self) -> ScoringMode;

    /// Score a record keyed by training column names
    fn score(&self, record: &Record) -> RiskScoreBreakdown;

    /// Per-feature weights this scorer applies
    fn weights(&self) -> RiskWeights;

    fn describe(&self) -> String {
        self.mode().as_str().to_string()
    }
}

/// Weighted score over the features present in `record`.
///
/// Absent features add nothing but still count toward the maximum.
pub fn score(record: &Record, weights: &RiskWeights, thresholds: &RiskThresholds) -> RiskScoreBreakdown {
    let mut factors = BTreeMap::new();
    let mut total = 0.0;

    for (feature, weight) in weights.iter() {
        let Some(value) = record.get(feature).filter(|v| !v.is_missing()) else {
            continue;
        };
        let is_high_risk = thresholds.is_high_risk(feature, value);
        let contribution = weight * if is_high_risk { 1.0 } else { BASELINE_FACTOR };
        total += contribution;
        factors.insert(
            feature.to_string(),
            FactorScore {
                value: value.clone(),
                weight,
                is_high_risk,
                contribution,
            },
        );
    }

    let max_possible = weights.total();
    RiskScoreBreakdown {
        factors,
        total,
        max_possible,
        normalized: normalize(total, max_possible),
    }
}

fn normalize(total: f64, max_possible: f64) -> f64 {
    if max_possible <= 0.0 || !total.is_finite() {
        return 0.0;
    }
    (total / max_possible * MAX_SCORE).clamp(0.0, MAX_SCORE)
}

// ============================================================================
// DATA-DRIVEN
// ============================================================================

pub struct DataDrivenScorer {
    weights: RiskWeights,
    thresholds: RiskThresholds,
}

impl DataDrivenScorer {
    pub fn new(weights: RiskWeights, thresholds: RiskThresholds) -> Self {
        Self { weights, thresholds }
    }
}

impl RiskScorer for DataDrivenScorer {
    fn mode(&self) -> ScoringMode {
        ScoringMode::DataDriven
    }

    fn score(&self, record: &Record) -> RiskScoreBreakdown {
        score(record, &self.weights, &self.thresholds)
    }

    fn weights(&self) -> RiskWeights {
        self.weights.clone()
    }
}

// ============================================================================
// STATIC TABLE
// ============================================================================

pub struct StaticTableScorer {
    preset: StaticPreset,
    table: &'static ScoringTable,
}

impl StaticTableScorer {
    pub fn new(preset: StaticPreset) -> Self {
        Self {
            preset,
            table: preset.table(),
        }
    }

    fn points(&self, field: &str, value: &Value) -> f64 {
        let key = value.key();
        self.table
            .rules
            .iter()
            .filter(|r| r.field == field && r.values.contains(&key.as_str()))
            .map(|r| r.points)
            .fold(0.0, f64::max)
    }
}

impl RiskScorer for StaticTableScorer {
    fn mode(&self) -> ScoringMode {
        ScoringMode::Static
    }

    fn score(&self, record: &Record) -> RiskScoreBreakdown {
        let by_key: BTreeMap<String, (&String, &Value)> = record
            .iter()
            .filter(|(_, v)| !v.is_missing())
            .map(|(k, v)| (canonical_key(k), (k, v)))
            .collect();

        let mut factors = BTreeMap::new();
        let mut total = 0.0;
        for (field, max) in self.table.field_maxima() {
            let Some((name, value)) = by_key.get(&canonical_key(field)) else {
                continue;
            };
            let points = self.points(field, value);
            total += points;
            factors.insert(
                (*name).clone(),
                FactorScore {
                    value: (*value).clone(),
                    weight: max,
                    is_high_risk: points > 0.0,
                    contribution: points,
                },
            );
        }

        RiskScoreBreakdown {
            factors,
            total,
            max_possible: self.table.max_points,
            normalized: normalize(total, self.table.max_points),
        }
    }

    fn weights(&self) -> RiskWeights {
        RiskWeights::new(
            self.table
                .field_maxima()
                .into_iter()
                .map(|(f, p)| (f.to_string(), p))
                .collect(),
        )
    }

    fn describe(&self) -> String {
        format!("static:{}", self.preset.as_str())
    }
}
