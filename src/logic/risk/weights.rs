//! Data-driven risk weights
//!
//! Per feature: |correlation| with the label, odds ratio for two-valued
//! discrete features, and per-value label rates. Values whose rate is above
//! `mean + std` of the per-value rates are high-risk. A chi-square test of
//! independence between value and label is reported alongside.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::logic::dataset::Value;
use crate::logic::preprocess::{TrainingColumn, TrainingTable};

pub const MIN_WEIGHT: f64 = 0.1;
pub const MAX_WEIGHT: f64 = 3.0;
const ODDS_EPSILON: f64 = 1e-8;
/// p-value below which a feature counts as significant
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Feature → non-negative weight
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskWeights {
    weights: BTreeMap<String, f64>,
}

impl RiskWeights {
    pub fn new(weights: BTreeMap<String, f64>) -> Self {
        Self { weights }
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        self.weights.get(feature).copied()
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Feature → set of high-risk value keys
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskThresholds {
    values: BTreeMap<String, BTreeSet<String>>,
}

impl RiskThresholds {
    pub fn is_high_risk(&self, feature: &str, value: &Value) -> bool {
        self.values
            .get(feature)
            .is_some_and(|set| set.contains(&value.key()))
    }

    #[cfg(test)]
    pub fn values(&self, feature: &str) -> Vec<String> {
        self.values
            .get(feature)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn insert(&mut self, feature: &str, keys: impl IntoIterator<Item = String>) {
        self.values.entry(feature.to_string()).or_default().extend(keys);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValueRate {
    pub value: String,
    pub count: usize,
    pub positives: usize,
    pub rate: f64,
}

/// Statistics behind one feature's weight
#[derive(Debug, Clone, Serialize)]
pub struct FeatureStats {
    pub correlation: f64,
    pub odds_ratio: f64,
    pub log_odds: f64,
    pub rate_range: f64,
    pub high_risk_values: Vec<String>,
    pub value_rates: Vec<ValueRate>,
    /// `None` when the value × label table has a single row or column
    pub chi_square: Option<ChiSquareTest>,
}

/// Pearson chi-square test of independence between a feature and the label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub dof: usize,
    pub p_value: f64,
    pub significant: bool,
}

/// Fit weights and high-risk values on the cleaned training table.
///
/// Degenerate inputs (no features, constant columns, constant labels) yield
/// finite weights instead of errors.
pub fn fit_weights(
    table: &TrainingTable,
) -> (RiskWeights, RiskThresholds, BTreeMap<String, FeatureStats>) {
    let labels: Vec<f64> = table.labels.iter().map(|&y| y as f64).collect();

    let stats: BTreeMap<String, FeatureStats> = table
        .columns
        .iter()
        .map(|col| (col.name.clone(), feature_stats(col, &table.labels, &labels)))
        .collect();

    let max_corr = stats
        .values()
        .map(|s| s.correlation)
        .fold(0.0_f64, f64::max);
    let max_corr = if max_corr > 0.0 { max_corr } else { 1.0 };

    let mut weights = BTreeMap::new();
    let mut thresholds = RiskThresholds::default();
    for (name, s) in &stats {
        let normalized = s.correlation / max_corr * 2.0;
        let weight = normalized * (1.0 + s.rate_range) * (1.0 + s.log_odds / 10.0);
        weights.insert(name.clone(), weight.clamp(MIN_WEIGHT, MAX_WEIGHT));
        thresholds.insert(name, s.high_risk_values.iter().cloned());
    }

    (RiskWeights::new(weights), thresholds, stats)
}

fn feature_stats(col: &TrainingColumn, labels: &[u8], labels_f: &[f64]) -> FeatureStats {
    let correlation = pearson(&col.encoded, labels_f);
    let correlation = if correlation.is_nan() { 0.0 } else { correlation.abs() };

    // value key → (encoded, count, positives)
    let mut groups: BTreeMap<String, (f64, usize, usize)> = BTreeMap::new();
    for ((raw, &enc), &y) in col.raw.iter().zip(&col.encoded).zip(labels) {
        let entry = groups.entry(raw.key()).or_insert((enc, 0, 0));
        entry.1 += 1;
        entry.2 += y as usize;
    }

    let mut value_rates: Vec<(f64, ValueRate)> = groups
        .into_iter()
        .map(|(value, (enc, count, positives))| {
            let rate = positives as f64 / count as f64;
            (enc, ValueRate { value, count, positives, rate })
        })
        .collect();
    value_rates.sort_by(|a, b| a.0.total_cmp(&b.0));
    let value_rates: Vec<ValueRate> = value_rates.into_iter().map(|(_, v)| v).collect();

    let odds_ratio = odds_ratio(&value_rates, labels);
    let log_odds = if odds_ratio > 0.0 { odds_ratio.ln().abs() } else { 0.0 };

    let rates: Vec<f64> = value_rates.iter().map(|v| v.rate).collect();
    let rate_range = rates.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
        - rates.iter().cloned().fold(f64::INFINITY, f64::min);
    let rate_range = if rate_range.is_finite() { rate_range } else { 0.0 };

    let high_risk_values = match sample_std(&rates) {
        Some(std) => {
            let cutoff = mean(&rates) + std;
            value_rates
                .iter()
                .filter(|v| v.rate > cutoff)
                .map(|v| v.value.clone())
                .collect()
        }
        None => Vec::new(),
    };

    let chi_square = chi_square(&value_rates);
    if let Some(test) = &chi_square {
        tracing::debug!(
            "{}: chi-square {:.4} (dof {}), p-value {:.6}{}",
            col.name,
            test.statistic,
            test.dof,
            test.p_value,
            if test.significant { ", significant" } else { "" }
        );
    }

    FeatureStats {
        correlation,
        odds_ratio,
        log_odds,
        rate_range,
        high_risk_values,
        value_rates,
        chi_square,
    }
}

/// Chi-square over the value × label counts.
///
/// One degree of freedom gets the Yates continuity correction.
fn chi_square(value_rates: &[ValueRate]) -> Option<ChiSquareTest> {
    let n: usize = value_rates.iter().map(|v| v.count).sum();
    let positives: usize = value_rates.iter().map(|v| v.positives).sum();
    if value_rates.len() < 2 || positives == 0 || positives == n {
        return None;
    }

    let dof = value_rates.len() - 1;
    let n = n as f64;
    let label_totals = [n - positives as f64, positives as f64];

    let mut statistic = 0.0;
    for v in value_rates {
        let observed = [(v.count - v.positives) as f64, v.positives as f64];
        for (o, total) in observed.iter().zip(label_totals) {
            let expected = v.count as f64 * total / n;
            let diff = (o - expected).abs();
            let diff = if dof == 1 { (diff - 0.5).max(0.0) } else { diff };
            statistic += diff * diff / expected;
        }
    }

    let p_value = ChiSquared::new(dof as f64).ok()?.sf(statistic);
    Some(ChiSquareTest {
        statistic,
        dof,
        p_value,
        significant: p_value < SIGNIFICANCE_LEVEL,
    })
}

/// Odds ratio of a 2×2 contingency table; 1.0 for any other shape
fn odds_ratio(value_rates: &[ValueRate], labels: &[u8]) -> f64 {
    let label_classes = labels.iter().collect::<BTreeSet<_>>().len();
    if value_rates.len() != 2 || label_classes != 2 {
        return 1.0;
    }

    let (first, second) = (&value_rates[0], &value_rates[1]);
    let a = (first.count - first.positives) as f64;
    let b = first.positives as f64;
    let c = (second.count - second.positives) as f64;
    let d = second.positives as f64;

    (a * d) / (b * c + ODDS_EPSILON)
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

fn sample_std(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    Some(var.sqrt())
}

/// Pearson correlation; NaN when either side has zero variance
fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return f64::NAN;
    }
    let (mx, my) = (mean(xs), mean(ys));
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    sxy / (sxx.sqrt() * syy.sqrt())
}
