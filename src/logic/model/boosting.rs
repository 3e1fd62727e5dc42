//! Gradient-boosted decision trees (binary log-loss)
//!
//! Each round fits a depth-limited regression tree to the log-loss gradient
//! using histogram split search over pre-binned feature values, with Newton
//! leaf values. Deterministic: no row or feature subsampling.

use ndarray::Array2;
use serde::Serialize;

use super::classifier::Classifier;
use crate::logic::error::{PipelineError, PipelineResult};

// ============================================================================
// CONSTANTS
// ============================================================================

const L2_REG: f64 = 1.0;
const MIN_SPLIT_GAIN: f64 = 1e-9;
const MIN_HESSIAN: f64 = 1e-12;
const PROBA_CLIP: f64 = 1e-6;

#[derive(Debug, Clone, Serialize)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub max_bins: usize,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            max_bins: 64,
        }
    }
}

// ============================================================================
// TREES
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn predict_with(&self, feature: impl Fn(usize) -> f64) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                Node::Leaf(v) => return v,
                Node::Split { feature: f, threshold, left, right } => {
                    i = if feature(f) <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Feature values mapped to histogram bins. Bin `b` holds values in
/// `(thresholds[b-1], thresholds[b]]`.
struct BinnedFeature {
    thresholds: Vec<f64>,
    bins: Vec<usize>,
}

fn bin_column(values: &[f64], max_bins: usize) -> BinnedFeature {
    let mut unique: Vec<f64> = values.to_vec();
    unique.sort_by(|a, b| a.total_cmp(b));
    unique.dedup();

    let midpoints: Vec<f64> = unique.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    let keep = max_bins.saturating_sub(1).max(1);
    let thresholds = if midpoints.len() > keep {
        let m = midpoints.len();
        let mut picked: Vec<f64> = (0..keep).map(|k| midpoints[k * m / keep]).collect();
        picked.dedup();
        picked
    } else {
        midpoints
    };

    let bins = values
        .iter()
        .map(|&x| thresholds.partition_point(|&t| t < x))
        .collect();

    BinnedFeature { thresholds, bins }
}

struct SplitCandidate {
    feature: usize,
    bin: usize,
    gain: f64,
}

struct TreeBuilder<'a> {
    binned: &'a [BinnedFeature],
    grad: &'a [f64],
    hess: &'a [f64],
    params: &'a BoostingParams,
    importances: &'a mut [f64],
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    fn build(&mut self, rows: &[usize], depth: usize) -> usize {
        let g: f64 = rows.iter().map(|&r| self.grad[r]).sum();
        let h: f64 = rows.iter().map(|&r| self.hess[r]).sum();

        let split = if depth < self.params.max_depth
            && rows.len() >= 2 * self.params.min_samples_leaf
        {
            self.best_split(rows, g, h)
        } else {
            None
        };

        let Some(split) = split else {
            self.nodes.push(Node::Leaf(g / (h + L2_REG)));
            return self.nodes.len() - 1;
        };

        self.importances[split.feature] += split.gain;

        let feature = &self.binned[split.feature];
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .copied()
            .partition(|&r| feature.bins[r] <= split.bin);
        let threshold = feature.thresholds[split.bin];

        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf(0.0));
        let left = self.build(&left_rows, depth + 1);
        let right = self.build(&right_rows, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold,
            left,
            right,
        };
        idx
    }

    fn best_split(&self, rows: &[usize], g: f64, h: f64) -> Option<SplitCandidate> {
        let parent = g * g / (h + L2_REG);
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<SplitCandidate> = None;

        for (f, feature) in self.binned.iter().enumerate() {
            let n_bins = feature.thresholds.len() + 1;
            if n_bins < 2 {
                continue;
            }

            let mut hist_g = vec![0.0; n_bins];
            let mut hist_h = vec![0.0; n_bins];
            let mut hist_n = vec![0usize; n_bins];
            for &r in rows {
                let b = feature.bins[r];
                hist_g[b] += self.grad[r];
                hist_h[b] += self.hess[r];
                hist_n[b] += 1;
            }

            let (mut gl, mut hl, mut nl) = (0.0, 0.0, 0usize);
            for b in 0..n_bins - 1 {
                gl += hist_g[b];
                hl += hist_h[b];
                nl += hist_n[b];
                let nr = rows.len() - nl;
                if nl < min_leaf || nr < min_leaf {
                    continue;
                }

                let (gr, hr) = (g - gl, h - hl);
                let gain = gl * gl / (hl + L2_REG) + gr * gr / (hr + L2_REG) - parent;
                if gain > MIN_SPLIT_GAIN && best.as_ref().map_or(true, |s| gain > s.gain) {
                    best = Some(SplitCandidate { feature: f, bin: b, gain });
                }
            }
        }

        best
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

#[derive(Debug, Clone)]
pub struct GradientBoostingClassifier {
    layout_hash: u32,
    n_features: usize,
    init_score: f64,
    learning_rate: f64,
    trees: Vec<Tree>,
    importances: Vec<f64>,
}

impl GradientBoostingClassifier {
    pub fn fit(
        x: &Array2<f64>,
        y: &[u8],
        layout_hash: u32,
        params: &BoostingParams,
    ) -> PipelineResult<Self> {
        let (n_rows, n_features) = x.dim();
        if n_rows == 0 || n_rows != y.len() {
            return Err(PipelineError::InsufficientData(format!(
                "boosting needs matching rows and labels, got {} rows and {} labels",
                n_rows,
                y.len()
            )));
        }

        let binned: Vec<BinnedFeature> = (0..n_features)
            .map(|f| bin_column(&x.column(f).to_vec(), params.max_bins))
            .collect();

        let base_rate = (y.iter().map(|&v| v as f64).sum::<f64>() / n_rows as f64)
            .clamp(PROBA_CLIP, 1.0 - PROBA_CLIP);
        let init_score = (base_rate / (1.0 - base_rate)).ln();

        let mut raw = vec![init_score; n_rows];
        let mut grad = vec![0.0; n_rows];
        let mut hess = vec![0.0; n_rows];
        let mut importances = vec![0.0; n_features];
        let mut trees = Vec::with_capacity(params.n_estimators);
        let all_rows: Vec<usize> = (0..n_rows).collect();

        for _ in 0..params.n_estimators {
            for i in 0..n_rows {
                let p = sigmoid(raw[i]);
                grad[i] = y[i] as f64 - p;
                hess[i] = (p * (1.0 - p)).max(MIN_HESSIAN);
            }

            let mut builder = TreeBuilder {
                binned: &binned,
                grad: &grad,
                hess: &hess,
                params,
                importances: &mut importances,
                nodes: Vec::new(),
            };
            builder.build(&all_rows, 0);
            let tree = Tree { nodes: builder.nodes };

            for (i, score) in raw.iter_mut().enumerate() {
                *score += params.learning_rate * tree.predict_with(|f| x[[i, f]]);
            }
            trees.push(tree);
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        tracing::debug!(
            "Gradient boosting fitted: {} trees, {} features, base rate {:.3}",
            trees.len(),
            n_features,
            base_rate
        );

        Ok(Self {
            layout_hash,
            n_features,
            init_score,
            learning_rate: params.learning_rate,
            trees,
            importances,
        })
    }

    fn raw_score(&self, features: &[f64]) -> f64 {
        self.init_score
            + self.learning_rate
                * self
                    .trees
                    .iter()
                    .map(|t| t.predict_with(|f| features[f]))
                    .sum::<f64>()
    }

    #[cfg(test)]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for GradientBoostingClassifier {
    fn name(&self) -> &'static str {
        "gradient_boosting"
    }

    fn layout_hash(&self) -> u32 {
        self.layout_hash
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> u8 {
        u8::from(sigmoid(self.raw_score(features)) >= 0.5)
    }

    fn predict_proba(&self, features: &[f64]) -> Option<f64> {
        Some(sigmoid(self.raw_score(features)))
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        Some(self.importances.clone())
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
