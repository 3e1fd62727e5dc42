//! Holdout split and metrics

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

/// Stratified train/test split.
///
/// Each class keeps at least one training row. Indices come back sorted.
pub fn stratified_split(labels: &[u8], test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [0u8, 1u8] {
        let mut idx: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == class).collect();
        if idx.is_empty() {
            continue;
        }
        idx.shuffle(&mut rng);

        let n_test = ((idx.len() as f64) * test_fraction).round() as usize;
        let n_test = n_test.min(idx.len() - 1);
        test.extend_from_slice(&idx[..n_test]);
        train.extend_from_slice(&idx[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Split row indices into `k` stratified folds.
///
/// Each class is shuffled and dealt round-robin, so fold sizes per class
/// differ by at most one. Indices within a fold come back sorted.
pub fn stratified_folds(labels: &[u8], k: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut folds = vec![Vec::new(); k.max(1)];
    let n_folds = folds.len();

    for class in [0u8, 1u8] {
        let mut idx: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == class).collect();
        idx.shuffle(&mut rng);
        for (j, i) in idx.into_iter().enumerate() {
            folds[j % n_folds].push(i);
        }
    }

    for fold in &mut folds {
        fold.sort_unstable();
    }
    folds
}

/// Holdout metrics. Precision/recall/F1 are support-weighted over both classes.
#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub test_size: usize,
    /// Mean k-fold accuracy on the training rows
    pub cv_score: Option<f64>,
}

impl Metrics {
    pub fn compute(truth: &[u8], predicted: &[u8]) -> Option<Self> {
        if truth.is_empty() || truth.len() != predicted.len() {
            return None;
        }

        let n = truth.len() as f64;
        let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();

        let (mut precision, mut recall, mut f1) = (0.0, 0.0, 0.0);
        for class in [0u8, 1u8] {
            let support = truth.iter().filter(|&&t| t == class).count();
            if support == 0 {
                continue;
            }
            let tp = truth
                .iter()
                .zip(predicted)
                .filter(|(t, p)| **t == class && **p == class)
                .count() as f64;
            let predicted_pos = predicted.iter().filter(|&&p| p == class).count() as f64;

            let p = if predicted_pos > 0.0 { tp / predicted_pos } else { 0.0 };
            let r = tp / support as f64;
            let f = if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };

            let w = support as f64 / n;
            precision += w * p;
            recall += w * r;
            f1 += w * f;
        }

        Some(Self {
            accuracy: correct as f64 / n,
            precision,
            recall,
            f1_score: f1,
            test_size: truth.len(),
            cv_score: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_is_stratified_and_deterministic() {
        let labels: Vec<u8> = (0..20).map(|i| u8::from(i % 4 == 0)).collect();
        let (train, test) = stratified_split(&labels, 0.2, 42);

        assert_eq!(train.len() + test.len(), 20);
        assert_eq!(test.len(), 4);
        assert_eq!(test.iter().filter(|&&i| labels[i] == 1).count(), 1);
        assert_eq!((train.clone(), test.clone()), stratified_split(&labels, 0.2, 42));
    }

    #[test]
    fn test_split_keeps_training_rows_per_class() {
        let labels = vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        let (train, _) = stratified_split(&labels, 0.5, 1);
        assert!(train.iter().any(|&i| labels[i] == 1));
    }

    #[test]
    fn test_zero_fraction_keeps_everything() {
        let labels = vec![0, 1, 0, 1];
        let (train, test) = stratified_split(&labels, 0.0, 1);
        assert_eq!(train, vec![0, 1, 2, 3]);
        assert!(test.is_empty());
    }

    #[test]
    fn test_folds_partition_rows() {
        let labels: Vec<u8> = (0..23).map(|i| u8::from(i % 3 == 0)).collect();
        let folds = stratified_folds(&labels, 5, 42);

        assert_eq!(folds.len(), 5);
        let mut all: Vec<usize> = folds.iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..23).collect::<Vec<_>>());

        // 8 positives over 5 folds: one or two each
        for fold in &folds {
            let positives = fold.iter().filter(|&&i| labels[i] == 1).count();
            assert!((1..=2).contains(&positives));
            assert!(fold.windows(2).all(|w| w[0] < w[1]));
        }
        assert_eq!(folds, stratified_folds(&labels, 5, 42));
    }

    #[test]
    fn test_metrics() {
        let truth = vec![1, 1, 0, 0];
        let predicted = vec![1, 0, 0, 0];
        let m = Metrics::compute(&truth, &predicted).unwrap();

        assert_eq!(m.accuracy, 0.75);
        // class 0: p=2/3 r=1, class 1: p=1 r=0.5
        assert!((m.precision - (0.5 * 2.0 / 3.0 + 0.5)).abs() < 1e-12);
        assert!((m.recall - 0.75).abs() < 1e-12);
        assert!(Metrics::compute(&[], &[]).is_none());
    }
}
