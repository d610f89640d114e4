use std::cmp::Ordering;

use ndarray::{Array1, Array2};

/// Impurity measure used when scoring candidate splits.
#[derive(Debug, Clone, Copy)]
pub enum SplitCriterion {
    /// Sum of squared deviations (regression).
    Variance,
    /// Gini impurity over class-index targets (classification).
    Gini {
        /// Number of distinct classes.
        classes: usize,
    },
}

/// A chosen split point. Lower `score` is better; scores are only comparable
/// within one criterion.
#[derive(Debug, Clone, Copy)]
pub struct Split {
    /// Column index to split on.
    pub feature: usize,
    /// Rows with `value <= threshold` go left.
    pub threshold: f64,
    /// Weighted child impurity.
    pub score: f64,
}

/// Finds the best split over the given rows and candidate features, or `None`
/// when no feature admits a split satisfying the leaf-size floor.
pub(crate) fn best_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    rows: &[usize],
    features: &[usize],
    criterion: SplitCriterion,
    min_samples_leaf: usize,
) -> Option<Split> {
    let mut best: Option<Split> = None;
    for &feature in features {
        let mut order = rows.to_vec();
        order.sort_by(|&a, &b| {
            x[[a, feature]]
                .partial_cmp(&x[[b, feature]])
                .unwrap_or(Ordering::Equal)
        });
        let candidate = match criterion {
            SplitCriterion::Variance => scan_variance(x, y, &order, feature, min_samples_leaf),
            SplitCriterion::Gini { classes } => {
                scan_gini(x, y, &order, feature, classes, min_samples_leaf)
            }
        };
        if let Some(split) = candidate {
            if best.as_ref().map_or(true, |b| split.score < b.score) {
                best = Some(split);
            }
        }
    }
    best
}

fn scan_variance(
    x: &Array2<f64>,
    y: &Array1<f64>,
    order: &[usize],
    feature: usize,
    min_samples_leaf: usize,
) -> Option<Split> {
    let n = order.len();
    let total_sum: f64 = order.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = order.iter().map(|&i| y[i] * y[i]).sum();
    let mut left_sum = 0.0;
    let mut left_sq = 0.0;
    let mut best: Option<Split> = None;
    for i in 1..n {
        let prev = order[i - 1];
        left_sum += y[prev];
        left_sq += y[prev] * y[prev];
        let prev_value = x[[prev, feature]];
        let value = x[[order[i], feature]];
        if value <= prev_value {
            continue;
        }
        if i < min_samples_leaf || n - i < min_samples_leaf {
            continue;
        }
        let nl = i as f64;
        let nr = (n - i) as f64;
        let right_sum = total_sum - left_sum;
        let right_sq = total_sq - left_sq;
        let score =
            (left_sq - left_sum * left_sum / nl) + (right_sq - right_sum * right_sum / nr);
        if best.as_ref().map_or(true, |b| score < b.score) {
            best = Some(Split {
                feature,
                threshold: (prev_value + value) / 2.0,
                score,
            });
        }
    }
    best
}

fn scan_gini(
    x: &Array2<f64>,
    y: &Array1<f64>,
    order: &[usize],
    feature: usize,
    classes: usize,
    min_samples_leaf: usize,
) -> Option<Split> {
    let n = order.len();
    let mut total = vec![0_usize; classes];
    for &i in order {
        total[y[i] as usize] += 1;
    }
    let mut left = vec![0_usize; classes];
    let mut best: Option<Split> = None;
    for i in 1..n {
        let prev = order[i - 1];
        left[y[prev] as usize] += 1;
        let prev_value = x[[prev, feature]];
        let value = x[[order[i], feature]];
        if value <= prev_value {
            continue;
        }
        if i < min_samples_leaf || n - i < min_samples_leaf {
            continue;
        }
        let nl = i as f64;
        let nr = (n - i) as f64;
        let left_sq: f64 = left.iter().map(|&c| (c * c) as f64).sum();
        let right_sq: f64 = total
            .iter()
            .zip(&left)
            .map(|(&t, &l)| {
                let r = t - l;
                (r * r) as f64
            })
            .sum();
        let score = nl * (1.0 - left_sq / (nl * nl)) + nr * (1.0 - right_sq / (nr * nr));
        if best.as_ref().map_or(true, |b| score < b.score) {
            best = Some(Split {
                feature,
                threshold: (prev_value + value) / 2.0,
                score,
            });
        }
    }
    best
}
