use serde::{Deserialize, Serialize};

/// Scores from the most recent training run. All fields are absent until the
/// first successful run; serialized as flat key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// R² of the fish-stock regressor on the held-out fold.
    pub regression_r2: Option<f64>,
    /// Accuracy of the risk classifier on the held-out fold.
    pub classification_accuracy: Option<f64>,
    /// Weighted-average F1 of the risk classifier on the held-out fold.
    pub classification_f1: Option<f64>,
}

/// Coefficient of determination. A constant target yields 1.0 for perfect
/// predictions and 0.0 otherwise; empty or mismatched inputs yield 0.0.
#[must_use]
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean) * (a - mean)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Fraction of exactly matching labels; empty input yields 0.0.
#[must_use]
pub fn accuracy(actual: &[usize], predicted: &[usize]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return 0.0;
    }
    let matches = actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| a == p)
        .count();
    matches as f64 / actual.len() as f64
}

/// F1 averaged over classes, weighted by true-label support. Classes with a
/// zero precision+recall denominator contribute zero.
#[must_use]
pub fn weighted_f1(actual: &[usize], predicted: &[usize], classes: usize) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() || classes == 0 {
        return 0.0;
    }
    let mut true_positive = vec![0_usize; classes];
    let mut false_positive = vec![0_usize; classes];
    let mut false_negative = vec![0_usize; classes];
    for (&a, &p) in actual.iter().zip(predicted) {
        if a == p {
            true_positive[a] += 1;
        } else {
            false_positive[p] += 1;
            false_negative[a] += 1;
        }
    }
    let mut weighted = 0.0;
    for class in 0..classes {
        let support = true_positive[class] + false_negative[class];
        if support == 0 {
            continue;
        }
        let tp = true_positive[class] as f64;
        let precision_den = tp + false_positive[class] as f64;
        let recall_den = tp + false_negative[class] as f64;
        let precision = if precision_den == 0.0 {
            0.0
        } else {
            tp / precision_den
        };
        let recall = tp / recall_den;
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        weighted += f1 * support as f64 / actual.len() as f64;
    }
    weighted
}
