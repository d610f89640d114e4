//! From-scratch CART decision trees and bootstrap-bagged random forests.

/// Bagged ensembles for regression and classification.
pub mod ensemble;
/// Split-point search over a feature subset.
pub mod split;
/// Single decision tree growth and prediction.
pub mod tree;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ensemble::{RandomForestClassifier, RandomForestRegressor};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, Node};

/// How many features each split considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Every feature (scikit-style regressor default).
    All,
    /// `max(1, floor(sqrt(p)))` features (scikit-style classifier default).
    Sqrt,
}

impl MaxFeatures {
    /// Number of candidate features for a matrix with `features` columns.
    #[must_use]
    pub fn candidates(self, features: usize) -> usize {
        match self {
            Self::All => features,
            Self::Sqrt => ((features as f64).sqrt().floor() as usize).max(1),
        }
    }
}

/// Forest hyperparameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the ensemble.
    pub trees: usize,
    /// Maximum tree depth; `None` grows until purity.
    pub max_depth: Option<usize>,
    /// Minimum samples required to attempt a split.
    pub min_samples_split: usize,
    /// Minimum samples required in each child.
    pub min_samples_leaf: usize,
    /// Per-split feature subsampling policy.
    pub max_features: MaxFeatures,
    /// Seed for bootstrap sampling and feature subsampling.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            seed: 42,
        }
    }
}

impl ForestConfig {
    /// Creates a config with the given tree count and defaults otherwise.
    #[must_use]
    pub fn new(trees: usize) -> Self {
        Self {
            trees,
            ..Self::default()
        }
    }

    /// Sets the maximum depth.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Sets the feature subsampling policy.
    #[must_use]
    pub const fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Errors raised while fitting a forest.
#[derive(Debug, Error)]
pub enum ForestError {
    /// No rows to fit on.
    #[error("training set is empty")]
    EmptyTrainingSet,
    /// Feature matrix and target lengths disagree.
    #[error("feature matrix has {rows} rows but {targets} targets")]
    ShapeMismatch {
        /// Rows in the feature matrix.
        rows: usize,
        /// Target values supplied.
        targets: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_candidates_never_drop_to_zero() {
        assert_eq!(MaxFeatures::Sqrt.candidates(1), 1);
        assert_eq!(MaxFeatures::Sqrt.candidates(9), 3);
        assert_eq!(MaxFeatures::Sqrt.candidates(10), 3);
        assert_eq!(MaxFeatures::All.candidates(10), 10);
    }

    #[test]
    fn config_builders_override_defaults() {
        let config = ForestConfig::new(250)
            .with_max_features(MaxFeatures::Sqrt)
            .with_seed(7);
        assert_eq!(config.trees, 250);
        assert_eq!(config.max_features, MaxFeatures::Sqrt);
        assert_eq!(config.seed, 7);
        assert_eq!(config.min_samples_split, 2);
    }
}
