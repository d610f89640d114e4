use ndarray::{Array1, Array2};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{DecisionTree, GrowParams};
use super::{ForestConfig, ForestError, SplitCriterion};

fn validate(x: &Array2<f64>, targets: usize) -> Result<(), ForestError> {
    if x.nrows() == 0 {
        return Err(ForestError::EmptyTrainingSet);
    }
    if x.nrows() != targets {
        return Err(ForestError::ShapeMismatch {
            rows: x.nrows(),
            targets,
        });
    }
    Ok(())
}

fn bootstrap(rng: &mut SmallRng, rows: usize) -> Vec<usize> {
    (0..rows).map(|_| rng.gen_range(0..rows)).collect()
}

fn grow_params(config: &ForestConfig, features: usize) -> GrowParams {
    GrowParams {
        max_depth: config.max_depth,
        min_samples_split: config.min_samples_split,
        min_samples_leaf: config.min_samples_leaf,
        feature_candidates: config.max_features.candidates(features),
    }
}

/// Bagged ensemble of regression trees; predictions average over trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
}

impl RandomForestRegressor {
    /// Creates an unfitted forest.
    #[must_use]
    pub const fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
        }
    }

    /// Fits the ensemble on a feature matrix and continuous targets.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ForestError> {
        validate(x, y.len())?;
        let config = self.config;
        let params = grow_params(&config, x.ncols());
        self.trees = (0..config.trees)
            .map(|tree| {
                let mut rng = SmallRng::seed_from_u64(config.seed.wrapping_add(tree as u64));
                let rows = bootstrap(&mut rng, x.nrows());
                DecisionTree::grow(x, y, rows, &params, SplitCriterion::Variance, &mut rng)
            })
            .collect();
        Ok(())
    }

    /// Predicts continuous targets for every row; an unfitted forest predicts
    /// zero.
    #[must_use]
    pub fn predict(&self, x: &Array2<f64>) -> Vec<f64> {
        let trees = self.trees.len().max(1) as f64;
        x.rows()
            .into_iter()
            .map(|row| {
                self.trees
                    .iter()
                    .map(|tree| tree.predict_row(row))
                    .sum::<f64>()
                    / trees
            })
            .collect()
    }

    /// Whether `fit` has produced trees.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

/// Bagged ensemble of classification trees; predictions majority-vote over
/// trees, ties breaking toward the lower class index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    classes: usize,
}

impl RandomForestClassifier {
    /// Creates an unfitted forest.
    #[must_use]
    pub const fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            classes: 0,
        }
    }

    /// Fits the ensemble on a feature matrix and class-index labels.
    pub fn fit(&mut self, x: &Array2<f64>, labels: &[usize]) -> Result<(), ForestError> {
        validate(x, labels.len())?;
        self.classes = labels.iter().max().map_or(0, |&max| max + 1);
        let y = Array1::from_iter(labels.iter().map(|&label| label as f64));
        let config = self.config;
        let params = grow_params(&config, x.ncols());
        let criterion = SplitCriterion::Gini {
            classes: self.classes,
        };
        self.trees = (0..config.trees)
            .map(|tree| {
                let mut rng = SmallRng::seed_from_u64(config.seed.wrapping_add(tree as u64));
                let rows = bootstrap(&mut rng, x.nrows());
                DecisionTree::grow(x, &y, rows, &params, criterion, &mut rng)
            })
            .collect();
        Ok(())
    }

    /// Predicts class indices for every row.
    #[must_use]
    pub fn predict(&self, x: &Array2<f64>) -> Vec<usize> {
        x.rows()
            .into_iter()
            .map(|row| {
                let mut votes = vec![0_usize; self.classes.max(1)];
                for tree in &self.trees {
                    votes[tree.predict_row(row) as usize] += 1;
                }
                let mut winner = 0;
                for (class, &count) in votes.iter().enumerate() {
                    if count > votes[winner] {
                        winner = class;
                    }
                }
                winner
            })
            .collect()
    }

    /// Number of classes seen at fit time.
    #[must_use]
    pub const fn class_count(&self) -> usize {
        self.classes
    }
}
