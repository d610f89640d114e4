use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use super::split::{best_split, SplitCriterion};

/// One node in the tree arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    /// Terminal node carrying the prediction (mean target or class index).
    Leaf {
        /// Predicted value.
        value: f64,
    },
    /// Internal node routing rows by a threshold test.
    Split {
        /// Column index tested.
        feature: usize,
        /// Rows with `value <= threshold` go left.
        threshold: f64,
        /// Arena index of the left child.
        left: usize,
        /// Arena index of the right child.
        right: usize,
    },
}

/// Growth limits shared by every tree in a forest.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GrowParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub feature_candidates: usize,
}

/// A fitted CART tree stored as a node arena rooted at index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grows a tree over the given bootstrap rows.
    pub(crate) fn grow(
        x: &Array2<f64>,
        y: &Array1<f64>,
        rows: Vec<usize>,
        params: &GrowParams,
        criterion: SplitCriterion,
        rng: &mut SmallRng,
    ) -> Self {
        let mut nodes = Vec::new();
        grow_node(&mut nodes, x, y, rows, 0, params, criterion, rng);
        Self { nodes }
    }

    /// Predicts a single feature row.
    #[must_use]
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty (never true for a grown tree).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn grow_node(
    nodes: &mut Vec<Node>,
    x: &Array2<f64>,
    y: &Array1<f64>,
    rows: Vec<usize>,
    depth: usize,
    params: &GrowParams,
    criterion: SplitCriterion,
    rng: &mut SmallRng,
) -> usize {
    let depth_capped = params.max_depth.map_or(false, |limit| depth >= limit);
    if !depth_capped && rows.len() >= params.min_samples_split && !is_pure(y, &rows) {
        let n_features = x.ncols();
        let features: Vec<usize> = if params.feature_candidates >= n_features {
            (0..n_features).collect()
        } else {
            rand::seq::index::sample(rng, n_features, params.feature_candidates).into_vec()
        };
        if let Some(split) = best_split(x, y, &rows, &features, criterion, params.min_samples_leaf)
        {
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                .iter()
                .partition(|&&row| x[[row, split.feature]] <= split.threshold);
            let index = nodes.len();
            nodes.push(Node::Leaf { value: 0.0 });
            let left = grow_node(nodes, x, y, left_rows, depth + 1, params, criterion, rng);
            let right = grow_node(nodes, x, y, right_rows, depth + 1, params, criterion, rng);
            nodes[index] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
            return index;
        }
    }
    let index = nodes.len();
    nodes.push(Node::Leaf {
        value: leaf_value(y, &rows, criterion),
    });
    index
}

fn is_pure(y: &Array1<f64>, rows: &[usize]) -> bool {
    let first = y[rows[0]];
    rows.iter().all(|&row| y[row] == first)
}

fn leaf_value(y: &Array1<f64>, rows: &[usize], criterion: SplitCriterion) -> f64 {
    match criterion {
        SplitCriterion::Variance => {
            rows.iter().map(|&row| y[row]).sum::<f64>() / rows.len() as f64
        }
        SplitCriterion::Gini { classes } => {
            let mut counts = vec![0_usize; classes];
            for &row in rows {
                counts[y[row] as usize] += 1;
            }
            let mut majority = 0;
            for (class, &count) in counts.iter().enumerate() {
                if count > counts[majority] {
                    majority = class;
                }
            }
            majority as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    fn params(candidates: usize) -> GrowParams {
        GrowParams {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            feature_candidates: candidates,
        }
    }

    #[test]
    fn tree_memorizes_a_step_function() {
        let x = array![[1.0], [2.0], [8.0], [9.0]];
        let y = array![0.0, 0.0, 7.0, 7.0];
        let mut rng = SmallRng::seed_from_u64(1);
        let tree = DecisionTree::grow(
            &x,
            &y,
            vec![0, 1, 2, 3],
            &params(1),
            SplitCriterion::Variance,
            &mut rng,
        );
        assert_eq!(tree.predict_row(array![1.5].view()), 0.0);
        assert_eq!(tree.predict_row(array![8.5].view()), 7.0);
    }

    #[test]
    fn pure_targets_collapse_to_one_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![4.0, 4.0, 4.0];
        let mut rng = SmallRng::seed_from_u64(1);
        let tree = DecisionTree::grow(
            &x,
            &y,
            vec![0, 1, 2],
            &params(1),
            SplitCriterion::Variance,
            &mut rng,
        );
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.predict_row(array![100.0].view()), 4.0);
    }

    #[test]
    fn majority_leaf_breaks_ties_toward_lower_class() {
        let x = array![[1.0], [1.0]];
        let y = array![1.0, 0.0];
        let mut rng = SmallRng::seed_from_u64(1);
        let tree = DecisionTree::grow(
            &x,
            &y,
            vec![0, 1],
            &params(1),
            SplitCriterion::Gini { classes: 2 },
            &mut rng,
        );
        assert_eq!(tree.predict_row(array![1.0].view()), 0.0);
    }
}
