use serde::{Deserialize, Serialize};

use super::encoder::OneHotEncoder;
use super::features::{design_matrix, FeatureSource};
use crate::dataset::derive::RiskLevel;
use crate::forest::{RandomForestClassifier, RandomForestRegressor};

/// Fitted fish-stock regression pipeline: region encoder + forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRegressor {
    encoder: OneHotEncoder,
    forest: RandomForestRegressor,
}

impl StockRegressor {
    pub(crate) const fn new(encoder: OneHotEncoder, forest: RandomForestRegressor) -> Self {
        Self { encoder, forest }
    }

    /// Predicts the fish stock index for every row, input order preserved.
    #[must_use]
    pub fn predict<S: FeatureSource>(&self, rows: &[S]) -> Vec<f64> {
        self.forest.predict(&design_matrix(rows, &self.encoder))
    }
}

/// Fitted biodiversity-risk classification pipeline: region encoder, forest,
/// and the class labels fitted from the training fold (lexically sorted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskClassifier {
    encoder: OneHotEncoder,
    forest: RandomForestClassifier,
    classes: Vec<RiskLevel>,
}

impl RiskClassifier {
    pub(crate) const fn new(
        encoder: OneHotEncoder,
        forest: RandomForestClassifier,
        classes: Vec<RiskLevel>,
    ) -> Self {
        Self {
            encoder,
            forest,
            classes,
        }
    }

    /// Predicts the risk label for every row, input order preserved.
    #[must_use]
    pub fn predict<S: FeatureSource>(&self, rows: &[S]) -> Vec<RiskLevel> {
        self.forest
            .predict(&design_matrix(rows, &self.encoder))
            .into_iter()
            .map(|index| self.classes[index])
            .collect()
    }

    /// Class labels in fitted order.
    #[must_use]
    pub fn classes(&self) -> &[RiskLevel] {
        &self.classes
    }
}
