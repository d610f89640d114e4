//! Model training: fixed feature schema, seeded split, forest fitting, and
//! held-out evaluation.

/// One-hot category encoding.
pub mod encoder;
/// Feature schema and design-matrix construction.
pub mod features;
/// Evaluation metrics and the persisted metrics record.
pub mod metrics;
/// Fitted pipeline types.
pub mod pipeline;
/// Seeded train/test splitting.
pub mod split;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_telemetry::{LogLevel, Telemetry};
use thiserror::Error;
use uuid::Uuid;

use crate::dataset::derive::RiskLevel;
use crate::dataset::record::PreparedObservation;
use crate::forest::{ForestConfig, ForestError, MaxFeatures, RandomForestClassifier, RandomForestRegressor};
use encoder::OneHotEncoder;
use features::design_matrix;
use metrics::{accuracy, r2_score, weighted_f1, TrainingMetrics};
use pipeline::{RiskClassifier, StockRegressor};
use split::train_test_split;

/// Fewest rows that leave both folds non-empty.
pub const MIN_TRAINING_ROWS: usize = 5;

/// Trainer hyperparameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Trees in the fish-stock regression forest.
    pub regression_trees: usize,
    /// Trees in the risk classification forest.
    pub classification_trees: usize,
    /// Fraction of rows held out for evaluation.
    pub test_ratio: f64,
    /// Seed for the split and both forests.
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            regression_trees: 200,
            classification_trees: 250,
            test_ratio: 0.2,
            seed: 42,
        }
    }
}

impl TrainConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the held-out fraction.
    #[must_use]
    pub const fn with_test_ratio(mut self, test_ratio: f64) -> Self {
        self.test_ratio = test_ratio;
        self
    }
}

/// Report describing one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Rows the run was trained on (both folds).
    pub rows: usize,
    /// Held-out evaluation scores.
    pub metrics: TrainingMetrics,
}

impl TrainingReport {
    /// Renders a concise summary string.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "[train {}] rows={} r2={:.4} acc={:.4} f1={:.4}",
            self.run_id,
            self.rows,
            self.metrics.regression_r2.unwrap_or(f64::NAN),
            self.metrics.classification_accuracy.unwrap_or(f64::NAN),
            self.metrics.classification_f1.unwrap_or(f64::NAN),
        )
    }
}

/// Both fitted pipelines plus the run report.
#[derive(Debug, Clone)]
pub struct TrainedModels {
    /// Fish-stock regression pipeline.
    pub regressor: StockRegressor,
    /// Biodiversity-risk classification pipeline.
    pub classifier: RiskClassifier,
    /// Run report with metrics.
    pub report: TrainingReport,
}

/// Errors raised by a training run.
#[derive(Debug, Error)]
pub enum TrainError {
    /// Too few rows to hold out a non-empty evaluation fold.
    #[error("training requires at least {minimum} rows, got {rows}")]
    TooFewRows {
        /// Rows supplied.
        rows: usize,
        /// Required minimum.
        minimum: usize,
    },
    /// Forest fitting failed.
    #[error(transparent)]
    Forest(#[from] ForestError),
}

/// Fits both pipelines over prepared observations.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    /// Creates a trainer with the given configuration.
    #[must_use]
    pub const fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Trains both pipelines and evaluates them on the held-out fold.
    pub fn train(&self, rows: &[PreparedObservation]) -> Result<TrainedModels, TrainError> {
        self.train_with_telemetry(rows, None)
    }

    /// Trains with optional telemetry instrumentation.
    pub fn train_with_telemetry(
        &self,
        rows: &[PreparedObservation],
        telemetry: Option<&Telemetry>,
    ) -> Result<TrainedModels, TrainError> {
        if rows.len() < MIN_TRAINING_ROWS {
            return Err(TrainError::TooFewRows {
                rows: rows.len(),
                minimum: MIN_TRAINING_ROWS,
            });
        }
        let folds = train_test_split(rows.len(), self.config.test_ratio, self.config.seed);
        let train_fold: Vec<&PreparedObservation> =
            folds.train.iter().map(|&index| &rows[index]).collect();
        let test_fold: Vec<&PreparedObservation> =
            folds.test.iter().map(|&index| &rows[index]).collect();
        log(
            telemetry,
            LogLevel::Debug,
            "training_folds_prepared",
            json!({ "train_rows": train_fold.len(), "test_rows": test_fold.len() }),
        );

        let region_encoder =
            OneHotEncoder::fit(train_fold.iter().map(|row| row.base.region.as_str()));
        let x_train = design_matrix(&train_fold, &region_encoder);

        let y_stock = Array1::from_iter(train_fold.iter().map(|row| row.base.fish_stock_index));
        let mut stock_forest = RandomForestRegressor::new(
            ForestConfig::new(self.config.regression_trees).with_seed(self.config.seed),
        );
        stock_forest.fit(&x_train, &y_stock)?;
        let regressor = StockRegressor::new(region_encoder.clone(), stock_forest);
        let predicted_stock = regressor.predict(&test_fold);
        let actual_stock: Vec<f64> = test_fold
            .iter()
            .map(|row| row.base.fish_stock_index)
            .collect();
        let regression_r2 = r2_score(&actual_stock, &predicted_stock);

        let mut classes: Vec<RiskLevel> =
            train_fold.iter().map(|row| row.biodiversity_risk).collect();
        classes.sort_by_key(|level| level.as_str());
        classes.dedup();
        let labels: Vec<usize> = train_fold
            .iter()
            .map(|row| {
                classes
                    .iter()
                    .position(|class| *class == row.biodiversity_risk)
                    .unwrap_or(0)
            })
            .collect();
        let mut risk_forest = RandomForestClassifier::new(
            ForestConfig::new(self.config.classification_trees)
                .with_max_features(MaxFeatures::Sqrt)
                .with_seed(self.config.seed),
        );
        risk_forest.fit(&x_train, &labels)?;
        let classifier = RiskClassifier::new(region_encoder, risk_forest, classes);
        let predicted_risk = classifier.predict(&test_fold);
        let actual_risk: Vec<RiskLevel> =
            test_fold.iter().map(|row| row.biodiversity_risk).collect();
        let (actual_indices, predicted_indices, label_count) =
            index_labels(&actual_risk, &predicted_risk);
        let classification_accuracy = accuracy(&actual_indices, &predicted_indices);
        let classification_f1 = weighted_f1(&actual_indices, &predicted_indices, label_count);

        let report = TrainingReport {
            run_id: Uuid::new_v4(),
            rows: rows.len(),
            metrics: TrainingMetrics {
                regression_r2: Some(regression_r2),
                classification_accuracy: Some(classification_accuracy),
                classification_f1: Some(classification_f1),
            },
        };
        log(
            telemetry,
            LogLevel::Info,
            "training_complete",
            json!({
                "run_id": report.run_id,
                "rows": report.rows,
                "regression_r2": regression_r2,
                "classification_accuracy": classification_accuracy,
                "classification_f1": classification_f1,
            }),
        );
        Ok(TrainedModels {
            regressor,
            classifier,
            report,
        })
    }
}

/// Maps held-out and predicted labels into one index space spanning both.
fn index_labels(
    actual: &[RiskLevel],
    predicted: &[RiskLevel],
) -> (Vec<usize>, Vec<usize>, usize) {
    let mut table: Vec<RiskLevel> = actual.iter().chain(predicted).copied().collect();
    table.sort_by_key(|level| level.as_str());
    table.dedup();
    let index_of = |label: RiskLevel| -> usize {
        table
            .iter()
            .position(|entry| *entry == label)
            .unwrap_or(0)
    };
    let actual_indices = actual.iter().map(|&label| index_of(label)).collect();
    let predicted_indices = predicted.iter().map(|&label| index_of(label)).collect();
    (actual_indices, predicted_indices, table.len())
}

fn log(telemetry: Option<&Telemetry>, level: LogLevel, message: &str, fields: serde_json::Value) {
    if let Some(telemetry) = telemetry {
        let _ = telemetry.log(level, message, fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::record::{prepare_observations, Observation};
    use chrono::NaiveDate;

    fn observation(
        region: &str,
        lat: f64,
        lon: f64,
        stock: f64,
        biodiversity: f64,
        species: &str,
        invasive: &str,
    ) -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            lat,
            lon,
            region: region.into(),
            sea_temperature: 18.0 + biodiversity / 10.0,
            salinity: 34.0,
            fish_stock_index: stock,
            biodiversity_index: biodiversity,
            edna_detected_species: species.into(),
            invasive_species_flag: invasive.into(),
        }
    }

    fn survey() -> Vec<PreparedObservation> {
        let rows = vec![
            observation("Bay of Bengal", 15.2, 87.1, 78.0, 72.0, "Tuna,Cod,Sardine", "no"),
            observation("Bay of Bengal", 14.8, 86.5, 74.0, 68.0, "Tuna,Mackerel", "no"),
            observation("Bay of Bengal", 15.9, 87.9, 81.0, 75.0, "Salmon,Tuna,Cod", "no"),
            observation("Arabian Sea", 18.1, 64.2, 44.0, 38.0, "Anchovy,Sardine", "no"),
            observation("Arabian Sea", 17.6, 63.8, 41.0, 35.0, "Anchovy", "no"),
            observation("Arabian Sea", 18.4, 64.9, 47.0, 39.5, "Sardine,Anchovy", "yes"),
            observation("Laccadive Sea", 10.3, 72.1, 55.0, 52.0, "Snapper,Grouper", "no"),
            observation("Laccadive Sea", 9.8, 71.6, 58.0, 55.0, "Grouper", "no"),
            observation("Laccadive Sea", 10.6, 72.8, 52.0, 48.0, "Snapper", "yes"),
            observation("Bay of Bengal", 16.2, 88.2, 76.0, 70.0, "Cod,Sardine", "no"),
            observation("Arabian Sea", 18.9, 65.1, 39.0, 33.0, "", "no"),
            observation("Laccadive Sea", 10.1, 72.4, 56.0, 51.0, "Snapper,Grouper,Cod", "no"),
        ];
        prepare_observations(&rows)
    }

    #[test]
    fn training_produces_all_three_metrics() {
        let trained = Trainer::new(TrainConfig::default()).train(&survey()).unwrap();
        let metrics = &trained.report.metrics;
        assert!(metrics.regression_r2.unwrap().is_finite());
        let accuracy = metrics.classification_accuracy.unwrap();
        assert!((0.0..=1.0).contains(&accuracy));
        assert!((0.0..=1.0).contains(&metrics.classification_f1.unwrap()));
    }

    #[test]
    fn training_is_deterministic_for_a_seed() {
        let rows = survey();
        let trainer = Trainer::new(TrainConfig::default());
        let first = trainer.train(&rows).unwrap();
        let second = trainer.train(&rows).unwrap();
        assert_eq!(first.report.metrics, second.report.metrics);
        let probe = &rows[..4];
        assert_eq!(
            first.regressor.predict(probe),
            second.regressor.predict(probe)
        );
        assert_eq!(
            first.classifier.predict(probe),
            second.classifier.predict(probe)
        );
    }

    #[test]
    fn too_few_rows_fail_before_fitting() {
        let rows = survey();
        let err = Trainer::new(TrainConfig::default())
            .train(&rows[..4])
            .unwrap_err();
        assert!(matches!(
            err,
            TrainError::TooFewRows { rows: 4, minimum: 5 }
        ));
    }

    #[test]
    fn fitted_classes_are_sorted_labels() {
        let trained = Trainer::new(TrainConfig::default()).train(&survey()).unwrap();
        let labels: Vec<&str> = trained
            .classifier
            .classes()
            .iter()
            .map(|class| class.as_str())
            .collect();
        let mut sorted = labels.clone();
        sorted.sort_unstable();
        assert_eq!(labels, sorted);
    }

    #[test]
    fn prediction_preserves_input_order_and_length() {
        let rows = survey();
        let trained = Trainer::new(TrainConfig::default()).train(&rows).unwrap();
        let stock = trained.regressor.predict(&rows);
        let risk = trained.classifier.predict(&rows);
        assert_eq!(stock.len(), rows.len());
        assert_eq!(risk.len(), rows.len());
        let head = trained.regressor.predict(&rows[..3]);
        assert_eq!(head, stock[..3]);
    }
}
