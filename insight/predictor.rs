use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::advisor::Advisory;
use crate::dataset::derive::RiskLevel;
use crate::dataset::record::{prepare_forecast, ForecastRow};
use crate::store::StoredModels;
use crate::training::pipeline::{RiskClassifier, StockRegressor};

/// Index-aligned prediction output: one entry per input row in each sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    /// Predicted fish stock index per row.
    pub fish_stock_predictions: Vec<f64>,
    /// Predicted biodiversity risk per row.
    pub biodiversity_risk_predictions: Vec<RiskLevel>,
    /// Advisory per row, computed from the predicted stock value.
    pub recommendations: Vec<Advisory>,
}

/// Errors raised while building a predictor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredictError {
    /// One or both artifacts are absent; train first.
    #[error("models are not trained yet; train before predicting")]
    NotTrained,
}

/// Applies both fitted pipelines to new rows.
#[derive(Debug, Clone)]
pub struct Predictor {
    regressor: StockRegressor,
    classifier: RiskClassifier,
}

impl Predictor {
    /// Builds a predictor from two fitted pipelines.
    #[must_use]
    pub const fn new(regressor: StockRegressor, classifier: RiskClassifier) -> Self {
        Self {
            regressor,
            classifier,
        }
    }

    /// Builds a predictor from loaded artifacts. Fails with `NotTrained` when
    /// either artifact is absent, before any inference is attempted.
    pub fn from_store(models: StoredModels) -> Result<Self, PredictError> {
        match (models.regressor, models.classifier) {
            (Some(regressor), Some(classifier)) => Ok(Self::new(regressor, classifier)),
            _ => Err(PredictError::NotTrained),
        }
    }

    /// Prepares the rows, applies both pipelines, and derives one advisory
    /// per row from its predicted stock value. Output order matches input
    /// order; an empty batch yields empty sequences.
    #[must_use]
    pub fn predict(&self, rows: &[ForecastRow]) -> Forecast {
        let prepared = prepare_forecast(rows);
        let fish_stock_predictions = self.regressor.predict(&prepared);
        let biodiversity_risk_predictions = self.classifier.predict(&prepared);
        let recommendations = rows
            .iter()
            .zip(&fish_stock_predictions)
            .map(|(row, &stock)| Advisory::for_forecast(row, stock))
            .collect();
        Forecast {
            fish_stock_predictions,
            biodiversity_risk_predictions,
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::record::{prepare_observations, Observation};
    use crate::training::{TrainConfig, Trainer};
    use chrono::NaiveDate;

    fn observation(region: &str, stock: f64, biodiversity: f64, invasive: &str) -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            lat: 15.0 + biodiversity / 50.0,
            lon: 87.0 - stock / 40.0,
            region: region.into(),
            sea_temperature: 22.0,
            salinity: 34.0,
            fish_stock_index: stock,
            biodiversity_index: biodiversity,
            edna_detected_species: "Tuna,Cod".into(),
            invasive_species_flag: invasive.into(),
        }
    }

    fn forecast_row(region: &str, biodiversity: f64, invasive: &str) -> ForecastRow {
        ForecastRow {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            lat: 15.0,
            lon: 87.0,
            region: region.into(),
            sea_temperature: 23.0,
            salinity: 33.5,
            biodiversity_index: biodiversity,
            edna_detected_species: "Tuna".into(),
            invasive_species_flag: invasive.into(),
        }
    }

    fn trained() -> Predictor {
        let rows = prepare_observations(&[
            observation("Bay of Bengal", 80.0, 75.0, "no"),
            observation("Bay of Bengal", 74.0, 70.0, "no"),
            observation("Arabian Sea", 45.0, 45.0, "no"),
            observation("Arabian Sea", 42.0, 43.0, "yes"),
            observation("Laccadive Sea", 25.0, 30.0, "no"),
            observation("Laccadive Sea", 21.0, 28.0, "no"),
            observation("Bay of Bengal", 77.0, 72.0, "no"),
            observation("Arabian Sea", 40.0, 41.0, "no"),
        ]);
        let trained = Trainer::new(TrainConfig::default()).train(&rows).unwrap();
        Predictor::new(trained.regressor, trained.classifier)
    }

    #[test]
    fn missing_artifacts_fail_before_inference() {
        let err = Predictor::from_store(StoredModels {
            regressor: None,
            classifier: None,
        })
        .unwrap_err();
        assert_eq!(err, PredictError::NotTrained);
    }

    #[test]
    fn one_missing_artifact_is_still_not_trained() {
        let predictor = trained();
        let err = Predictor::from_store(StoredModels {
            regressor: Some(predictor.regressor.clone()),
            classifier: None,
        })
        .unwrap_err();
        assert_eq!(err, PredictError::NotTrained);
    }

    #[test]
    fn output_is_aligned_with_input() {
        let predictor = trained();
        let rows = vec![
            forecast_row("Bay of Bengal", 70.0, "no"),
            forecast_row("Arabian Sea", 42.0, "no"),
            forecast_row("Laccadive Sea", 30.0, "no"),
        ];
        let forecast = predictor.predict(&rows);
        assert_eq!(forecast.fish_stock_predictions.len(), 3);
        assert_eq!(forecast.biodiversity_risk_predictions.len(), 3);
        assert_eq!(forecast.recommendations.len(), 3);
        let head = predictor.predict(&rows[..1]);
        assert_eq!(
            head.fish_stock_predictions[0],
            forecast.fish_stock_predictions[0]
        );
    }

    #[test]
    fn invasive_rows_always_get_the_invasive_advisory() {
        let predictor = trained();
        let forecast = predictor.predict(&[forecast_row("Bay of Bengal", 70.0, "yes")]);
        assert_eq!(
            forecast.recommendations[0],
            Advisory::InvasiveSpeciesRisk
        );
    }

    #[test]
    fn unseen_region_predicts_without_error() {
        let predictor = trained();
        let forecast = predictor.predict(&[forecast_row("South China Sea", 55.0, "no")]);
        assert_eq!(forecast.fish_stock_predictions.len(), 1);
        assert!(forecast.fish_stock_predictions[0].is_finite());
    }

    #[test]
    fn empty_batch_yields_empty_sequences() {
        let predictor = trained();
        let forecast = predictor.predict(&[]);
        assert!(forecast.fish_stock_predictions.is_empty());
        assert!(forecast.recommendations.is_empty());
    }
}
