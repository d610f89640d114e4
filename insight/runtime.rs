use anyhow::Context;
use parking_lot::Mutex;
use serde_json::json;
use shared_telemetry::{LogLevel, Telemetry};

use crate::dataset::record::{prepare_observations, ForecastRow, Observation};
use crate::predictor::{Forecast, Predictor};
use crate::store::{ModelStore, StoreConfig, StoreError};
use crate::training::metrics::TrainingMetrics;
use crate::training::{TrainConfig, Trainer, TrainingReport};

/// Ties the trainer, store, and predictor together for the boundary layer.
/// The store sits behind a mutex so a retrain holds exclusive access to the
/// artifact files while a predict is loading them.
pub struct InsightRuntime {
    trainer: Trainer,
    store: Mutex<ModelStore>,
    telemetry: Option<Telemetry>,
}

impl InsightRuntime {
    /// Creates a runtime from trainer and store configuration.
    #[must_use]
    pub fn new(train_config: TrainConfig, store_config: StoreConfig) -> Self {
        Self {
            trainer: Trainer::new(train_config),
            store: Mutex::new(ModelStore::new(store_config)),
            telemetry: None,
        }
    }

    /// Attaches telemetry for structured logging.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Sets telemetry after construction.
    pub fn set_telemetry(&mut self, telemetry: Telemetry) {
        self.telemetry = Some(telemetry);
    }

    /// Prepares the rows, trains both pipelines, and persists the artifacts
    /// and metrics. All-or-nothing: nothing is written unless both models
    /// fit.
    pub fn train_and_persist(&self, rows: &[Observation]) -> anyhow::Result<TrainingReport> {
        self.log(
            LogLevel::Info,
            "training_started",
            json!({ "rows": rows.len() }),
        );
        let prepared = prepare_observations(rows);
        let trained = self
            .trainer
            .train_with_telemetry(&prepared, self.telemetry.as_ref())?;
        {
            let store = self.store.lock();
            store
                .save(&trained.regressor, &trained.classifier)
                .context("persisting model artifacts")?;
            store
                .save_metrics(&trained.report.metrics)
                .context("persisting training metrics")?;
        }
        self.log(
            LogLevel::Info,
            "training_persisted",
            json!({ "run_id": trained.report.run_id, "summary": trained.report.summary() }),
        );
        Ok(trained.report)
    }

    /// Loads the persisted pipelines and serves predictions. Fails with the
    /// not-trained condition when either artifact is absent.
    pub fn predict(&self, rows: &[ForecastRow]) -> anyhow::Result<Forecast> {
        let models = {
            let store = self.store.lock();
            store.load().context("loading model artifacts")?
        };
        let predictor = Predictor::from_store(models)?;
        let forecast = predictor.predict(rows);
        self.log(
            LogLevel::Info,
            "prediction_served",
            json!({ "rows": rows.len() }),
        );
        Ok(forecast)
    }

    /// Whether both artifacts are present; the boundary layer checks this
    /// before offering prediction.
    #[must_use]
    pub fn is_trained(&self) -> bool {
        self.store.lock().artifacts_present()
    }

    /// The persisted metrics record; all fields absent before the first
    /// successful training run.
    pub fn metrics(&self) -> Result<TrainingMetrics, StoreError> {
        self.store.lock().load_metrics()
    }

    fn log(&self, level: LogLevel, message: &str, fields: serde_json::Value) {
        if let Some(telemetry) = self.telemetry.as_ref() {
            let _ = telemetry.log(level, message, fields);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::PredictError;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn observation(region: &str, stock: f64, biodiversity: f64, invasive: &str) -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            lat: 15.0 + biodiversity / 40.0,
            lon: 87.0 - stock / 30.0,
            region: region.into(),
            sea_temperature: 21.0 + stock / 50.0,
            salinity: 34.0,
            fish_stock_index: stock,
            biodiversity_index: biodiversity,
            edna_detected_species: "Tuna,Cod".into(),
            invasive_species_flag: invasive.into(),
        }
    }

    fn survey() -> Vec<Observation> {
        vec![
            observation("Bay of Bengal", 80.0, 75.0, "no"),
            observation("Bay of Bengal", 74.0, 70.0, "no"),
            observation("Bay of Bengal", 77.0, 72.0, "no"),
            observation("Arabian Sea", 45.0, 45.0, "no"),
            observation("Arabian Sea", 42.0, 43.0, "yes"),
            observation("Arabian Sea", 40.0, 41.0, "no"),
            observation("Laccadive Sea", 25.0, 30.0, "no"),
            observation("Laccadive Sea", 21.0, 28.0, "no"),
        ]
    }

    fn forecast_rows(rows: &[Observation]) -> Vec<ForecastRow> {
        rows.iter()
            .map(|row| ForecastRow {
                date: row.date,
                lat: row.lat,
                lon: row.lon,
                region: row.region.clone(),
                sea_temperature: row.sea_temperature,
                salinity: row.salinity,
                biodiversity_index: row.biodiversity_index,
                edna_detected_species: row.edna_detected_species.clone(),
                invasive_species_flag: row.invasive_species_flag.clone(),
            })
            .collect()
    }

    #[test]
    fn predict_before_train_is_the_not_trained_condition() {
        let dir = tempdir().unwrap();
        let runtime =
            InsightRuntime::new(TrainConfig::default(), StoreConfig::new(dir.path()));
        assert!(!runtime.is_trained());
        let err = runtime.predict(&forecast_rows(&survey())).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PredictError>(),
            Some(&PredictError::NotTrained)
        );
    }

    #[test]
    fn train_then_predict_round_trips_through_the_store() {
        let dir = tempdir().unwrap();
        let runtime =
            InsightRuntime::new(TrainConfig::default(), StoreConfig::new(dir.path()));
        let rows = survey();
        let report = runtime.train_and_persist(&rows).unwrap();
        assert!(runtime.is_trained());
        assert!(report.metrics.regression_r2.is_some());

        // Predictions served through the persisted artifacts match the ones
        // from the in-memory pipelines that were just fit.
        let trainer = Trainer::new(TrainConfig::default());
        let trained = trainer.train(&prepare_observations(&rows)).unwrap();
        let direct = Predictor::new(trained.regressor, trained.classifier)
            .predict(&forecast_rows(&rows));
        let served = runtime.predict(&forecast_rows(&rows)).unwrap();
        assert_eq!(
            served.fish_stock_predictions,
            direct.fish_stock_predictions
        );
        assert_eq!(
            served.biodiversity_risk_predictions,
            direct.biodiversity_risk_predictions
        );
        assert_eq!(served.recommendations, direct.recommendations);
    }

    #[test]
    fn persisted_metrics_match_the_report() {
        let dir = tempdir().unwrap();
        let runtime =
            InsightRuntime::new(TrainConfig::default(), StoreConfig::new(dir.path()));
        assert_eq!(runtime.metrics().unwrap(), TrainingMetrics::default());
        let report = runtime.train_and_persist(&survey()).unwrap();
        assert_eq!(runtime.metrics().unwrap(), report.metrics);
    }

    #[test]
    fn retrain_overwrites_artifacts_wholesale() {
        let dir = tempdir().unwrap();
        let runtime =
            InsightRuntime::new(TrainConfig::default(), StoreConfig::new(dir.path()));
        runtime.train_and_persist(&survey()).unwrap();
        let first = runtime.metrics().unwrap();
        // Retraining on a reshaped dataset replaces both artifacts and
        // metrics. A uniform shift would leave tree metrics unchanged, so
        // break the stock/biodiversity relationship instead.
        let mut shifted = survey();
        shifted[0].fish_stock_index = 5.0;
        shifted[7].fish_stock_index = 85.0;
        runtime.train_and_persist(&shifted).unwrap();
        let second = runtime.metrics().unwrap();
        assert!(second.regression_r2.is_some());
        assert_ne!(first, second);
    }

    #[test]
    fn telemetry_records_training_events() {
        let dir = tempdir().unwrap();
        let sink = Arc::new(
            shared_telemetry::JsonlSink::new(dir.path().join("telemetry.log")).unwrap(),
        );
        let telemetry = Telemetry::new("insight.runtime").with_sink(sink);
        let runtime =
            InsightRuntime::new(TrainConfig::default(), StoreConfig::new(dir.path()))
                .with_telemetry(telemetry.clone());
        runtime.train_and_persist(&survey()).unwrap();
        let recent = telemetry.recent(8);
        assert!(recent
            .iter()
            .any(|record| record.message == "training_persisted"));
        assert!(recent
            .iter()
            .any(|record| record.message == "training_complete"));
    }
}
