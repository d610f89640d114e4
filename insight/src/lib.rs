#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! GenSea insight core: ocean & fisheries observations in, fitted
//! random-forest pipelines, forecasts, and advisories out.

/// Observation ingest, schema checks, and derived features.
#[path = "../dataset/main.rs"]
pub mod dataset;

/// Decision trees and bootstrap-bagged random forests.
#[path = "../forest/main.rs"]
pub mod forest;

/// Training pipelines: feature schema, split, encoding, metrics.
#[path = "../training/main.rs"]
pub mod training;

/// Model artifact persistence.
#[path = "../store.rs"]
pub mod store;

/// Online inference over fitted pipelines.
#[path = "../predictor.rs"]
pub mod predictor;

/// Advisory rule, alert triage, and dataset summaries.
#[path = "../advisor.rs"]
pub mod advisor;

/// Orchestration runtime tying trainer, store, and predictor together.
#[path = "../runtime.rs"]
pub mod runtime;

pub use advisor::{Advisory, AlertStatus, DatasetSummary};
pub use dataset::derive::RiskLevel;
pub use dataset::record::{
    prepare_forecast, prepare_observations, ForecastRow, Observation, PreparedForecast,
    PreparedObservation,
};
pub use dataset::schema::DatasetError;
pub use forest::{ForestConfig, ForestError, MaxFeatures};
pub use predictor::{Forecast, PredictError, Predictor};
pub use runtime::InsightRuntime;
pub use store::{ModelStore, StoreConfig, StoreError, StoredModels};
pub use training::metrics::TrainingMetrics;
pub use training::pipeline::{RiskClassifier, StockRegressor};
pub use training::{TrainConfig, TrainError, TrainedModels, Trainer, TrainingReport};
