use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::training::metrics::TrainingMetrics;
use crate::training::pipeline::{RiskClassifier, StockRegressor};

/// File name of the persisted regression pipeline.
pub const REGRESSOR_FILE: &str = "rf_regressor.json";
/// File name of the persisted classification pipeline.
pub const CLASSIFIER_FILE: &str = "rf_classifier.json";
/// File name of the persisted metrics record.
pub const METRICS_FILE: &str = "metrics.json";

/// Where artifacts live.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Artifact directory.
    pub dir: PathBuf,
}

impl StoreConfig {
    /// Creates a config rooted at the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
        }
    }
}

/// Artifacts found on disk; each is independently absent or present.
#[derive(Debug, Clone)]
pub struct StoredModels {
    /// Regression pipeline, if persisted.
    pub regressor: Option<StockRegressor>,
    /// Classification pipeline, if persisted.
    pub classifier: Option<RiskClassifier>,
}

impl StoredModels {
    /// Whether both artifacts are present.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.regressor.is_some() && self.classifier.is_some()
    }
}

/// Errors raised while persisting or loading artifacts.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Serializing an artifact failed.
    #[error("encoding {path}: {source}")]
    Encode {
        /// Destination path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
    /// Writing or renaming failed.
    #[error("writing {path}: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// Reading an existing file failed.
    #[error("reading {path}: {source}")]
    Read {
        /// Source path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// A file exists but does not decode; never treated as absent.
    #[error("corrupt artifact {path}: {source}")]
    Corrupt {
        /// Source path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Persists and loads the fitted pipelines and the metrics record. Writes go
/// to a sibling temp file first and are renamed into place, so a crash
/// mid-write never leaves a corrupt artifact behind.
#[derive(Debug, Clone)]
pub struct ModelStore {
    config: StoreConfig,
}

impl ModelStore {
    /// Creates a store over the configured directory.
    #[must_use]
    pub const fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Artifact directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    /// Overwrites both artifacts. Both are fully serialized and written to
    /// temp files before the first rename, so a failure mid-save cannot leave
    /// one artifact updated and the other corrupt.
    pub fn save(
        &self,
        regressor: &StockRegressor,
        classifier: &RiskClassifier,
    ) -> Result<(), StoreError> {
        fs::create_dir_all(&self.config.dir).map_err(|source| StoreError::Write {
            path: self.config.dir.clone(),
            source,
        })?;
        let regressor_tmp = self.stage(REGRESSOR_FILE, regressor)?;
        let classifier_tmp = self.stage(CLASSIFIER_FILE, classifier)?;
        self.commit(&regressor_tmp, REGRESSOR_FILE)?;
        self.commit(&classifier_tmp, CLASSIFIER_FILE)?;
        Ok(())
    }

    /// Overwrites the metrics record.
    pub fn save_metrics(&self, metrics: &TrainingMetrics) -> Result<(), StoreError> {
        fs::create_dir_all(&self.config.dir).map_err(|source| StoreError::Write {
            path: self.config.dir.clone(),
            source,
        })?;
        let tmp = self.stage(METRICS_FILE, metrics)?;
        self.commit(&tmp, METRICS_FILE)
    }

    /// Loads whatever artifacts are present. A missing file is `None`; an
    /// unreadable or undecodable file is an error.
    pub fn load(&self) -> Result<StoredModels, StoreError> {
        Ok(StoredModels {
            regressor: self.load_optional(REGRESSOR_FILE)?,
            classifier: self.load_optional(CLASSIFIER_FILE)?,
        })
    }

    /// Loads the metrics record; absent means never trained.
    pub fn load_metrics(&self) -> Result<TrainingMetrics, StoreError> {
        Ok(self.load_optional(METRICS_FILE)?.unwrap_or_default())
    }

    /// Whether both artifact files exist on disk.
    #[must_use]
    pub fn artifacts_present(&self) -> bool {
        self.config.dir.join(REGRESSOR_FILE).exists()
            && self.config.dir.join(CLASSIFIER_FILE).exists()
    }

    fn stage<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, StoreError> {
        let target = self.config.dir.join(name);
        let bytes = serde_json::to_vec(value).map_err(|source| StoreError::Encode {
            path: target.clone(),
            source,
        })?;
        let tmp = self.config.dir.join(format!("{name}.tmp"));
        fs::write(&tmp, bytes).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        Ok(tmp)
    }

    fn commit(&self, tmp: &Path, name: &str) -> Result<(), StoreError> {
        let target = self.config.dir.join(name);
        fs::rename(tmp, &target).map_err(|source| StoreError::Write {
            path: target,
            source,
        })
    }

    fn load_optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StoreError> {
        let path = self.config.dir.join(name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { path, source })
    }
}
