use ndarray::Array2;

use super::encoder::OneHotEncoder;
use crate::dataset::record::{PreparedForecast, PreparedObservation};

/// The fixed feature schema shared by training and prediction.
pub const FEATURE_COLUMNS: [&str; 8] = [
    "lat",
    "lon",
    "region",
    "sea_temperature",
    "salinity",
    "biodiversity_index",
    "eDNA_count",
    "invasive_flag",
];

/// Numeric features in design-matrix column order; the one-hot region block
/// follows them.
pub const NUMERIC_COLUMNS: [&str; 7] = [
    "lat",
    "lon",
    "sea_temperature",
    "salinity",
    "biodiversity_index",
    "eDNA_count",
    "invasive_flag",
];

/// A prepared row that can contribute a design-matrix row.
pub trait FeatureSource {
    /// Numeric features in `NUMERIC_COLUMNS` order.
    fn numeric_features(&self) -> [f64; 7];
    /// Categorical region value.
    fn region(&self) -> &str;
}

impl FeatureSource for PreparedObservation {
    fn numeric_features(&self) -> [f64; 7] {
        [
            self.base.lat,
            self.base.lon,
            self.base.sea_temperature,
            self.base.salinity,
            self.base.biodiversity_index,
            f64::from(self.edna_count),
            f64::from(self.invasive_flag),
        ]
    }

    fn region(&self) -> &str {
        &self.base.region
    }
}

impl FeatureSource for PreparedForecast {
    fn numeric_features(&self) -> [f64; 7] {
        [
            self.base.lat,
            self.base.lon,
            self.base.sea_temperature,
            self.base.salinity,
            self.base.biodiversity_index,
            f64::from(self.edna_count),
            f64::from(self.invasive_flag),
        ]
    }

    fn region(&self) -> &str {
        &self.base.region
    }
}

impl<T: FeatureSource> FeatureSource for &T {
    fn numeric_features(&self) -> [f64; 7] {
        (**self).numeric_features()
    }

    fn region(&self) -> &str {
        (**self).region()
    }
}

/// Builds the design matrix: the numeric block followed by the one-hot
/// region block. Unseen regions leave their block all zero.
#[must_use]
pub fn design_matrix<S: FeatureSource>(rows: &[S], encoder: &OneHotEncoder) -> Array2<f64> {
    let numeric = NUMERIC_COLUMNS.len();
    let mut matrix = Array2::zeros((rows.len(), numeric + encoder.width()));
    for (i, row) in rows.iter().enumerate() {
        for (j, value) in row.numeric_features().into_iter().enumerate() {
            matrix[[i, j]] = value;
        }
        if let Some(index) = encoder.index_of(row.region()) {
            matrix[[i, numeric + index]] = 1.0;
        }
    }
    matrix
}
