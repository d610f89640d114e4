use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::record::{ForecastRow, Observation};

/// Columns every historical observation must carry.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "date",
    "lat",
    "lon",
    "region",
    "sea_temperature",
    "salinity",
    "fish_stock_index",
    "biodiversity_index",
    "eDNA_detected_species",
    "invasive_species_flag",
];

/// Columns every prediction-time row must carry (no fish stock target).
pub const FORECAST_COLUMNS: [&str; 9] = [
    "date",
    "lat",
    "lon",
    "region",
    "sea_temperature",
    "salinity",
    "biodiversity_index",
    "eDNA_detected_species",
    "invasive_species_flag",
];

/// Errors raised while ingesting raw rows.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A row was not a JSON object.
    #[error("row {row} is not a JSON object")]
    NotAnObject {
        /// Zero-based row index.
        row: usize,
    },
    /// A row lacked one or more required columns.
    #[error("row {row} is missing required columns: {columns:?}")]
    MissingColumns {
        /// Zero-based row index.
        row: usize,
        /// Names of the absent columns.
        columns: Vec<String>,
    },
    /// A row carried a value of the wrong type.
    #[error("row {row}: {source}")]
    Deserialize {
        /// Zero-based row index.
        row: usize,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Returns the required columns absent from a raw record, in schema order.
#[must_use]
pub fn missing_columns(record: &serde_json::Map<String, Value>, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|column| !record.contains_key(**column))
        .map(|column| (*column).to_string())
        .collect()
}

fn rows_from_json<T>(rows: &[Value], required: &[&str]) -> Result<Vec<T>, DatasetError>
where
    T: DeserializeOwned,
{
    let mut parsed = Vec::with_capacity(rows.len());
    for (row, value) in rows.iter().enumerate() {
        let Value::Object(record) = value else {
            return Err(DatasetError::NotAnObject { row });
        };
        let columns = missing_columns(record, required);
        if !columns.is_empty() {
            return Err(DatasetError::MissingColumns { row, columns });
        }
        let typed = serde_json::from_value(value.clone())
            .map_err(|source| DatasetError::Deserialize { row, source })?;
        parsed.push(typed);
    }
    Ok(parsed)
}

/// Decodes historical observations, failing fast with the missing column
/// names. Unknown extra fields are ignored.
pub fn observations_from_json(rows: &[Value]) -> Result<Vec<Observation>, DatasetError> {
    rows_from_json(rows, &REQUIRED_COLUMNS)
}

/// Decodes prediction-time rows, failing fast with the missing column names.
pub fn forecast_rows_from_json(rows: &[Value]) -> Result<Vec<ForecastRow>, DatasetError> {
    rows_from_json(rows, &FORECAST_COLUMNS)
}
