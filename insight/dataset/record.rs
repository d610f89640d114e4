use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::derive::{invasive_to_flag, species_count, RiskLevel};

/// Accepts the eDNA species field either comma-joined or as a list, and a
/// JSON null as an empty detection.
fn species_field<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SpeciesField {
        Joined(String),
        Listed(Vec<String>),
    }

    Ok(match Option::<SpeciesField>::deserialize(deserializer)? {
        Some(SpeciesField::Joined(value)) => value,
        Some(SpeciesField::Listed(items)) => items.join(","),
        None => String::new(),
    })
}

/// One historical ocean/fisheries sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Sample date.
    pub date: NaiveDate,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Region name (open set).
    pub region: String,
    /// Sea surface temperature in °C.
    pub sea_temperature: f64,
    /// Salinity in PSU.
    pub salinity: f64,
    /// Fish stock index, 0–100.
    pub fish_stock_index: f64,
    /// Biodiversity index, 0–100.
    pub biodiversity_index: f64,
    /// Comma-joined detected species.
    #[serde(rename = "eDNA_detected_species", deserialize_with = "species_field")]
    pub edna_detected_species: String,
    /// Invasive-species flag, "yes" or "no".
    pub invasive_species_flag: String,
}

impl Observation {
    /// Enriches the observation with the derived feature fields.
    #[must_use]
    pub fn prepare(&self) -> PreparedObservation {
        PreparedObservation {
            edna_count: species_count(&self.edna_detected_species),
            invasive_flag: invasive_to_flag(&self.invasive_species_flag),
            biodiversity_risk: RiskLevel::from_biodiversity_index(self.biodiversity_index),
            base: self.clone(),
        }
    }
}

/// A prediction-time row: observation shape without the fish stock target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    /// Sample date.
    pub date: NaiveDate,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Region name (open set).
    pub region: String,
    /// Sea surface temperature in °C.
    pub sea_temperature: f64,
    /// Salinity in PSU.
    pub salinity: f64,
    /// Biodiversity index, 0–100.
    pub biodiversity_index: f64,
    /// Comma-joined detected species.
    #[serde(rename = "eDNA_detected_species", deserialize_with = "species_field")]
    pub edna_detected_species: String,
    /// Invasive-species flag, "yes" or "no".
    pub invasive_species_flag: String,
}

impl ForecastRow {
    /// Enriches the row with the derived feature fields.
    #[must_use]
    pub fn prepare(&self) -> PreparedForecast {
        PreparedForecast {
            edna_count: species_count(&self.edna_detected_species),
            invasive_flag: invasive_to_flag(&self.invasive_species_flag),
            biodiversity_risk: RiskLevel::from_biodiversity_index(self.biodiversity_index),
            base: self.clone(),
        }
    }
}

/// Historical observation enriched with the derived features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedObservation {
    /// The source observation.
    #[serde(flatten)]
    pub base: Observation,
    /// Number of species detected via eDNA.
    #[serde(rename = "eDNA_count")]
    pub edna_count: u32,
    /// Invasive-species flag as 0/1.
    pub invasive_flag: u8,
    /// Derived biodiversity risk label.
    pub biodiversity_risk: RiskLevel,
}

/// Forecast row enriched with the derived features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedForecast {
    /// The source row.
    #[serde(flatten)]
    pub base: ForecastRow,
    /// Number of species detected via eDNA.
    #[serde(rename = "eDNA_count")]
    pub edna_count: u32,
    /// Invasive-species flag as 0/1.
    pub invasive_flag: u8,
    /// Derived biodiversity risk label.
    pub biodiversity_risk: RiskLevel,
}

/// Prepares a batch of historical observations.
#[must_use]
pub fn prepare_observations(rows: &[Observation]) -> Vec<PreparedObservation> {
    rows.iter().map(Observation::prepare).collect()
}

/// Prepares a batch of prediction-time rows.
#[must_use]
pub fn prepare_forecast(rows: &[ForecastRow]) -> Vec<PreparedForecast> {
    rows.iter().map(ForecastRow::prepare).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prepare_derives_all_three_features() {
        let row = Observation {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            lat: 15.0,
            lon: 87.0,
            region: "Bay of Bengal".into(),
            sea_temperature: 22.0,
            salinity: 34.0,
            fish_stock_index: 55.0,
            biodiversity_index: 38.5,
            edna_detected_species: "Tuna,Cod,Sardine".into(),
            invasive_species_flag: "Yes".into(),
        };
        let prepared = row.prepare();
        assert_eq!(prepared.edna_count, 3);
        assert_eq!(prepared.invasive_flag, 1);
        assert_eq!(prepared.biodiversity_risk, RiskLevel::High);
    }

    #[test]
    fn species_list_deserializes_to_joined_string() {
        let row: ForecastRow = serde_json::from_value(json!({
            "date": "2024-03-01",
            "lat": 12.0,
            "lon": 97.0,
            "region": "Andaman Sea",
            "sea_temperature": 24.0,
            "salinity": 33.5,
            "biodiversity_index": 62.0,
            "eDNA_detected_species": ["Tuna", "Cod"],
            "invasive_species_flag": "no"
        }))
        .unwrap();
        assert_eq!(row.edna_detected_species, "Tuna,Cod");
        assert_eq!(row.prepare().edna_count, 2);
    }

    #[test]
    fn null_species_means_zero_detections() {
        let row: ForecastRow = serde_json::from_value(json!({
            "date": "2024-03-01",
            "lat": 12.0,
            "lon": 97.0,
            "region": "Andaman Sea",
            "sea_temperature": 24.0,
            "salinity": 33.5,
            "biodiversity_index": 62.0,
            "eDNA_detected_species": null,
            "invasive_species_flag": "no"
        }))
        .unwrap();
        assert_eq!(row.prepare().edna_count, 0);
    }

    #[test]
    fn prepared_row_serializes_flat() {
        let row = Observation {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            lat: 15.0,
            lon: 87.0,
            region: "Bay of Bengal".into(),
            sea_temperature: 22.0,
            salinity: 34.0,
            fish_stock_index: 55.0,
            biodiversity_index: 45.0,
            edna_detected_species: String::new(),
            invasive_species_flag: "no".into(),
        };
        let value = serde_json::to_value(row.prepare()).unwrap();
        assert_eq!(value["region"], json!("Bay of Bengal"));
        assert_eq!(value["eDNA_count"], json!(0));
        assert_eq!(value["invasive_flag"], json!(0));
        assert_eq!(value["biodiversity_risk"], json!("medium"));
    }
}
