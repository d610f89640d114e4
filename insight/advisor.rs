use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::derive::invasive_to_flag;
use crate::dataset::record::{ForecastRow, Observation};

/// Fish-stock values below this trigger a fishing ban alert.
pub const FISHING_BAN_BELOW: f64 = 30.0;
/// Biodiversity index values below this recommend a conservation zone.
pub const CONSERVATION_ZONE_BELOW: f64 = 40.0;

/// One of four fixed advisories, chosen by the first matching rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advisory {
    /// Invasive species flagged.
    #[serde(rename = "invasive species risk")]
    InvasiveSpeciesRisk,
    /// Fish stock below the ban threshold.
    #[serde(rename = "fishing ban alert")]
    FishingBanAlert,
    /// Biodiversity below the conservation threshold.
    #[serde(rename = "recommend conservation zone")]
    RecommendConservationZone,
    /// No rule matched.
    #[serde(rename = "sustainable fishing possible")]
    SustainableFishingPossible,
}

impl Advisory {
    /// Applies the rules in priority order: invasive flag, fish stock,
    /// biodiversity, fallback. The stock value may be historical or a
    /// prediction; the rule does not distinguish.
    #[must_use]
    pub fn recommend(fish_stock: f64, biodiversity_index: f64, invasive_species_flag: &str) -> Self {
        if invasive_to_flag(invasive_species_flag) == 1 {
            Self::InvasiveSpeciesRisk
        } else if fish_stock < FISHING_BAN_BELOW {
            Self::FishingBanAlert
        } else if biodiversity_index < CONSERVATION_ZONE_BELOW {
            Self::RecommendConservationZone
        } else {
            Self::SustainableFishingPossible
        }
    }

    /// Advisory for a historical observation using its true stock index.
    #[must_use]
    pub fn for_observation(row: &Observation) -> Self {
        Self::recommend(
            row.fish_stock_index,
            row.biodiversity_index,
            &row.invasive_species_flag,
        )
    }

    /// Advisory for a forecast row using a predicted stock value.
    #[must_use]
    pub fn for_forecast(row: &ForecastRow, predicted_stock: f64) -> Self {
        Self::recommend(
            predicted_stock,
            row.biodiversity_index,
            &row.invasive_species_flag,
        )
    }

    /// The fixed advisory string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvasiveSpeciesRisk => "invasive species risk",
            Self::FishingBanAlert => "fishing ban alert",
            Self::RecommendConservationZone => "recommend conservation zone",
            Self::SustainableFishingPossible => "sustainable fishing possible",
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Traffic-light triage for dashboard maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    /// No alert.
    Green,
    /// Low stock or low biodiversity.
    Yellow,
    /// Invasive species present.
    Red,
}

impl AlertStatus {
    /// Triage for a historical observation.
    #[must_use]
    pub fn for_observation(row: &Observation) -> Self {
        if invasive_to_flag(&row.invasive_species_flag) == 1 {
            Self::Red
        } else if row.fish_stock_index < FISHING_BAN_BELOW
            || row.biodiversity_index < CONSERVATION_ZONE_BELOW
        {
            Self::Yellow
        } else {
            Self::Green
        }
    }
}

/// Aggregate view of a dataset for the boundary layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Rows summarized.
    pub count: usize,
    /// Mean fish stock index.
    pub avg_fish_stock_index: f64,
    /// Mean biodiversity index.
    pub avg_biodiversity_index: f64,
    /// Rows under the fishing ban threshold.
    pub restricted_zones: usize,
    /// Rows under the conservation threshold.
    pub conservation_priority: usize,
    /// Rows with the invasive flag set.
    pub invasive_species_risk: usize,
}

impl DatasetSummary {
    /// Summarizes a batch of observations; an empty batch is all zeros.
    #[must_use]
    pub fn from_observations(rows: &[Observation]) -> Self {
        if rows.is_empty() {
            return Self {
                count: 0,
                avg_fish_stock_index: 0.0,
                avg_biodiversity_index: 0.0,
                restricted_zones: 0,
                conservation_priority: 0,
                invasive_species_risk: 0,
            };
        }
        let count = rows.len();
        Self {
            count,
            avg_fish_stock_index: rows.iter().map(|row| row.fish_stock_index).sum::<f64>()
                / count as f64,
            avg_biodiversity_index: rows.iter().map(|row| row.biodiversity_index).sum::<f64>()
                / count as f64,
            restricted_zones: rows
                .iter()
                .filter(|row| row.fish_stock_index < FISHING_BAN_BELOW)
                .count(),
            conservation_priority: rows
                .iter()
                .filter(|row| row.biodiversity_index < CONSERVATION_ZONE_BELOW)
                .count(),
            invasive_species_risk: rows
                .iter()
                .filter(|row| invasive_to_flag(&row.invasive_species_flag) == 1)
                .count(),
        }
    }
}
