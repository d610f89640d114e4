use std::fmt;

use serde::{Deserialize, Serialize};

/// Biodiversity index values below this are high risk.
pub const HIGH_RISK_BELOW: f64 = 40.0;
/// Biodiversity index values below this (and at or above the high cut) are
/// medium risk.
pub const MEDIUM_RISK_BELOW: f64 = 60.0;

/// Three-level biodiversity risk derived from the biodiversity index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Index below 40.
    High,
    /// Index in [40, 60).
    Medium,
    /// Index at or above 60.
    Low,
}

impl RiskLevel {
    /// Derives the risk level from a biodiversity index value.
    #[must_use]
    pub fn from_biodiversity_index(index: f64) -> Self {
        if index < HIGH_RISK_BELOW {
            Self::High
        } else if index < MEDIUM_RISK_BELOW {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Returns the label string used in datasets and responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts species in a comma-joined eDNA detection string. The empty string
/// is zero species; otherwise every comma-separated segment counts.
#[must_use]
pub fn species_count(species: &str) -> u32 {
    if species.is_empty() {
        0
    } else {
        species.split(',').count() as u32
    }
}

/// Maps the "yes"/"no" invasive-species flag to 1/0, case-insensitively.
#[must_use]
pub fn invasive_to_flag(flag: &str) -> u8 {
    u8::from(flag.eq_ignore_ascii_case("yes"))
}
