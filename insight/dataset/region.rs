use super::record::Observation;

/// Region names included in the Northern Indian Ocean subset.
pub const NORTHERN_INDIAN_OCEAN_REGIONS: [&str; 6] = [
    "Bay of Bengal",
    "Arabian Sea",
    "Laccadive Sea",
    "Indian Ocean",
    "Andaman Sea",
    "Persian Gulf",
];

/// Inclusive lat/lon bounding box.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    /// Southern edge.
    pub lat_min: f64,
    /// Northern edge.
    pub lat_max: f64,
    /// Western edge.
    pub lon_min: f64,
    /// Eastern edge.
    pub lon_max: f64,
}

impl BoundingBox {
    /// Returns whether a point falls inside the box.
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }
}

/// Bounding box restricting the named regions to the Northern Indian Ocean.
pub const NORTHERN_INDIAN_OCEAN_BBOX: BoundingBox = BoundingBox {
    lat_min: 0.0,
    lat_max: 30.0,
    lon_min: 50.0,
    lon_max: 100.0,
};

/// Keeps observations in the named Northern-Indian-Ocean regions that also
/// fall inside the bounding box.
#[must_use]
pub fn filter_northern_indian_ocean(rows: &[Observation]) -> Vec<Observation> {
    rows.iter()
        .filter(|row| {
            NORTHERN_INDIAN_OCEAN_REGIONS.contains(&row.region.as_str())
                && NORTHERN_INDIAN_OCEAN_BBOX.contains(row.lat, row.lon)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn observation(region: &str, lat: f64, lon: f64) -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            lat,
            lon,
            region: region.into(),
            sea_temperature: 22.0,
            salinity: 34.0,
            fish_stock_index: 55.0,
            biodiversity_index: 45.0,
            edna_detected_species: "Tuna".into(),
            invasive_species_flag: "no".into(),
        }
    }

    #[test]
    fn keeps_named_regions_inside_the_box() {
        let rows = vec![
            observation("Bay of Bengal", 15.0, 87.0),
            observation("North Atlantic", 40.0, -30.0),
            observation("Indian Ocean", -25.0, 80.0),
        ];
        let kept = filter_northern_indian_ocean(&rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].region, "Bay of Bengal");
    }

    #[test]
    fn bbox_edges_are_inclusive() {
        assert!(NORTHERN_INDIAN_OCEAN_BBOX.contains(0.0, 50.0));
        assert!(NORTHERN_INDIAN_OCEAN_BBOX.contains(30.0, 100.0));
        assert!(!NORTHERN_INDIAN_OCEAN_BBOX.contains(30.1, 80.0));
    }
}
