//! Ecosystem Classification
//!
//! Maps land cover, canopy cover, and human footprint readings to a broad
//! ecosystem class. The class selects the pillar weight profile used for the
//! overall score and the baseline used for ecosystem service valuation.

use serde::Serialize;

/// Broad ecosystem classes recognized by the scoring and valuation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EcosystemType {
    TropicalForest,
    Mangrove,
    Wetland,
    GrasslandSavanna,
    Agricultural,
    UrbanGreen,
    Default,
}

impl EcosystemType {
    pub const ALL: [EcosystemType; 7] = [
        EcosystemType::TropicalForest,
        EcosystemType::Mangrove,
        EcosystemType::Wetland,
        EcosystemType::GrasslandSavanna,
        EcosystemType::Agricultural,
        EcosystemType::UrbanGreen,
        EcosystemType::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EcosystemType::TropicalForest => "tropical_forest",
            EcosystemType::Mangrove => "mangrove",
            EcosystemType::Wetland => "wetland",
            EcosystemType::GrasslandSavanna => "grassland_savanna",
            EcosystemType::Agricultural => "agricultural",
            EcosystemType::UrbanGreen => "urban_green",
            EcosystemType::Default => "default",
        }
    }
}

// Canopy cover (%) below which a forest land-cover class is treated as savanna.
const SPARSE_CANOPY_PCT: f64 = 25.0;

// Human modification index above which any non-built class is reclassified
// as urban green space.
const URBAN_PRESSURE_INDEX: f64 = 0.6;

/// Classify the ecosystem at a location from up to three readings.
///
/// `land_cover` is a WorldCover class code (10-100), `tree_cover` a canopy
/// percentage, and `human_modification` the gHM index in [0,1]. Any of the
/// three may be absent; classification always succeeds and falls back to
/// `Default` when nothing is known.
pub fn classify(
    land_cover: Option<f64>,
    tree_cover: Option<f64>,
    human_modification: Option<f64>,
) -> EcosystemType {
    if let Some(code) = land_cover {
        let mut ecosystem = match code as i64 {
            10 => EcosystemType::TropicalForest,
            20 | 30 => EcosystemType::GrasslandSavanna,
            40 => EcosystemType::Agricultural,
            50 => EcosystemType::UrbanGreen,
            80 | 90 => EcosystemType::Wetland,
            95 => EcosystemType::Mangrove,
            // 60 bare, 70 snow/ice, 100 moss/lichen, or unmapped codes
            _ => EcosystemType::Default,
        };

        // Sparse-canopy forest reads as savanna
        if ecosystem == EcosystemType::TropicalForest {
            if let Some(canopy) = tree_cover {
                if canopy < SPARSE_CANOPY_PCT {
                    ecosystem = EcosystemType::GrasslandSavanna;
                }
            }
        }

        // Heavy human pressure overrides natural classes
        if human_modification.is_some_and(|hm| hm > URBAN_PRESSURE_INDEX)
            && !matches!(
                ecosystem,
                EcosystemType::UrbanGreen | EcosystemType::Agricultural
            )
        {
            ecosystem = EcosystemType::UrbanGreen;
        }

        return ecosystem;
    }

    // No land cover: infer from canopy, then human footprint
    match tree_cover {
        Some(canopy) if canopy > 50.0 => EcosystemType::TropicalForest,
        Some(canopy) if canopy > 10.0 => EcosystemType::GrasslandSavanna,
        _ => match human_modification {
            Some(hm) if hm > 0.5 => EcosystemType::UrbanGreen,
            Some(hm) if hm > 0.3 => EcosystemType::Agricultural,
            _ => EcosystemType::Default,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worldcover_class_mapping() {
        assert_eq!(classify(Some(10.0), None, None), EcosystemType::TropicalForest);
        assert_eq!(classify(Some(20.0), None, None), EcosystemType::GrasslandSavanna);
        assert_eq!(classify(Some(30.0), None, None), EcosystemType::GrasslandSavanna);
        assert_eq!(classify(Some(40.0), None, None), EcosystemType::Agricultural);
        assert_eq!(classify(Some(50.0), None, None), EcosystemType::UrbanGreen);
        assert_eq!(classify(Some(80.0), None, None), EcosystemType::Wetland);
        assert_eq!(classify(Some(90.0), None, None), EcosystemType::Wetland);
        assert_eq!(classify(Some(95.0), None, None), EcosystemType::Mangrove);
    }

    #[test]
    fn test_unmapped_classes_default() {
        assert_eq!(classify(Some(60.0), None, None), EcosystemType::Default);
        assert_eq!(classify(Some(70.0), None, None), EcosystemType::Default);
        assert_eq!(classify(Some(100.0), None, None), EcosystemType::Default);
        assert_eq!(classify(Some(255.0), None, None), EcosystemType::Default);
    }

    #[test]
    fn test_sparse_forest_demoted_to_savanna() {
        // Forest class but only 12% canopy → savanna
        assert_eq!(
            classify(Some(10.0), Some(12.0), None),
            EcosystemType::GrasslandSavanna
        );
        // 25% is not below the threshold
        assert_eq!(
            classify(Some(10.0), Some(25.0), None),
            EcosystemType::TropicalForest
        );
        // Missing canopy leaves the class alone
        assert_eq!(classify(Some(10.0), None, None), EcosystemType::TropicalForest);
    }

    #[test]
    fn test_human_pressure_forces_urban_green() {
        assert_eq!(
            classify(Some(10.0), Some(80.0), Some(0.75)),
            EcosystemType::UrbanGreen
        );
        assert_eq!(
            classify(Some(90.0), None, Some(0.61)),
            EcosystemType::UrbanGreen
        );
        // Agricultural and urban classes are left as-is
        assert_eq!(
            classify(Some(40.0), None, Some(0.9)),
            EcosystemType::Agricultural
        );
        assert_eq!(
            classify(Some(50.0), None, Some(0.9)),
            EcosystemType::UrbanGreen
        );
        // At exactly 0.6 the override does not fire
        assert_eq!(
            classify(Some(10.0), None, Some(0.6)),
            EcosystemType::TropicalForest
        );
    }

    #[test]
    fn test_fallback_from_canopy() {
        assert_eq!(classify(None, Some(65.0), None), EcosystemType::TropicalForest);
        assert_eq!(classify(None, Some(30.0), None), EcosystemType::GrasslandSavanna);
        assert_eq!(classify(None, Some(5.0), None), EcosystemType::Default);
    }

    #[test]
    fn test_fallback_from_human_modification() {
        assert_eq!(classify(None, None, Some(0.8)), EcosystemType::UrbanGreen);
        assert_eq!(classify(None, None, Some(0.4)), EcosystemType::Agricultural);
        assert_eq!(classify(None, None, Some(0.1)), EcosystemType::Default);
        // Low canopy falls through to the human-footprint branch
        assert_eq!(classify(None, Some(8.0), Some(0.55)), EcosystemType::UrbanGreen);
    }

    #[test]
    fn test_no_data_defaults() {
        assert_eq!(classify(None, None, None), EcosystemType::Default);
    }

    #[test]
    fn test_serializes_snake_case() {
        let json = serde_json::to_string(&EcosystemType::TropicalForest).unwrap();
        assert_eq!(json, "\"tropical_forest\"");
        let json = serde_json::to_string(&EcosystemType::Default).unwrap();
        assert_eq!(json, "\"default\"");
    }
}
