//! Pillar E: Ecosystem
//!
//! Human footprint and terrain context: WorldPop population density inside
//! the buffer, VIIRS nighttime radiance, the global human modification
//! index, SRTM elevation, and distance to permanent water. Radiance and
//! modification readings carry a plain-language interpretation band.

use anyhow::Result;
use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::pillars::{fetch_scaled, present_quality, PillarHandler, PillarId};
use crate::provider::{DatasetRef, Location, MetricProvider};
use crate::response::{DateRange, MetricReading};

const POPULATION: DatasetRef = DatasetRef::new("WorldPop/GP/100m/pop_age_sex_cons_unadj", "population");
const NIGHTLIGHTS: DatasetRef = DatasetRef::new("NOAA/VIIRS/DNB/MONTHLY_V1/VCMSLCFG", "avg_rad");
const HUMAN_MODIFICATION: DatasetRef = DatasetRef::new("CSP/HM/GlobalHumanModification", "gHM");
const ELEVATION: DatasetRef = DatasetRef::new("USGS/SRTMGL1_003", "elevation");
const ELEVATION_MIN: DatasetRef = DatasetRef::new("USGS/SRTMGL1_003", "elevation_min");
const ELEVATION_MAX: DatasetRef = DatasetRef::new("USGS/SRTMGL1_003", "elevation_max");
const DISTANCE_TO_WATER: DatasetRef =
    DatasetRef::new("JRC/GSW1_4/GlobalSurfaceWater", "distance_to_water");

const SIMPLE_METRICS: &[&str] = &["population", "nightlights"];
const COMPREHENSIVE_METRICS: &[&str] = &[
    "population",
    "nightlights",
    "human_modification",
    "elevation",
    "distance_to_water",
];

pub struct EcosystemPillar;

impl PillarHandler for EcosystemPillar {
    fn id(&self) -> PillarId {
        PillarId::E
    }

    fn simple_metrics(&self) -> &'static [&'static str] {
        SIMPLE_METRICS
    }

    fn comprehensive_metrics(&self) -> &'static [&'static str] {
        COMPREHENSIVE_METRICS
    }

    fn query_metrics(
        &self,
        provider: &dyn MetricProvider,
        location: Location,
        buffer_radius: f64,
        date_range: &DateRange,
        metrics: &[&str],
    ) -> Result<BTreeMap<String, MetricReading>> {
        let mut results = BTreeMap::new();

        if metrics.contains(&"population") {
            let total = fetch_scaled(provider, &POPULATION, location, buffer_radius, date_range)?;
            let radius_km = buffer_radius / 1000.0;
            let area_km2 = PI * radius_km * radius_km;
            let density = total.filter(|t| *t != 0.0).map(|t| t / area_km2);
            results.insert(
                "population".to_string(),
                MetricReading::new(
                    density,
                    "people/km2",
                    "Population Density",
                    present_quality(density),
                )
                .with_extra("total_in_buffer", total)
                .with_extra("buffer_area_km2", area_km2),
            );
        }

        if metrics.contains(&"nightlights") {
            let radiance = fetch_scaled(provider, &NIGHTLIGHTS, location, buffer_radius, date_range)?;
            results.insert(
                "nightlights".to_string(),
                MetricReading::new(
                    radiance,
                    "nanoWatts/cm2/sr",
                    "Nighttime Lights Radiance",
                    present_quality(radiance),
                )
                .with_extra("interpretation", interpret_nightlights(radiance)),
            );
        }

        if metrics.contains(&"human_modification") {
            let hm = fetch_scaled(provider, &HUMAN_MODIFICATION, location, buffer_radius, date_range)?;
            results.insert(
                "human_modification".to_string(),
                MetricReading::new(
                    hm,
                    "index 0-1",
                    "Global Human Modification Index",
                    present_quality(hm),
                )
                .with_extra("interpretation", interpret_human_modification(hm)),
            );
        }

        if metrics.contains(&"elevation") {
            let elevation = fetch_scaled(provider, &ELEVATION, location, buffer_radius, date_range)?;
            let min = fetch_scaled(provider, &ELEVATION_MIN, location, buffer_radius, date_range)?;
            let max = fetch_scaled(provider, &ELEVATION_MAX, location, buffer_radius, date_range)?;
            let relief = match (min, max) {
                (Some(mn), Some(mx)) => Some(mx - mn),
                _ => None,
            };
            results.insert(
                "elevation".to_string(),
                MetricReading::new(
                    elevation,
                    "meters",
                    "Elevation Above Sea Level",
                    present_quality(elevation),
                )
                .with_extra("min", min)
                .with_extra("max", max)
                .with_extra("relief", relief),
            );
        }

        if metrics.contains(&"distance_to_water") {
            let distance =
                fetch_scaled(provider, &DISTANCE_TO_WATER, location, buffer_radius, date_range)?;
            results.insert(
                "distance_to_water".to_string(),
                MetricReading::new(
                    distance,
                    "meters",
                    "Distance to Nearest Permanent Water",
                    present_quality(distance),
                ),
            );
        }

        Ok(results)
    }
}

fn interpret_nightlights(value: Option<f64>) -> &'static str {
    let Some(v) = value else { return "Unknown" };
    if v < 0.5 {
        "Very Dark (wilderness/rural)"
    } else if v < 5.0 {
        "Low (rural/suburban)"
    } else if v < 20.0 {
        "Moderate (suburban/urban)"
    } else if v < 50.0 {
        "High (urban)"
    } else {
        "Very High (urban core)"
    }
}

fn interpret_human_modification(value: Option<f64>) -> &'static str {
    let Some(v) = value else { return "Unknown" };
    if v < 0.1 {
        "Very Low (natural)"
    } else if v < 0.3 {
        "Low"
    } else if v < 0.5 {
        "Moderate"
    } else if v < 0.7 {
        "High"
    } else {
        "Very High (heavily modified)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;
    use crate::response::Quality;
    use approx::assert_relative_eq;

    fn run(provider: &StaticProvider, metrics: &[&str]) -> BTreeMap<String, MetricReading> {
        let range = DateRange {
            start: "2026-01-01".to_string(),
            end: "2026-01-31".to_string(),
        };
        EcosystemPillar
            .query_metrics(provider, Location::new(-3.0, -62.0), 500.0, &range, metrics)
            .unwrap()
    }

    #[test]
    fn test_population_density_over_buffer_area() {
        let results = run(&StaticProvider::sample_scene(), SIMPLE_METRICS);
        let population = &results["population"];

        // 120 people over pi * 0.5^2 km2
        let expected = 120.0 / (PI * 0.25);
        assert_relative_eq!(population.value.unwrap(), expected, epsilon = 1e-9);
        assert_eq!(population.quality, Quality::Good);
        assert_relative_eq!(
            population.extras.get("total_in_buffer").unwrap().as_f64().unwrap(),
            120.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            population.extras.get("buffer_area_km2").unwrap().as_f64().unwrap(),
            PI * 0.25,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_zero_population_has_no_density() {
        let mut provider = StaticProvider::sample_scene();
        provider.insert("WorldPop/GP/100m/pop_age_sex_cons_unadj", "population", 0.0);
        let results = run(&provider, &["population"]);
        let population = &results["population"];
        assert_eq!(population.value, None);
        assert_eq!(population.quality, Quality::Unavailable);
    }

    #[test]
    fn test_nightlights_interpretation_from_scene() {
        let results = run(&StaticProvider::sample_scene(), SIMPLE_METRICS);
        let nightlights = &results["nightlights"];
        assert_relative_eq!(nightlights.value.unwrap(), 0.8, epsilon = 1e-9);
        assert_eq!(
            nightlights.extras.get("interpretation").unwrap(),
            &serde_json::Value::from("Low (rural/suburban)")
        );
    }

    #[test]
    fn test_nightlights_bands() {
        assert_eq!(interpret_nightlights(None), "Unknown");
        assert_eq!(interpret_nightlights(Some(0.2)), "Very Dark (wilderness/rural)");
        assert_eq!(interpret_nightlights(Some(3.0)), "Low (rural/suburban)");
        assert_eq!(interpret_nightlights(Some(12.0)), "Moderate (suburban/urban)");
        assert_eq!(interpret_nightlights(Some(35.0)), "High (urban)");
        assert_eq!(interpret_nightlights(Some(80.0)), "Very High (urban core)");
    }

    #[test]
    fn test_human_modification_bands() {
        assert_eq!(interpret_human_modification(None), "Unknown");
        assert_eq!(interpret_human_modification(Some(0.05)), "Very Low (natural)");
        assert_eq!(interpret_human_modification(Some(0.18)), "Low");
        assert_eq!(interpret_human_modification(Some(0.4)), "Moderate");
        assert_eq!(interpret_human_modification(Some(0.6)), "High");
        assert_eq!(
            interpret_human_modification(Some(0.9)),
            "Very High (heavily modified)"
        );
    }

    #[test]
    fn test_elevation_terrain_stats() {
        let results = run(&StaticProvider::sample_scene(), COMPREHENSIVE_METRICS);
        let elevation = &results["elevation"];
        assert_relative_eq!(elevation.value.unwrap(), 310.0, epsilon = 1e-9);
        // relief = 330 - 295
        assert_relative_eq!(
            elevation.extras.get("relief").unwrap().as_f64().unwrap(),
            35.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_distance_to_water() {
        let results = run(&StaticProvider::sample_scene(), COMPREHENSIVE_METRICS);
        let distance = &results["distance_to_water"];
        assert_relative_eq!(distance.value.unwrap(), 1250.0, epsilon = 1e-9);
        assert_eq!(distance.quality, Quality::Good);
    }

    #[test]
    fn test_missing_distance_is_unavailable() {
        let mut provider = StaticProvider::sample_scene();
        provider.remove("JRC/GSW1_4/GlobalSurfaceWater", "distance_to_water");
        let results = run(&provider, COMPREHENSIVE_METRICS);
        assert_eq!(results["distance_to_water"].quality, Quality::Unavailable);
    }
}
