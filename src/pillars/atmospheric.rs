//! Pillar A: Atmospheric
//!
//! Air quality and atmospheric conditions from the MODIS aerosol (MCD19A2)
//! and atmosphere (MOD08_M3) products. AQI and UV index are estimated from
//! the coarse atmosphere bands; visibility is derived from AOD in-handler
//! rather than fetched.

use anyhow::Result;
use std::collections::BTreeMap;

use crate::pillars::{fetch_scaled, present_quality, PillarHandler, PillarId};
use crate::provider::{DatasetRef, Location, MetricProvider};
use crate::response::{DateRange, MetricReading, Quality};
use crate::utils::round_dp;

const AOD: DatasetRef =
    DatasetRef::new("MODIS/061/MCD19A2_GRANULES", "Optical_Depth_047").scaled(0.001);
const ATMOSPHERE_AOD: DatasetRef =
    DatasetRef::new("MODIS/061/MOD08_M3", "Aerosol_Optical_Depth_Land_Ocean_Mean_Mean");
const ATMOSPHERE_OZONE: DatasetRef =
    DatasetRef::new("MODIS/061/MOD08_M3", "Total_Ozone_Mean_Mean");
const ATMOSPHERE_CLOUD: DatasetRef =
    DatasetRef::new("MODIS/061/MOD08_M3", "Cloud_Fraction_Mean_Mean").scaled(0.01);

const SIMPLE_METRICS: &[&str] = &["aod", "aqi"];
const COMPREHENSIVE_METRICS: &[&str] = &["aod", "aqi", "uv_index", "visibility", "cloud_fraction"];

pub struct AtmosphericPillar;

impl PillarHandler for AtmosphericPillar {
    fn id(&self) -> PillarId {
        PillarId::A
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

        if metrics.contains(&"aod") {
            let aod = fetch_scaled(provider, &AOD, location, buffer_radius, date_range)?;
            results.insert(
                "aod".to_string(),
                MetricReading::new(
                    aod,
                    "dimensionless",
                    "Aerosol Optical Depth at 470nm",
                    assess_aod_quality(aod),
                ),
            );
        }

        if metrics.contains(&"aqi") {
            let band = fetch_scaled(provider, &ATMOSPHERE_AOD, location, buffer_radius, date_range)?;
            // Rough AQI estimate from the column aerosol load
            let aqi = band.map(|v| (v * 1000.0).clamp(0.0, 500.0));
            results.insert(
                "aqi".to_string(),
                MetricReading::new(
                    aqi,
                    "index",
                    "Air Quality Index (estimated from AOD)",
                    assess_aqi_quality(aqi),
                ),
            );
        }

        if metrics.contains(&"uv_index") {
            let ozone =
                fetch_scaled(provider, &ATMOSPHERE_OZONE, location, buffer_radius, date_range)?;
            // Thinner ozone column means more surface UV
            let uv = ozone.map(|dobson| (15.0 - dobson / 30.0).max(0.0));
            results.insert(
                "uv_index".to_string(),
                MetricReading::new(uv, "index", "UV Index (estimated)", present_quality(uv)),
            );
        }

        if metrics.contains(&"cloud_fraction") {
            let cloud =
                fetch_scaled(provider, &ATMOSPHERE_CLOUD, location, buffer_radius, date_range)?;
            results.insert(
                "cloud_fraction".to_string(),
                MetricReading::new(cloud, "fraction", "Cloud Fraction", present_quality(cloud)),
            );
        }

        if metrics.contains(&"visibility") {
            let reading = match results.get("aod").and_then(|r| r.value) {
                Some(aod) if aod >= 0.0 => {
                    // Koschmieder approximation: visibility (km) ~ 50 / (1 + 10 * AOD)
                    let km = (50.0 / (1.0 + 10.0 * aod)).clamp(1.0, 50.0);
                    MetricReading::new(
                        Some(round_dp(km, 2)),
                        "km",
                        "Estimated Visibility (derived from AOD)",
                        Quality::Moderate,
                    )
                    .with_source("derived_from_aod")
                }
                _ => MetricReading::unavailable("Requires valid AOD value for calculation"),
            };
            results.insert("visibility".to_string(), reading);
        }

        Ok(results)
    }
}

fn assess_aod_quality(value: Option<f64>) -> Quality {
    match value {
        None => Quality::Unavailable,
        Some(v) if !(0.0..=3.0).contains(&v) => Quality::Poor,
        Some(v) if v < 0.1 => Quality::Good,
        Some(v) if v < 0.3 => Quality::Moderate,
        Some(_) => Quality::Good,
    }
}

fn assess_aqi_quality(value: Option<f64>) -> Quality {
    match value {
        None => Quality::Unavailable,
        Some(v) if !(0.0..=500.0).contains(&v) => Quality::Poor,
        Some(_) => Quality::Good,
    }
}
