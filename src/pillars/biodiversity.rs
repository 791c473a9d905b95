//! Pillar B: Biodiversity
//!
//! Vegetation vigor from the MODIS vegetation index and LAI/FPAR products,
//! plus the dominant WorldCover land-cover class. The land-cover code also
//! feeds ecosystem classification downstream, which is why it stays raw.

use anyhow::Result;
use std::collections::BTreeMap;

use crate::pillars::{fetch_scaled, present_quality, PillarHandler, PillarId};
use crate::provider::{DatasetRef, Location, MetricProvider};
use crate::response::{DateRange, MetricReading, Quality};

const VEGETATION_NDVI: DatasetRef = DatasetRef::new("MODIS/061/MOD13A2", "NDVI").scaled(0.0001);
const VEGETATION_EVI: DatasetRef = DatasetRef::new("MODIS/061/MOD13A2", "EVI").scaled(0.0001);
const CANOPY_LAI: DatasetRef = DatasetRef::new("MODIS/061/MOD15A2H", "Lai_500m").scaled(0.1);
const CANOPY_FPAR: DatasetRef = DatasetRef::new("MODIS/061/MOD15A2H", "Fpar_500m").scaled(0.01);
const LAND_COVER: DatasetRef = DatasetRef::new("ESA/WorldCover/v200", "Map");

const SIMPLE_METRICS: &[&str] = &["ndvi", "evi"];
const COMPREHENSIVE_METRICS: &[&str] = &["ndvi", "evi", "lai", "land_cover", "fpar"];

pub struct BiodiversityPillar;

impl PillarHandler for BiodiversityPillar {
    fn id(&self) -> PillarId {
        PillarId::B
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

        if metrics.contains(&"ndvi") {
            let ndvi = fetch_scaled(provider, &VEGETATION_NDVI, location, buffer_radius, date_range)?;
            results.insert(
                "ndvi".to_string(),
                MetricReading::new(
                    ndvi,
                    "dimensionless",
                    "Normalized Difference Vegetation Index",
                    assess_ndvi_quality(ndvi),
                )
                .with_source("MODIS")
                .with_resolution("1km"),
            );
        }

        if metrics.contains(&"evi") {
            let evi = fetch_scaled(provider, &VEGETATION_EVI, location, buffer_radius, date_range)?;
            results.insert(
                "evi".to_string(),
                MetricReading::new(
                    evi,
                    "dimensionless",
                    "Enhanced Vegetation Index",
                    present_quality(evi),
                )
                .with_source("MODIS")
                .with_resolution("1km"),
            );
        }

        if metrics.contains(&"lai") {
            let lai = fetch_scaled(provider, &CANOPY_LAI, location, buffer_radius, date_range)?;
            results.insert(
                "lai".to_string(),
                MetricReading::new(lai, "m2/m2", "Leaf Area Index", present_quality(lai)),
            );
        }

        if metrics.contains(&"land_cover") {
            let code = fetch_scaled(provider, &LAND_COVER, location, buffer_radius, date_range)?;
            let class_name = code.and_then(worldcover_class_name);
            results.insert(
                "land_cover".to_string(),
                MetricReading::new(
                    code,
                    "class",
                    "Dominant Land Cover Class",
                    present_quality(code),
                )
                .with_extra("class_name", class_name),
            );
        }

        if metrics.contains(&"fpar") {
            let fpar = fetch_scaled(provider, &CANOPY_FPAR, location, buffer_radius, date_range)?;
            results.insert(
                "fpar".to_string(),
                MetricReading::new(
                    fpar,
                    "fraction",
                    "Fraction of Absorbed PAR",
                    present_quality(fpar),
                ),
            );
        }

        Ok(results)
    }
}

fn assess_ndvi_quality(value: Option<f64>) -> Quality {
    match value {
        None => Quality::Unavailable,
        Some(v) if !(-1.0..=1.0).contains(&v) => Quality::Poor,
        Some(_) => Quality::Good,
    }
}

/// WorldCover v200 class labels.
fn worldcover_class_name(code: f64) -> Option<&'static str> {
    match code as i64 {
        10 => Some("Tree cover"),
        20 => Some("Shrubland"),
        30 => Some("Grassland"),
        40 => Some("Cropland"),
        50 => Some("Built-up"),
        60 => Some("Bare/sparse vegetation"),
        70 => Some("Snow and ice"),
        80 => Some("Permanent water"),
        90 => Some("Herbaceous wetland"),
        95 => Some("Mangroves"),
        100 => Some("Moss and lichen"),
        _ => None,
    }
}
