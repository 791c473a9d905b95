//! Pillar C: Carbon
//!
//! Forest cover and loss from Hansen Global Forest Change, canopy height
//! from the ETH 2020 product, above-ground biomass from GEDI L4A. Biomass
//! falls back to an allometric estimate from canopy height when GEDI has
//! no coverage, and carbon stock is derived as half the biomass.

use anyhow::Result;
use std::collections::BTreeMap;

use crate::pillars::{fetch_scaled, present_quality, PillarHandler, PillarId};
use crate::provider::{DatasetRef, Location, MetricProvider};
use crate::response::{DateRange, MetricReading, Quality};

const HANSEN_TREE_COVER: DatasetRef =
    DatasetRef::new("UMD/hansen/global_forest_change_2023_v1_11", "treecover2000");
const HANSEN_LOSS: DatasetRef =
    DatasetRef::new("UMD/hansen/global_forest_change_2023_v1_11", "loss");
const HANSEN_LOSS_YEAR: DatasetRef =
    DatasetRef::new("UMD/hansen/global_forest_change_2023_v1_11", "lossyear");
const GEDI_BIOMASS: DatasetRef = DatasetRef::new("LARSE/GEDI/GEDI04_A_002_MONTHLY", "agbd");
const ETH_CANOPY: DatasetRef = DatasetRef::new("users/nlang/ETH_GlobalCanopyHeight_2020_10m_v1", "b1");

/// Mg/ha of above-ground biomass per meter of canopy height, used when
/// GEDI has no footprint in the buffer.
const BIOMASS_PER_METER: f64 = 8.0;
const CARBON_FRACTION: f64 = 0.5;

const SIMPLE_METRICS: &[&str] = &["tree_cover", "forest_loss"];
const COMPREHENSIVE_METRICS: &[&str] = &[
    "tree_cover",
    "forest_loss",
    "canopy_height",
    "biomass",
    "carbon_stock",
];

pub struct CarbonPillar;

impl PillarHandler for CarbonPillar {
    fn id(&self) -> PillarId {
        PillarId::C
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

        if metrics.contains(&"tree_cover") {
            let cover = fetch_scaled(provider, &HANSEN_TREE_COVER, location, buffer_radius, date_range)?;
            results.insert(
                "tree_cover".to_string(),
                MetricReading::new(
                    cover,
                    "percent",
                    "Tree Cover in Year 2000",
                    present_quality(cover),
                ),
            );
        }

        if metrics.contains(&"forest_loss") {
            let loss = fetch_scaled(provider, &HANSEN_LOSS, location, buffer_radius, date_range)?;
            let loss_year = fetch_scaled(provider, &HANSEN_LOSS_YEAR, location, buffer_radius, date_range)?;
            let detected = loss.is_some_and(|v| v != 0.0);
            results.insert(
                "forest_loss".to_string(),
                MetricReading::new(
                    Some(if detected { 1.0 } else { 0.0 }),
                    "binary",
                    "Forest Loss Detected Since 2000",
                    Quality::Good,
                )
                .with_extra(
                    "loss_year",
                    loss_year.filter(|v| *v != 0.0).map(|v| 2000 + v as i64),
                ),
            );
        }

        if metrics.contains(&"canopy_height") {
            let height = fetch_scaled(provider, &ETH_CANOPY, location, buffer_radius, date_range)?;
            results.insert(
                "canopy_height".to_string(),
                MetricReading::new(height, "meters", "Canopy Height", present_quality(height))
                    .with_source("ETH Global Canopy Height 2020"),
            );
        }

        if metrics.contains(&"biomass") {
            let agbd = fetch_scaled(provider, &GEDI_BIOMASS, location, buffer_radius, date_range)?;
            let reading = match agbd {
                Some(_) => MetricReading::new(
                    agbd,
                    "Mg/ha",
                    "Above-ground Biomass Density",
                    Quality::Good,
                )
                .with_source("GEDI L4A"),
                None => {
                    let height = results
                        .get("canopy_height")
                        .and_then(|r: &MetricReading| r.value);
                    match height {
                        Some(h) => MetricReading::new(
                            Some(h * BIOMASS_PER_METER),
                            "Mg/ha",
                            "Above-ground Biomass (estimated from height)",
                            Quality::Moderate,
                        )
                        .with_source("Estimated"),
                        None => MetricReading::unavailable("No GEDI data available"),
                    }
                }
            };
            results.insert("biomass".to_string(), reading);
        }

        if metrics.contains(&"carbon_stock") {
            let biomass = results.get("biomass");
            let reading = match biomass.and_then(|r| r.value) {
                Some(b) => MetricReading::new(
                    Some(b * CARBON_FRACTION),
                    "Mg C/ha",
                    "Carbon Stock (0.5 x biomass)",
                    biomass.map_or(Quality::Unavailable, |r| r.quality),
                ),
                None => MetricReading::unavailable("Requires biomass estimate"),
            };
            results.insert("carbon_stock".to_string(), reading);
        }

        Ok(results)
    }
}
