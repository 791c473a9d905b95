//! Pillar D: Degradation
//!
//! Land and water stress: MODIS land surface temperature, SMAP L4 soil
//! moisture, JRC surface water occurrence, and MODIS ET/PET. Two derived
//! indices live here: a simplified drought index combining soil moisture
//! and temperature anomalies, and the evaporative stress index 1 - ET/PET.

use anyhow::Result;
use std::collections::BTreeMap;

use crate::pillars::{fetch_scaled, present_quality, PillarHandler, PillarId};
use crate::provider::{DatasetRef, Location, MetricProvider};
use crate::response::{DateRange, MetricReading, Quality};

const LST_DAY: DatasetRef = DatasetRef::new("MODIS/061/MOD11A2", "LST_Day_1km")
    .scaled(0.02)
    .with_offset(-273.15);
const LST_NIGHT: DatasetRef = DatasetRef::new("MODIS/061/MOD11A2", "LST_Night_1km")
    .scaled(0.02)
    .with_offset(-273.15);
const SOIL_MOISTURE: DatasetRef = DatasetRef::new("NASA/SMAP/SPL4SMGP/007", "sm_surface");
const WATER_OCCURRENCE: DatasetRef = DatasetRef::new("JRC/GSW1_4/GlobalSurfaceWater", "occurrence");
const WATER_SEASONALITY: DatasetRef = DatasetRef::new("JRC/GSW1_4/GlobalSurfaceWater", "seasonality");
const ET: DatasetRef = DatasetRef::new("MODIS/061/MOD16A2", "ET").scaled(0.1);
const PET: DatasetRef = DatasetRef::new("MODIS/061/MOD16A2", "PET").scaled(0.1);

const SIMPLE_METRICS: &[&str] = &["lst", "soil_moisture"];
const COMPREHENSIVE_METRICS: &[&str] = &[
    "lst",
    "soil_moisture",
    "water_occurrence",
    "drought_index",
    "evaporative_stress",
];

pub struct DegradationPillar;

impl PillarHandler for DegradationPillar {
    fn id(&self) -> PillarId {
        PillarId::D
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

        if metrics.contains(&"lst") {
            let day = fetch_scaled(provider, &LST_DAY, location, buffer_radius, date_range)?;
            let night = fetch_scaled(provider, &LST_NIGHT, location, buffer_radius, date_range)?;
            let diurnal_range = match (day, night) {
                (Some(d), Some(n)) => Some(d - n),
                _ => None,
            };
            results.insert(
                "lst".to_string(),
                MetricReading::new(
                    day,
                    "Celsius",
                    "Land Surface Temperature",
                    assess_lst_quality(day),
                )
                .with_extra("lst_day", day)
                .with_extra("lst_night", night)
                .with_extra("diurnal_range", diurnal_range),
            );
        }

        if metrics.contains(&"soil_moisture") {
            let sm = fetch_scaled(provider, &SOIL_MOISTURE, location, buffer_radius, date_range)?;
            results.insert(
                "soil_moisture".to_string(),
                MetricReading::new(
                    sm,
                    "m3/m3",
                    "Surface Soil Moisture",
                    assess_soil_moisture_quality(sm),
                )
                .with_source("SMAP L4"),
            );
        }

        if metrics.contains(&"water_occurrence") {
            let occurrence =
                fetch_scaled(provider, &WATER_OCCURRENCE, location, buffer_radius, date_range)?;
            let seasonality =
                fetch_scaled(provider, &WATER_SEASONALITY, location, buffer_radius, date_range)?;
            results.insert(
                "water_occurrence".to_string(),
                MetricReading::new(
                    occurrence,
                    "percent",
                    "Surface Water Occurrence (1984-2021)",
                    present_quality(occurrence),
                )
                .with_extra("seasonality", seasonality),
            );
        }

        if metrics.contains(&"drought_index") {
            let sm = results.get("soil_moisture").and_then(|r| r.value);
            let lst = results.get("lst").and_then(|r| r.value);
            let reading = match (sm, lst) {
                (Some(sm), Some(lst)) => {
                    // Low soil moisture plus high temperature means drought
                    // stress; both terms centered on typical values.
                    let sm_norm = (sm - 0.2) / 0.3;
                    let lst_norm = (lst - 25.0) / 15.0;
                    let index = (-sm_norm + lst_norm * 0.5).clamp(-3.0, 3.0);
                    MetricReading::new(
                        Some(index),
                        "index",
                        "Drought Index (-3 to +3, higher = more drought stress)",
                        Quality::Moderate,
                    )
                    .with_extra("interpretation", interpret_drought(index))
                }
                _ => MetricReading::unavailable("Requires soil moisture and LST"),
            };
            results.insert("drought_index".to_string(), reading);
        }

        if metrics.contains(&"evaporative_stress") {
            let et = fetch_scaled(provider, &ET, location, buffer_radius, date_range)?;
            let pet = fetch_scaled(provider, &PET, location, buffer_radius, date_range)?;
            let esi = match (et, pet) {
                (Some(et), Some(pet)) if pet > 0.0 => Some(1.0 - et / pet),
                _ => None,
            };
            results.insert(
                "evaporative_stress".to_string(),
                MetricReading::new(
                    esi,
                    "index",
                    "Evaporative Stress Index (1 - ET/PET)",
                    present_quality(esi),
                )
                .with_extra("et", et)
                .with_extra("pet", pet),
            );
        }

        Ok(results)
    }
}

fn assess_lst_quality(value: Option<f64>) -> Quality {
    match value {
        None => Quality::Unavailable,
        Some(v) if !(-60.0..=70.0).contains(&v) => Quality::Poor,
        Some(_) => Quality::Good,
    }
}

fn assess_soil_moisture_quality(value: Option<f64>) -> Quality {
    match value {
        None => Quality::Unavailable,
        Some(v) if !(0.0..=0.6).contains(&v) => Quality::Poor,
        Some(_) => Quality::Good,
    }
}

fn interpret_drought(value: f64) -> &'static str {
    if value < -1.5 {
        "Very Wet"
    } else if value < -0.5 {
        "Wet"
    } else if value < 0.5 {
        "Normal"
    } else if value < 1.5 {
        "Dry"
    } else {
        "Severe Drought"
    }
}
