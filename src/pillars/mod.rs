//! Pillar Handlers
//!
//! One handler per planetary health pillar (A-E). Each handler hard-codes the
//! datasets backing its metrics, the unit and description strings, and the
//! plausibility checks that set per-metric quality flags. Handlers never call
//! each other; a derived metric may only read values the same handler already
//! fetched, which keeps the five pillars independently dispatchable.

pub mod atmospheric;
pub mod biodiversity;
pub mod carbon;
pub mod degradation;
pub mod ecosystem_services;

use anyhow::Result;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::provider::{DatasetRef, Location, MetricProvider};
use crate::response::{DateRange, MetricReading};

pub use atmospheric::AtmosphericPillar;
pub use biodiversity::BiodiversityPillar;
pub use carbon::CarbonPillar;
pub use degradation::DegradationPillar;
pub use ecosystem_services::EcosystemPillar;

/// Pillar identifiers. Serialized as the bare letter ("A".."E").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PillarId {
    A,
    B,
    C,
    D,
    E,
}

impl PillarId {
    pub const ALL: [PillarId; 5] = [
        PillarId::A,
        PillarId::B,
        PillarId::C,
        PillarId::D,
        PillarId::E,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PillarId::A => "Atmospheric",
            PillarId::B => "Biodiversity",
            PillarId::C => "Carbon",
            PillarId::D => "Degradation",
            PillarId::E => "Ecosystem",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            PillarId::A => "#3498db",
            PillarId::B => "#27ae60",
            PillarId::C => "#8e44ad",
            PillarId::D => "#e74c3c",
            PillarId::E => "#f39c12",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PillarId::A => "Air quality, aerosols, and atmospheric conditions",
            PillarId::B => "Vegetation health, land cover, and ecosystem diversity",
            PillarId::C => "Forest cover, biomass, and carbon storage",
            PillarId::D => "Land and water stress indicators",
            PillarId::E => "Human impact and ecosystem services",
        }
    }

    /// Key used for the pillar entry in the result JSON, e.g. "A_atmospheric".
    pub fn key(&self) -> &'static str {
        match self {
            PillarId::A => "A_atmospheric",
            PillarId::B => "B_biodiversity",
            PillarId::C => "C_carbon",
            PillarId::D => "D_degradation",
            PillarId::E => "E_ecosystem",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PillarId::A => "A",
            PillarId::B => "B",
            PillarId::C => "C",
            PillarId::D => "D",
            PillarId::E => "E",
        }
    }

    pub fn parse(s: &str) -> Option<PillarId> {
        match s {
            "A" => Some(PillarId::A),
            "B" => Some(PillarId::B),
            "C" => Some(PillarId::C),
            "D" => Some(PillarId::D),
            "E" => Some(PillarId::E),
            _ => None,
        }
    }
}

/// Behavior shared by the five pillar implementations.
///
/// `query_metrics` fetches every requested metric through the provider and
/// returns the readings keyed by metric name. A provider error aborts the
/// whole pillar; the orchestrator turns that into a per-pillar error entry
/// without failing the sibling pillars.
pub trait PillarHandler: Send + Sync {
    fn id(&self) -> PillarId;

    /// Metric names for simple mode (2 key metrics per pillar).
    fn simple_metrics(&self) -> &'static [&'static str];

    /// Metric names for comprehensive mode (5 metrics per pillar).
    fn comprehensive_metrics(&self) -> &'static [&'static str];

    fn query_metrics(
        &self,
        provider: &dyn MetricProvider,
        location: Location,
        buffer_radius: f64,
        date_range: &DateRange,
        metrics: &[&str],
    ) -> Result<BTreeMap<String, MetricReading>>;
}

/// Build the full handler set, keyed by pillar ID.
pub fn handler_registry() -> FxHashMap<PillarId, Box<dyn PillarHandler>> {
    let mut handlers: FxHashMap<PillarId, Box<dyn PillarHandler>> =
        FxHashMap::with_capacity_and_hasher(PillarId::ALL.len(), Default::default());
    handlers.insert(PillarId::A, Box::new(AtmosphericPillar));
    handlers.insert(PillarId::B, Box::new(BiodiversityPillar));
    handlers.insert(PillarId::C, Box::new(CarbonPillar));
    handlers.insert(PillarId::D, Box::new(DegradationPillar));
    handlers.insert(PillarId::E, Box::new(EcosystemPillar));
    handlers
}

/// Default plausibility check for metrics without a pillar-specific one:
/// any present value is good.
pub(crate) fn present_quality(value: Option<f64>) -> crate::response::Quality {
    if value.is_some() {
        crate::response::Quality::Good
    } else {
        crate::response::Quality::Unavailable
    }
}

/// Fetch one dataset band and apply its scale factor and offset.
pub(crate) fn fetch_scaled(
    provider: &dyn MetricProvider,
    dataset: &DatasetRef,
    location: Location,
    buffer_radius: f64,
    date_range: &DateRange,
) -> Result<Option<f64>> {
    let raw = provider.fetch(dataset, location, buffer_radius, date_range)?;
    Ok(raw.map(|v| dataset.apply_scale(v)))
}
