//! Static Configuration Tables
//!
//! The per-metric scoring registry (`METRIC_SPECS`), ecosystem weight
//! profiles, and the shared vocabulary enums used by the scoring and quality
//! modules. Everything here is read-only at runtime and safe to share across
//! query threads without synchronization.

use crate::ecosystem::EcosystemType;
use crate::pillars::PillarId;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// Normalization curve shape for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormType {
    Linear,
    InverseLinear,
    Sigmoid,
    InverseSigmoid,
    Gaussian,
    Centered,
}

impl NormType {
    /// Parse the wire name of a curve shape. Unknown names fall back to
    /// linear rather than failing.
    pub fn parse(name: &str) -> NormType {
        match name {
            "linear" => NormType::Linear,
            "inverse_linear" => NormType::InverseLinear,
            "sigmoid" => NormType::Sigmoid,
            "inverse_sigmoid" => NormType::InverseSigmoid,
            "gaussian" => NormType::Gaussian,
            "centered" => NormType::Centered,
            _ => NormType::Linear,
        }
    }
}

/// Criticality tier controlling a metric's influence on the Data Quality
/// Score. Critical metrics dominate DQS; auxiliary metrics barely move it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criticality {
    Critical,
    Important,
    Supporting,
    Auxiliary,
}

/// Static scoring configuration for one metric.
#[derive(Debug, Clone, Copy)]
pub struct MetricSpec {
    /// Human-readable metric name for reports
    pub display_name: &'static str,
    /// Curve shape used to map the raw value onto 0-100
    pub norm_type: NormType,
    /// Lower reference bound of the scoring range
    pub v_min: f64,
    /// Upper reference bound of the scoring range
    pub v_max: f64,
    /// Sigmoid midpoint override (defaults to the range midpoint)
    pub v_mid: Option<f64>,
    /// Gaussian optimum
    pub v_opt: Option<f64>,
    /// Gaussian width
    pub sigma: Option<f64>,
    /// Sigmoid steepness (defaults to 0.5, auto-scaled by range)
    pub k: Option<f64>,
    /// Weight within the pillar's category score. Zero marks an
    /// informational-only metric: excluded from weighted sums and from DQS,
    /// still quality-assessed.
    pub weight: f64,
    /// DQS criticality tier
    pub criticality: Criticality,
    /// Pillar this metric scores under
    pub pillar: PillarId,
}

impl MetricSpec {
    const fn new(
        display_name: &'static str,
        norm_type: NormType,
        v_min: f64,
        v_max: f64,
        weight: f64,
        criticality: Criticality,
        pillar: PillarId,
    ) -> Self {
        Self {
            display_name,
            norm_type,
            v_min,
            v_max,
            v_mid: None,
            v_opt: None,
            sigma: None,
            k: None,
            weight,
            criticality,
            pillar,
        }
    }

    const fn optimum(mut self, v_opt: f64, sigma: f64) -> Self {
        self.v_opt = Some(v_opt);
        self.sigma = Some(sigma);
        self
    }
}

/// Scoring registry for every metric the pillar handlers can produce.
///
/// Reference ranges follow the PHI Technical Framework metric metadata;
/// criticality tiers follow its data-quality taxonomy (critical: ndvi,
/// tree_cover, soil_moisture, human_modification).
pub static METRIC_SPECS: &[(&str, MetricSpec)] = &[
    // ===== PILLAR A: ATMOSPHERIC =====
    (
        "aod",
        MetricSpec::new(
            "Aerosol Optical Depth",
            NormType::InverseLinear,
            0.0,
            1.0,
            1.0,
            Criticality::Important,
            PillarId::A,
        ),
    ),
    (
        "aqi",
        MetricSpec::new(
            "Air Quality Index",
            NormType::InverseLinear,
            0.0,
            500.0,
            1.0,
            Criticality::Supporting,
            PillarId::A,
        ),
    ),
    (
        "uv_index",
        MetricSpec::new(
            "UV Index",
            NormType::Gaussian,
            0.0,
            15.0,
            0.5,
            Criticality::Auxiliary,
            PillarId::A,
        )
        .optimum(4.5, 2.5),
    ),
    (
        "visibility",
        MetricSpec::new(
            "Visibility",
            NormType::Linear,
            1.0,
            50.0,
            0.5,
            Criticality::Auxiliary,
            PillarId::A,
        ),
    ),
    (
        "cloud_fraction",
        MetricSpec::new(
            "Cloud Fraction",
            NormType::Linear,
            0.0,
            1.0,
            0.0,
            Criticality::Auxiliary,
            PillarId::A,
        ),
    ),
    // ===== PILLAR B: BIODIVERSITY =====
    (
        "ndvi",
        MetricSpec::new(
            "Normalized Difference Vegetation Index",
            NormType::Linear,
            -0.1,
            0.9,
            1.0,
            Criticality::Critical,
            PillarId::B,
        ),
    ),
    (
        "evi",
        MetricSpec::new(
            "Enhanced Vegetation Index",
            NormType::Linear,
            -0.1,
            0.8,
            1.0,
            Criticality::Important,
            PillarId::B,
        ),
    ),
    (
        "lai",
        MetricSpec::new(
            "Leaf Area Index",
            NormType::Sigmoid,
            0.0,
            8.0,
            0.7,
            Criticality::Supporting,
            PillarId::B,
        ),
    ),
    (
        "fpar",
        MetricSpec::new(
            "Fraction of Absorbed PAR",
            NormType::Linear,
            0.0,
            1.0,
            0.7,
            Criticality::Supporting,
            PillarId::B,
        ),
    ),
    (
        "land_cover",
        MetricSpec::new(
            "Land Cover Class",
            NormType::Linear,
            10.0,
            100.0,
            0.0,
            Criticality::Supporting,
            PillarId::B,
        ),
    ),
    // ===== PILLAR C: CARBON =====
    (
        "tree_cover",
        MetricSpec::new(
            "Tree Cover Percentage",
            NormType::Linear,
            0.0,
            100.0,
            1.0,
            Criticality::Critical,
            PillarId::C,
        ),
    ),
    (
        "forest_loss",
        MetricSpec::new(
            "Forest Loss (since 2000)",
            NormType::InverseLinear,
            0.0,
            1.0,
            1.0,
            Criticality::Supporting,
            PillarId::C,
        ),
    ),
    (
        "canopy_height",
        MetricSpec::new(
            "Canopy Height",
            NormType::Sigmoid,
            0.0,
            40.0,
            0.8,
            Criticality::Important,
            PillarId::C,
        ),
    ),
    (
        "biomass",
        MetricSpec::new(
            "Above-ground Biomass",
            NormType::Sigmoid,
            0.0,
            400.0,
            0.8,
            Criticality::Important,
            PillarId::C,
        ),
    ),
    (
        "carbon_stock",
        MetricSpec::new(
            "Carbon Stock",
            NormType::Linear,
            0.0,
            200.0,
            0.7,
            Criticality::Supporting,
            PillarId::C,
        ),
    ),
    // ===== PILLAR D: DEGRADATION =====
    (
        "lst",
        MetricSpec::new(
            "Land Surface Temperature",
            NormType::Gaussian,
            -40.0,
            60.0,
            0.8,
            Criticality::Supporting,
            PillarId::D,
        )
        .optimum(25.0, 10.0),
    ),
    (
        "soil_moisture",
        MetricSpec::new(
            "Soil Moisture",
            NormType::Gaussian,
            0.0,
            0.6,
            1.0,
            Criticality::Critical,
            PillarId::D,
        )
        .optimum(0.3, 0.1),
    ),
    (
        "water_occurrence",
        MetricSpec::new(
            "Water Occurrence",
            NormType::Sigmoid,
            0.0,
            100.0,
            0.6,
            Criticality::Supporting,
            PillarId::D,
        ),
    ),
    (
        "drought_index",
        MetricSpec::new(
            "Drought Index",
            NormType::Centered,
            -3.0,
            3.0,
            0.9,
            Criticality::Important,
            PillarId::D,
        ),
    ),
    (
        "evaporative_stress",
        MetricSpec::new(
            "Evaporative Stress Index",
            NormType::Centered,
            -2.0,
            2.0,
            0.7,
            Criticality::Supporting,
            PillarId::D,
        ),
    ),
    // ===== PILLAR E: ECOSYSTEM =====
    (
        "population",
        MetricSpec::new(
            "Population Density",
            NormType::InverseSigmoid,
            0.0,
            10000.0,
            0.7,
            Criticality::Supporting,
            PillarId::E,
        ),
    ),
    (
        "nightlights",
        MetricSpec::new(
            "Nighttime Lights Radiance",
            NormType::InverseSigmoid,
            0.0,
            100.0,
            0.7,
            Criticality::Supporting,
            PillarId::E,
        ),
    ),
    (
        "human_modification",
        MetricSpec::new(
            "Human Modification Index",
            NormType::InverseLinear,
            0.0,
            1.0,
            1.0,
            Criticality::Critical,
            PillarId::E,
        ),
    ),
    (
        "elevation",
        MetricSpec::new(
            "Elevation",
            NormType::Linear,
            -500.0,
            9000.0,
            0.0,
            Criticality::Auxiliary,
            PillarId::E,
        ),
    ),
    (
        "distance_to_water",
        MetricSpec::new(
            "Distance to Water",
            NormType::InverseSigmoid,
            0.0,
            20000.0,
            0.5,
            Criticality::Auxiliary,
            PillarId::E,
        ),
    ),
];

/// Look up a metric's scoring spec by wire name.
pub fn metric_spec(name: &str) -> Option<&'static MetricSpec> {
    static INDEX: OnceLock<FxHashMap<&'static str, &'static MetricSpec>> = OnceLock::new();
    INDEX
        .get_or_init(|| METRIC_SPECS.iter().map(|(n, s)| (*n, s)).collect())
        .get(name)
        .copied()
}

/// Pillar weights `[A, B, C, D, E]` for an ecosystem archetype.
///
/// Forest and mangrove systems weight carbon and biodiversity; grassland and
/// wetland systems weight degradation; urban systems weight atmosphere and
/// human-impact metrics. Each profile sums to 1.0, and the default profile
/// weights all pillars equally.
pub fn ecosystem_weights(ecosystem: EcosystemType) -> [f64; 5] {
    match ecosystem {
        EcosystemType::TropicalForest => [0.10, 0.30, 0.30, 0.15, 0.15],
        EcosystemType::Mangrove => [0.05, 0.25, 0.35, 0.20, 0.15],
        EcosystemType::GrasslandSavanna => [0.10, 0.30, 0.15, 0.30, 0.15],
        EcosystemType::Wetland => [0.10, 0.25, 0.15, 0.35, 0.15],
        EcosystemType::Agricultural => [0.15, 0.20, 0.10, 0.30, 0.25],
        EcosystemType::UrbanGreen => [0.30, 0.20, 0.10, 0.15, 0.25],
        EcosystemType::Default => [0.20, 0.20, 0.20, 0.20, 0.20],
    }
}
