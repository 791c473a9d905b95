//! Planetary Health Index Query Engine
//!
//! Scores ecosystem health 0-100 across five pillars (Atmospheric,
//! Biodiversity, Carbon, Degradation, Ecosystem) from satellite-derived
//! metrics supplied by a pluggable provider.
//!
//! - `engine`: query orchestration, validation, and result assembly
//! - `pillars/`: one handler per pillar with its datasets and derivations
//! - `utils/`: normalization curves mapping raw values onto 0-100
//! - `scoring`: category, overall, and ESV-multiplier calculations
//! - `quality`: criticality-weighted Data Quality Score
//! - `valuation`: polygon geometry, carbon credits, ecosystem service value

pub mod config;
pub mod ecosystem;
pub mod engine;
pub mod pillars;
pub mod provider;
pub mod quality;
pub mod response;
pub mod scoring;
pub mod utils;
pub mod valuation;

// Re-export commonly used types
pub use ecosystem::EcosystemType;
pub use engine::{
    parse_mode, parse_pillars, parse_temporal, QueryEngine, QueryRequest, ValidationError,
    DEFAULT_BUFFER_RADIUS_M,
};
pub use pillars::PillarId;
pub use provider::{DatasetRef, Location, MetricProvider, StaticProvider};
pub use response::{
    DateRange, MetricReading, Mode, PillarEntry, PillarResult, Quality, QueryResult, Temporal,
};
