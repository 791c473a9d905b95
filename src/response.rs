//! Result Types
//!
//! Typed representation of the query result JSON. Field names here are a
//! published contract consumed by downstream dashboards, so every rename or
//! skip annotation is deliberate. A metric is always a `MetricReading`; the
//! quality-only shape produced when raw values are stripped is expressed by
//! `MetricPayload` rather than by mutating maps in place.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::ecosystem::EcosystemType;
use crate::pillars::PillarId;
use crate::provider::Location;

/// Per-metric data quality flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Good,
    Moderate,
    Poor,
    Unavailable,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Good => "good",
            Quality::Moderate => "moderate",
            Quality::Poor => "poor",
            Quality::Unavailable => "unavailable",
        }
    }
}

/// One observed (or derived) metric value with provenance metadata.
///
/// `value` is serialized even when absent; a null value always carries
/// `quality: unavailable` and is excluded from weighted scoring. Pillar
/// extras such as `lst_day` or `loss_year` live in `extras` and are
/// flattened into the metric object.
#[derive(Debug, Clone, Serialize)]
pub struct MetricReading {
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<&'static str>,
    pub quality: Quality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extras: BTreeMap<&'static str, Value>,
}

impl MetricReading {
    pub fn new(
        value: Option<f64>,
        unit: &'static str,
        description: &'static str,
        quality: Quality,
    ) -> Self {
        MetricReading {
            value,
            unit: Some(unit),
            description: Some(description),
            source: None,
            resolution: None,
            quality,
            error: None,
            extras: BTreeMap::new(),
        }
    }

    /// Reading for a metric that could not be produced at all. Carries only
    /// the null value, the quality flag, and the error message.
    pub fn unavailable(error: impl Into<String>) -> Self {
        MetricReading {
            value: None,
            unit: None,
            description: None,
            source: None,
            resolution: None,
            quality: Quality::Unavailable,
            error: Some(error.into()),
            extras: BTreeMap::new(),
        }
    }

    pub fn with_source(mut self, source: &'static str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_resolution(mut self, resolution: &'static str) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_extra(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.extras.insert(key, value.into());
        self
    }
}

/// Serialized form of a metric: the full reading, or `{quality}` only when
/// the caller asked for raw values to be stripped.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MetricPayload {
    Full(MetricReading),
    QualityOnly { quality: Quality },
}

impl MetricPayload {
    pub fn from_reading(reading: MetricReading, include_raw: bool) -> Self {
        if include_raw {
            MetricPayload::Full(reading)
        } else {
            MetricPayload::QualityOnly {
                quality: reading.quality,
            }
        }
    }

    pub fn quality(&self) -> Quality {
        match self {
            MetricPayload::Full(reading) => reading.quality,
            MetricPayload::QualityOnly { quality } => *quality,
        }
    }
}

/// Query depth: 2 key metrics per pillar, or the full set of 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Simple,
    Comprehensive,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Simple => "simple",
            Mode::Comprehensive => "comprehensive",
        }
    }

    pub fn parse(s: &str) -> Option<Mode> {
        match s {
            "simple" => Some(Mode::Simple),
            "comprehensive" => Some(Mode::Comprehensive),
            _ => None,
        }
    }
}

/// Lookback window selector for the queried date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Temporal {
    Latest,
    Monthly,
    Annual,
}

impl Temporal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Temporal::Latest => "latest",
            Temporal::Monthly => "monthly",
            Temporal::Annual => "annual",
        }
    }

    pub fn parse(s: &str) -> Option<Temporal> {
        match s {
            "latest" => Some(Temporal::Latest),
            "monthly" => Some(Temporal::Monthly),
            "annual" => Some(Temporal::Annual),
            _ => None,
        }
    }

    /// Days of history covered by each temporal mode.
    pub fn window_days(&self) -> i64 {
        match self {
            Temporal::Latest => 30,
            Temporal::Monthly => 365,
            Temporal::Annual => 365 * 5,
        }
    }
}

/// Inclusive date window, both ends formatted YYYY-MM-DD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Centroid {
    pub latitude: f64,
    pub longitude: f64,
}

/// Echo of the query parameters, point- or polygon-shaped.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QueryInfo {
    Point {
        latitude: f64,
        longitude: f64,
        timestamp: String,
        mode: Mode,
        temporal: Temporal,
        buffer_radius_m: f64,
        date_range: DateRange,
    },
    Polygon {
        points: Vec<Location>,
        centroid: Centroid,
        timestamp: String,
        mode: Mode,
        temporal: Temporal,
        date_range: DateRange,
    },
}

/// Area block attached to polygon queries.
#[derive(Debug, Clone, Serialize)]
pub struct GeometryInfo {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub points: Vec<Location>,
    pub area_m2: f64,
    pub area_ha: f64,
    pub area_acres: f64,
}

/// Successful outcome of one pillar query.
#[derive(Debug, Clone, Serialize)]
pub struct PillarResult {
    pub pillar_id: PillarId,
    pub pillar_name: &'static str,
    pub pillar_color: &'static str,
    pub metrics: BTreeMap<String, MetricPayload>,
    pub score: Option<i64>,
    pub mode: Mode,
    pub query_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryInfo>,
}

/// Reduced shape emitted when a pillar handler failed outright. The score
/// is still present (as null) so downstream consumers can key on it.
#[derive(Debug, Clone, Serialize)]
pub struct PillarFailure {
    pub error: String,
    pub metrics: BTreeMap<String, MetricPayload>,
    pub score: Option<i64>,
}

impl PillarFailure {
    pub fn new(error: impl Into<String>) -> Self {
        PillarFailure {
            error: error.into(),
            metrics: BTreeMap::new(),
            score: None,
        }
    }
}

/// One entry in the `pillars` map.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PillarEntry {
    Ok(PillarResult),
    Failed(PillarFailure),
}

impl PillarEntry {
    pub fn score(&self) -> Option<i64> {
        match self {
            PillarEntry::Ok(result) => result.score,
            PillarEntry::Failed(_) => None,
        }
    }

    pub fn metrics(&self) -> &BTreeMap<String, MetricPayload> {
        match self {
            PillarEntry::Ok(result) => &result.metrics,
            PillarEntry::Failed(failure) => &failure.metrics,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PillarEntry::Ok(_) => None,
            PillarEntry::Failed(failure) => Some(&failure.error),
        }
    }
}

/// Carbon credit estimate priced at the low/mid/high market tiers.
#[derive(Debug, Clone, Serialize)]
pub struct EstimatedValue {
    pub low_usd: f64,
    pub mid_usd: f64,
    pub high_usd: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CarbonCredits {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbon_stock_mg_c_ha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_carbon_mg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co2_equivalent_tonnes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_co2_tonnes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<EstimatedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methodology: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EcosystemServiceValue {
    pub available: bool,
    pub ecosystem_type: EcosystemType,
    pub base_esv_per_ha_usd: f64,
    pub adjusted_esv_per_ha_usd: f64,
    pub total_annual_esv_usd: f64,
    pub projected_10yr_usd: f64,
    pub projected_30yr_usd: f64,
    pub area_ha: f64,
    pub methodology: &'static str,
}

/// Cross-pillar summary: scores, data quality, and (for polygons) valuation.
#[derive(Debug, Clone, Serialize)]
pub struct QuerySummary {
    pub overall_score: Option<f64>,
    pub overall_interpretation: &'static str,
    pub pillar_scores: BTreeMap<PillarId, Option<i64>>,
    pub ecosystem_type: EcosystemType,
    pub ecosystem_weights: BTreeMap<PillarId, f64>,
    pub data_quality_score: f64,
    pub data_completeness: f64,
    pub dqs_recommendation: &'static str,
    pub missing_critical_metrics: Vec<String>,
    pub quality_flags: Vec<String>,
    pub esv_multiplier: Option<f64>,
    pub methodology: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbon_credits: Option<CarbonCredits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecosystem_service_value: Option<EcosystemServiceValue>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TimeSeriesInfo {
    pub enabled: bool,
    pub mode: Temporal,
}

/// Complete result of a point or polygon query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub query: QueryInfo,
    pub pillars: BTreeMap<&'static str, PillarEntry>,
    pub summary: QuerySummary,
    pub time_series: TimeSeriesInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Quality::*;

    #[test]
    fn test_reading_serializes_null_value() {
        let reading = MetricReading::new(None, "index", "Air Quality Index", Unavailable);
        let json = serde_json::to_value(&reading).unwrap();
        assert!(json.get("value").unwrap().is_null());
        assert_eq!(json["quality"], "unavailable");
        assert_eq!(json["unit"], "index");
    }

    #[test]
    fn test_reading_extras_are_flattened() {
        let reading = MetricReading::new(Some(25.0), "Celsius", "Land Surface Temperature", Good)
            .with_extra("lst_day", 25.0)
            .with_extra("lst_night", 14.0);
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["lst_day"], 25.0);
        assert_eq!(json["lst_night"], 14.0);
        assert!(json.get("extras").is_none());
    }

    #[test]
    fn test_stripped_payload_is_quality_only() {
        let reading = MetricReading::new(Some(0.65), "dimensionless", "NDVI", Good);
        let payload = MetricPayload::from_reading(reading, false);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"quality": "good"}));
    }

    #[test]
    fn test_full_payload_keeps_value() {
        let reading = MetricReading::new(Some(0.65), "dimensionless", "NDVI", Good);
        let payload = MetricPayload::from_reading(reading, true);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["value"], 0.65);
    }

    #[test]
    fn test_unavailable_reading_is_minimal() {
        let reading = MetricReading::unavailable("no coverage");
        let json = serde_json::to_value(&reading).unwrap();
        assert!(json["value"].is_null());
        assert_eq!(json["quality"], "unavailable");
        assert_eq!(json["error"], "no coverage");
        assert!(json.get("unit").is_none());
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_failed_pillar_entry_shape() {
        let entry = PillarEntry::Failed(PillarFailure::new("provider timeout"));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["error"], "provider timeout");
        assert_eq!(json["metrics"], serde_json::json!({}));
        assert!(json["score"].is_null());
        assert!(json.get("pillar_id").is_none());
    }

    #[test]
    fn test_mode_and_temporal_parse() {
        assert_eq!(Mode::parse("simple"), Some(Mode::Simple));
        assert_eq!(Mode::parse("full"), None);
        assert_eq!(Temporal::parse("annual"), Some(Temporal::Annual));
        assert_eq!(Temporal::parse("weekly"), None);
        assert_eq!(Temporal::Latest.window_days(), 30);
        assert_eq!(Temporal::Annual.window_days(), 1825);
    }

    #[test]
    fn test_point_query_info_shape() {
        let info = QueryInfo::Point {
            latitude: -3.4653,
            longitude: -62.2159,
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            mode: Mode::Comprehensive,
            temporal: Temporal::Latest,
            buffer_radius_m: 500.0,
            date_range: DateRange {
                start: "2025-12-02".to_string(),
                end: "2026-01-01".to_string(),
            },
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["latitude"], -3.4653);
        assert_eq!(json["buffer_radius_m"], 500.0);
        assert_eq!(json["mode"], "comprehensive");
        assert!(json.get("points").is_none());
    }

    #[test]
    fn test_polygon_query_info_shape() {
        let info = QueryInfo::Polygon {
            points: vec![
                Location::new(0.0, 0.0),
                Location::new(0.0, 1.0),
                Location::new(1.0, 1.0),
                Location::new(1.0, 0.0),
            ],
            centroid: Centroid {
                latitude: 0.5,
                longitude: 0.5,
            },
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            mode: Mode::Simple,
            temporal: Temporal::Latest,
            date_range: DateRange {
                start: "2025-12-02".to_string(),
                end: "2026-01-01".to_string(),
            },
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["points"].as_array().unwrap().len(), 4);
        assert_eq!(json["points"][0]["lat"], 0.0);
        assert_eq!(json["centroid"]["latitude"], 0.5);
        assert!(json.get("buffer_radius_m").is_none());
        assert!(json.get("latitude").is_none());
    }
}
