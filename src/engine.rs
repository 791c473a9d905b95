//! Query Orchestrator
//!
//! The main entry point for planetary health queries. Dispatches the five
//! pillar handlers (in parallel via Rayon or sequentially), tolerates
//! per-pillar failure, and assembles the scored result: pillar entries,
//! ecosystem-weighted overall score, data quality summary, and polygon
//! valuation blocks.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::config::ecosystem_weights;
use crate::ecosystem::classify;
use crate::pillars::{handler_registry, PillarHandler, PillarId};
use crate::provider::{Location, MetricProvider};
use crate::quality;
use crate::response::{
    DateRange, MetricPayload, MetricReading, Mode, PillarEntry, PillarFailure, PillarResult,
    QueryInfo, QueryResult, QuerySummary, Temporal, TimeSeriesInfo,
};
use crate::scoring;
use crate::valuation;

/// Spatial averaging radius applied when the caller does not set one.
pub const DEFAULT_BUFFER_RADIUS_M: f64 = 500.0;

/// Input rejected before any pillar dispatch. Construction of one of these
/// guarantees no provider call was made for the offending query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Latitude must be between -90 and 90, got {0}")]
    Latitude(String),
    #[error("Longitude must be between -180 and 180, got {0}")]
    Longitude(String),
    #[error("Mode must be 'simple' or 'comprehensive', got {0}")]
    Mode(String),
    #[error("Temporal must be 'latest', 'monthly', or 'annual', got {0}")]
    Temporal(String),
    #[error("Invalid pillar: {0}. Must be one of A, B, C, D, E")]
    Pillar(String),
    #[error("Polygon must have exactly 4 points, got {0}")]
    PolygonPoints(usize),
}

/// Tunable parameters shared by point and polygon queries.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub mode: Mode,
    pub temporal: Temporal,
    pub buffer_radius_m: f64,
    /// Subset of pillars to query; `None` queries all five.
    pub pillars: Option<Vec<PillarId>>,
    pub parallel: bool,
    /// When false, each metric is stripped down to its quality flag.
    pub include_raw: bool,
    /// Explicit date window; `None` derives one from `temporal`.
    pub date_range: Option<DateRange>,
}

impl Default for QueryRequest {
    fn default() -> Self {
        QueryRequest {
            mode: Mode::Comprehensive,
            temporal: Temporal::Latest,
            buffer_radius_m: DEFAULT_BUFFER_RADIUS_M,
            pillars: None,
            parallel: true,
            include_raw: true,
            date_range: None,
        }
    }
}

/// Parse a mode string from an external surface (CLI, HTTP layer).
pub fn parse_mode(s: &str) -> Result<Mode, ValidationError> {
    Mode::parse(s).ok_or_else(|| ValidationError::Mode(s.to_string()))
}

/// Parse a temporal string from an external surface.
pub fn parse_temporal(s: &str) -> Result<Temporal, ValidationError> {
    Temporal::parse(s).ok_or_else(|| ValidationError::Temporal(s.to_string()))
}

/// Parse a comma-separated pillar list such as "A,B,E".
pub fn parse_pillars(s: &str) -> Result<Vec<PillarId>, ValidationError> {
    s.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| PillarId::parse(token).ok_or_else(|| ValidationError::Pillar(token.to_string())))
        .collect()
}

fn validate_point(lat: f64, lon: f64) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ValidationError::Latitude(lat.to_string()));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(ValidationError::Longitude(lon.to_string()));
    }
    Ok(())
}

fn date_range_for(temporal: Temporal) -> DateRange {
    let end = Utc::now();
    let start = end - Duration::days(temporal.window_days());
    DateRange {
        start: start.format("%Y-%m-%d").to_string(),
        end: end.format("%Y-%m-%d").to_string(),
    }
}

/// What one pillar dispatch produced: either its readings or the error
/// message that aborted it. The timestamp is taken at dispatch.
struct PillarOutcome {
    query_time: String,
    readings: Result<BTreeMap<String, MetricReading>, String>,
}

/// Query engine over a set of pillar handlers and one metric provider.
///
/// Holds no mutable state; a single engine value can serve concurrent
/// queries from multiple threads.
pub struct QueryEngine {
    handlers: FxHashMap<PillarId, Box<dyn PillarHandler>>,
    provider: Box<dyn MetricProvider>,
}

impl QueryEngine {
    pub fn new(provider: impl MetricProvider + 'static) -> Self {
        QueryEngine {
            handlers: handler_registry(),
            provider: Box::new(provider),
        }
    }

    /// Query all requested pillars for a point location.
    ///
    /// Fails only on invalid input; a pillar whose provider call errors
    /// becomes an `{error, metrics: {}}` entry in the result instead of
    /// failing the query.
    pub fn query(
        &self,
        lat: f64,
        lon: f64,
        request: &QueryRequest,
    ) -> Result<QueryResult, ValidationError> {
        validate_point(lat, lon)?;

        let date_range = request
            .date_range
            .clone()
            .unwrap_or_else(|| date_range_for(request.temporal));
        let pillar_ids = self.requested_pillars(request);
        let timestamp = Utc::now().to_rfc3339();

        tracing::debug!(
            "point query at ({}, {}) over {} pillars, {} mode",
            lat,
            lon,
            pillar_ids.len(),
            request.mode.as_str()
        );

        let outcomes = self.run_pillars(
            Location::new(lat, lon),
            request,
            &date_range,
            &pillar_ids,
        );

        let query = QueryInfo::Point {
            latitude: lat,
            longitude: lon,
            timestamp,
            mode: request.mode,
            temporal: request.temporal,
            buffer_radius_m: request.buffer_radius_m,
            date_range,
        };
        Ok(self.assemble(query, outcomes, &pillar_ids, None, request))
    }

    /// Query a 4-corner polygon. Metrics are sampled at the centroid; the
    /// summary additionally carries the polygon geometry, a carbon credit
    /// estimate, and the annual ecosystem service value.
    pub fn query_polygon(
        &self,
        points: &[Location],
        request: &QueryRequest,
    ) -> Result<QueryResult, ValidationError> {
        if points.len() != 4 {
            return Err(ValidationError::PolygonPoints(points.len()));
        }
        for point in points {
            validate_point(point.lat, point.lng)?;
        }

        let date_range = request
            .date_range
            .clone()
            .unwrap_or_else(|| date_range_for(request.temporal));
        let pillar_ids = self.requested_pillars(request);
        let centroid = valuation::polygon_centroid(points);
        let timestamp = Utc::now().to_rfc3339();

        tracing::debug!(
            "polygon query centred at ({}, {}) over {} pillars",
            centroid.latitude,
            centroid.longitude,
            pillar_ids.len()
        );

        let outcomes = self.run_pillars(
            Location::new(centroid.latitude, centroid.longitude),
            request,
            &date_range,
            &pillar_ids,
        );

        let query = QueryInfo::Polygon {
            points: points.to_vec(),
            centroid,
            timestamp,
            mode: request.mode,
            temporal: request.temporal,
            date_range,
        };
        Ok(self.assemble(query, outcomes, &pillar_ids, Some(points), request))
    }

    /// Query one pillar without the orchestration fan-out. Unlike
    /// [`QueryEngine::query`] this propagates a provider failure to the
    /// caller instead of folding it into the result.
    pub fn query_single_pillar(
        &self,
        lat: f64,
        lon: f64,
        pillar: PillarId,
        mode: Mode,
        buffer_radius: f64,
        date_range: Option<DateRange>,
    ) -> Result<PillarResult> {
        validate_point(lat, lon)?;
        let date_range = date_range.unwrap_or_else(|| date_range_for(Temporal::Latest));
        let query_time = Utc::now().to_rfc3339();

        let handler = self
            .handlers
            .get(&pillar)
            .ok_or_else(|| anyhow!("no handler registered for pillar {}", pillar.as_str()))?;
        let readings = handler.query_metrics(
            self.provider.as_ref(),
            Location::new(lat, lon),
            buffer_radius,
            &date_range,
            metric_list(handler.as_ref(), mode),
        )?;
        let score = scoring::pillar_score(pillar, &readings);

        Ok(PillarResult {
            pillar_id: pillar,
            pillar_name: pillar.name(),
            pillar_color: pillar.color(),
            metrics: readings
                .into_iter()
                .map(|(name, reading)| (name, MetricPayload::from_reading(reading, true)))
                .collect(),
            score,
            mode,
            query_time,
            geometry: None,
        })
    }

    /// Metric names each pillar would fetch in the given mode.
    pub fn available_metrics(&self, mode: Mode) -> BTreeMap<PillarId, Vec<&'static str>> {
        self.handlers
            .iter()
            .map(|(id, handler)| (*id, metric_list(handler.as_ref(), mode).to_vec()))
            .collect()
    }

    fn requested_pillars(&self, request: &QueryRequest) -> Vec<PillarId> {
        request
            .pillars
            .clone()
            .unwrap_or_else(|| PillarId::ALL.to_vec())
    }

    fn run_pillars(
        &self,
        location: Location,
        request: &QueryRequest,
        date_range: &DateRange,
        pillar_ids: &[PillarId],
    ) -> FxHashMap<PillarId, PillarOutcome> {
        let mut outcomes =
            FxHashMap::with_capacity_and_hasher(pillar_ids.len(), Default::default());

        if request.parallel {
            let collected: Vec<(PillarId, PillarOutcome)> = pillar_ids
                .par_iter()
                .map(|id| {
                    (
                        *id,
                        self.run_pillar(*id, location, request.mode, request.buffer_radius_m, date_range),
                    )
                })
                .collect();
            outcomes.extend(collected);
        } else {
            for id in pillar_ids {
                outcomes.insert(
                    *id,
                    self.run_pillar(*id, location, request.mode, request.buffer_radius_m, date_range),
                );
            }
        }

        outcomes
    }

    fn run_pillar(
        &self,
        id: PillarId,
        location: Location,
        mode: Mode,
        buffer_radius: f64,
        date_range: &DateRange,
    ) -> PillarOutcome {
        let query_time = Utc::now().to_rfc3339();
        let Some(handler) = self.handlers.get(&id) else {
            return PillarOutcome {
                query_time,
                readings: Err(format!("no handler registered for pillar {}", id.as_str())),
            };
        };

        let metrics = metric_list(handler.as_ref(), mode);
        match handler.query_metrics(self.provider.as_ref(), location, buffer_radius, date_range, metrics)
        {
            Ok(readings) => PillarOutcome {
                query_time,
                readings: Ok(readings),
            },
            Err(e) => {
                tracing::warn!("pillar {} query failed: {:#}", id.as_str(), e);
                PillarOutcome {
                    query_time,
                    readings: Err(e.to_string()),
                }
            }
        }
    }

    /// Turn raw pillar outcomes into the final result. The summary is
    /// computed from the raw readings before any `include_raw` stripping,
    /// so quality-only responses still carry full scores.
    fn assemble(
        &self,
        query: QueryInfo,
        mut outcomes: FxHashMap<PillarId, PillarOutcome>,
        pillar_ids: &[PillarId],
        polygon: Option<&[Location]>,
        request: &QueryRequest,
    ) -> QueryResult {
        let mut pillar_scores: BTreeMap<PillarId, Option<i64>> = BTreeMap::new();
        for id in pillar_ids {
            let Some(outcome) = outcomes.get(id) else {
                continue;
            };
            let score = match &outcome.readings {
                Ok(readings) => scoring::pillar_score(*id, readings),
                Err(_) => None,
            };
            pillar_scores.insert(*id, score);
        }

        // Flattened view of every produced reading; metric names are unique
        // across pillars so this cannot collide.
        let mut index: FxHashMap<&str, &MetricReading> = FxHashMap::default();
        for id in pillar_ids {
            if let Some(outcome) = outcomes.get(id) {
                if let Ok(readings) = &outcome.readings {
                    for (name, reading) in readings {
                        index.insert(name.as_str(), reading);
                    }
                }
            }
        }

        let ecosystem = classify(
            index.get("land_cover").and_then(|r| r.value),
            index.get("tree_cover").and_then(|r| r.value),
            index.get("human_modification").and_then(|r| r.value),
        );
        let weights = ecosystem_weights(ecosystem);
        let overall = scoring::overall_score(&pillar_scores, &weights);
        let esv_multiplier = overall.and_then(scoring::esv_multiplier);

        let dqs = quality::calculate_dqs(&index);
        let completeness = quality::data_completeness(&index);
        let missing = quality::missing_critical_metrics(&index);
        // Flag order follows pillar ID then metric name, so the cap keeps
        // the same flags from run to run.
        let flags = quality::quality_flags(
            pillar_ids
                .iter()
                .filter_map(|id| outcomes.get(id))
                .filter_map(|outcome| outcome.readings.as_ref().ok())
                .flatten(),
        );

        let geometry = polygon.map(valuation::geometry_info);
        let carbon_credits = polygon.map(|points| {
            let area_ha = valuation::polygon_area_hectares(points);
            valuation::carbon_credits(
                index.get("carbon_stock").and_then(|r| r.value),
                index.get("biomass").and_then(|r| r.value),
                index.get("tree_cover").and_then(|r| r.value),
                area_ha,
                Some(dqs),
            )
        });
        let service_value = polygon.map(|points| {
            let area_ha = valuation::polygon_area_hectares(points);
            valuation::ecosystem_service_value(esv_multiplier, ecosystem, area_ha)
        });

        let mut pillars: BTreeMap<&'static str, PillarEntry> = BTreeMap::new();
        for id in pillar_ids {
            let Some(outcome) = outcomes.remove(id) else {
                continue;
            };
            let entry = match outcome.readings {
                Ok(readings) => PillarEntry::Ok(PillarResult {
                    pillar_id: *id,
                    pillar_name: id.name(),
                    pillar_color: id.color(),
                    metrics: readings
                        .into_iter()
                        .map(|(name, reading)| {
                            (name, MetricPayload::from_reading(reading, request.include_raw))
                        })
                        .collect(),
                    score: pillar_scores.get(id).copied().flatten(),
                    mode: request.mode,
                    query_time: outcome.query_time,
                    geometry: geometry.clone(),
                }),
                Err(error) => PillarEntry::Failed(PillarFailure::new(error)),
            };
            pillars.insert(id.key(), entry);
        }

        let summary = QuerySummary {
            overall_score: overall,
            overall_interpretation: scoring::interpretation(overall),
            pillar_scores,
            ecosystem_type: ecosystem,
            ecosystem_weights: PillarId::ALL.iter().copied().zip(weights).collect(),
            data_quality_score: dqs,
            data_completeness: completeness,
            dqs_recommendation: quality::dqs_recommendation(dqs),
            missing_critical_metrics: missing,
            quality_flags: flags,
            esv_multiplier,
            methodology: scoring::METHODOLOGY,
            geometry,
            carbon_credits,
            ecosystem_service_value: service_value,
        };

        QueryResult {
            query,
            pillars,
            summary,
            time_series: TimeSeriesInfo {
                enabled: request.temporal != Temporal::Latest,
                mode: request.temporal,
            },
        }
    }
}

fn metric_list(handler: &dyn PillarHandler, mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Simple => handler.simple_metrics(),
        Mode::Comprehensive => handler.comprehensive_metrics(),
    }
}
