//! Data Quality Scoring
//!
//! Computes the Data Quality Score (DQS): a criticality-weighted availability
//! average over the whole metric registry. Metrics the query never produced
//! count as zero availability, so a simple-mode query can never reach the
//! DQS of a comprehensive one. Also derives the confidence band, the fixed
//! recommendation strings, completeness, and per-metric quality flags.

use rustc_hash::FxHashMap;

use crate::config::{Criticality, MetricSpec, METRIC_SPECS};
use crate::response::{MetricReading, Quality};
use crate::utils::round_dp;

// Confidence band thresholds.
pub const DQS_HIGH: f64 = 85.0;
pub const DQS_INVESTMENT_GRADE: f64 = 70.0;
pub const DQS_ACCEPTABLE: f64 = 50.0;
pub const DQS_MARGINAL: f64 = 40.0;

/// At most this many quality flags are surfaced in a summary.
pub const MAX_QUALITY_FLAGS: usize = 5;

/// DQS weight for a criticality tier.
pub fn criticality_weight(criticality: Criticality) -> f64 {
    match criticality {
        Criticality::Critical => 1.0,
        Criticality::Important => 0.7,
        Criticality::Supporting => 0.4,
        Criticality::Auxiliary => 0.2,
    }
}

/// Availability credit for a quality flag.
pub fn availability_score(quality: Quality) -> f64 {
    match quality {
        Quality::Good => 1.0,
        Quality::Moderate => 0.5,
        Quality::Poor => 0.25,
        Quality::Unavailable => 0.0,
    }
}

/// Data Quality Score over the full metric registry, 0-100, 2 decimals.
///
/// `readings` holds every metric the query produced, keyed by name.
/// Registered metrics with `weight == 0` are informational and excluded;
/// registered metrics absent from `readings` contribute zero availability.
pub fn calculate_dqs(readings: &FxHashMap<&str, &MetricReading>) -> f64 {
    let mut weighted = 0.0;
    let mut weight_total = 0.0;

    for (name, spec) in METRIC_SPECS.iter() {
        if spec.weight == 0.0 {
            continue;
        }
        let weight = criticality_weight(spec.criticality);
        let availability = readings
            .get(name)
            .map_or(0.0, |r| availability_score(r.quality));
        weighted += weight * availability;
        weight_total += weight;
    }

    if weight_total == 0.0 {
        return 0.0;
    }
    round_dp(weighted / weight_total * 100.0, 2)
}

/// Confidence band label for a DQS value.
pub fn confidence_band(dqs: f64) -> &'static str {
    if dqs >= DQS_HIGH {
        "high"
    } else if dqs >= DQS_INVESTMENT_GRADE {
        "investment_grade"
    } else if dqs >= DQS_ACCEPTABLE {
        "acceptable"
    } else {
        "low"
    }
}

/// Fixed recommendation text per DQS band. Downstream reports display these
/// verbatim, so the wording is part of the contract.
pub fn dqs_recommendation(dqs: f64) -> &'static str {
    if dqs >= DQS_HIGH {
        "High confidence results. Data quality suitable for detailed analysis and reporting."
    } else if dqs >= DQS_INVESTMENT_GRADE {
        "Investment-grade data quality. Results suitable for most applications."
    } else if dqs >= DQS_ACCEPTABLE {
        "Acceptable data quality. Consider supplementing with additional data sources."
    } else if dqs >= DQS_MARGINAL {
        "Marginal data quality. Results should be interpreted with caution."
    } else {
        "Low data quality. Consider expanding search area or time range for better coverage."
    }
}

/// Fraction of produced metrics that actually carry a usable value, 0-1.
/// Unlike the DQS this only looks at what the query produced, so it reflects
/// provider coverage rather than query depth.
pub fn data_completeness(readings: &FxHashMap<&str, &MetricReading>) -> f64 {
    if readings.is_empty() {
        return 0.0;
    }
    let available = readings
        .values()
        .filter(|r| r.value.is_some() && r.quality != Quality::Unavailable)
        .count();
    available as f64 / readings.len() as f64
}

/// Registered critical metrics with no value anywhere in the results,
/// in registry order.
pub fn missing_critical_metrics(readings: &FxHashMap<&str, &MetricReading>) -> Vec<String> {
    METRIC_SPECS
        .iter()
        .filter(|(name, spec)| {
            spec.criticality == Criticality::Critical
                && !readings.get(name).is_some_and(|r| r.value.is_some())
        })
        .map(|(name, _)| (*name).to_string())
        .collect()
}

/// `<metric>_poor` / `<metric>_unavailable` flags, capped at
/// [`MAX_QUALITY_FLAGS`]. Iteration order of the input decides which flags
/// survive the cap.
pub fn quality_flags<'a, I>(metrics: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a String, &'a MetricReading)>,
{
    let mut flags = Vec::new();
    for (name, reading) in metrics {
        match reading.quality {
            Quality::Poor => flags.push(format!("{}_poor", name)),
            Quality::Unavailable => flags.push(format!("{}_unavailable", name)),
            _ => {}
        }
    }
    flags.truncate(MAX_QUALITY_FLAGS);
    flags
}

/// Range-based plausibility check with an attached confidence value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityCheck {
    pub quality: Quality,
    pub confidence: f64,
}

/// Assess a raw value against its spec's expected range: absent →
/// unavailable, outside the range → poor, within 5% of either bound →
/// moderate, otherwise good.
pub fn assess_metric_quality(value: Option<f64>, spec: &MetricSpec) -> QualityCheck {
    let Some(value) = value else {
        return QualityCheck {
            quality: Quality::Unavailable,
            confidence: 0.0,
        };
    };

    if value < spec.v_min || value > spec.v_max {
        return QualityCheck {
            quality: Quality::Poor,
            confidence: 0.3,
        };
    }

    let range = spec.v_max - spec.v_min;
    if range > 0.0 {
        let edge_ratio = (value - spec.v_min).abs().min((value - spec.v_max).abs()) / range;
        if edge_ratio < 0.05 {
            return QualityCheck {
                quality: Quality::Moderate,
                confidence: 0.6,
            };
        }
    }

    QualityCheck {
        quality: Quality::Good,
        confidence: 0.9,
    }
}
