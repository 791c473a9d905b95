//! Scoring Engine
//!
//! Turns raw metric readings into 0-100 health scores: per-metric
//! normalization, weighted category scores per pillar, and an
//! ecosystem-weighted overall score. Also hosts the ESV multiplier curve
//! that converts an overall score into a service-value adjustment.

use std::collections::BTreeMap;

use crate::config::metric_spec;
use crate::pillars::PillarId;
use crate::response::MetricReading;
use crate::utils::normalization::normalize;
use crate::utils::round_dp;

/// Version tag stamped into every summary.
pub const METHODOLOGY: &str = "PHI Technical Framework v1.0";

// ESV multiplier curve: linear distance from the neutral score of 50,
// damped by a log term so extreme scores do not run away.
pub const ESV_SCALE_K: f64 = 0.6;
pub const ESV_LOG_ALPHA: f64 = 0.15;

/// Weighted score for one pillar plus the per-metric breakdown.
#[derive(Debug, Clone)]
pub struct CategoryScore {
    pub score: Option<f64>,
    pub metric_scores: BTreeMap<String, f64>,
}

/// Normalize one named metric value to 0-100, rounded to 2 decimals.
/// Returns `None` for metrics with no registered spec.
pub fn normalize_metric(name: &str, value: f64) -> Option<f64> {
    metric_spec(name).map(|spec| round_dp(normalize(value, spec), 2))
}

/// Weighted average of the normalized metrics belonging to `pillar`.
///
/// Metrics with a null value or no spec are skipped; weights renormalize
/// over the metrics that actually contributed. `score` is `None` when no
/// metric with weight > 0 was scorable.
pub fn category_score(
    pillar: PillarId,
    metrics: &BTreeMap<String, MetricReading>,
) -> CategoryScore {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut metric_scores = BTreeMap::new();

    for (name, reading) in metrics {
        let Some(value) = reading.value else {
            continue;
        };
        let Some(spec) = metric_spec(name) else {
            continue;
        };
        if spec.pillar != pillar {
            continue;
        }

        let normalized = round_dp(normalize(value, spec), 2);
        metric_scores.insert(name.clone(), normalized);
        weighted_sum += normalized * spec.weight;
        weight_total += spec.weight;
    }

    let score = (weight_total > 0.0).then(|| round_dp(weighted_sum / weight_total, 2));
    CategoryScore {
        score,
        metric_scores,
    }
}

/// Pillar score as the rounded integer form of the category score.
pub fn pillar_score(pillar: PillarId, metrics: &BTreeMap<String, MetricReading>) -> Option<i64> {
    category_score(pillar, metrics)
        .score
        .map(|s| s.round() as i64)
}

/// Ecosystem-weighted overall score across pillars, 2 decimals.
///
/// Pillars with no score drop out of numerator and denominator, so the
/// remaining weights renormalize instead of dragging the average to zero.
pub fn overall_score(
    pillar_scores: &BTreeMap<PillarId, Option<i64>>,
    weights: &[f64; 5],
) -> Option<f64> {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for (i, id) in PillarId::ALL.iter().enumerate() {
        let Some(Some(score)) = pillar_scores.get(id) else {
            continue;
        };
        weighted_sum += *score as f64 * weights[i];
        weight_total += weights[i];
    }

    (weight_total > 0.0).then(|| round_dp(weighted_sum / weight_total, 2))
}

/// Service-value adjustment for an overall score, rounded to 4 decimals.
///
/// Scores above 50 yield a premium, below 50 a discount. Returns `None`
/// when the score is not positive.
pub fn esv_multiplier(phi: f64) -> Option<f64> {
    if phi <= 0.0 {
        return None;
    }

    let phi_floor = phi.max(1.0);
    let base = (phi_floor - 50.0) / 100.0;
    let ratio = phi_floor / 50.0;
    if ratio <= 0.0 {
        return None;
    }

    let multiplier = base * ESV_SCALE_K * (1.0 + ESV_LOG_ALPHA * ratio.ln());
    Some(round_dp(multiplier, 4))
}

/// Human-readable band for a 0-100 score.
pub fn interpretation(score: Option<f64>) -> &'static str {
    let Some(score) = score else {
        return "Unavailable";
    };
    let score = score.round();
    if score >= 80.0 {
        "Excellent"
    } else if score >= 60.0 {
        "Good"
    } else if score >= 40.0 {
        "Moderate"
    } else if score >= 20.0 {
        "Poor"
    } else {
        "Critical"
    }
}

/// Hex badge color for a 0-100 score, matching the interpretation bands.
pub fn score_color(score: Option<f64>) -> &'static str {
    let Some(score) = score else {
        return "#95a5a6";
    };
    let score = score.round();
    if score >= 80.0 {
        "#27ae60"
    } else if score >= 60.0 {
        "#2ecc71"
    } else if score >= 40.0 {
        "#f39c12"
    } else if score >= 20.0 {
        "#e74c3c"
    } else {
        "#c0392b"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Quality;
    use approx::assert_relative_eq;

    fn reading(value: f64) -> MetricReading {
        MetricReading::new(Some(value), "unit", "test metric", Quality::Good)
    }

    #[test]
    fn test_single_metric_category_is_its_normalized_score() {
        // NDVI 0.65 in [-0.1, 0.9] → 75.0, weight 1.0
        let mut metrics = BTreeMap::new();
        metrics.insert("ndvi".to_string(), reading(0.65));

        let result = category_score(PillarId::B, &metrics);
        assert_eq!(result.score, Some(75.0));
        assert_eq!(result.metric_scores.get("ndvi"), Some(&75.0));
        assert_eq!(pillar_score(PillarId::B, &metrics), Some(75));
    }

    #[test]
    fn test_category_skips_null_and_unknown_metrics() {
        let mut metrics = BTreeMap::new();
        metrics.insert("ndvi".to_string(), reading(0.65));
        metrics.insert(
            "evi".to_string(),
            MetricReading::new(None, "dimensionless", "EVI", Quality::Unavailable),
        );
        metrics.insert("not_a_metric".to_string(), reading(42.0));

        let result = category_score(PillarId::B, &metrics);
        assert_eq!(result.score, Some(75.0));
        assert_eq!(result.metric_scores.len(), 1);
    }

    #[test]
    fn test_category_ignores_other_pillars_metrics() {
        // tree_cover belongs to pillar C, not B
        let mut metrics = BTreeMap::new();
        metrics.insert("tree_cover".to_string(), reading(80.0));

        let result = category_score(PillarId::B, &metrics);
        assert_eq!(result.score, None);
        assert!(result.metric_scores.is_empty());
    }

    #[test]
    fn test_category_weighted_average() {
        // ndvi 75.0 (w 1.0), evi 0.42 → (0.42+0.1)/0.9*100 = 57.78 (w 1.0)
        let mut metrics = BTreeMap::new();
        metrics.insert("ndvi".to_string(), reading(0.65));
        metrics.insert("evi".to_string(), reading(0.42));

        let result = category_score(PillarId::B, &metrics);
        let expected = (75.0 + 57.78) / 2.0;
        assert_relative_eq!(result.score.unwrap(), expected, epsilon = 0.01);
    }

    #[test]
    fn test_overall_default_weights_is_mean() {
        let mut scores = BTreeMap::new();
        scores.insert(PillarId::A, Some(80));
        scores.insert(PillarId::B, Some(70));
        scores.insert(PillarId::C, Some(60));
        scores.insert(PillarId::D, Some(50));
        scores.insert(PillarId::E, Some(40));

        let overall = overall_score(&scores, &[0.2; 5]);
        assert_eq!(overall, Some(60.0));
    }

    #[test]
    fn test_overall_renormalizes_over_missing_pillars() {
        let mut scores = BTreeMap::new();
        scores.insert(PillarId::A, Some(80));
        scores.insert(PillarId::B, Some(70));
        scores.insert(PillarId::C, None);

        let overall = overall_score(&scores, &[0.2; 5]);
        assert_eq!(overall, Some(75.0));
    }

    #[test]
    fn test_overall_none_when_no_scores() {
        let scores = BTreeMap::new();
        assert_eq!(overall_score(&scores, &[0.2; 5]), None);
    }

    #[test]
    fn test_overall_with_uneven_weights() {
        // Tropical forest profile: A .10, B .30, C .30, D .15, E .15
        let mut scores = BTreeMap::new();
        scores.insert(PillarId::A, Some(40));
        scores.insert(PillarId::B, Some(90));
        scores.insert(PillarId::C, Some(80));
        scores.insert(PillarId::D, Some(60));
        scores.insert(PillarId::E, Some(70));

        let weights = [0.10, 0.30, 0.30, 0.15, 0.15];
        let expected = 40.0 * 0.10 + 90.0 * 0.30 + 80.0 * 0.30 + 60.0 * 0.15 + 70.0 * 0.15;
        assert_eq!(overall_score(&scores, &weights), Some(round_dp(expected, 2)));
    }

    #[test]
    fn test_esv_multiplier_neutral_at_fifty() {
        let m = esv_multiplier(50.0).unwrap();
        assert_relative_eq!(m, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_esv_multiplier_signs() {
        // 80 → premium: 0.3*0.6*(1+0.15*ln(1.6)) = 0.1927
        assert_relative_eq!(esv_multiplier(80.0).unwrap(), 0.1927, epsilon = 1e-4);
        // 30 → discount
        assert!(esv_multiplier(30.0).unwrap() < 0.0);
        // Non-positive score has no defined multiplier
        assert_eq!(esv_multiplier(0.0), None);
        assert_eq!(esv_multiplier(-5.0), None);
    }

    #[test]
    fn test_esv_multiplier_floors_tiny_scores() {
        // 0.5 is floored to 1.0 before the curve
        assert_eq!(esv_multiplier(0.5), esv_multiplier(1.0));
    }

    #[test]
    fn test_interpretation_bands() {
        assert_eq!(interpretation(Some(92.0)), "Excellent");
        assert_eq!(interpretation(Some(80.0)), "Excellent");
        // Rounds before banding: 79.6 → 80
        assert_eq!(interpretation(Some(79.6)), "Excellent");
        assert_eq!(interpretation(Some(79.4)), "Good");
        assert_eq!(interpretation(Some(60.0)), "Good");
        assert_eq!(interpretation(Some(45.0)), "Moderate");
        assert_eq!(interpretation(Some(25.0)), "Poor");
        assert_eq!(interpretation(Some(10.0)), "Critical");
        assert_eq!(interpretation(None), "Unavailable");
    }

    #[test]
    fn test_score_colors() {
        assert_eq!(score_color(Some(85.0)), "#27ae60");
        assert_eq!(score_color(Some(65.0)), "#2ecc71");
        assert_eq!(score_color(Some(45.0)), "#f39c12");
        assert_eq!(score_color(Some(25.0)), "#e74c3c");
        assert_eq!(score_color(Some(5.0)), "#c0392b");
        assert_eq!(score_color(None), "#95a5a6");
    }

    #[test]
    fn test_normalize_metric_rounds_to_two_decimals() {
        // evi 0.42 → 57.7777... → 57.78
        assert_eq!(normalize_metric("evi", 0.42), Some(57.78));
        assert_eq!(normalize_metric("no_such_metric", 1.0), None);
    }
}
