//! Metric Normalization Functions
//!
//! Converts raw environmental readings onto the common 0-100 PHI score scale
//! using the six curve shapes of the PHI Technical Framework:
//! - `linear`: higher raw values score higher (NDVI, tree cover)
//! - `inverse_linear`: lower raw values score higher (AOD, forest loss)
//! - `sigmoid` / `inverse_sigmoid`: S-curves with diminishing returns at the
//!   extremes (LAI, biomass, population density)
//! - `gaussian`: peak score at an optimal value (LST at 25 C, soil moisture)
//! - `centered`: peak score at zero (drought index, evaporative stress)
//!
//! All functions are pure, total, and clamp their result to [0, 100].
//! A missing raw value never reaches these functions; `normalize` operates
//! on a present value and the caller excludes absent readings upstream.

use crate::config::{MetricSpec, NormType};

/// Linear normalization: `S = (V - V_min) / (V_max - V_min) * 100`
///
/// The value is clamped into `[v_min, v_max]` before the ratio, so inputs
/// outside the reference range saturate at 0 or 100.
pub fn linear(value: f64, v_min: f64, v_max: f64) -> f64 {
    if v_max == v_min {
        return 50.0; // Avoid division by zero
    }

    let clamped = value.clamp(v_min, v_max);
    let score = (clamped - v_min) / (v_max - v_min) * 100.0;
    score.clamp(0.0, 100.0)
}

/// Inverse linear normalization: `S = (V_max - V) / (V_max - V_min) * 100`
pub fn inverse_linear(value: f64, v_min: f64, v_max: f64) -> f64 {
    if v_max == v_min {
        return 50.0; // Avoid division by zero
    }

    let clamped = value.clamp(v_min, v_max);
    let score = (v_max - clamped) / (v_max - v_min) * 100.0;
    score.clamp(0.0, 100.0)
}

/// Sigmoid normalization: `S = 100 / (1 + exp(-k_scaled * (V - V_mid)))`
///
/// The steepness `k` is auto-scaled to the metric's range
/// (`k_scaled = k * 10 / (v_max - v_min)`) so the same nominal `k` produces
/// a comparable transition width across metrics with very different units.
/// `v_mid` defaults to the range midpoint. The exponent is clamped at +/-700
/// to keep `exp` finite; beyond that the curve has saturated anyway.
pub fn sigmoid(value: f64, v_min: f64, v_max: f64, k: f64, v_mid: Option<f64>) -> f64 {
    let v_mid = v_mid.unwrap_or((v_min + v_max) / 2.0);

    let range = v_max - v_min;
    let k_scaled = if range > 0.0 { k * (10.0 / range) } else { k };

    let exponent = -k_scaled * (value - v_mid);
    if exponent > 700.0 {
        return 0.0;
    } else if exponent < -700.0 {
        return 100.0;
    }

    let score = 100.0 / (1.0 + exponent.exp());
    score.clamp(0.0, 100.0)
}

/// Inverse sigmoid: `S = 100 - sigmoid(V)`
///
/// Lower values are better, with diminishing returns at the extremes
/// (population density, nighttime lights).
pub fn inverse_sigmoid(value: f64, v_min: f64, v_max: f64, k: f64, v_mid: Option<f64>) -> f64 {
    100.0 - sigmoid(value, v_min, v_max, k, v_mid)
}

/// Gaussian normalization: `S = 100 * exp(-(V - V_opt)^2 / (2 * sigma^2))`
///
/// Maximum score at the optimal value, decreasing symmetrically. When both
/// bounds are given the value is clamped into `[v_min, v_max]` first.
/// `sigma == 0` degenerates to an exact match test: 100 at `v_opt`, else 0.
pub fn gaussian(
    value: f64,
    v_opt: f64,
    sigma: f64,
    v_min: Option<f64>,
    v_max: Option<f64>,
) -> f64 {
    let value = match (v_min, v_max) {
        (Some(lo), Some(hi)) => value.clamp(lo, hi),
        _ => value,
    };

    if sigma == 0.0 {
        return if value == v_opt { 100.0 } else { 0.0 };
    }

    let exponent = -((value - v_opt) * (value - v_opt)) / (2.0 * sigma * sigma);
    let score = 100.0 * exponent.exp();
    score.clamp(0.0, 100.0)
}

/// Centered normalization: `S = 100 * (1 - |V| / |V_max|)`
///
/// Maximum score at zero, decreasing with distance from zero in either
/// direction (indices like drought that are anomalies around a baseline).
/// `v_max == 0` degenerates to an exact match test.
pub fn centered(value: f64, v_max: f64) -> f64 {
    if v_max == 0.0 {
        return if value == 0.0 { 100.0 } else { 0.0 };
    }

    let abs_ratio = value.abs() / v_max.abs();
    let score = 100.0 * (1.0 - abs_ratio);
    score.clamp(0.0, 100.0)
}

/// Normalize a raw value using the curve shape and parameters of its spec.
///
/// Gaussian specs missing an explicit optimum or width fall back to the
/// range midpoint and a quarter of the range.
pub fn normalize(value: f64, spec: &MetricSpec) -> f64 {
    match spec.norm_type {
        NormType::Linear => linear(value, spec.v_min, spec.v_max),
        NormType::InverseLinear => inverse_linear(value, spec.v_min, spec.v_max),
        NormType::Sigmoid => sigmoid(
            value,
            spec.v_min,
            spec.v_max,
            spec.k.unwrap_or(0.5),
            spec.v_mid,
        ),
        NormType::InverseSigmoid => inverse_sigmoid(
            value,
            spec.v_min,
            spec.v_max,
            spec.k.unwrap_or(0.5),
            spec.v_mid,
        ),
        NormType::Gaussian => {
            let v_opt = spec.v_opt.unwrap_or((spec.v_min + spec.v_max) / 2.0);
            let sigma = spec.sigma.unwrap_or((spec.v_max - spec.v_min) / 4.0);
            gaussian(value, v_opt, sigma, Some(spec.v_min), Some(spec.v_max))
        }
        NormType::Centered => centered(value, spec.v_max),
    }
}
