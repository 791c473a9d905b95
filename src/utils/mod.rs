//! Utility modules for PHI scoring
//!
//! Contains shared functionality used across the engine:
//! - Normalization: the six 0-100 curve shapes and spec-driven dispatch
//! - Rounding: decimal rounding for scores and dollar amounts

pub mod normalization;

// Re-export commonly used functions
pub use normalization::{
    centered, gaussian, inverse_linear, inverse_sigmoid, linear, normalize, sigmoid,
};

/// Round to a fixed number of decimal places.
///
/// Scores round to 1-2 places and dollar amounts to 2; results stay stable
/// across serialization instead of trailing float noise.
pub fn round_dp(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
