//! Polygon Geometry and Valuation
//!
//! Area via the Shoelace formula in an equirectangular projection, plus
//! the two valuation products attached to polygon summaries: carbon
//! credit estimates and annual ecosystem service value.

use crate::ecosystem::EcosystemType;
use crate::provider::Location;
use crate::response::{
    CarbonCredits, Centroid, EcosystemServiceValue, EstimatedValue, GeometryInfo,
};
use crate::utils::round_dp;

/// Kilometres per degree of latitude, and of longitude at the equator.
pub const KM_PER_DEGREE: f64 = 111.32;

/// Tonnes of CO2 equivalent per tonne of carbon (44/12).
pub const CO2_PER_CARBON: f64 = 3.67;

const HECTARES_PER_KM2: f64 = 100.0;
const ACRES_PER_HECTARE: f64 = 2.47105;

/// Voluntary carbon market price tiers in USD per verified tonne CO2e.
const CARBON_PRICE_LOW_USD: f64 = 15.0;
const CARBON_PRICE_MID_USD: f64 = 25.0;
const CARBON_PRICE_HIGH_USD: f64 = 50.0;

/// Annual growth factor for the 10- and 30-year ESV projections.
const ESV_GROWTH_FACTOR: f64 = 1.02;

const CARBON_METHODOLOGY: &str = "IPCC Tier 1 estimation with satellite-derived biomass";
const ESV_METHODOLOGY: &str = "Costanza et al. (2014) + PHI adjustment";

/// Polygon area in hectares via the Shoelace formula.
///
/// Vertices are projected to kilometres around the polygon's mean
/// latitude, so the result is an equirectangular approximation good for
/// areas up to tens of square kilometres.
pub fn polygon_area_hectares(points: &[Location]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let mean_lat = points.iter().map(|p| p.lat).sum::<f64>() / points.len() as f64;
    let lng_km = KM_PER_DEGREE * mean_lat.to_radians().cos();

    let mut cross_sum = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        let (x1, y1) = (p.lng * lng_km, p.lat * KM_PER_DEGREE);
        let (x2, y2) = (q.lng * lng_km, q.lat * KM_PER_DEGREE);
        cross_sum += x1 * y2 - x2 * y1;
    }

    let area_km2 = cross_sum.abs() / 2.0;
    area_km2 * HECTARES_PER_KM2
}

/// Centroid as the mean of the polygon vertices.
pub fn polygon_centroid(points: &[Location]) -> Centroid {
    let n = points.len() as f64;
    Centroid {
        latitude: points.iter().map(|p| p.lat).sum::<f64>() / n,
        longitude: points.iter().map(|p| p.lng).sum::<f64>() / n,
    }
}

/// Geometry block echoed into the summary and each pillar result.
pub fn geometry_info(points: &[Location]) -> GeometryInfo {
    let area_ha = polygon_area_hectares(points);
    GeometryInfo {
        kind: "Polygon",
        points: points.to_vec(),
        area_m2: area_ha * 10_000.0,
        area_ha: round_dp(area_ha, 2),
        area_acres: round_dp(area_ha * ACRES_PER_HECTARE, 2),
    }
}

/// Carbon credit estimate from whichever carbon metric is available.
///
/// Prefers a measured carbon stock, then above-ground biomass at a 0.5
/// carbon fraction, then a rough 2 Mg C per percent of tree cover.
/// Verified tonnage discounts CO2e by a confidence factor derived from
/// the data quality score (0.7 when no DQS is available).
pub fn carbon_credits(
    carbon_stock: Option<f64>,
    biomass: Option<f64>,
    tree_cover: Option<f64>,
    area_ha: f64,
    dqs: Option<f64>,
) -> CarbonCredits {
    let carbon_per_ha = carbon_stock
        .or_else(|| biomass.map(|b| b * 0.5))
        .or_else(|| tree_cover.map(|t| t * 2.0));

    let Some(carbon_per_ha) = carbon_per_ha else {
        return CarbonCredits {
            available: false,
            carbon_stock_mg_c_ha: None,
            total_carbon_mg: None,
            co2_equivalent_tonnes: None,
            verified_co2_tonnes: None,
            estimated_value: None,
            confidence: None,
            methodology: None,
            reason: Some("No carbon stock, biomass, or tree cover data available"),
        };
    };

    let total_carbon = carbon_per_ha * area_ha;
    let co2e = total_carbon * CO2_PER_CARBON;
    let confidence = dqs.map_or(0.7, |d| (d / 100.0).min(1.0));
    let verified = co2e * confidence;

    CarbonCredits {
        available: true,
        carbon_stock_mg_c_ha: Some(carbon_per_ha),
        total_carbon_mg: Some(round_dp(total_carbon, 2)),
        co2_equivalent_tonnes: Some(round_dp(co2e, 2)),
        verified_co2_tonnes: Some(round_dp(verified, 2)),
        estimated_value: Some(EstimatedValue {
            low_usd: round_dp(verified * CARBON_PRICE_LOW_USD, 2),
            mid_usd: round_dp(verified * CARBON_PRICE_MID_USD, 2),
            high_usd: round_dp(verified * CARBON_PRICE_HIGH_USD, 2),
        }),
        confidence: Some(confidence),
        methodology: Some(CARBON_METHODOLOGY),
        reason: None,
    }
}

/// Costanza et al. (2014) baseline value in USD per hectare per year.
pub fn base_esv_per_ha(ecosystem: EcosystemType) -> f64 {
    match ecosystem {
        EcosystemType::TropicalForest => 5382.0,
        EcosystemType::Mangrove => 9990.0,
        EcosystemType::Wetland => 25682.0,
        EcosystemType::GrasslandSavanna => 2871.0,
        EcosystemType::Agricultural => 1532.0,
        EcosystemType::UrbanGreen => 3212.0,
        EcosystemType::Default => 3000.0,
    }
}

/// Annual ecosystem service value for the polygon, adjusted by the
/// overall-score multiplier and projected forward at 2% annual growth.
pub fn ecosystem_service_value(
    multiplier: Option<f64>,
    ecosystem: EcosystemType,
    area_ha: f64,
) -> EcosystemServiceValue {
    let base = base_esv_per_ha(ecosystem);
    let adjusted = base * (1.0 + multiplier.unwrap_or(0.0));
    let total_annual = adjusted * area_ha;

    EcosystemServiceValue {
        available: true,
        ecosystem_type: ecosystem,
        base_esv_per_ha_usd: base,
        adjusted_esv_per_ha_usd: round_dp(adjusted, 2),
        total_annual_esv_usd: round_dp(total_annual, 2),
        projected_10yr_usd: round_dp(project_compound(total_annual, 10), 2),
        projected_30yr_usd: round_dp(project_compound(total_annual, 30), 2),
        area_ha: round_dp(area_ha, 2),
        methodology: ESV_METHODOLOGY,
    }
}

fn project_compound(annual: f64, years: i32) -> f64 {
    (0..years).map(|i| annual * ESV_GROWTH_FACTOR.powi(i)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<Location> {
        vec![
            Location::new(-0.5, -0.5),
            Location::new(-0.5, 0.5),
            Location::new(0.5, 0.5),
            Location::new(0.5, -0.5),
        ]
    }

    #[test]
    fn test_one_degree_square_at_equator() {
        // 1 degree x 1 degree at the equator: 111.32 km squared, in ha
        let area = polygon_area_hectares(&unit_square());
        let expected = KM_PER_DEGREE * KM_PER_DEGREE * 100.0;
        assert_relative_eq!(area, expected, max_relative = 0.01);
    }

    #[test]
    fn test_area_shrinks_with_latitude() {
        let shifted: Vec<Location> = unit_square()
            .iter()
            .map(|p| Location::new(p.lat + 60.0, p.lng))
            .collect();
        let area = polygon_area_hectares(&shifted);
        // cos(60 deg) = 0.5 halves the longitude span
        let expected = KM_PER_DEGREE * KM_PER_DEGREE * 100.0 * 0.5;
        assert_relative_eq!(area, expected, max_relative = 0.01);
    }

    #[test]
    fn test_degenerate_polygon_has_zero_area() {
        let line = vec![Location::new(0.0, 0.0), Location::new(0.0, 1.0)];
        assert_eq!(polygon_area_hectares(&line), 0.0);
    }

    #[test]
    fn test_centroid_is_vertex_mean() {
        let points = vec![
            Location::new(1.0, 103.0),
            Location::new(1.0, 104.0),
            Location::new(2.0, 104.0),
            Location::new(2.0, 103.0),
        ];
        let c = polygon_centroid(&points);
        assert_relative_eq!(c.latitude, 1.5);
        assert_relative_eq!(c.longitude, 103.5);
    }

    #[test]
    fn test_geometry_info_units() {
        let info = geometry_info(&unit_square());
        assert_eq!(info.kind, "Polygon");
        assert_eq!(info.points.len(), 4);
        // m2 comes from the unrounded hectares
        assert_relative_eq!(info.area_m2, info.area_ha * 10_000.0, max_relative = 1e-4);
        assert_relative_eq!(
            info.area_acres,
            info.area_ha * ACRES_PER_HECTARE,
            max_relative = 1e-4
        );
    }

    #[test]
    fn test_carbon_credits_prefers_measured_stock() {
        // 60 Mg C/ha over 100 ha, no DQS: conf 0.7
        let credits = carbon_credits(Some(60.0), Some(185.0), Some(72.0), 100.0, None);
        assert!(credits.available);
        assert_eq!(credits.carbon_stock_mg_c_ha, Some(60.0));
        assert_eq!(credits.total_carbon_mg, Some(6000.0));
        assert_eq!(credits.co2_equivalent_tonnes, Some(22020.0));
        assert_eq!(credits.verified_co2_tonnes, Some(15414.0));
        let value = credits.estimated_value.unwrap();
        assert_eq!(value.low_usd, 231210.0);
        assert_eq!(value.mid_usd, 385350.0);
        assert_eq!(value.high_usd, 770700.0);
        assert_eq!(credits.confidence, Some(0.7));
    }

    #[test]
    fn test_carbon_credits_biomass_fallback() {
        let credits = carbon_credits(None, Some(185.0), Some(72.0), 10.0, None);
        // 185 * 0.5 = 92.5 Mg C/ha
        assert_eq!(credits.carbon_stock_mg_c_ha, Some(92.5));

        let credits = carbon_credits(None, None, Some(72.0), 10.0, None);
        // 72% tree cover * 2 = 144 Mg C/ha
        assert_eq!(credits.carbon_stock_mg_c_ha, Some(144.0));
    }

    #[test]
    fn test_carbon_credits_confidence_tracks_dqs() {
        let credits = carbon_credits(Some(60.0), None, None, 1.0, Some(96.28));
        assert_eq!(credits.confidence, Some(0.9628));

        let capped = carbon_credits(Some(60.0), None, None, 1.0, Some(120.0));
        assert_eq!(capped.confidence, Some(1.0));
    }

    #[test]
    fn test_carbon_credits_unavailable_without_inputs() {
        let credits = carbon_credits(None, None, None, 100.0, Some(90.0));
        assert!(!credits.available);
        assert!(credits.reason.is_some());
        assert_eq!(credits.total_carbon_mg, None);
        assert!(credits.estimated_value.is_none());
    }

    #[test]
    fn test_esv_base_table() {
        assert_eq!(base_esv_per_ha(EcosystemType::TropicalForest), 5382.0);
        assert_eq!(base_esv_per_ha(EcosystemType::Wetland), 25682.0);
        assert_eq!(base_esv_per_ha(EcosystemType::Default), 3000.0);
    }

    #[test]
    fn test_esv_adjusts_and_projects() {
        let esv = ecosystem_service_value(Some(0.1), EcosystemType::Agricultural, 100.0);
        assert!(esv.available);
        assert_eq!(esv.base_esv_per_ha_usd, 1532.0);
        assert_relative_eq!(esv.adjusted_esv_per_ha_usd, 1685.2);
        assert_relative_eq!(esv.total_annual_esv_usd, 168520.0);

        // Geometric series: total * (1.02^n - 1) / 0.02
        let ten_year = 168520.0 * (1.02f64.powi(10) - 1.0) / 0.02;
        let thirty_year = 168520.0 * (1.02f64.powi(30) - 1.0) / 0.02;
        assert_relative_eq!(esv.projected_10yr_usd, ten_year, epsilon = 0.01);
        assert_relative_eq!(esv.projected_30yr_usd, thirty_year, epsilon = 0.01);
    }

    #[test]
    fn test_esv_without_multiplier_uses_base_rate() {
        let esv = ecosystem_service_value(None, EcosystemType::TropicalForest, 50.0);
        assert_eq!(esv.adjusted_esv_per_ha_usd, 5382.0);
        assert_eq!(esv.total_annual_esv_usd, 269100.0);
    }
}
