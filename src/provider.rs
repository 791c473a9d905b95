//! Metric Provider Contract
//!
//! Pillar handlers read every raw observation through `MetricProvider`, which
//! stands in front of the remote imagery catalog. Calls may take seconds and
//! may fail; `Ok(None)` means the catalog answered but has no coverage for the
//! requested footprint. `StaticProvider` is the in-memory implementation used
//! by the CLI demo scene and the test suite.

use anyhow::Result;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::response::DateRange;

/// A point on the globe, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Location { lat, lng }
    }
}

/// One band of one catalog dataset, with the factors that convert stored
/// integers to physical units. Aggregate bands a provider computes on the
/// fly (`elevation_min`, `elevation_max`, `distance_to_water`) are addressed
/// the same way as stored bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetRef {
    pub id: &'static str,
    pub band: &'static str,
    pub scale_factor: f64,
    pub offset: f64,
}

impl DatasetRef {
    pub const fn new(id: &'static str, band: &'static str) -> Self {
        DatasetRef {
            id,
            band,
            scale_factor: 1.0,
            offset: 0.0,
        }
    }

    pub const fn scaled(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub const fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Convert a stored band value to physical units.
    pub fn apply_scale(&self, raw: f64) -> f64 {
        raw * self.scale_factor + self.offset
    }
}

/// Source of raw metric observations.
pub trait MetricProvider: Send + Sync {
    /// Fetch the spatially reduced value of one band over the buffered
    /// footprint. Returns the raw stored value; scaling to physical units is
    /// the caller's job via [`DatasetRef::apply_scale`].
    fn fetch(
        &self,
        dataset: &DatasetRef,
        location: Location,
        buffer_radius: f64,
        date_range: &DateRange,
    ) -> Result<Option<f64>>;
}

/// Fixed-value provider keyed by `(dataset id, band)`.
#[derive(Debug, Default, Clone)]
pub struct StaticProvider {
    values: FxHashMap<(&'static str, &'static str), f64>,
}

impl StaticProvider {
    pub fn new() -> Self {
        StaticProvider {
            values: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, dataset: &'static str, band: &'static str, raw_value: f64) {
        self.values.insert((dataset, band), raw_value);
    }

    pub fn remove(&mut self, dataset: &'static str, band: &'static str) {
        self.values.remove(&(dataset, band));
    }

    /// A plausible lowland rainforest scene. Values are raw band values;
    /// handlers apply the catalog scale factors (e.g. NDVI 6500 → 0.65,
    /// LST 14907.5 → 25.0 C).
    pub fn sample_scene() -> Self {
        let mut p = StaticProvider::new();

        // Pillar A
        p.insert("MODIS/061/MCD19A2_GRANULES", "Optical_Depth_047", 80.0);
        p.insert("MODIS/061/MOD08_M3", "Aerosol_Optical_Depth_Land_Ocean_Mean_Mean", 0.038);
        p.insert("MODIS/061/MOD08_M3", "Total_Ozone_Mean_Mean", 270.0);
        p.insert("MODIS/061/MOD08_M3", "Cloud_Fraction_Mean_Mean", 45.0);

        // Pillar B
        p.insert("MODIS/061/MOD13A2", "NDVI", 6500.0);
        p.insert("MODIS/061/MOD13A2", "EVI", 4200.0);
        p.insert("MODIS/061/MOD15A2H", "Lai_500m", 35.0);
        p.insert("MODIS/061/MOD15A2H", "Fpar_500m", 62.0);
        p.insert("ESA/WorldCover/v200", "Map", 10.0);

        // Pillar C
        p.insert("UMD/hansen/global_forest_change_2023_v1_11", "treecover2000", 72.0);
        p.insert("UMD/hansen/global_forest_change_2023_v1_11", "loss", 0.02);
        p.insert("UMD/hansen/global_forest_change_2023_v1_11", "lossyear", 18.0);
        p.insert("LARSE/GEDI/GEDI04_A_002_MONTHLY", "agbd", 185.0);
        p.insert("users/nlang/ETH_GlobalCanopyHeight_2020_10m_v1", "b1", 28.0);

        // Pillar D
        p.insert("MODIS/061/MOD11A2", "LST_Day_1km", 14907.5);
        p.insert("MODIS/061/MOD11A2", "LST_Night_1km", 14357.5);
        p.insert("NASA/SMAP/SPL4SMGP/007", "sm_surface", 0.31);
        p.insert("JRC/GSW1_4/GlobalSurfaceWater", "occurrence", 18.0);
        p.insert("JRC/GSW1_4/GlobalSurfaceWater", "seasonality", 6.0);
        p.insert("MODIS/061/MOD16A2", "ET", 350.0);
        p.insert("MODIS/061/MOD16A2", "PET", 420.0);

        // Pillar E
        p.insert("WorldPop/GP/100m/pop_age_sex_cons_unadj", "population", 120.0);
        p.insert("NOAA/VIIRS/DNB/MONTHLY_V1/VCMSLCFG", "avg_rad", 0.8);
        p.insert("CSP/HM/GlobalHumanModification", "gHM", 0.18);
        p.insert("USGS/SRTMGL1_003", "elevation", 310.0);
        p.insert("USGS/SRTMGL1_003", "elevation_min", 295.0);
        p.insert("USGS/SRTMGL1_003", "elevation_max", 330.0);
        p.insert("JRC/GSW1_4/GlobalSurfaceWater", "distance_to_water", 1250.0);

        p
    }
}

impl MetricProvider for StaticProvider {
    fn fetch(
        &self,
        dataset: &DatasetRef,
        _location: Location,
        _buffer_radius: f64,
        _date_range: &DateRange,
    ) -> Result<Option<f64>> {
        Ok(self.values.get(&(dataset.id, dataset.band)).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn any_range() -> DateRange {
        DateRange {
            start: "2026-01-01".to_string(),
            end: "2026-01-31".to_string(),
        }
    }

    #[test]
    fn test_dataset_scaling() {
        let ndvi = DatasetRef::new("MODIS/061/MOD13A2", "NDVI").scaled(0.0001);
        assert_relative_eq!(ndvi.apply_scale(6500.0), 0.65, epsilon = 1e-12);

        // LST: scale then offset from Kelvin
        let lst = DatasetRef::new("MODIS/061/MOD11A2", "LST_Day_1km")
            .scaled(0.02)
            .with_offset(-273.15);
        assert_relative_eq!(lst.apply_scale(14907.5), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_static_provider_lookup() {
        let provider = StaticProvider::sample_scene();
        let ndvi = DatasetRef::new("MODIS/061/MOD13A2", "NDVI").scaled(0.0001);
        let got = provider
            .fetch(&ndvi, Location::new(-3.0, -62.0), 500.0, &any_range())
            .unwrap();
        assert_eq!(got, Some(6500.0));
    }

    #[test]
    fn test_static_provider_missing_band() {
        let provider = StaticProvider::new();
        let ndvi = DatasetRef::new("MODIS/061/MOD13A2", "NDVI");
        let got = provider
            .fetch(&ndvi, Location::new(0.0, 0.0), 500.0, &any_range())
            .unwrap();
        assert_eq!(got, None);
    }
}
