//! # Dashboard Analytics
//!
//! Read-only aggregations over the live dataset. Each call takes one read
//! view of the repository, so the numbers it returns are mutually
//! consistent; nothing is cached between calls.
//!
//! Percentages are zero-safe: with an empty denominator every share is `0`
//! rather than an error. Categories are exactly the distinct values present
//! in the data, sorted by key.

use serde::Serialize;

use agro_core::CropType;

use crate::repository::{ReadUnit, Repository};

/// Farm count and summed total area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Number of farms.
    pub total_farms: usize,
    /// Sum of every farm's total area, in hectares.
    pub total_area: f64,
}

/// Farm distribution for one state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateShare {
    /// State code.
    pub state: String,
    /// Farms in that state.
    pub count: usize,
    /// Share of all farms, 0–100.
    pub percentage: f64,
}

/// Planted-area distribution for one culture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropShare {
    /// Culture.
    pub crop_type: CropType,
    /// Summed planted area, in hectares.
    pub total_area: f64,
    /// Share of all planted area, 0–100.
    pub percentage: f64,
}

/// Agricultural versus preserved-vegetation land use across all farms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LandUse {
    /// Sum of agricultural areas.
    pub agricultural_area: f64,
    /// Sum of vegetation areas.
    pub vegetation_area: f64,
    /// Agricultural share of the combined land use, 0–100.
    pub agricultural_percentage: f64,
    /// Vegetation share of the combined land use, 0–100.
    pub vegetation_percentage: f64,
}

/// `part / whole * 100`, or `0` when `whole` is not positive.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Dashboard aggregations over a repository.
#[derive(Debug)]
pub struct Analytics<'a, R> {
    repo: &'a R,
}

impl<'a, R: Repository> Analytics<'a, R> {
    pub(crate) fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Farm count and total area.
    pub fn summary(&self) -> DashboardSummary {
        let totals = self.repo.read(|unit| unit.area_totals());
        DashboardSummary {
            total_farms: totals.farms,
            total_area: totals.total,
        }
    }

    /// Farms grouped by state.
    pub fn by_state(&self) -> Vec<StateShare> {
        let counts = self.repo.read(|unit| unit.farm_count_by_state());
        let total: usize = counts.values().sum();
        counts
            .into_iter()
            .map(|(state, count)| StateShare {
                state,
                count,
                percentage: percentage(count as f64, total as f64),
            })
            .collect()
    }

    /// Planted area grouped by culture.
    pub fn by_crop(&self) -> Vec<CropShare> {
        let areas = self.repo.read(|unit| unit.planted_area_by_type());
        let total: f64 = areas.values().sum();
        areas
            .into_iter()
            .map(|(crop_type, area)| CropShare {
                crop_type,
                total_area: area,
                percentage: percentage(area, total),
            })
            .collect()
    }

    /// Agricultural versus vegetation split.
    pub fn land_use(&self) -> LandUse {
        let totals = self.repo.read(|unit| unit.area_totals());
        let combined = totals.agricultural + totals.vegetation;
        LandUse {
            agricultural_area: totals.agricultural,
            vegetation_area: totals.vegetation,
            agricultural_percentage: percentage(totals.agricultural, combined),
            vegetation_percentage: percentage(totals.vegetation, combined),
        }
    }
}
