use std::ops::AddAssign;

use serde::Serialize;

use agro_core::{FarmId, HarvestId};

use crate::repository::UnitOfWork;

/// How many dependent records a cascade delete removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    /// Farms removed.
    pub farms: usize,
    /// Harvests removed.
    pub harvests: usize,
    /// Crops removed.
    pub crops: usize,
}

impl AddAssign for CascadeReport {
    fn add_assign(&mut self, other: Self) {
        self.farms += other.farms;
        self.harvests += other.harvests;
        self.crops += other.crops;
    }
}

/// Remove a harvest and its crops.
pub(crate) fn remove_harvest_tree<U: UnitOfWork>(unit: &mut U, harvest_id: HarvestId) -> CascadeReport {
    let mut report = CascadeReport::default();
    for crop in unit.crops_by_harvest(harvest_id) {
        if unit.remove_crop(crop.id).is_some() {
            report.crops += 1;
        }
    }
    if unit.remove_harvest(harvest_id).is_some() {
        report.harvests += 1;
    }
    report
}

/// Remove a farm, its harvests and their crops.
pub(crate) fn remove_farm_tree<U: UnitOfWork>(unit: &mut U, farm_id: FarmId) -> CascadeReport {
    let mut report = CascadeReport::default();
    for harvest in unit.harvests_by_farm(farm_id) {
        report += remove_harvest_tree(unit, harvest.id);
    }
    if unit.remove_farm(farm_id).is_some() {
        report.farms += 1;
    }
    report
}
