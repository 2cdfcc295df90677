//! # Repository Interface
//!
//! The services never touch storage directly. They see the dataset through
//! two traits:
//!
//! - [`ReadUnit`] — point lookups, parent-filtered listings and the
//!   aggregate queries the dashboard needs.
//! - [`UnitOfWork`] — `put_*` / `remove_*` on top of a read view.
//!
//! A [`Repository`] hands out one or the other inside a closure. Writes go
//! through [`Repository::transact`], which is atomic: when the closure
//! returns `Err`, no mutation it performed is visible afterwards.
//!
//! Listings return owned records ordered by `created_at` (ties broken by
//! id) so callers get a stable order across calls.

use std::collections::BTreeMap;

use agro_core::{
    Crop, CropId, CropType, Document, Farm, FarmId, Harvest, HarvestId, Producer, ProducerId,
};

/// Summed farm areas, in hectares.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AreaTotals {
    /// Number of farms aggregated.
    pub farms: usize,
    /// Sum of `total_area`.
    pub total: f64,
    /// Sum of `agricultural_area`.
    pub agricultural: f64,
    /// Sum of `vegetation_area`.
    pub vegetation: f64,
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCounts {
    /// Producers.
    pub producers: usize,
    /// Farms.
    pub farms: usize,
    /// Harvests.
    pub harvests: usize,
    /// Crops.
    pub crops: usize,
}

impl RecordCounts {
    /// Whether every table is empty.
    pub fn is_empty(&self) -> bool {
        self.producers == 0 && self.farms == 0 && self.harvests == 0 && self.crops == 0
    }
}

/// Read access to the dataset.
pub trait ReadUnit {
    /// Look up a producer.
    fn producer(&self, id: ProducerId) -> Option<Producer>;
    /// All producers.
    fn producers(&self) -> Vec<Producer>;
    /// The producer holding `document`, if any.
    fn producer_by_document(&self, document: &Document) -> Option<Producer>;

    /// Look up a farm.
    fn farm(&self, id: FarmId) -> Option<Farm>;
    /// All farms.
    fn farms(&self) -> Vec<Farm>;
    /// Farms owned by `producer_id`.
    fn farms_by_producer(&self, producer_id: ProducerId) -> Vec<Farm>;

    /// Look up a harvest.
    fn harvest(&self, id: HarvestId) -> Option<Harvest>;
    /// All harvests.
    fn harvests(&self) -> Vec<Harvest>;
    /// Harvests recorded on `farm_id`.
    fn harvests_by_farm(&self, farm_id: FarmId) -> Vec<Harvest>;

    /// Look up a crop.
    fn crop(&self, id: CropId) -> Option<Crop>;
    /// All crops.
    fn crops(&self) -> Vec<Crop>;
    /// Crops planted within `harvest_id`.
    fn crops_by_harvest(&self, harvest_id: HarvestId) -> Vec<Crop>;
    /// Crops of one culture.
    fn crops_by_type(&self, crop_type: CropType) -> Vec<Crop>;

    /// Sum the area triple over every farm.
    fn area_totals(&self) -> AreaTotals {
        self.farms()
            .iter()
            .fold(AreaTotals::default(), |mut acc, farm| {
                acc.farms += 1;
                acc.total += farm.total_area;
                acc.agricultural += farm.agricultural_area;
                acc.vegetation += farm.vegetation_area;
                acc
            })
    }

    /// Number of farms per state code.
    fn farm_count_by_state(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for farm in self.farms() {
            *counts.entry(farm.state).or_insert(0) += 1;
        }
        counts
    }

    /// Planted area per culture.
    fn planted_area_by_type(&self) -> BTreeMap<CropType, f64> {
        let mut areas = BTreeMap::new();
        for crop in self.crops() {
            *areas.entry(crop.crop_type).or_insert(0.0) += crop.planted_area;
        }
        areas
    }

    /// Row counts per table.
    fn counts(&self) -> RecordCounts {
        RecordCounts {
            producers: self.producers().len(),
            farms: self.farms().len(),
            harvests: self.harvests().len(),
            crops: self.crops().len(),
        }
    }
}

/// Mutable access to the dataset within one atomic unit.
///
/// `put_*` inserts or replaces by id. `remove_*` returns the removed record.
/// Neither checks referential integrity; that is the services' job.
pub trait UnitOfWork: ReadUnit {
    /// Insert or replace a producer.
    fn put_producer(&mut self, producer: Producer);
    /// Remove a producer.
    fn remove_producer(&mut self, id: ProducerId) -> Option<Producer>;

    /// Insert or replace a farm.
    fn put_farm(&mut self, farm: Farm);
    /// Remove a farm.
    fn remove_farm(&mut self, id: FarmId) -> Option<Farm>;

    /// Insert or replace a harvest.
    fn put_harvest(&mut self, harvest: Harvest);
    /// Remove a harvest.
    fn remove_harvest(&mut self, id: HarvestId) -> Option<Harvest>;

    /// Insert or replace a crop.
    fn put_crop(&mut self, crop: Crop);
    /// Remove a crop.
    fn remove_crop(&mut self, id: CropId) -> Option<Crop>;
}

/// A store the services can run against.
pub trait Repository: Send + Sync {
    /// The unit handed to closures.
    type Unit: UnitOfWork;

    /// Run `f` against a consistent read view.
    fn read<T>(&self, f: impl FnOnce(&Self::Unit) -> T) -> T;

    /// Run `f` as one atomic unit of work.
    ///
    /// If `f` returns `Err`, every mutation it made is rolled back before
    /// the error is returned.
    fn transact<T, E>(&self, f: impl FnOnce(&mut Self::Unit) -> Result<T, E>) -> Result<T, E>;
}
