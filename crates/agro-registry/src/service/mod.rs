//! # Domain Services
//!
//! [`Registry`] is the entry point. It owns a [`Repository`] handle and a
//! [`Clock`] and hands out one short-lived service per record kind:
//!
//! ```ignore
//! let registry = Registry::new(InMemoryRepository::new(), Arc::new(SystemClock));
//! let producer = registry.producers().create(NewProducer { .. })?;
//! let farm = registry.farms().create(NewFarm { producer_id: producer.id, .. })?;
//! ```
//!
//! Every mutation runs inside exactly one [`Repository::transact`] call and
//! validates before it writes, so a failed call leaves the dataset
//! untouched. Cascade deletes walk the ownership tree bottom-up inside the
//! same transaction.

mod cascade;
mod crop;
mod farm;
mod harvest;
mod producer;

use std::sync::Arc;

use agro_core::{Clock, SystemClock};

pub use cascade::CascadeReport;
pub use crop::CropService;
pub use farm::FarmService;
pub use harvest::HarvestService;
pub use producer::ProducerService;

use crate::analytics::Analytics;
use crate::repository::Repository;

/// The registry: a repository plus the clock that stamps its records.
#[derive(Debug, Clone)]
pub struct Registry<R> {
    repo: R,
    clock: Arc<dyn Clock>,
}

impl<R: Repository> Registry<R> {
    /// Build a registry over `repo`, timestamping with `clock`.
    pub fn new(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Build a registry that timestamps with the wall clock.
    pub fn with_system_clock(repo: R) -> Self {
        Self::new(repo, Arc::new(SystemClock))
    }

    /// The underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Producer operations.
    pub fn producers(&self) -> ProducerService<'_, R> {
        ProducerService::new(&self.repo, self.clock.as_ref())
    }

    /// Farm operations.
    pub fn farms(&self) -> FarmService<'_, R> {
        FarmService::new(&self.repo, self.clock.as_ref())
    }

    /// Harvest operations.
    pub fn harvests(&self) -> HarvestService<'_, R> {
        HarvestService::new(&self.repo, self.clock.as_ref())
    }

    /// Crop operations.
    pub fn crops(&self) -> CropService<'_, R> {
        CropService::new(&self.repo, self.clock.as_ref())
    }

    /// Dashboard aggregations.
    pub fn analytics(&self) -> Analytics<'_, R> {
        Analytics::new(&self.repo)
    }
}
