//! Registry compensation for failed write-through.
//!
//! Mutating handlers run under [`AppState::write_gate`]: they take a
//! [`Snapshot`] of the records they are about to touch, apply the change to
//! the registry, then persist it. If persisting fails the snapshot is put
//! back, so a request that returns an error leaves the registry as it
//! found it. The gate is held until the database has answered, which keeps
//! Postgres writes in the same order as registry commits.
//!
//! [`AppState::write_gate`]: crate::state::AppState::write_gate

use std::convert::Infallible;
use std::fmt::Display;

use agro_core::{Crop, CropId, Farm, FarmId, Harvest, HarvestId, Producer, ProducerId};
use agro_registry::{InMemoryRepository, ReadUnit, Registry, Repository, UnitOfWork};

use crate::error::AppError;

/// Records as they were before a mutation.
#[derive(Debug, Default)]
pub struct Snapshot {
    producers: Vec<Producer>,
    farms: Vec<Farm>,
    harvests: Vec<Harvest>,
    crops: Vec<Crop>,
    created: Vec<Created>,
}

/// A record that did not exist before the mutation.
#[derive(Debug, Clone, Copy)]
enum Created {
    Producer(ProducerId),
    Farm(FarmId),
    Harvest(HarvestId),
    Crop(CropId),
}

impl Snapshot {
    /// A single producer, for updates.
    pub fn producer(registry: &Registry<InMemoryRepository>, id: ProducerId) -> Self {
        registry.repository().read(|unit| Self {
            producers: unit.producer(id).into_iter().collect(),
            ..Self::default()
        })
    }

    /// A single farm, for updates.
    pub fn farm(registry: &Registry<InMemoryRepository>, id: FarmId) -> Self {
        registry.repository().read(|unit| Self {
            farms: unit.farm(id).into_iter().collect(),
            ..Self::default()
        })
    }

    /// A producer with its farms, harvests and crops.
    pub fn producer_tree(registry: &Registry<InMemoryRepository>, id: ProducerId) -> Self {
        registry.repository().read(|unit| {
            let mut snapshot = Self::default();
            snapshot.producers.extend(unit.producer(id));
            for farm in unit.farms_by_producer(id) {
                snapshot.collect_farm(unit, farm);
            }
            snapshot
        })
    }

    /// A farm with its harvests and crops.
    pub fn farm_tree(registry: &Registry<InMemoryRepository>, id: FarmId) -> Self {
        registry.repository().read(|unit| {
            let mut snapshot = Self::default();
            if let Some(farm) = unit.farm(id) {
                snapshot.collect_farm(unit, farm);
            }
            snapshot
        })
    }

    /// A harvest with its crops.
    pub fn harvest_tree(registry: &Registry<InMemoryRepository>, id: HarvestId) -> Self {
        registry.repository().read(|unit| {
            let mut snapshot = Self::default();
            if let Some(harvest) = unit.harvest(id) {
                snapshot.collect_harvest(unit, harvest);
            }
            snapshot
        })
    }

    /// A single crop.
    pub fn crop(registry: &Registry<InMemoryRepository>, id: CropId) -> Self {
        registry.repository().read(|unit| Self {
            crops: unit.crop(id).into_iter().collect(),
            ..Self::default()
        })
    }

    /// Nothing existed: rolling back removes the new producer.
    pub fn new_producer(id: ProducerId) -> Self {
        Self::created(Created::Producer(id))
    }

    /// Nothing existed: rolling back removes the new farm.
    pub fn new_farm(id: FarmId) -> Self {
        Self::created(Created::Farm(id))
    }

    /// Nothing existed: rolling back removes the new harvest.
    pub fn new_harvest(id: HarvestId) -> Self {
        Self::created(Created::Harvest(id))
    }

    /// Nothing existed: rolling back removes the new crop.
    pub fn new_crop(id: CropId) -> Self {
        Self::created(Created::Crop(id))
    }

    fn created(record: Created) -> Self {
        Self {
            created: vec![record],
            ..Self::default()
        }
    }

    fn collect_farm(&mut self, unit: &impl ReadUnit, farm: Farm) {
        for harvest in unit.harvests_by_farm(farm.id) {
            self.collect_harvest(unit, harvest);
        }
        self.farms.push(farm);
    }

    fn collect_harvest(&mut self, unit: &impl ReadUnit, harvest: Harvest) {
        self.crops.extend(unit.crops_by_harvest(harvest.id));
        self.harvests.push(harvest);
    }

    /// Put the registry back to the captured state in one transaction.
    pub fn restore(self, registry: &Registry<InMemoryRepository>) {
        let restored: Result<(), Infallible> = registry.repository().transact(|unit| {
            for record in self.created {
                match record {
                    Created::Producer(id) => {
                        unit.remove_producer(id);
                    }
                    Created::Farm(id) => {
                        unit.remove_farm(id);
                    }
                    Created::Harvest(id) => {
                        unit.remove_harvest(id);
                    }
                    Created::Crop(id) => {
                        unit.remove_crop(id);
                    }
                }
            }
            for producer in self.producers {
                unit.put_producer(producer);
            }
            for farm in self.farms {
                unit.put_farm(farm);
            }
            for harvest in self.harvests {
                unit.put_harvest(harvest);
            }
            for crop in self.crops {
                unit.put_crop(crop);
            }
            Ok(())
        });
        if let Err(never) = restored {
            match never {}
        }
    }
}

/// Turn the outcome of an insert or update into the handler's result.
///
/// A database error, or an update that matched no row, rolls the registry
/// back to `before` and surfaces as a 500.
pub fn settle(
    persisted: Result<bool, sqlx::Error>,
    entity: &'static str,
    id: impl Display,
    before: Snapshot,
    registry: &Registry<InMemoryRepository>,
) -> Result<(), AppError> {
    let failure = match persisted {
        Ok(true) => return Ok(()),
        Ok(false) => "no matching database row".to_string(),
        Err(e) => e.to_string(),
    };

    tracing::error!(entity, id = %id, error = %failure, "database write failed; reverting registry change");
    before.restore(registry);
    Err(AppError::Internal(format!(
        "{entity} {id} could not be persisted: {failure}"
    )))
}

/// Outcome of a delete. A delete that matched no row is logged and kept:
/// both stores now agree the record is gone.
pub fn settle_delete(
    persisted: Result<bool, sqlx::Error>,
    entity: &'static str,
    id: impl Display,
    before: Snapshot,
    registry: &Registry<InMemoryRepository>,
) -> Result<(), AppError> {
    match persisted {
        Ok(true) => Ok(()),
        Ok(false) => {
            tracing::warn!(entity, id = %id, "deleted record had no database row");
            Ok(())
        }
        Err(e) => settle(Err(e), entity, id, before, registry),
    }
}
