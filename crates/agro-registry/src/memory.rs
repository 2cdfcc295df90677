//! # In-Memory Repository
//!
//! [`InMemoryRepository`] is a cloneable handle over four hash tables behind
//! one `parking_lot::RwLock`. Reads share the lock; a transaction holds the
//! write lock for its whole duration.
//!
//! ## Atomicity
//!
//! Every `put_*` / `remove_*` made inside [`Repository::transact`] records
//! the previous value of the touched row in an undo journal. When the
//! closure returns `Err` (or panics), the journal is replayed in reverse and
//! the tables end up exactly as they were before the transaction started.
//!
//! ## Document uniqueness
//!
//! The producer service checks `producer_by_document` and inserts inside the
//! same transaction, so two concurrent creations with the same document are
//! serialized by the write lock and the second one sees the first.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockWriteGuard};
use uuid::Uuid;

use agro_core::{
    Crop, CropId, CropType, Document, Farm, FarmId, Harvest, HarvestId, Producer, ProducerId,
};

use crate::repository::{ReadUnit, RecordCounts, Repository, UnitOfWork};

/// Undo record: the row's value before the mutation (`None` if it did not
/// exist).
#[derive(Debug)]
enum Undo {
    Producer(ProducerId, Option<Producer>),
    Farm(FarmId, Option<Farm>),
    Harvest(HarvestId, Option<Harvest>),
    Crop(CropId, Option<Crop>),
}

/// Creation-order key shared by all record kinds.
trait Chronological: Clone {
    fn order_key(&self) -> (DateTime<Utc>, Uuid);
}

impl Chronological for Producer {
    fn order_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.created_at, *self.id.as_uuid())
    }
}

impl Chronological for Farm {
    fn order_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.created_at, *self.id.as_uuid())
    }
}

impl Chronological for Harvest {
    fn order_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.created_at, *self.id.as_uuid())
    }
}

impl Chronological for Crop {
    fn order_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.created_at, *self.id.as_uuid())
    }
}

fn ordered<'a, T: Chronological + 'a>(rows: impl Iterator<Item = &'a T>) -> Vec<T> {
    let mut out: Vec<T> = rows.cloned().collect();
    out.sort_by_key(Chronological::order_key);
    out
}

/// The tables behind an [`InMemoryRepository`].
#[derive(Debug, Default)]
pub struct Tables {
    producers: HashMap<ProducerId, Producer>,
    farms: HashMap<FarmId, Farm>,
    harvests: HashMap<HarvestId, Harvest>,
    crops: HashMap<CropId, Crop>,
    journal: Vec<Undo>,
}

impl Tables {
    fn rollback(&mut self) {
        while let Some(undo) = self.journal.pop() {
            match undo {
                Undo::Producer(id, Some(row)) => {
                    self.producers.insert(id, row);
                }
                Undo::Producer(id, None) => {
                    self.producers.remove(&id);
                }
                Undo::Farm(id, Some(row)) => {
                    self.farms.insert(id, row);
                }
                Undo::Farm(id, None) => {
                    self.farms.remove(&id);
                }
                Undo::Harvest(id, Some(row)) => {
                    self.harvests.insert(id, row);
                }
                Undo::Harvest(id, None) => {
                    self.harvests.remove(&id);
                }
                Undo::Crop(id, Some(row)) => {
                    self.crops.insert(id, row);
                }
                Undo::Crop(id, None) => {
                    self.crops.remove(&id);
                }
            }
        }
    }
}

impl ReadUnit for Tables {
    fn producer(&self, id: ProducerId) -> Option<Producer> {
        self.producers.get(&id).cloned()
    }

    fn producers(&self) -> Vec<Producer> {
        ordered(self.producers.values())
    }

    fn producer_by_document(&self, document: &Document) -> Option<Producer> {
        self.producers
            .values()
            .find(|p| &p.document == document)
            .cloned()
    }

    fn farm(&self, id: FarmId) -> Option<Farm> {
        self.farms.get(&id).cloned()
    }

    fn farms(&self) -> Vec<Farm> {
        ordered(self.farms.values())
    }

    fn farms_by_producer(&self, producer_id: ProducerId) -> Vec<Farm> {
        ordered(self.farms.values().filter(|f| f.producer_id == producer_id))
    }

    fn harvest(&self, id: HarvestId) -> Option<Harvest> {
        self.harvests.get(&id).cloned()
    }

    fn harvests(&self) -> Vec<Harvest> {
        ordered(self.harvests.values())
    }

    fn harvests_by_farm(&self, farm_id: FarmId) -> Vec<Harvest> {
        ordered(self.harvests.values().filter(|h| h.farm_id == farm_id))
    }

    fn crop(&self, id: CropId) -> Option<Crop> {
        self.crops.get(&id).cloned()
    }

    fn crops(&self) -> Vec<Crop> {
        ordered(self.crops.values())
    }

    fn crops_by_harvest(&self, harvest_id: HarvestId) -> Vec<Crop> {
        ordered(self.crops.values().filter(|c| c.harvest_id == harvest_id))
    }

    fn crops_by_type(&self, crop_type: CropType) -> Vec<Crop> {
        ordered(self.crops.values().filter(|c| c.crop_type == crop_type))
    }

    fn counts(&self) -> RecordCounts {
        RecordCounts {
            producers: self.producers.len(),
            farms: self.farms.len(),
            harvests: self.harvests.len(),
            crops: self.crops.len(),
        }
    }
}

impl UnitOfWork for Tables {
    fn put_producer(&mut self, producer: Producer) {
        let id = producer.id;
        let previous = self.producers.insert(id, producer);
        self.journal.push(Undo::Producer(id, previous));
    }

    fn remove_producer(&mut self, id: ProducerId) -> Option<Producer> {
        let removed = self.producers.remove(&id);
        if removed.is_some() {
            self.journal.push(Undo::Producer(id, removed.clone()));
        }
        removed
    }

    fn put_farm(&mut self, farm: Farm) {
        let id = farm.id;
        let previous = self.farms.insert(id, farm);
        self.journal.push(Undo::Farm(id, previous));
    }

    fn remove_farm(&mut self, id: FarmId) -> Option<Farm> {
        let removed = self.farms.remove(&id);
        if removed.is_some() {
            self.journal.push(Undo::Farm(id, removed.clone()));
        }
        removed
    }

    fn put_harvest(&mut self, harvest: Harvest) {
        let id = harvest.id;
        let previous = self.harvests.insert(id, harvest);
        self.journal.push(Undo::Harvest(id, previous));
    }

    fn remove_harvest(&mut self, id: HarvestId) -> Option<Harvest> {
        let removed = self.harvests.remove(&id);
        if removed.is_some() {
            self.journal.push(Undo::Harvest(id, removed.clone()));
        }
        removed
    }

    fn put_crop(&mut self, crop: Crop) {
        let id = crop.id;
        let previous = self.crops.insert(id, crop);
        self.journal.push(Undo::Crop(id, previous));
    }

    fn remove_crop(&mut self, id: CropId) -> Option<Crop> {
        let removed = self.crops.remove(&id);
        if removed.is_some() {
            self.journal.push(Undo::Crop(id, removed.clone()));
        }
        removed
    }
}

/// Holds the write lock for one transaction. Rolls back on drop unless
/// committed, so a panicking closure leaves no partial write behind.
struct Transaction<'a> {
    tables: RwLockWriteGuard<'a, Tables>,
    committed: bool,
}

impl Transaction<'_> {
    fn commit(mut self) {
        self.tables.journal.clear();
        self.committed = true;
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.tables.rollback();
        }
    }
}

/// Thread-safe in-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRepository {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repository for InMemoryRepository {
    type Unit = Tables;

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        f(&*self.tables.read())
    }

    fn transact<T, E>(&self, f: impl FnOnce(&mut Tables) -> Result<T, E>) -> Result<T, E> {
        let mut tx = Transaction {
            tables: self.tables.write(),
            committed: false,
        };
        tx.tables.journal.clear();
        let result = f(&mut *tx.tables);
        if result.is_ok() {
            tx.commit();
        }
        result
    }
}
