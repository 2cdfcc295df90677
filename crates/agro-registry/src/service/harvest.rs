use agro_core::domain::required_text;
use agro_core::{Clock, DomainError, EntityKind, FarmId, Harvest, HarvestId, NewHarvest};

use super::cascade::{remove_harvest_tree, CascadeReport};
use crate::repository::{ReadUnit, Repository, UnitOfWork};

/// Harvest operations.
#[derive(Debug)]
pub struct HarvestService<'a, R> {
    repo: &'a R,
    clock: &'a dyn Clock,
}

impl<'a, R: Repository> HarvestService<'a, R> {
    pub(crate) fn new(repo: &'a R, clock: &'a dyn Clock) -> Self {
        Self { repo, clock }
    }

    /// Record a harvest on an existing farm.
    ///
    /// # Errors
    ///
    /// [`DomainError::FarmNotFound`] if the farm does not exist,
    /// [`DomainError::InvalidField`] for a blank description.
    pub fn create(&self, new: NewHarvest) -> Result<Harvest, DomainError> {
        let harvest = self.repo.transact(|unit| {
            if unit.farm(new.farm_id).is_none() {
                return Err(DomainError::FarmNotFound(new.farm_id));
            }
            let harvest = Harvest {
                id: HarvestId::new(),
                farm_id: new.farm_id,
                year: new.year,
                description: required_text("description", &new.description)?,
                created_at: self.clock.now(),
            };
            unit.put_harvest(harvest.clone());
            Ok(harvest)
        })?;

        tracing::info!(
            harvest_id = %harvest.id,
            farm_id = %harvest.farm_id,
            year = harvest.year,
            "harvest recorded"
        );
        Ok(harvest)
    }

    /// Fetch a harvest.
    pub fn get(&self, id: HarvestId) -> Result<Harvest, DomainError> {
        self.repo
            .read(|unit| unit.harvest(id))
            .ok_or_else(|| DomainError::not_found(EntityKind::Harvest, id))
    }

    /// All harvests, oldest first.
    pub fn list_all(&self) -> Vec<Harvest> {
        self.repo.read(|unit| unit.harvests())
    }

    /// Harvests recorded on `farm_id`.
    pub fn list_by_farm(&self, farm_id: FarmId) -> Vec<Harvest> {
        self.repo.read(|unit| unit.harvests_by_farm(farm_id))
    }

    /// Delete a harvest together with its crops.
    pub fn delete(&self, id: HarvestId) -> Result<CascadeReport, DomainError> {
        let report = self.repo.transact(|unit| {
            if unit.harvest(id).is_none() {
                return Err(DomainError::not_found(EntityKind::Harvest, id));
            }
            Ok(remove_harvest_tree(unit, id))
        })?;

        tracing::info!(harvest_id = %id, crops = report.crops, "harvest deleted");
        Ok(report)
    }
}
