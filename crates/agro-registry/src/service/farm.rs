use agro_core::domain::{required_text, state_code};
use agro_core::{Clock, DomainError, EntityKind, Farm, FarmId, FarmPatch, NewFarm, ProducerId};

use super::cascade::{remove_farm_tree, CascadeReport};
use crate::repository::{ReadUnit, Repository, UnitOfWork};

/// Farm operations.
#[derive(Debug)]
pub struct FarmService<'a, R> {
    repo: &'a R,
    clock: &'a dyn Clock,
}

impl<'a, R: Repository> FarmService<'a, R> {
    pub(crate) fn new(repo: &'a R, clock: &'a dyn Clock) -> Self {
        Self { repo, clock }
    }

    /// Register a farm under an existing producer.
    ///
    /// # Errors
    ///
    /// - [`DomainError::ProducerNotFound`] if the owner does not exist.
    /// - [`DomainError::InvalidField`] for a blank name, city or state.
    /// - [`DomainError::InvalidArea`] / [`DomainError::AreaInvariantViolation`]
    ///   if the area triple is out of range or over-allocated.
    pub fn create(&self, new: NewFarm) -> Result<Farm, DomainError> {
        let farm = self.repo.transact(|unit| {
            if unit.producer(new.producer_id).is_none() {
                return Err(DomainError::ProducerNotFound(new.producer_id));
            }
            let name = required_text("name", &new.name)?;
            let city = required_text("city", &new.city)?;
            let state = state_code(&new.state)?;
            new.areas().validate()?;

            let now = self.clock.now();
            let farm = Farm {
                id: FarmId::new(),
                producer_id: new.producer_id,
                name,
                city,
                state,
                total_area: new.total_area,
                agricultural_area: new.agricultural_area,
                vegetation_area: new.vegetation_area,
                created_at: now,
                updated_at: now,
            };
            unit.put_farm(farm.clone());
            Ok(farm)
        })?;

        tracing::info!(
            farm_id = %farm.id,
            producer_id = %farm.producer_id,
            state = %farm.state,
            total_area = farm.total_area,
            "farm registered"
        );
        Ok(farm)
    }

    /// Fetch a farm.
    pub fn get(&self, id: FarmId) -> Result<Farm, DomainError> {
        self.repo
            .read(|unit| unit.farm(id))
            .ok_or_else(|| DomainError::not_found(EntityKind::Farm, id))
    }

    /// All farms, oldest first.
    pub fn list_all(&self) -> Vec<Farm> {
        self.repo.read(|unit| unit.farms())
    }

    /// Farms owned by `producer_id`. Empty for an unknown producer.
    pub fn list_by_producer(&self, producer_id: ProducerId) -> Vec<Farm> {
        self.repo.read(|unit| unit.farms_by_producer(producer_id))
    }

    /// Apply a partial update.
    ///
    /// The area invariant is checked against the effective triple: patched
    /// values overlaid on the current ones. An empty patch returns the
    /// record unchanged.
    pub fn update(&self, id: FarmId, patch: FarmPatch) -> Result<Farm, DomainError> {
        let farm = self.repo.transact(|unit| -> Result<Farm, DomainError> {
            let mut farm = unit
                .farm(id)
                .ok_or_else(|| DomainError::not_found(EntityKind::Farm, id))?;
            if patch == FarmPatch::default() {
                return Ok(farm);
            }

            if let Some(name) = &patch.name {
                farm.name = required_text("name", name)?;
            }
            if let Some(city) = &patch.city {
                farm.city = required_text("city", city)?;
            }
            if let Some(state) = &patch.state {
                farm.state = state_code(state)?;
            }

            let areas = farm.areas().overlay(&patch);
            areas.validate()?;
            farm.total_area = areas.total;
            farm.agricultural_area = areas.agricultural;
            farm.vegetation_area = areas.vegetation;
            farm.updated_at = self.clock.now();

            unit.put_farm(farm.clone());
            Ok(farm)
        })?;

        tracing::info!(farm_id = %id, "farm updated");
        Ok(farm)
    }

    /// Delete a farm together with its harvests and crops.
    pub fn delete(&self, id: FarmId) -> Result<CascadeReport, DomainError> {
        let report = self.repo.transact(|unit| {
            if unit.farm(id).is_none() {
                return Err(DomainError::not_found(EntityKind::Farm, id));
            }
            Ok(remove_farm_tree(unit, id))
        })?;

        tracing::info!(
            farm_id = %id,
            harvests = report.harvests,
            crops = report.crops,
            "farm deleted"
        );
        Ok(report)
    }
}
