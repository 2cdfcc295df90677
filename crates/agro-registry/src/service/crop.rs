use agro_core::domain::validate_planted_area;
use agro_core::{Clock, Crop, CropId, CropType, DomainError, EntityKind, HarvestId, NewCrop};

use crate::repository::{ReadUnit, Repository, UnitOfWork};

/// Crop operations.
#[derive(Debug)]
pub struct CropService<'a, R> {
    repo: &'a R,
    clock: &'a dyn Clock,
}

impl<'a, R: Repository> CropService<'a, R> {
    pub(crate) fn new(repo: &'a R, clock: &'a dyn Clock) -> Self {
        Self { repo, clock }
    }

    /// Record a planted crop within an existing harvest.
    ///
    /// # Errors
    ///
    /// [`DomainError::HarvestNotFound`] if the harvest does not exist,
    /// [`DomainError::InvalidArea`] if the planted area is not positive.
    pub fn create(&self, new: NewCrop) -> Result<Crop, DomainError> {
        let crop = self.repo.transact(|unit| {
            if unit.harvest(new.harvest_id).is_none() {
                return Err(DomainError::HarvestNotFound(new.harvest_id));
            }
            validate_planted_area(new.planted_area)?;
            let crop = Crop {
                id: CropId::new(),
                harvest_id: new.harvest_id,
                crop_type: new.crop_type,
                planted_area: new.planted_area,
                created_at: self.clock.now(),
            };
            unit.put_crop(crop.clone());
            Ok(crop)
        })?;

        tracing::info!(
            crop_id = %crop.id,
            harvest_id = %crop.harvest_id,
            crop_type = %crop.crop_type,
            planted_area = crop.planted_area,
            "crop recorded"
        );
        Ok(crop)
    }

    /// Fetch a crop.
    pub fn get(&self, id: CropId) -> Result<Crop, DomainError> {
        self.repo
            .read(|unit| unit.crop(id))
            .ok_or_else(|| DomainError::not_found(EntityKind::Crop, id))
    }

    /// All crops, oldest first.
    pub fn list_all(&self) -> Vec<Crop> {
        self.repo.read(|unit| unit.crops())
    }

    /// Crops planted within `harvest_id`.
    pub fn list_by_harvest(&self, harvest_id: HarvestId) -> Vec<Crop> {
        self.repo.read(|unit| unit.crops_by_harvest(harvest_id))
    }

    /// Crops of one culture.
    pub fn list_by_type(&self, crop_type: CropType) -> Vec<Crop> {
        self.repo.read(|unit| unit.crops_by_type(crop_type))
    }

    /// Delete a crop.
    pub fn delete(&self, id: CropId) -> Result<(), DomainError> {
        self.repo.transact(|unit| {
            unit.remove_crop(id)
                .map(|_| ())
                .ok_or_else(|| DomainError::not_found(EntityKind::Crop, id))
        })?;

        tracing::info!(crop_id = %id, "crop deleted");
        Ok(())
    }
}
