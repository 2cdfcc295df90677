use agro_core::domain::required_text;
use agro_core::{
    Clock, Document, DomainError, EntityKind, NewProducer, Producer, ProducerId, ProducerPatch,
};

use super::cascade::{remove_farm_tree, CascadeReport};
use crate::repository::{ReadUnit, Repository, UnitOfWork};

/// Producer operations.
#[derive(Debug)]
pub struct ProducerService<'a, R> {
    repo: &'a R,
    clock: &'a dyn Clock,
}

impl<'a, R: Repository> ProducerService<'a, R> {
    pub(crate) fn new(repo: &'a R, clock: &'a dyn Clock) -> Self {
        Self { repo, clock }
    }

    /// Register a producer.
    ///
    /// # Errors
    ///
    /// - [`DomainError::InvalidDocument`] if the document is not a valid
    ///   CPF/CNPJ.
    /// - [`DomainError::DuplicateDocument`] if another producer holds it.
    /// - [`DomainError::InvalidField`] if the name is blank.
    pub fn create(&self, new: NewProducer) -> Result<Producer, DomainError> {
        let document = Document::parse(&new.document)?;
        let name = required_text("name", &new.name)?;

        let producer = self.repo.transact(|unit| {
            if unit.producer_by_document(&document).is_some() {
                return Err(DomainError::DuplicateDocument(document.formatted()));
            }
            let now = self.clock.now();
            let producer = Producer {
                id: ProducerId::new(),
                document,
                name,
                created_at: now,
                updated_at: now,
            };
            unit.put_producer(producer.clone());
            Ok(producer)
        })?;

        tracing::info!(
            producer_id = %producer.id,
            kind = %producer.document.kind(),
            "producer registered"
        );
        Ok(producer)
    }

    /// Fetch a producer.
    pub fn get(&self, id: ProducerId) -> Result<Producer, DomainError> {
        self.repo
            .read(|unit| unit.producer(id))
            .ok_or_else(|| DomainError::not_found(EntityKind::Producer, id))
    }

    /// All producers, oldest first.
    pub fn list(&self) -> Vec<Producer> {
        self.repo.read(|unit| unit.producers())
    }

    /// Apply a partial update.
    ///
    /// A new document is re-validated and checked for uniqueness against
    /// other producers only. An empty patch returns the record unchanged
    /// without touching `updated_at`.
    pub fn update(&self, id: ProducerId, patch: ProducerPatch) -> Result<Producer, DomainError> {
        let producer = self.repo.transact(|unit| -> Result<Producer, DomainError> {
            let mut producer = unit
                .producer(id)
                .ok_or_else(|| DomainError::not_found(EntityKind::Producer, id))?;
            if patch.is_empty() {
                return Ok(producer);
            }

            if let Some(raw) = &patch.document {
                let document = Document::parse(raw)?;
                if let Some(holder) = unit.producer_by_document(&document) {
                    if holder.id != id {
                        return Err(DomainError::DuplicateDocument(document.formatted()));
                    }
                }
                producer.document = document;
            }
            if let Some(name) = &patch.name {
                producer.name = required_text("name", name)?;
            }
            producer.updated_at = self.clock.now();

            unit.put_producer(producer.clone());
            Ok(producer)
        })?;

        tracing::info!(producer_id = %id, "producer updated");
        Ok(producer)
    }

    /// Delete a producer together with its farms, harvests and crops.
    pub fn delete(&self, id: ProducerId) -> Result<CascadeReport, DomainError> {
        let report = self.repo.transact(|unit| {
            if unit.producer(id).is_none() {
                return Err(DomainError::not_found(EntityKind::Producer, id));
            }
            let mut report = CascadeReport::default();
            for farm in unit.farms_by_producer(id) {
                report += remove_farm_tree(unit, farm.id);
            }
            unit.remove_producer(id);
            Ok(report)
        })?;

        tracing::info!(
            producer_id = %id,
            farms = report.farms,
            harvests = report.harvests,
            crops = report.crops,
            "producer deleted"
        );
        Ok(report)
    }
}
