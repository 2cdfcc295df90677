//! # Error Hierarchy
//!
//! Structured error types for the registry, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! [`DomainError`] is what every service operation returns. Each variant is a
//! distinct, caller-correctable condition: none of them is transient, so
//! nothing here is ever retried. [`ValidationError`] covers construction of
//! value types (documents, crop types) and folds into [`DomainError`].

use thiserror::Error;
use uuid::Uuid;

use crate::identity::{FarmId, HarvestId, ProducerId};

/// The kind of record an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A rural producer.
    Producer,
    /// A farm owned by a producer.
    Farm,
    /// A harvest recorded on a farm.
    Harvest,
    /// A crop planted within a harvest.
    Crop,
}

impl EntityKind {
    /// Return the lowercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Producer => "producer",
            Self::Farm => "farm",
            Self::Harvest => "harvest",
            Self::Crop => "crop",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a domain service operation.
///
/// Every invariant check runs before any write is committed, so receiving
/// one of these means the dataset is exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The document fails the CPF/CNPJ length or checksum rules.
    #[error("invalid document: \"{0}\" (expected a valid CPF or CNPJ)")]
    InvalidDocument(String),

    /// Another producer already holds this document.
    #[error("a producer with document {0} already exists")]
    DuplicateDocument(String),

    /// The addressed record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of the missing record.
        entity: EntityKind,
        /// Identifier that failed to resolve.
        id: Uuid,
    },

    /// A farm referenced a producer that does not exist.
    #[error("producer {0} not found")]
    ProducerNotFound(ProducerId),

    /// A harvest referenced a farm that does not exist.
    #[error("farm {0} not found")]
    FarmNotFound(FarmId),

    /// A crop referenced a harvest that does not exist.
    #[error("harvest {0} not found")]
    HarvestNotFound(HarvestId),

    /// Agricultural plus vegetation area exceeds the farm's total area.
    #[error(
        "agricultural area ({agricultural} ha) plus vegetation area ({vegetation} ha) exceeds total area ({total} ha)"
    )]
    AreaInvariantViolation {
        /// Effective agricultural area.
        agricultural: f64,
        /// Effective vegetation area.
        vegetation: f64,
        /// Effective total area.
        total: f64,
    },

    /// An area value is out of range (non-positive planted or total area,
    /// negative land use, or not a finite number).
    #[error("invalid area: {0}")]
    InvalidArea(String),

    /// A required text field is empty.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl DomainError {
    /// Shorthand for [`DomainError::NotFound`].
    pub fn not_found(entity: EntityKind, id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDocument(_) => "INVALID_DOCUMENT",
            Self::DuplicateDocument(_) => "DUPLICATE_DOCUMENT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ProducerNotFound(_) => "PRODUCER_NOT_FOUND",
            Self::FarmNotFound(_) => "FARM_NOT_FOUND",
            Self::HarvestNotFound(_) => "HARVEST_NOT_FOUND",
            Self::AreaInvariantViolation { .. } => "AREA_INVARIANT_VIOLATION",
            Self::InvalidArea(_) => "INVALID_AREA",
            Self::InvalidField { .. } => "INVALID_FIELD",
        }
    }
}

/// Validation errors for value types.
///
/// These carry the rejected input so operators can see what was sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The string is not a valid CPF (11 digits) or CNPJ (14 digits).
    #[error("invalid document: \"{0}\" (expected a valid CPF or CNPJ)")]
    InvalidDocument(String),

    /// The crop type is not one of the supported cultures.
    #[error(
        "unknown crop type: \"{0}\" (expected SOY, CORN, COTTON, COFFEE or SUGARCANE)"
    )]
    UnknownCropType(String),

    /// A required text field is empty after trimming.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidDocument(raw) => Self::InvalidDocument(raw),
            ValidationError::EmptyField(field) => Self::InvalidField {
                field,
                reason: "must not be empty".to_string(),
            },
            ValidationError::UnknownCropType(raw) => Self::InvalidField {
                field: "crop_type",
                reason: format!("unknown crop type \"{raw}\""),
            },
        }
    }
}
