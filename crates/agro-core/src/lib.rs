#![deny(missing_docs)]

//! # agro-core — Foundational Types for the Rural Producer Registry
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** [`ProducerId`], [`FarmId`],
//!    [`HarvestId`] and [`CropId`] are distinct types.
//!
//! 2. **A [`Document`] is valid by construction.** CPF/CNPJ checksum
//!    validation happens once, in [`Document::parse`]; the stored value is
//!    the normalized digit string.
//!
//! 3. **One place for the area invariant.** [`LandAreas::validate`] is used
//!    on create and on the effective post-update triple.
//!
//! 4. **[`DomainError`] hierarchy.** Structured errors with `thiserror`, one
//!    variant per caller-correctable condition.

pub mod document;
pub mod domain;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use document::{Document, DocumentKind};
pub use domain::{
    Crop, CropType, Farm, FarmPatch, Harvest, LandAreas, NewCrop, NewFarm, NewHarvest,
    NewProducer, Producer, ProducerPatch,
};
pub use error::{DomainError, EntityKind, ValidationError};
pub use identity::{CropId, FarmId, HarvestId, ProducerId};
pub use temporal::{Clock, ManualClock, SystemClock};
