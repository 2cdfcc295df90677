//! # agro-registry — Producer Registry Engine
//!
//! Domain services and dashboard analytics for the rural producer
//! registry, written against an abstract [`Repository`].
//!
//! ## Modules
//!
//! - [`repository`] — the read/write traits a store must implement.
//! - [`memory`] — [`InMemoryRepository`], the transactional in-process store.
//! - [`service`] — [`Registry`] and the per-record services, including
//!   invariant checks and cascade deletes.
//! - [`analytics`] — summary, by-state, by-crop and land-use aggregations.
//!
//! ## Crate Policy
//!
//! - Depends only on `agro-core` for domain types.
//! - No I/O. Transport and persistence adapters live in `agro-api`.
//! - Every mutation is validated before anything is written; a failed
//!   call leaves the dataset unchanged.

#![deny(missing_docs)]

pub mod analytics;
pub mod memory;
pub mod repository;
pub mod service;

pub use analytics::{Analytics, CropShare, DashboardSummary, LandUse, StateShare};
pub use memory::InMemoryRepository;
pub use repository::{AreaTotals, ReadUnit, RecordCounts, Repository, UnitOfWork};
pub use service::{
    CascadeReport, CropService, FarmService, HarvestService, ProducerService, Registry,
};
