//! Catalog Domain
//!
//! This module provides a complete domain implementation for the installed
//! cloud price catalog: locations, terms, resource types and prices, plus the
//! update/merge engine that reconciles freshly fetched provider data against
//! the previously installed state.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Service   │  ← Update orchestration, status, per-provider locking
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │UpdateContext│  ← Merge engine (discover / update-if-needed / retire)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + Postgres + in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, enums
//! └─────────────┘
//! ```

pub mod entity;
pub mod error;
pub mod filters;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod rating;
pub mod repository;
pub mod service;
pub mod snapshot;
pub mod update;

// Re-export commonly used types
pub use error::{CatalogError, CatalogResult};
pub use filters::EnablementFilters;
pub use memory::InMemoryCatalogRepository;
pub use models::{
    CatalogCounts, CatalogPrice, CatalogType, CloudProvider, FetchedOffer, HOURS_PER_MONTH,
    Location, PriceFilter, PriceTerm, Rating, ResourceKind,
};
pub use postgres::PgCatalogRepository;
pub use rating::{RateClassifier, RateTable};
pub use repository::{CatalogRepository, CommitSet};
pub use service::{CatalogService, UpdatePhase, UpdateStatus};
pub use snapshot::CatalogSnapshot;
pub use update::{MergeOutcome, MergeSummary, OfferDisposition, UpdateContext};
