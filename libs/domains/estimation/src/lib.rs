//! Estimation Domain
//!
//! This module prices resource requests against a committed catalog
//! snapshot and aggregates the results into quotes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ PriceLookupEngine│  ← Generic search; per-kind CostModel formulas
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │   FloatingCost   │  ← [min, max] cost ranges, delta propagation
//! │      Quote       │
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │ Requests, tiers  │  ← DTOs, validation, progressive-band rates
//! └──────────────────┘
//! ```
//!
//! Lookups are read-only over [`domain_catalog::CatalogSnapshot`] values and
//! never observe a catalog mid-merge; a request no catalog entry satisfies
//! is a normal `Ok(None)` outcome, not an error.

pub mod error;
pub mod floating_cost;
pub mod lookup;
pub mod quote;
pub mod request;
pub mod tiered;

// Re-export commonly used types
pub use error::{EstimationError, EstimationResult};
pub use floating_cost::{COST_PRECISION, FloatingCost, round_half_up};
pub use lookup::{PriceLookupEngine, PriceQuote, ProviderProfile};
pub use quote::Quote;
pub use request::{LookupRequest, OptimizationTarget, UsageProfile};
pub use tiered::compute_rates;
