use async_trait::async_trait;

use crate::error::CatalogResult;
use crate::models::{
    CatalogCounts, CatalogPrice, CatalogType, CloudProvider, Location, PriceFilter, PriceTerm,
    ResourceKind,
};
use crate::snapshot::CatalogSnapshot;

/// The exact set of rows an update run wants persisted.
///
/// Only touched-and-changed rows appear in the upsert lists, so a re-import
/// with identical data produces an empty set (no spurious writes). The
/// retired code lists name rows to delete.
#[derive(Debug, Clone, Default)]
pub struct CommitSet {
    pub locations: Vec<Location>,
    pub terms: Vec<PriceTerm>,
    pub types: Vec<CatalogType>,
    pub prices: Vec<CatalogPrice>,
    pub retired_price_codes: Vec<String>,
    pub retired_type_codes: Vec<(ResourceKind, String)>,
}

impl CommitSet {
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
            && self.terms.is_empty()
            && self.types.is_empty()
            && self.prices.is_empty()
            && self.retired_price_codes.is_empty()
            && self.retired_type_codes.is_empty()
    }
}

/// Repository trait for catalog persistence.
///
/// Implementations must apply [`CommitSet`]s atomically: a failed commit
/// leaves the previously committed catalog untouched, and a concurrent
/// reader never observes a partially applied set.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Load the committed catalog of one provider as a read-only snapshot.
    async fn load_snapshot(&self, provider: CloudProvider) -> CatalogResult<CatalogSnapshot>;

    /// Apply one update run's changes in a single transaction.
    async fn commit(&self, provider: CloudProvider, changes: CommitSet) -> CatalogResult<()>;

    /// Current entity counts for a provider.
    async fn counts(&self, provider: CloudProvider) -> CatalogResult<CatalogCounts>;

    /// List installed prices with optional filters.
    async fn list_prices(&self, filter: PriceFilter) -> CatalogResult<Vec<CatalogPrice>>;

    /// All locations installed for a provider.
    async fn locations(&self, provider: CloudProvider) -> CatalogResult<Vec<Location>>;
}
