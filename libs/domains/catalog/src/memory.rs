use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::CatalogResult;
use crate::models::{
    CatalogCounts, CatalogPrice, CatalogType, CloudProvider, Location, PriceFilter, PriceTerm,
    ResourceKind,
};
use crate::repository::{CatalogRepository, CommitSet};
use crate::snapshot::CatalogSnapshot;

/// In-memory implementation of [`CatalogRepository`].
///
/// Backs tests and demo runs without a database. Commits swap state under a
/// single write lock, which makes the all-or-nothing guarantee trivial.
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    inner: RwLock<Store>,
}

#[derive(Default)]
struct Store {
    terms: HashMap<String, PriceTerm>,
    providers: HashMap<CloudProvider, ProviderCatalog>,
}

#[derive(Default)]
struct ProviderCatalog {
    locations: HashMap<String, Location>,
    types: HashMap<(ResourceKind, String), CatalogType>,
    prices: HashMap<String, CatalogPrice>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a committed snapshot, replacing the provider's catalog.
    pub fn seed(&self, snapshot: CatalogSnapshot) {
        let mut store = self.inner.write().expect("catalog store lock poisoned");
        for term in &snapshot.terms {
            store.terms.insert(term.code.clone(), term.clone());
        }
        let catalog = store.providers.entry(snapshot.provider).or_default();
        catalog.locations = snapshot
            .locations
            .into_iter()
            .map(|l| (l.code.clone(), l))
            .collect();
        catalog.types = snapshot
            .types
            .into_iter()
            .map(|t| ((t.kind, t.code.clone()), t))
            .collect();
        catalog.prices = snapshot
            .prices
            .into_iter()
            .map(|p| (p.code.clone(), p))
            .collect();
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn load_snapshot(&self, provider: CloudProvider) -> CatalogResult<CatalogSnapshot> {
        let store = self.inner.read().expect("catalog store lock poisoned");
        let mut snapshot = CatalogSnapshot::empty(provider);
        snapshot.terms = store.terms.values().cloned().collect();
        snapshot.terms.sort_by(|a, b| a.code.cmp(&b.code));

        if let Some(catalog) = store.providers.get(&provider) {
            snapshot.locations = catalog.locations.values().cloned().collect();
            snapshot.locations.sort_by(|a, b| a.code.cmp(&b.code));
            snapshot.types = catalog.types.values().cloned().collect();
            snapshot.types.sort_by(|a, b| a.code.cmp(&b.code));
            snapshot.prices = catalog.prices.values().cloned().collect();
            snapshot.prices.sort_by(|a, b| a.code.cmp(&b.code));
        }
        Ok(snapshot)
    }

    async fn commit(&self, provider: CloudProvider, changes: CommitSet) -> CatalogResult<()> {
        let mut store = self.inner.write().expect("catalog store lock poisoned");

        for term in changes.terms {
            store.terms.insert(term.code.clone(), term);
        }

        let catalog = store.providers.entry(provider).or_default();

        for code in &changes.retired_price_codes {
            catalog.prices.remove(code);
        }
        for key in &changes.retired_type_codes {
            catalog.types.remove(key);
        }
        for location in changes.locations {
            catalog.locations.insert(location.code.clone(), location);
        }
        for ty in changes.types {
            catalog.types.insert((ty.kind, ty.code.clone()), ty);
        }
        for price in changes.prices {
            catalog.prices.insert(price.code.clone(), price);
        }
        Ok(())
    }

    async fn counts(&self, provider: CloudProvider) -> CatalogResult<CatalogCounts> {
        let store = self.inner.read().expect("catalog store lock poisoned");
        let Some(catalog) = store.providers.get(&provider) else {
            return Ok(CatalogCounts {
                prices: 0,
                types: 0,
                locations: 0,
                storage_types: 0,
            });
        };

        Ok(CatalogCounts {
            prices: catalog.prices.len() as i64,
            types: catalog.types.len() as i64,
            locations: catalog.locations.len() as i64,
            storage_types: catalog
                .types
                .keys()
                .filter(|(kind, _)| *kind == ResourceKind::Storage)
                .count() as i64,
        })
    }

    async fn list_prices(&self, filter: PriceFilter) -> CatalogResult<Vec<CatalogPrice>> {
        let store = self.inner.read().expect("catalog store lock poisoned");

        let mut results: Vec<CatalogPrice> = store
            .providers
            .iter()
            .filter(|(provider, _)| filter.provider.is_none_or(|p| p == **provider))
            .flat_map(|(_, catalog)| catalog.prices.values())
            .filter(|p| filter.kind.is_none_or(|k| k == p.kind))
            .filter(|p| {
                filter
                    .type_code
                    .as_ref()
                    .is_none_or(|c| *c == p.type_code)
            })
            .filter(|p| {
                filter
                    .term_code
                    .as_ref()
                    .is_none_or(|c| *c == p.term_code)
            })
            .filter(|p| {
                filter
                    .location_code
                    .as_ref()
                    .is_none_or(|c| *c == p.location_code)
            })
            .cloned()
            .collect();

        results.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(results
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect())
    }

    async fn locations(&self, provider: CloudProvider) -> CatalogResult<Vec<Location>> {
        let store = self.inner.read().expect("catalog store lock poisoned");
        let mut results: Vec<Location> = store
            .providers
            .get(&provider)
            .map(|c| c.locations.values().cloned().collect())
            .unwrap_or_default();
        results.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(results)
    }
}
