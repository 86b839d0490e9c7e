use serde::{Deserialize, Serialize};

use crate::models::{
    CatalogCounts, CatalogPrice, CatalogType, CloudProvider, Location, PriceTerm, ResourceKind,
};

/// A committed, read-only view of one provider's catalog.
///
/// Snapshots are loaded from the repository after an update run has
/// committed; lookups only ever see fully committed state, never a
/// mid-merge intermediate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub provider: CloudProvider,
    pub locations: Vec<Location>,
    pub terms: Vec<PriceTerm>,
    pub types: Vec<CatalogType>,
    pub prices: Vec<CatalogPrice>,
}

impl CatalogSnapshot {
    pub fn empty(provider: CloudProvider) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    pub fn location_by_code(&self, code: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.code == code)
    }

    /// Resolve a location by code first, then by human name (the alias map
    /// built during import is persisted as the location names).
    pub fn resolve_location(&self, name_or_code: &str) -> Option<&Location> {
        self.location_by_code(name_or_code)
            .or_else(|| self.locations.iter().find(|l| l.name == name_or_code))
    }

    /// The provider's preferred location, if one is flagged.
    pub fn preferred_location(&self) -> Option<&Location> {
        self.locations.iter().find(|l| l.preferred)
    }

    pub fn term_by_code(&self, code: &str) -> Option<&PriceTerm> {
        self.terms.iter().find(|t| t.code == code)
    }

    pub fn type_by_code(&self, kind: ResourceKind, code: &str) -> Option<&CatalogType> {
        self.types.iter().find(|t| t.kind == kind && t.code == code)
    }

    pub fn types_of(&self, kind: ResourceKind) -> impl Iterator<Item = &CatalogType> {
        self.types.iter().filter(move |t| t.kind == kind)
    }

    /// All price rows for a (kind, type, term, location) triple; discriminator
    /// filtering is left to the caller.
    pub fn prices_for<'a>(
        &'a self,
        kind: ResourceKind,
        type_code: &'a str,
        term_code: &'a str,
        location_code: &'a str,
    ) -> impl Iterator<Item = &'a CatalogPrice> {
        self.prices.iter().filter(move |p| {
            p.kind == kind
                && p.type_code == type_code
                && p.term_code == term_code
                && p.location_code == location_code
        })
    }

    pub fn counts(&self) -> CatalogCounts {
        CatalogCounts {
            prices: self.prices.len() as i64,
            types: self.types.len() as i64,
            locations: self.locations.len() as i64,
            storage_types: self
                .types
                .iter()
                .filter(|t| t.kind == ResourceKind::Storage)
                .count() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn location(code: &str, name: &str, preferred: bool) -> Location {
        Location {
            id: Uuid::now_v7(),
            provider: CloudProvider::Aws,
            code: code.to_string(),
            name: name.to_string(),
            continent: "NA".to_string(),
            preferred,
        }
    }

    #[test]
    fn test_resolve_location_by_code_then_name() {
        let snapshot = CatalogSnapshot {
            provider: CloudProvider::Aws,
            locations: vec![
                location("us-east-1", "US East (N. Virginia)", true),
                location("eu-west-1", "EU (Ireland)", false),
            ],
            ..Default::default()
        };

        assert_eq!(
            snapshot.resolve_location("eu-west-1").unwrap().code,
            "eu-west-1"
        );
        assert_eq!(
            snapshot.resolve_location("EU (Ireland)").unwrap().code,
            "eu-west-1"
        );
        assert!(snapshot.resolve_location("mars-north-1").is_none());
        assert_eq!(snapshot.preferred_location().unwrap().code, "us-east-1");
    }
}
