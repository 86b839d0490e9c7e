//! Offer sources
//!
//! A source delivers one provider's freshly fetched price data as neutral
//! [`FetchedOffer`] rows. Provider-native formats are parsed upstream of
//! this binary; the shipped sources speak the neutral JSON offer sheet
//! directly, or serve a built-in demo sheet.

pub mod demo;
pub mod http;

use async_trait::async_trait;
use domain_catalog::{CloudProvider, FetchedOffer, ResourceKind};
use thiserror::Error;

pub use demo::DemoOfferSource;
pub use http::HttpOfferSource;

/// Error type for offer source operations
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse offer sheet: {0}")]
    Parse(String),

    #[error("Source not configured: {0}")]
    NotConfigured(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Trait for provider offer sources
#[async_trait]
pub trait OfferSource: Send + Sync {
    /// Get the cloud provider this source feeds
    fn provider(&self) -> CloudProvider;

    /// Get the source name
    fn name(&self) -> &'static str;

    /// Check if the source is configured and ready
    fn is_configured(&self) -> bool;

    /// Fetch offers, restricted to the given kinds and regions when
    /// non-empty
    async fn fetch_offers(
        &self,
        kinds: &[ResourceKind],
        regions: &[String],
    ) -> SourceResult<Vec<FetchedOffer>>;

    /// Health check - verify the source is reachable
    async fn health_check(&self) -> SourceResult<bool>;

    /// Regions this source can report on
    fn supported_regions(&self) -> Vec<String>;
}

/// Restrict a fetched sheet to requested kinds and regions.
pub fn filter_offers(
    offers: Vec<FetchedOffer>,
    kinds: &[ResourceKind],
    regions: &[String],
) -> Vec<FetchedOffer> {
    offers
        .into_iter()
        .filter(|offer| kinds.is_empty() || kinds.contains(&offer.kind))
        .filter(|offer| regions.is_empty() || regions.iter().any(|r| *r == offer.region))
        .collect()
}

/// Registry of all offer sources
pub struct SourceRegistry {
    sources: Vec<Box<dyn OfferSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register(&mut self, source: Box<dyn OfferSource>) {
        self.sources.push(source);
    }

    pub fn get_source(&self, provider: CloudProvider) -> Option<&dyn OfferSource> {
        self.sources
            .iter()
            .find(|s| s.provider() == provider)
            .map(|s| s.as_ref())
    }

    pub fn get_configured_sources(&self) -> Vec<&dyn OfferSource> {
        self.sources
            .iter()
            .filter(|s| s.is_configured())
            .map(|s| s.as_ref())
            .collect()
    }

    pub fn all_sources(&self) -> &[Box<dyn OfferSource>] {
        &self.sources
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(kind: ResourceKind, region: &str) -> FetchedOffer {
        FetchedOffer {
            kind,
            type_code: "t3.micro".to_string(),
            type_name: "t3.micro".to_string(),
            term_code: "od".to_string(),
            region: region.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_offers_by_kind_and_region() {
        let offers = vec![
            offer(ResourceKind::Instance, "us-east-1"),
            offer(ResourceKind::Storage, "us-east-1"),
            offer(ResourceKind::Instance, "eu-west-1"),
        ];

        let filtered = filter_offers(
            offers.clone(),
            &[ResourceKind::Instance],
            &["us-east-1".to_string()],
        );
        assert_eq!(filtered.len(), 1);

        // Empty filters pass everything through
        assert_eq!(filter_offers(offers, &[], &[]).len(), 3);
    }
}
