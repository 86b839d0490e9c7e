//! Generic HTTP offer source
//!
//! Fetches a neutral JSON offer sheet (an array of offer rows) from a
//! configured URL. Anything provider-specific has already been flattened
//! into the sheet by whatever publishes it.

use async_trait::async_trait;
use domain_catalog::{CloudProvider, FetchedOffer, ResourceKind};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::{OfferSource, SourceError, SourceResult, filter_offers};

pub struct HttpOfferSource {
    provider: CloudProvider,
    offer_url: Option<String>,
    client: Client,
}

impl HttpOfferSource {
    pub fn new(provider: CloudProvider, offer_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("catalog-updater")
            .build()
            .unwrap_or_default();

        Self {
            provider,
            offer_url,
            client,
        }
    }

    fn url(&self) -> SourceResult<&str> {
        self.offer_url
            .as_deref()
            .ok_or_else(|| SourceError::NotConfigured(format!("{} offer URL not set", self.provider)))
    }
}

#[async_trait]
impl OfferSource for HttpOfferSource {
    fn provider(&self) -> CloudProvider {
        self.provider
    }

    fn name(&self) -> &'static str {
        "http-offer-sheet"
    }

    fn is_configured(&self) -> bool {
        self.offer_url.is_some()
    }

    async fn fetch_offers(
        &self,
        kinds: &[ResourceKind],
        regions: &[String],
    ) -> SourceResult<Vec<FetchedOffer>> {
        let url = self.url()?;
        debug!(provider = %self.provider, url, "Fetching offer sheet");

        let response = self.client.get(url).send().await?.error_for_status()?;
        let offers: Vec<FetchedOffer> = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        debug!(provider = %self.provider, count = offers.len(), "Offer sheet fetched");
        Ok(filter_offers(offers, kinds, regions))
    }

    async fn health_check(&self) -> SourceResult<bool> {
        let url = self.url()?;
        match self.client.head(url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                warn!(provider = %self.provider, error = %e, "Offer source unreachable");
                Ok(false)
            }
        }
    }

    fn supported_regions(&self) -> Vec<String> {
        // The sheet decides; the source itself does not restrict regions
        Vec::new()
    }
}
