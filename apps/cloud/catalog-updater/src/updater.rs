//! Catalog Updater Service
//!
//! Drives catalog refresh runs for every configured provider: fetches the
//! offer sheet, hands it to the merge engine, and reports status.

use std::sync::Arc;

use domain_catalog::service::UpdateStatus;
use domain_catalog::{
    CatalogCounts, CatalogRepository, CatalogService, CloudProvider, RateClassifier, ResourceKind,
};
use eyre::Result;
use observability::CatalogMetrics;
use serde::Serialize;
use std::str::FromStr;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::sources::{DemoOfferSource, HttpOfferSource, SourceRegistry};

/// Result of one updater pass over all requested providers
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshResult {
    pub providers_updated: Vec<String>,
    pub offers_fetched: usize,
    pub prices_created: usize,
    pub prices_updated: usize,
    pub prices_retired: usize,
    pub errors: usize,
}

/// Status of the updater and its sources
#[derive(Debug, Serialize)]
pub struct UpdaterStatus {
    pub providers: Vec<ProviderStatus>,
}

#[derive(Debug, Serialize)]
pub struct ProviderStatus {
    pub provider: String,
    pub source: String,
    pub enabled: bool,
    pub is_healthy: bool,
    pub counts: CatalogCounts,
    pub last_run: UpdateStatus,
}

/// Main catalog updater service
pub struct CatalogUpdater<R: CatalogRepository> {
    service: Arc<CatalogService<R>>,
    registry: SourceRegistry,
    config: Config,
}

impl<R: CatalogRepository + 'static> CatalogUpdater<R> {
    pub fn new(repository: R, config: Config) -> Self {
        let service = Arc::new(CatalogService::new(
            repository,
            Arc::new(RateClassifier::builtin()),
        ));

        let mut registry = SourceRegistry::new();
        for source in config.sources.iter().filter(|s| s.enabled) {
            match &source.offer_url {
                Some(url) => registry.register(Box::new(HttpOfferSource::new(
                    source.provider,
                    Some(url.clone()),
                ))),
                None => registry.register(Box::new(DemoOfferSource::new(source.provider))),
            }
        }

        Self {
            service,
            registry,
            config,
        }
    }

    /// Run one refresh pass.
    ///
    /// Each provider is one sequential update run; a failure in one
    /// provider's run does not stop the others.
    pub async fn refresh(
        &self,
        providers: Option<&[String]>,
        kinds: Option<&[String]>,
        regions: Option<&[String]>,
        force: bool,
        trigger: &str,
    ) -> Result<RefreshResult> {
        let kind_filters: Vec<ResourceKind> = kinds
            .map(|kinds| {
                kinds
                    .iter()
                    .filter_map(|k| ResourceKind::from_str(k).ok())
                    .collect()
            })
            .unwrap_or_default();

        let region_filters: Vec<String> = regions
            .map(|r| r.to_vec())
            .unwrap_or_else(|| self.config.default_regions.clone());

        let provider_filters: Option<Vec<CloudProvider>> = providers.map(|p| {
            p.iter()
                .filter_map(|name| CloudProvider::from_str(&name.to_lowercase()).ok())
                .collect()
        });

        let filters = self.config.patterns.compile()?;
        let mut result = RefreshResult::default();

        for source in self.registry.get_configured_sources() {
            if let Some(ref wanted) = provider_filters {
                if !wanted.contains(&source.provider()) {
                    continue;
                }
            }

            let provider = source.provider();
            info!(provider = %provider, source = source.name(), "Fetching offers");

            let offers = match source.fetch_offers(&kind_filters, &region_filters).await {
                Ok(offers) => {
                    CatalogMetrics::record_offer_fetch(
                        &provider.to_string(),
                        "ok",
                        offers.len(),
                    );
                    offers
                }
                Err(e) => {
                    CatalogMetrics::record_offer_fetch(&provider.to_string(), "error", 0);
                    error!(provider = %provider, error = %e, "Offer fetch failed");
                    result.errors += 1;
                    continue;
                }
            };

            if offers.is_empty() {
                warn!(provider = %provider, "Offer sheet empty, skipping update");
                continue;
            }
            result.offers_fetched += offers.len();

            match self
                .service
                .run_update(provider, force, filters.clone(), offers, trigger)
                .await
            {
                Ok(summary) => {
                    result.providers_updated.push(provider.to_string());
                    result.prices_created += summary.created;
                    result.prices_updated += summary.updated;
                    result.prices_retired += summary.retired_prices;
                }
                Err(e) => {
                    error!(provider = %provider, error = %e, "Catalog update failed");
                    result.errors += 1;
                }
            }
        }

        Ok(result)
    }

    /// Run as a scheduled service
    pub async fn run_scheduled(self: Arc<Self>, cron_expr: &str) -> Result<()> {
        info!(cron = cron_expr, "Starting scheduled catalog refresh");

        let sched = JobScheduler::new().await?;
        let updater = Arc::clone(&self);

        let job = Job::new_async(cron_expr, move |_uuid, _l| {
            let updater = Arc::clone(&updater);

            Box::pin(async move {
                info!("Running scheduled catalog refresh");
                match updater.refresh(None, None, None, false, "scheduled").await {
                    Ok(result) => {
                        info!(
                            providers = result.providers_updated.len(),
                            created = result.prices_created,
                            updated = result.prices_updated,
                            retired = result.prices_retired,
                            errors = result.errors,
                            "Scheduled refresh complete"
                        );
                    }
                    Err(e) => {
                        error!(error = %e, "Scheduled refresh failed");
                    }
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Scheduler started, waiting for jobs...");
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
        }
    }

    /// Get updater status: per provider, the source health, the installed
    /// catalog counts and the last run's status record.
    pub async fn status(&self) -> Result<UpdaterStatus> {
        let mut providers = Vec::new();

        for source in self.registry.all_sources() {
            let provider = source.provider();
            let is_healthy = source.health_check().await.unwrap_or(false);
            let counts = self
                .service
                .counts(provider)
                .await
                .unwrap_or(CatalogCounts::UNKNOWN);

            providers.push(ProviderStatus {
                provider: provider.to_string(),
                source: source.name().to_string(),
                enabled: source.is_configured(),
                is_healthy,
                counts,
                last_run: self.service.status(provider),
            });
        }

        Ok(UpdaterStatus { providers })
    }
}
