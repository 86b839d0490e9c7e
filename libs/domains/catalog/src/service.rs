use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use observability::CatalogMetrics;
use serde::Serialize;
use strum::Display;
use tracing::{error, info};

use crate::error::{CatalogError, CatalogResult};
use crate::filters::EnablementFilters;
use crate::models::{CatalogCounts, CloudProvider, FetchedOffer};
use crate::rating::RateClassifier;
use crate::repository::CatalogRepository;
use crate::snapshot::CatalogSnapshot;
use crate::update::{MergeSummary, UpdateContext};

/// Phase label of an update run, surfaced by the status record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UpdatePhase {
    #[default]
    Idle,
    Loading,
    Merging,
    Committing,
    Done,
    Failed,
}

/// Pollable status of the most recent update run per provider.
///
/// The post-update counts stay at the `-1` sentinel until a run succeeds;
/// a failed run resets them to the sentinel rather than leaving partially
/// measured values behind.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateStatus {
    pub provider: CloudProvider,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    /// Offers processed so far in the current/last run
    pub done: usize,
    /// Total offers the current/last run is processing
    pub workload: usize,
    pub phase: UpdatePhase,
    pub counts: CatalogCounts,
    pub error: Option<String>,
}

impl UpdateStatus {
    fn idle(provider: CloudProvider) -> Self {
        Self {
            provider,
            started_at: None,
            finished_at: None,
            last_success_at: None,
            done: 0,
            workload: 0,
            phase: UpdatePhase::Idle,
            counts: CatalogCounts::UNKNOWN,
            error: None,
        }
    }
}

/// Orchestrates catalog update runs and serves committed snapshots.
///
/// At most one update runs per provider at a time; a second trigger while
/// one is in flight is rejected with [`CatalogError::UpdateInProgress`].
/// The merge body itself is sequential, and its changes reach the
/// repository as one atomic commit, so lookups only ever observe fully
/// committed catalog states.
pub struct CatalogService<R: CatalogRepository> {
    repository: Arc<R>,
    classifier: Arc<RateClassifier>,
    in_flight: Mutex<HashSet<CloudProvider>>,
    statuses: RwLock<HashMap<CloudProvider, UpdateStatus>>,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repository: R, classifier: Arc<RateClassifier>) -> Self {
        Self {
            repository: Arc::new(repository),
            classifier,
            in_flight: Mutex::new(HashSet::new()),
            statuses: RwLock::new(HashMap::new()),
        }
    }

    /// Load the committed catalog of one provider for lookups.
    pub async fn snapshot(&self, provider: CloudProvider) -> CatalogResult<CatalogSnapshot> {
        self.repository.load_snapshot(provider).await
    }

    /// Current installed entity counts for a provider.
    pub async fn counts(&self, provider: CloudProvider) -> CatalogResult<CatalogCounts> {
        self.repository.counts(provider).await
    }

    /// Status of the most recent update run for a provider.
    pub fn status(&self, provider: CloudProvider) -> UpdateStatus {
        self.statuses
            .read()
            .expect("status map lock poisoned")
            .get(&provider)
            .cloned()
            .unwrap_or_else(|| UpdateStatus::idle(provider))
    }

    /// Run one catalog update for a provider.
    ///
    /// Rejects with [`CatalogError::UpdateInProgress`] when a run is already
    /// in flight for the same provider. A failure anywhere in the run marks
    /// the status failed and leaves the previously committed catalog
    /// untouched; re-triggering is the caller's decision.
    pub async fn run_update(
        &self,
        provider: CloudProvider,
        force: bool,
        filters: EnablementFilters,
        offers: Vec<FetchedOffer>,
        trigger: &str,
    ) -> CatalogResult<MergeSummary> {
        let _guard = self.acquire(provider)?;

        CatalogMetrics::record_update_started(&provider.to_string(), trigger);
        let clock = Instant::now();
        let workload = offers.len();
        self.with_status(provider, |status| {
            status.started_at = Some(Utc::now());
            status.finished_at = None;
            status.error = None;
            status.done = 0;
            status.workload = workload;
            status.phase = UpdatePhase::Loading;
        });

        info!(provider = %provider, force, workload, "Catalog update started");

        match self.merge(provider, force, filters, offers).await {
            Ok(summary) => {
                let counts = self.repository.counts(provider).await.unwrap_or_default();
                self.with_status(provider, |status| {
                    let now = Utc::now();
                    status.finished_at = Some(now);
                    status.last_success_at = Some(now);
                    status.phase = UpdatePhase::Done;
                    status.counts = counts;
                });

                let provider_label = provider.to_string();
                CatalogMetrics::record_update_completed(
                    &provider_label,
                    summary.touched,
                    summary.retired_prices,
                    clock.elapsed().as_secs_f64(),
                );
                CatalogMetrics::set_catalog_counts(
                    &provider_label,
                    counts.prices,
                    counts.types,
                    counts.locations,
                );
                Ok(summary)
            }
            Err(e) => {
                self.with_status(provider, |status| {
                    status.finished_at = Some(Utc::now());
                    status.phase = UpdatePhase::Failed;
                    status.counts = CatalogCounts::UNKNOWN;
                    status.error = Some(e.to_string());
                });

                CatalogMetrics::record_update_failed(&provider.to_string(), &e.to_string());
                error!(provider = %provider, error = %e, "Catalog update failed");
                Err(e)
            }
        }
    }

    /// The sequential merge body: load, apply every offer, retire, commit.
    async fn merge(
        &self,
        provider: CloudProvider,
        force: bool,
        filters: EnablementFilters,
        offers: Vec<FetchedOffer>,
    ) -> CatalogResult<MergeSummary> {
        let previous = self.repository.load_snapshot(provider).await?;
        let context = UpdateContext::new(
            provider,
            force,
            previous,
            filters,
            Arc::clone(&self.classifier),
        );

        self.with_status(provider, |status| status.phase = UpdatePhase::Merging);
        for offer in &offers {
            context.apply(offer);
            self.with_status(provider, |status| status.done += 1);
        }

        let outcome = context.finish();
        self.with_status(provider, |status| status.phase = UpdatePhase::Committing);
        self.repository.commit(provider, outcome.commit).await?;
        Ok(outcome.summary)
    }

    fn acquire(&self, provider: CloudProvider) -> CatalogResult<InFlightGuard<'_>> {
        let mut in_flight = self.in_flight.lock().expect("in-flight set lock poisoned");
        if !in_flight.insert(provider) {
            return Err(CatalogError::UpdateInProgress(provider));
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            provider,
        })
    }

    fn with_status(&self, provider: CloudProvider, apply: impl FnOnce(&mut UpdateStatus)) {
        let mut statuses = self.statuses.write().expect("status map lock poisoned");
        let status = statuses
            .entry(provider)
            .or_insert_with(|| UpdateStatus::idle(provider));
        apply(status);
    }
}

/// Releases the provider's update slot when the run ends, even on error.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<CloudProvider>>,
    provider: CloudProvider,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .expect("in-flight set lock poisoned")
            .remove(&self.provider);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCatalogRepository;
    use crate::models::ResourceKind;
    use crate::repository::MockCatalogRepository;

    fn service() -> CatalogService<InMemoryCatalogRepository> {
        let classifier = RateClassifier::new();
        classifier
            .load_table("instance", r#"{"default": "MEDIUM"}"#)
            .unwrap();
        CatalogService::new(InMemoryCatalogRepository::new(), Arc::new(classifier))
    }

    fn offer(type_code: &str, cost_per_hour: f64) -> FetchedOffer {
        FetchedOffer {
            kind: ResourceKind::Instance,
            type_code: type_code.to_string(),
            type_name: type_code.to_string(),
            cpu: 2.0,
            ram_mib: 4096.0,
            term_code: "od".to_string(),
            region: "us-east-1".to_string(),
            region_name: Some("US East".to_string()),
            cost_per_hour: Some(cost_per_hour),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_update_commits_and_reports_status() {
        let service = service();

        let summary = service
            .run_update(
                CloudProvider::Aws,
                false,
                EnablementFilters::allow_all(),
                vec![offer("t3.micro", 0.0104), offer("m5.large", 0.096)],
                "manual",
            )
            .await
            .unwrap();

        assert_eq!(summary.created, 2);

        let status = service.status(CloudProvider::Aws);
        assert_eq!(status.phase, UpdatePhase::Done);
        assert_eq!(status.done, 2);
        assert_eq!(status.workload, 2);
        assert_eq!(status.counts.prices, 2);
        assert!(status.last_success_at.is_some());

        let snapshot = service.snapshot(CloudProvider::Aws).await.unwrap();
        assert_eq!(snapshot.prices.len(), 2);
    }

    #[tokio::test]
    async fn test_second_run_retires_missing_rows() {
        let service = service();
        let filters = EnablementFilters::allow_all;

        service
            .run_update(
                CloudProvider::Aws,
                false,
                filters(),
                vec![offer("t3.micro", 0.0104), offer("m5.large", 0.096)],
                "manual",
            )
            .await
            .unwrap();

        let summary = service
            .run_update(
                CloudProvider::Aws,
                false,
                filters(),
                vec![offer("t3.micro", 0.0104)],
                "manual",
            )
            .await
            .unwrap();

        assert_eq!(summary.retired_prices, 1);
        let snapshot = service.snapshot(CloudProvider::Aws).await.unwrap();
        assert_eq!(snapshot.prices.len(), 1);
        assert_eq!(snapshot.prices[0].type_code, "t3.micro");
    }

    #[tokio::test]
    async fn test_concurrent_update_is_rejected() {
        let service = service();

        let guard = service.acquire(CloudProvider::Aws).unwrap();
        let result = service
            .run_update(
                CloudProvider::Aws,
                false,
                EnablementFilters::allow_all(),
                vec![offer("t3.micro", 0.0104)],
                "manual",
            )
            .await;
        assert!(matches!(result, Err(CatalogError::UpdateInProgress(_))));

        // A different provider is unaffected
        assert!(service.acquire(CloudProvider::Gcp).is_ok());

        drop(guard);
        assert!(service.acquire(CloudProvider::Aws).is_ok());
    }

    #[tokio::test]
    async fn test_failed_commit_marks_status_failed_with_sentinel_counts() {
        let mut repository = MockCatalogRepository::new();
        repository
            .expect_load_snapshot()
            .returning(|provider| Ok(CatalogSnapshot::empty(provider)));
        repository.expect_commit().returning(|_, _| {
            Err(CatalogError::Internal("connection reset".to_string()))
        });

        let classifier = RateClassifier::new();
        classifier
            .load_table("instance", r#"{"default": "MEDIUM"}"#)
            .unwrap();
        let service = CatalogService::new(repository, Arc::new(classifier));

        let result = service
            .run_update(
                CloudProvider::Aws,
                false,
                EnablementFilters::allow_all(),
                vec![offer("t3.micro", 0.0104)],
                "manual",
            )
            .await;

        assert!(result.is_err());
        let status = service.status(CloudProvider::Aws);
        assert_eq!(status.phase, UpdatePhase::Failed);
        assert_eq!(status.counts, CatalogCounts::UNKNOWN);
        assert!(status.error.is_some());
        assert!(status.last_success_at.is_none());
    }
}
