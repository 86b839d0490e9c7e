//! Catalog-specific metrics for the cost estimation platform.

use metrics::{counter, gauge, histogram};
use std::time::Instant;

/// Catalog metrics recorder
pub struct CatalogMetrics;

impl CatalogMetrics {
    /// Record a catalog update run start
    pub fn record_update_started(provider: &str, trigger: &str) {
        counter!(
            "catalog_update_jobs_total",
            "provider" => provider.to_string(),
            "trigger" => trigger.to_string(),
            "status" => "started"
        )
        .increment(1);
    }

    /// Record a catalog update run completion
    pub fn record_update_completed(
        provider: &str,
        touched: usize,
        retired: usize,
        duration_secs: f64,
    ) {
        counter!(
            "catalog_update_jobs_total",
            "provider" => provider.to_string(),
            "status" => "completed"
        )
        .increment(1);

        counter!("catalog_prices_touched_total", "provider" => provider.to_string())
            .increment(touched as u64);
        counter!("catalog_prices_retired_total", "provider" => provider.to_string())
            .increment(retired as u64);
        histogram!("catalog_update_duration_seconds", "provider" => provider.to_string())
            .record(duration_secs);

        tracing::info!(
            provider = provider,
            touched = touched,
            retired = retired,
            duration_secs = duration_secs,
            "Catalog update completed"
        );
    }

    /// Record a catalog update run failure
    pub fn record_update_failed(provider: &str, error: &str) {
        counter!(
            "catalog_update_jobs_total",
            "provider" => provider.to_string(),
            "status" => "failed"
        )
        .increment(1);

        tracing::error!(provider = provider, error = error, "Catalog update failed");
    }

    /// Set post-update catalog counts for a provider
    pub fn set_catalog_counts(provider: &str, prices: i64, types: i64, locations: i64) {
        gauge!("catalog_prices_total", "provider" => provider.to_string()).set(prices as f64);
        gauge!("catalog_types_total", "provider" => provider.to_string()).set(types as f64);
        gauge!("catalog_locations_total", "provider" => provider.to_string()).set(locations as f64);
    }

    /// Set installed price count by provider (single gauge)
    pub fn set_price_count(provider: &str, count: usize) {
        gauge!("catalog_prices_total", "provider" => provider.to_string()).set(count as f64);
    }

    /// Record a price lookup and its outcome ("matched" / "not_found")
    pub fn record_lookup(kind: &str, outcome: &str, duration_ms: u64) {
        counter!(
            "lookup_requests_total",
            "kind" => kind.to_string(),
            "outcome" => outcome.to_string()
        )
        .increment(1);
        histogram!("lookup_duration_seconds", "kind" => kind.to_string())
            .record(duration_ms as f64 / 1000.0);
    }

    /// Record an offer sheet fetch
    pub fn record_offer_fetch(provider: &str, status: &str, offers: usize) {
        counter!(
            "offer_fetch_total",
            "provider" => provider.to_string(),
            "status" => status.to_string()
        )
        .increment(1);

        tracing::debug!(
            provider = provider,
            status = status,
            offers = offers,
            "Offer fetch recorded"
        );
    }
}

/// Timer guard for catalog update runs.
///
/// Records the duration when `stop()` is called or when dropped.
pub struct UpdateTimer {
    start: Instant,
    provider: String,
    stopped: bool,
}

impl UpdateTimer {
    pub fn new(provider: &str) -> Self {
        Self {
            start: Instant::now(),
            provider: provider.to_string(),
            stopped: false,
        }
    }

    /// Stop the timer and record the duration. Returns elapsed seconds.
    pub fn stop(&mut self) -> f64 {
        if self.stopped {
            return 0.0;
        }
        self.stopped = true;

        let secs = self.start.elapsed().as_secs_f64();
        histogram!(
            "catalog_update_duration_seconds",
            "provider" => self.provider.clone()
        )
        .record(secs);
        secs
    }
}

impl Drop for UpdateTimer {
    fn drop(&mut self) {
        if !self.stopped {
            self.stop();
        }
    }
}
