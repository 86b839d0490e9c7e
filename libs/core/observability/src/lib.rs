//! Observability utilities for the cost estimation platform.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Custom metrics for catalog updates and price lookups
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, CatalogMetrics};
//!
//! // Initialize metrics recorder
//! init_metrics();
//!
//! // Record catalog operations
//! CatalogMetrics::record_update_started("aws", "manual");
//! CatalogMetrics::set_price_count("aws", 1250);
//! ```

pub mod catalog;

pub use catalog::{CatalogMetrics, UpdateTimer};

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// This should be called once at application startup.
/// Returns the PrometheusHandle for rendering metrics.
pub fn init_metrics() -> &'static PrometheusHandle {
    METRICS_HANDLE.get_or_init(|| {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("Failed to install Prometheus recorder");

        info!("Prometheus metrics recorder initialized");

        register_metric_descriptions();

        handle
    })
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Render the current metrics in Prometheus exposition format.
pub fn render_metrics() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

/// Register metric descriptions for documentation
fn register_metric_descriptions() {
    use metrics::describe_counter;
    use metrics::describe_gauge;
    use metrics::describe_histogram;

    // Catalog update metrics
    describe_counter!(
        "catalog_update_jobs_total",
        "Catalog update runs by provider and status"
    );
    describe_histogram!(
        "catalog_update_duration_seconds",
        "Catalog update run duration in seconds"
    );
    describe_counter!(
        "catalog_prices_touched_total",
        "Price rows touched during catalog updates"
    );
    describe_counter!(
        "catalog_prices_retired_total",
        "Price rows retired during catalog updates"
    );

    // Catalog state metrics
    describe_gauge!(
        "catalog_prices_total",
        "Installed price rows by provider"
    );
    describe_gauge!(
        "catalog_types_total",
        "Installed resource types by provider"
    );
    describe_gauge!(
        "catalog_locations_total",
        "Installed locations by provider"
    );

    // Lookup metrics
    describe_counter!(
        "lookup_requests_total",
        "Price lookups by resource kind and outcome"
    );
    describe_histogram!(
        "lookup_duration_seconds",
        "Price lookup duration in seconds"
    );

    // Offer source metrics
    describe_counter!(
        "offer_fetch_total",
        "Offer sheet fetches by provider and status"
    );
}
