//! Observability utilities for the cost estimator.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Estimation metrics for catalog resolutions and cost reports
//! - Axum middleware for request metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, EstimationMetrics};
//!
//! init_metrics()?;
//!
//! EstimationMetrics::record_resolution("priced", 0.12);
//!
//! let app = Router::new()
//!     .route("/metrics", get(metrics_handler));
//! ```

pub mod estimation;
pub mod http;

pub use estimation::EstimationMetrics;
pub use http::http_metrics;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder.
///
/// Safe to call more than once; later calls return the first handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();
        Ok(handle)
    })
}

pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    // HTTP
    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    // Resolution
    describe_counter!(
        "price_resolutions_total",
        "Descriptor resolutions by outcome"
    );
    describe_histogram!(
        "price_resolution_duration_seconds",
        "Single descriptor resolution duration in seconds"
    );
    describe_counter!("price_resolution_batches_total", "Resolved batches");
    describe_histogram!("price_resolution_batch_size", "Descriptors per batch");
    describe_histogram!(
        "price_resolution_batch_duration_seconds",
        "Batch resolution duration in seconds"
    );

    // Aggregation
    describe_counter!("cost_reports_total", "Cost reports produced");
    describe_counter!(
        "cost_report_lines_total",
        "Breakdown lines by status"
    );
}
