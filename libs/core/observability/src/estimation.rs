//! Estimation metrics: catalog resolutions and cost reports.

use metrics::{counter, histogram};

/// Estimation metrics recorder
pub struct EstimationMetrics;

impl EstimationMetrics {
    // =========================================================================
    // Resolution Metrics
    // =========================================================================

    /// Record a single descriptor resolution.
    ///
    /// `outcome` is `priced`, `no_match`, `lookup_failure` or `cost_overflow`.
    pub fn record_resolution(outcome: &str, duration_secs: f64) {
        counter!("price_resolutions_total", "outcome" => outcome.to_string()).increment(1);
        histogram!("price_resolution_duration_seconds", "outcome" => outcome.to_string())
            .record(duration_secs);
    }

    /// Record a resolved batch
    pub fn record_batch_resolved(count: usize, failed: usize, duration_secs: f64) {
        counter!("price_resolution_batches_total").increment(1);
        histogram!("price_resolution_batch_size").record(count as f64);
        histogram!("price_resolution_batch_duration_seconds").record(duration_secs);

        tracing::debug!(
            count = count,
            failed = failed,
            duration_secs = duration_secs,
            "Resolved pricing batch"
        );
    }

    // =========================================================================
    // Aggregation Metrics
    // =========================================================================

    /// Record a cost report built from `lines` quotes, `failed` of which carried an error
    pub fn record_report(lines: usize, failed: usize) {
        counter!("cost_reports_total").increment(1);
        counter!("cost_report_lines_total", "status" => "priced")
            .increment((lines - failed.min(lines)) as u64);
        counter!("cost_report_lines_total", "status" => "failed").increment(failed as u64);

        tracing::debug!(lines = lines, failed = failed, "Aggregated cost report");
    }
}
