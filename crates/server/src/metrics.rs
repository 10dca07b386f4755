//! Prometheus metrics for observability.
//!
//! This module provides metrics for the unstall server:
//! - HTTP request metrics (latency, counts)
//! - Monitor status (collected dynamically)
//! - Core detection and removal metrics (registered from `unstall_core::metrics`)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "unstall_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("unstall_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "unstall_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Monitor Metrics (collected dynamically)
// =============================================================================

/// Monitor running state (1 = running, 0 = stopped).
pub static MONITOR_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "unstall_monitor_running",
        "Whether the stall monitor loop is running (1) or stopped (0)",
    )
    .unwrap()
});

/// Torrents with an open streak.
pub static TRACKED_TORRENTS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "unstall_tracked_torrents",
        "Number of torrents with at least one consecutive bad observation",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Monitor
    registry
        .register(Box::new(MONITOR_RUNNING.clone()))
        .unwrap();
    registry
        .register(Box::new(TRACKED_TORRENTS.clone()))
        .unwrap();

    // Core metrics (cycles, detection, removals, queue fetches)
    for metric in unstall_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Collect dynamic metrics from current application state.
///
/// This is called before encoding metrics to update gauges with current
/// values from the monitor.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    if let Some(monitor) = state.monitor() {
        MONITOR_RUNNING.set(if monitor.is_running() { 1 } else { 0 });
        TRACKED_TORRENTS.set(monitor.tracked_count().await as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        // Access metrics to ensure they're initialized
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("unstall_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_all_metrics() {
        // Prometheus only outputs vector metrics that have been accessed
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        MONITOR_RUNNING.set(0);
        TRACKED_TORRENTS.set(0);
        unstall_core::metrics::CYCLES_TOTAL
            .with_label_values(&["ok"])
            .inc_by(0);
        unstall_core::metrics::TORRENTS_CONFIRMED.inc_by(0);

        let output = encode_metrics();

        // HTTP metrics
        assert!(output.contains("unstall_http_request_duration_seconds"));
        assert!(output.contains("unstall_http_requests_in_flight"));

        // Monitor metrics
        assert!(output.contains("unstall_monitor_running"));
        assert!(output.contains("unstall_tracked_torrents"));

        // Core metrics
        assert!(output.contains("unstall_cycles_total"));
        assert!(output.contains("unstall_torrents_confirmed_total"));
    }
}
