//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Monitor cycles (count, duration)
//! - Detection (flagged torrents, confirmed streaks)
//! - Removal (removals by policy, unmatched confirmations)
//! - Queue services (fetch results)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Cycle Metrics
// =============================================================================

/// Monitor cycles total by result.
pub static CYCLES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("unstall_cycles_total", "Total monitor cycles"),
        &["result"], // "ok", "failed"
    )
    .unwrap()
});

/// Monitor cycle duration in seconds.
pub static CYCLE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("unstall_cycle_duration_seconds", "Duration of a monitor cycle")
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Detection Metrics
// =============================================================================

/// Bad verdicts by reason (one per torrent per cycle).
pub static TORRENTS_FLAGGED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "unstall_torrents_flagged_total",
            "Bad classifications by reason",
        ),
        &["reason"], // "stalled", "stuck_metadata", "slow", "seedless"
    )
    .unwrap()
});

/// Torrents whose streak reached the threshold.
pub static TORRENTS_CONFIRMED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "unstall_torrents_confirmed_total",
        "Torrents confirmed bad after consecutive hits",
    )
    .unwrap()
});

// =============================================================================
// Removal Metrics
// =============================================================================

/// Removals by media kind and whether a re-search was triggered.
pub static REMOVALS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("unstall_removals_total", "Total torrents removed"),
        &["kind", "research"], // kind: "series", "movie", "other"; research: "true", "false"
    )
    .unwrap()
});

/// Confirmed torrents with no matching queue record.
pub static UNMATCHED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "unstall_unmatched_total",
        "Confirmed torrents without a matching queue record",
    )
    .unwrap()
});

// =============================================================================
// Queue Service Metrics
// =============================================================================

/// Queue fetches by service and result.
pub static QUEUE_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("unstall_queue_fetches_total", "Queue fetches"),
        &["service", "result"], // result: "ok", "empty", "error"
    )
    .unwrap()
});

/// All core metrics, for registration in the server's registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Cycles
        Box::new(CYCLES_TOTAL.clone()),
        Box::new(CYCLE_DURATION.clone()),
        // Detection
        Box::new(TORRENTS_FLAGGED.clone()),
        Box::new(TORRENTS_CONFIRMED.clone()),
        // Removal
        Box::new(REMOVALS_TOTAL.clone()),
        Box::new(UNMATCHED_TOTAL.clone()),
        // Queue services
        Box::new(QUEUE_FETCHES.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_in_fresh_registry() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        CYCLES_TOTAL.with_label_values(&["ok"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|f| f.get_name().to_string())
            .collect();
        assert!(names.contains(&"unstall_cycles_total".to_string()));
    }
}
