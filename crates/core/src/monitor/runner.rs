//! Periodic stall monitor.
//!
//! Each cycle lists the client's torrents, drops streaks of torrents that are
//! gone, classifies every torrent of a monitored category and removes the
//! ones whose streak reached the threshold.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::config::MonitorConfig;
use crate::metrics;
use crate::torrent_client::{Torrent, TorrentClient};

use super::classifier::{Classifier, Verdict};
use super::matcher::{find_match, SubstringMatcher, TitleMatcher};
use super::removal::{RemovalCoordinator, RemovalDecision};
use super::tracker::{StrikeTracker, TrackedTorrent};
use super::types::{CycleReport, MonitorError, MonitorStatus, MonitoredService};

/// Bookkeeping about past cycles.
#[derive(Debug, Default)]
struct CycleHistory {
    cycles_completed: u64,
    last_cycle_at: Option<chrono::DateTime<Utc>>,
    last_report: Option<CycleReport>,
    last_error: Option<String>,
}

/// Everything a cycle needs, shared with the background loop.
struct CycleRunner {
    classifier: Classifier,
    matcher: Arc<dyn TitleMatcher>,
    torrent_client: Arc<dyn TorrentClient>,
    coordinator: RemovalCoordinator,
    services: Vec<MonitoredService>,
    tracker: RwLock<StrikeTracker>,
    history: RwLock<CycleHistory>,
    // Held for the whole cycle so the loop and manual triggers never overlap.
    cycle_lock: Mutex<()>,
}

/// Detects stuck torrents and removes them through their queue service.
pub struct Monitor {
    config: MonitorConfig,
    runner: Arc<CycleRunner>,

    // Runtime state
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Monitor {
    /// Create a monitor using substring title matching.
    pub fn new(
        config: MonitorConfig,
        torrent_client: Arc<dyn TorrentClient>,
        services: Vec<MonitoredService>,
    ) -> Self {
        Self::with_matcher(config, torrent_client, services, Arc::new(SubstringMatcher))
    }

    /// Create a monitor with a custom matching strategy.
    pub fn with_matcher(
        config: MonitorConfig,
        torrent_client: Arc<dyn TorrentClient>,
        services: Vec<MonitoredService>,
        matcher: Arc<dyn TitleMatcher>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let runner = CycleRunner {
            classifier: Classifier::new(config.min_download_speed_kbps),
            matcher,
            coordinator: RemovalCoordinator::new(Arc::clone(&torrent_client)),
            torrent_client,
            services,
            tracker: RwLock::new(StrikeTracker::new(config.consecutive_hits_required)),
            history: RwLock::new(CycleHistory::default()),
            cycle_lock: Mutex::new(()),
        };

        Self {
            config,
            runner: Arc::new(runner),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Monitored services, in processing order.
    pub fn services(&self) -> &[MonitoredService] {
        &self.runner.services
    }

    /// Start the periodic loop (spawns a background task).
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Monitor already running");
            return;
        }

        info!(
            interval_secs = self.config.poll_interval_secs,
            hits_required = self.config.consecutive_hits_required,
            services = self.runner.services.len(),
            "Starting stall monitor"
        );

        self.spawn_cycle_loop();
    }

    /// Stop the periodic loop. A cycle in progress runs to completion.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Monitor not running");
            return;
        }

        info!("Stopping stall monitor");
        let _ = self.shutdown_tx.send(());

        // Wait for an in-flight cycle.
        let _guard = self.runner.cycle_lock.lock().await;
        info!("Stall monitor stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Run one cycle now, waiting for any cycle already in progress.
    pub async fn trigger(&self) -> Result<CycleReport, MonitorError> {
        self.runner.run_recorded().await
    }

    /// Run one cycle now without touching the cycle history.
    pub async fn run_cycle(&self) -> Result<CycleReport, MonitorError> {
        let _guard = self.runner.cycle_lock.lock().await;
        self.runner.run_cycle().await
    }

    pub async fn status(&self) -> MonitorStatus {
        let (tracked_torrents, consecutive_hits_required) = {
            let tracker = self.runner.tracker.read().await;
            (tracker.len(), tracker.required())
        };
        let history = self.runner.history.read().await;

        MonitorStatus {
            running: self.is_running(),
            consecutive_hits_required,
            tracked_torrents,
            cycles_completed: history.cycles_completed,
            last_cycle_at: history.last_cycle_at,
            last_report: history.last_report.clone(),
            last_error: history.last_error.clone(),
        }
    }

    /// Open streaks, highest first.
    pub async fn strikes(&self) -> Vec<TrackedTorrent> {
        self.runner.tracker.read().await.snapshot()
    }

    pub async fn tracked_count(&self) -> usize {
        self.runner.tracker.read().await.len()
    }

    fn spawn_cycle_loop(&self) {
        let running = Arc::clone(&self.running);
        let runner = Arc::clone(&self.runner);
        let interval = Duration::from_secs(self.config.poll_interval_secs);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Monitor loop started");
            loop {
                if !running.load(Ordering::Relaxed) {
                    break;
                }

                // Errors are recorded in the history and retried next interval.
                let _ = runner.run_recorded().await;

                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Monitor loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            info!("Monitor loop stopped");
        });
    }
}

impl CycleRunner {
    /// Run a cycle under the cycle lock and record its outcome.
    async fn run_recorded(&self) -> Result<CycleReport, MonitorError> {
        let _guard = self.cycle_lock.lock().await;

        let started = Instant::now();
        let result = self.run_cycle().await;
        let elapsed = started.elapsed().as_secs_f64();

        let label = if result.is_ok() { "ok" } else { "failed" };
        metrics::CYCLES_TOTAL.with_label_values(&[label]).inc();
        metrics::CYCLE_DURATION
            .with_label_values(&[label])
            .observe(elapsed);

        let mut history = self.history.write().await;
        history.cycles_completed += 1;
        history.last_cycle_at = Some(Utc::now());
        match &result {
            Ok(report) => {
                debug!(
                    seen = report.torrents_seen,
                    flagged = report.flagged,
                    removed = report.removed.len(),
                    "Monitor cycle finished in {:.2}s",
                    elapsed
                );
                history.last_report = Some(report.clone());
                history.last_error = None;
            }
            Err(e) => {
                error!("Monitor cycle aborted: {}", e);
                history.last_error = Some(e.to_string());
            }
        }

        result
    }

    /// One detection and removal pass. Callers hold the cycle lock.
    async fn run_cycle(&self) -> Result<CycleReport, MonitorError> {
        let torrents = self.torrent_client.list_torrents().await?;

        let mut report = CycleReport {
            torrents_seen: torrents.len(),
            ..Default::default()
        };

        {
            // Only torrents still in a monitored category keep their streak.
            let categories: HashSet<&str> =
                self.services.iter().map(|s| s.category.as_str()).collect();
            let current: HashSet<&str> = torrents
                .iter()
                .filter(|t| categories.contains(t.category.as_str()))
                .map(|t| t.hash.as_str())
                .collect();
            let forgotten = self.tracker.write().await.cleanup(&current);
            if forgotten > 0 {
                debug!("Forgot {} torrents no longer monitored", forgotten);
            }
            report.forgotten = forgotten;
        }

        for service in &self.services {
            let service_report = self.process_service(service, &torrents).await?;
            report.merge(service_report);
        }

        Ok(report)
    }

    async fn process_service(
        &self,
        service: &MonitoredService,
        torrents: &[Torrent],
    ) -> Result<CycleReport, MonitorError> {
        let mut report = CycleReport::default();
        let mut confirmed: Vec<(&Torrent, String)> = Vec::new();

        {
            let mut tracker = self.tracker.write().await;
            for torrent in torrents.iter().filter(|t| t.category == service.category) {
                debug!("Processing {} queue item: {}", service.category, torrent.name);

                let verdict = self.classifier.classify(torrent);
                let reason = verdict.reason();
                if let Verdict::Bad(bad) = &verdict {
                    report.flagged += 1;
                    metrics::TORRENTS_FLAGGED
                        .with_label_values(&[bad.label()])
                        .inc();
                }

                if tracker.record(&torrent.hash, verdict.is_bad(), &reason) {
                    info!(
                        "Confirmed {} download after {} hits: {}",
                        reason,
                        tracker.hits(&torrent.hash),
                        torrent.name
                    );
                    metrics::TORRENTS_CONFIRMED.inc();
                    confirmed.push((torrent, reason));
                } else if verdict.is_bad() {
                    info!(
                        "Strike {}/{} for {} download: {}",
                        tracker.hits(&torrent.hash),
                        tracker.required(),
                        reason,
                        torrent.name
                    );
                }
            }
        }

        report.confirmed = confirmed.len();
        if confirmed.is_empty() {
            return Ok(report);
        }

        let page = match service.queue.get_queue(&service.endpoint).await {
            Ok(page) => {
                metrics::QUEUE_FETCHES
                    .with_label_values(&[service.name.as_str(), "ok"])
                    .inc();
                page
            }
            Err(e) => {
                metrics::QUEUE_FETCHES
                    .with_label_values(&[service.name.as_str(), "failed"])
                    .inc();
                return Err(MonitorError::queue(&service.name, e));
            }
        };
        let records = page.and_then(|p| p.records).unwrap_or_default();

        for (torrent, reason) in confirmed {
            let Some(record) = find_match(self.matcher.as_ref(), torrent, &records) else {
                let orphaned = self.tracker.read().await.is_deregistered(&torrent.hash);
                if orphaned {
                    self.torrent_client.delete_torrent(torrent).await?;
                    self.tracker.write().await.clear(&torrent.hash);
                    info!(
                        "Deleted {} download left behind by {}: {}",
                        reason, service.name, torrent.name
                    );
                    report.orphans_deleted += 1;
                    continue;
                }
                debug!(
                    matcher = self.matcher.name(),
                    "No {} queue record matches {}",
                    service.name,
                    torrent.name
                );
                metrics::UNMATCHED_TOTAL.inc();
                report.unmatched += 1;
                continue;
            };

            let decision = RemovalDecision {
                torrent: torrent.clone(),
                reason,
                record: record.clone(),
                kind: service.kind,
            };

            let removed = match self.coordinator.remove(&decision, service).await {
                Err(e @ MonitorError::TorrentLeftBehind { .. }) => {
                    self.tracker.write().await.mark_deregistered(&torrent.hash);
                    return Err(e);
                }
                other => other?,
            };
            match removed {
                Some(outcome) => {
                    self.tracker.write().await.clear(&torrent.hash);
                    report.removed.push(outcome);
                }
                None => report.skipped += 1,
            }
        }

        Ok(report)
    }
}
