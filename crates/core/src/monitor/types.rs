//! Types for the stall monitor.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ServiceConfig;
use crate::queue::{QueueError, QueueService, ServiceEndpoint};

use super::removal::RemovalOutcome;

/// Errors that abort a monitor cycle.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Torrent client error.
    #[error("torrent client error: {0}")]
    TorrentClient(#[from] crate::torrent_client::TorrentClientError),

    /// Queue service error.
    #[error("queue service '{service}' error: {source}")]
    Queue {
        service: String,
        #[source]
        source: QueueError,
    },

    /// The queue record was deleted but the torrent delete failed.
    #[error("torrent {hash} left in client after its queue record was deleted: {source}")]
    TorrentLeftBehind {
        hash: String,
        #[source]
        source: crate::torrent_client::TorrentClientError,
    },
}

impl MonitorError {
    pub(crate) fn queue(service: &str, source: QueueError) -> Self {
        MonitorError::Queue {
            service: service.to_string(),
            source,
        }
    }
}

/// A torrent category together with the queue service that owns it.
#[derive(Clone)]
pub struct MonitoredService {
    /// Display name (e.g., "sonarr").
    pub name: String,
    /// qBittorrent category of this service's torrents.
    pub category: String,
    pub kind: super::MediaKind,
    pub endpoint: ServiceEndpoint,
    pub queue: Arc<dyn QueueService>,
}

impl MonitoredService {
    /// Build from config, resolving the removal policy from the category table.
    pub fn from_config(config: &ServiceConfig, queue: Arc<dyn QueueService>) -> Self {
        Self {
            name: config.name.clone(),
            category: config.category.clone(),
            kind: config.media_kind(),
            endpoint: ServiceEndpoint::new(config.url.clone(), config.api_key.clone()),
            queue,
        }
    }
}

impl std::fmt::Debug for MonitoredService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitoredService")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("kind", &self.kind)
            .field("url", &self.endpoint.url)
            .field("queue", &self.queue.name())
            .finish()
    }
}

/// What one cycle observed and did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleReport {
    /// Torrents returned by the client.
    pub torrents_seen: usize,
    /// Torrents classified bad this cycle.
    pub flagged: usize,
    /// Torrents whose streak reached the threshold.
    pub confirmed: usize,
    /// Confirmed torrents that were removed.
    pub removed: Vec<RemovalOutcome>,
    /// Confirmed torrents with no matching queue record.
    pub unmatched: usize,
    /// Matched torrents that could not be deregistered (record without id).
    pub skipped: usize,
    /// Stale streaks dropped because the torrent disappeared or left a
    /// monitored category.
    pub forgotten: usize,
    /// Deregistered torrents deleted straight from the client.
    pub orphans_deleted: usize,
}

impl CycleReport {
    pub(crate) fn merge(&mut self, other: CycleReport) {
        self.flagged += other.flagged;
        self.confirmed += other.confirmed;
        self.removed.extend(other.removed);
        self.unmatched += other.unmatched;
        self.skipped += other.skipped;
        self.orphans_deleted += other.orphans_deleted;
    }
}

/// Current status of the monitor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorStatus {
    /// Whether the periodic loop is running.
    pub running: bool,
    /// Streak threshold.
    pub consecutive_hits_required: u32,
    /// Torrents with an open streak.
    pub tracked_torrents: usize,
    /// Completed cycles since startup.
    pub cycles_completed: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_report: Option<CycleReport>,
    pub last_error: Option<String>,
}
