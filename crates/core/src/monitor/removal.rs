//! Category-specific removal of confirmed-bad torrents.
//!
//! Each category resolves to a [`MediaKind`]; the kind plus the matched queue
//! record yields a [`RemovalPlan`], which the [`RemovalCoordinator`] executes
//! against the queue service and the torrent client.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::metrics;
use crate::queue::QueueRecord;
use crate::torrent_client::{Torrent, TorrentClient};

use super::episode::{parse_episode_number, parse_season_number};
use super::types::{MonitorError, MonitoredService};

/// Removal policy variant of a torrent category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// TV; re-searches the affected season only.
    Series,
    /// Movies; re-searches the movie.
    Movie,
    /// Anything else; blocklists without re-searching.
    Other,
}

/// Built-in category table.
const CATEGORY_KINDS: &[(&str, MediaKind)] = &[
    ("tv-sonarr", MediaKind::Series),
    ("radarr", MediaKind::Movie),
    ("radarr-4k", MediaKind::Movie),
];

impl MediaKind {
    /// Look up a category in the built-in table; unknown categories are `Other`.
    pub fn for_category(category: &str) -> Self {
        CATEGORY_KINDS
            .iter()
            .find(|(name, _)| *name == category)
            .map(|(_, kind)| *kind)
            .unwrap_or(MediaKind::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Series => "series",
            MediaKind::Movie => "movie",
            MediaKind::Other => "other",
        }
    }
}

/// Search to trigger once the bad release is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Research {
    Season { series_id: i64, season_number: u32 },
    Movie { movie_id: i64 },
}

/// The concrete steps for one (kind, record) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalPlan {
    /// Let the queue service remove the torrent from the client.
    pub remove_from_client: bool,
    pub blocklist: bool,
    /// Delete the torrent ourselves before re-searching.
    pub delete_torrent: bool,
    pub research: Option<Research>,
}

impl RemovalPlan {
    /// Queue service cleans up the client; nothing is searched again.
    pub fn generic() -> Self {
        Self {
            remove_from_client: true,
            blocklist: true,
            delete_torrent: false,
            research: None,
        }
    }

    /// The torrent has to be gone before the search runs, or the new grab collides with it.
    pub fn targeted(research: Research) -> Self {
        Self {
            remove_from_client: false,
            blocklist: true,
            delete_torrent: true,
            research: Some(research),
        }
    }

    pub fn for_record(kind: MediaKind, record: &QueueRecord) -> Self {
        match kind {
            MediaKind::Series => match (record.series_id, parse_season_number(record)) {
                (Some(series_id), Some(season_number)) => Self::targeted(Research::Season {
                    series_id,
                    season_number,
                }),
                _ => Self::generic(),
            },
            MediaKind::Movie => match record.movie_id {
                Some(movie_id) => Self::targeted(Research::Movie { movie_id }),
                None => Self::generic(),
            },
            MediaKind::Other => Self::generic(),
        }
    }
}

/// A confirmed-bad torrent matched to its queue record.
#[derive(Debug, Clone)]
pub struct RemovalDecision {
    pub torrent: Torrent,
    pub reason: String,
    pub record: QueueRecord,
    pub kind: MediaKind,
}

/// What was removed, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalOutcome {
    pub hash: String,
    pub name: String,
    pub title: String,
    pub reason: String,
    pub kind: MediaKind,
    pub plan: RemovalPlan,
}

/// Executes removal plans.
pub struct RemovalCoordinator {
    torrent_client: Arc<dyn TorrentClient>,
}

impl RemovalCoordinator {
    pub fn new(torrent_client: Arc<dyn TorrentClient>) -> Self {
        Self { torrent_client }
    }

    /// Deregister and blocklist the record, then delete and re-search as planned.
    ///
    /// Returns `Ok(None)` when the record carries no id and cannot be
    /// deregistered; the torrent is left alone in that case.
    pub async fn remove(
        &self,
        decision: &RemovalDecision,
        service: &MonitoredService,
    ) -> Result<Option<RemovalOutcome>, MonitorError> {
        let record = &decision.record;
        let title = record.display_title().to_string();

        if record.id.is_none() {
            warn!(
                service = %service.name,
                "Queue record for {} has no id, cannot remove {} download",
                title,
                decision.reason
            );
            return Ok(None);
        }

        let plan = RemovalPlan::for_record(decision.kind, record);

        service
            .queue
            .delete_queue_element(
                &service.endpoint,
                record,
                plan.remove_from_client,
                plan.blocklist,
            )
            .await
            .map_err(|e| MonitorError::queue(&service.name, e))?;

        if plan.delete_torrent {
            if let Err(e) = self.torrent_client.delete_torrent(&decision.torrent).await {
                warn!(
                    service = %service.name,
                    hash = %decision.torrent.hash,
                    "Deleted queue record for {} but torrent is still in the client: {}",
                    title,
                    e
                );
                return Err(MonitorError::TorrentLeftBehind {
                    hash: decision.torrent.hash.clone(),
                    source: e,
                });
            }
        }

        match plan.research {
            Some(Research::Season {
                series_id,
                season_number,
            }) => {
                service
                    .queue
                    .search_season(&service.endpoint, series_id, season_number)
                    .await
                    .map_err(|e| MonitorError::queue(&service.name, e))?;
                let episode = parse_episode_number(record)
                    .map(|e| format!("E{}", e))
                    .unwrap_or_default();
                info!(
                    "Removing {} download: {} S{}{}",
                    decision.reason, title, season_number, episode
                );
            }
            Some(Research::Movie { movie_id }) => {
                service
                    .queue
                    .search_movie(&service.endpoint, movie_id)
                    .await
                    .map_err(|e| MonitorError::queue(&service.name, e))?;
                info!("Removing {} download: {}", decision.reason, title);
            }
            None => {
                info!("Removing {} download: {}", decision.reason, title);
                warn!("Did not re-search {} download {}", service.name, title);
            }
        }

        metrics::REMOVALS_TOTAL
            .with_label_values(&[
                decision.kind.as_str(),
                if plan.research.is_some() { "true" } else { "false" },
            ])
            .inc();

        Ok(Some(RemovalOutcome {
            hash: decision.torrent.hash.clone(),
            name: decision.torrent.name.clone(),
            title,
            reason: decision.reason.clone(),
            kind: decision.kind,
            plan,
        }))
    }
}
