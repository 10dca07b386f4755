//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external service traits,
//! so whole monitor cycles can be exercised without qBittorrent or an *arr
//! instance.
//!
//! # Example
//!
//! ```rust,ignore
//! use unstall_core::testing::{fixtures, MockQueueService, MockTorrentClient};
//!
//! let torrent_client = MockTorrentClient::new();
//! let queue = MockQueueService::with_records(vec![
//!     fixtures::series_record(1, "Show.S02E05.720p", 7, Some(2)),
//! ]);
//!
//! // Build MonitoredService/Monitor around them...
//! ```

mod mock_queue_service;
mod mock_torrent_client;

pub use mock_queue_service::{MockQueueService, QueueCall};
pub use mock_torrent_client::MockTorrentClient;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::queue::{QueueEpisode, QueueMedia, QueueRecord};
    use crate::torrent_client::{Torrent, TorrentState};

    /// Create a test torrent with a healthy speed and seeds; the state decides the verdict.
    pub fn torrent(hash: &str, name: &str, category: &str, state: TorrentState) -> Torrent {
        Torrent {
            hash: hash.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            state,
            dlspeed: 1024 * 1024, // 1 MB/s
            num_complete: 10,
        }
    }

    /// Create a downloading torrent with the given speed (bytes/s) and seed count.
    pub fn downloading(
        hash: &str,
        name: &str,
        category: &str,
        dlspeed: u64,
        num_complete: u64,
    ) -> Torrent {
        Torrent {
            dlspeed,
            num_complete,
            ..torrent(hash, name, category, TorrentState::Downloading)
        }
    }

    /// Create a Sonarr queue record.
    pub fn series_record(
        id: i64,
        title: &str,
        series_id: i64,
        season_number: Option<u32>,
    ) -> QueueRecord {
        QueueRecord {
            id: Some(id),
            title: Some(title.to_string()),
            download_id: None,
            series_id: Some(series_id),
            season_number,
            ..Default::default()
        }
    }

    /// Create a Sonarr queue record carrying an episode number.
    pub fn episode_record(
        id: i64,
        title: &str,
        series_id: i64,
        season_number: u32,
        episode_number: u32,
    ) -> QueueRecord {
        QueueRecord {
            episode: Some(QueueEpisode {
                episode_number: Some(episode_number),
            }),
            ..series_record(id, title, series_id, Some(season_number))
        }
    }

    /// Create a Radarr queue record.
    pub fn movie_record(id: i64, title: &str, movie_id: i64) -> QueueRecord {
        QueueRecord {
            id: Some(id),
            title: Some(title.to_string()),
            movie_id: Some(movie_id),
            ..Default::default()
        }
    }

    /// Attach a series title, as Sonarr does with `includeSeries=true`.
    pub fn with_series_title(mut record: QueueRecord, title: &str) -> QueueRecord {
        record.series = Some(QueueMedia {
            title: Some(title.to_string()),
        });
        record
    }
}
