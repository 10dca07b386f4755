//! Types for torrent client operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during torrent client operations.
#[derive(Debug, Error)]
pub enum TorrentClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,
}

/// State of a torrent, as far as stall detection cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TorrentState {
    /// Actively downloading from peers.
    Downloading,
    /// Downloading but no data is flowing.
    StalledDownload,
    /// Still fetching metadata (magnet without info dict yet).
    MetadataDownload,
    /// Seeding, paused, queued, checking, errored, ...
    Other,
}

impl TorrentState {
    /// Parse a qBittorrent state string.
    pub fn from_qbittorrent(state: &str) -> Self {
        match state {
            "downloading" => TorrentState::Downloading,
            "stalledDL" => TorrentState::StalledDownload,
            "metaDL" => TorrentState::MetadataDownload,
            _ => TorrentState::Other,
        }
    }

    /// Returns the string representation for API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            TorrentState::Downloading => "downloading",
            TorrentState::StalledDownload => "stalled_download",
            TorrentState::MetadataDownload => "metadata_download",
            TorrentState::Other => "other",
        }
    }
}

/// One torrent as observed in the current cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Torrent {
    /// Info hash (lowercase hex).
    pub hash: String,
    /// Torrent name.
    pub name: String,
    /// Category/label (empty when unset).
    pub category: String,
    /// Current state.
    pub state: TorrentState,
    /// Current download speed in bytes/second.
    pub dlspeed: u64,
    /// Number of peers holding a complete copy.
    pub num_complete: u64,
}

/// Trait for torrent client backends.
#[async_trait]
pub trait TorrentClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Full snapshot of all torrents, unfiltered.
    async fn list_torrents(&self) -> Result<Vec<Torrent>, TorrentClientError>;

    /// Remove a torrent from the client and delete its files.
    async fn delete_torrent(&self, torrent: &Torrent) -> Result<(), TorrentClientError>;

    /// End the client session, if the backend keeps one.
    async fn logout(&self) -> Result<(), TorrentClientError> {
        Ok(())
    }
}
