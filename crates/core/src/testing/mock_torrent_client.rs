//! Mock torrent client for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::torrent_client::{Torrent, TorrentClient, TorrentClientError};

/// Mock implementation of the TorrentClient trait.
///
/// Provides controllable behavior for testing:
/// - Script the torrent list each cycle observes
/// - Track deleted torrents for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// let client = MockTorrentClient::new();
/// client.set_torrents(vec![fixtures::torrent("abc", "Show.S01E01", "tv-sonarr", TorrentState::StalledDownload)]).await;
///
/// // ... run a cycle ...
///
/// assert_eq!(client.deleted_hashes().await, vec!["abc".to_string()]);
/// ```
#[derive(Debug)]
pub struct MockTorrentClient {
    /// Torrents returned by list_torrents.
    torrents: Arc<RwLock<Vec<Torrent>>>,
    /// Recorded delete_torrent calls.
    deleted: Arc<RwLock<Vec<String>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<TorrentClientError>>>,
    /// If set, the next delete_torrent will fail with this error.
    next_delete_error: Arc<RwLock<Option<TorrentClientError>>>,
    list_calls: Arc<RwLock<usize>>,
    logged_out: Arc<RwLock<bool>>,
}

impl Default for MockTorrentClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTorrentClient {
    /// Create a new mock torrent client with no torrents.
    pub fn new() -> Self {
        Self {
            torrents: Arc::new(RwLock::new(Vec::new())),
            deleted: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            next_delete_error: Arc::new(RwLock::new(None)),
            list_calls: Arc::new(RwLock::new(0)),
            logged_out: Arc::new(RwLock::new(false)),
        }
    }

    /// Replace the torrent list.
    pub async fn set_torrents(&self, torrents: Vec<Torrent>) {
        *self.torrents.write().await = torrents;
    }

    /// Replace one torrent (matched by hash), or append it.
    pub async fn upsert_torrent(&self, torrent: Torrent) {
        let mut torrents = self.torrents.write().await;
        match torrents.iter_mut().find(|t| t.hash == torrent.hash) {
            Some(existing) => *existing = torrent,
            None => torrents.push(torrent),
        }
    }

    /// Current torrent list.
    pub async fn torrents(&self) -> Vec<Torrent> {
        self.torrents.read().await.clone()
    }

    /// Hashes passed to delete_torrent, in call order.
    pub async fn deleted_hashes(&self) -> Vec<String> {
        self.deleted.read().await.clone()
    }

    pub async fn list_calls(&self) -> usize {
        *self.list_calls.read().await
    }

    pub async fn logged_out(&self) -> bool {
        *self.logged_out.read().await
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: TorrentClientError) {
        *self.next_error.write().await = Some(error);
    }

    /// Fail only the next delete, leaving listing untouched.
    pub async fn set_next_delete_error(&self, error: TorrentClientError) {
        *self.next_delete_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<TorrentClientError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl TorrentClient for MockTorrentClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_torrents(&self) -> Result<Vec<Torrent>, TorrentClientError> {
        *self.list_calls.write().await += 1;
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        Ok(self.torrents.read().await.clone())
    }

    async fn delete_torrent(&self, torrent: &Torrent) -> Result<(), TorrentClientError> {
        if let Some(err) = self.next_delete_error.write().await.take() {
            return Err(err);
        }
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.deleted.write().await.push(torrent.hash.clone());
        // Deleting an unknown hash is not an error in qBittorrent either.
        self.torrents.write().await.retain(|t| t.hash != torrent.hash);
        Ok(())
    }

    async fn logout(&self) -> Result<(), TorrentClientError> {
        *self.logged_out.write().await = true;
        Ok(())
    }
}
