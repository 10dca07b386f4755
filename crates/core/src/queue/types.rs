//! Types for queue service operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to a queue service.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,
}

/// Where a queue service lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    /// Base URL without the `/api/v3` suffix.
    pub url: String,
    pub api_key: String,
}

impl ServiceEndpoint {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

/// Episode details attached to a Sonarr queue record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEpisode {
    #[serde(default)]
    pub episode_number: Option<u32>,
}

/// Series or movie summary attached to a queue record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueMedia {
    #[serde(default)]
    pub title: Option<String>,
}

/// One entry of the service's download queue.
///
/// Sonarr and Radarr share this shape; every field is optional because the
/// two services populate different subsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub download_id: Option<String>,
    #[serde(default)]
    pub series_id: Option<i64>,
    #[serde(default)]
    pub movie_id: Option<i64>,
    #[serde(default)]
    pub season_number: Option<u32>,
    #[serde(default)]
    pub episode: Option<QueueEpisode>,
    #[serde(default)]
    pub series: Option<QueueMedia>,
    #[serde(default)]
    pub movie: Option<QueueMedia>,
}

impl QueueRecord {
    /// Human-facing name: series title, then movie title, then release title.
    pub fn display_title(&self) -> &str {
        self.series
            .as_ref()
            .and_then(|s| s.title.as_deref())
            .or_else(|| self.movie.as_ref().and_then(|m| m.title.as_deref()))
            .or(self.title.as_deref())
            .unwrap_or("<untitled>")
    }
}

/// One page of the queue endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuePage {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total_records: Option<u32>,
    #[serde(default)]
    pub records: Option<Vec<QueueRecord>>,
}

impl QueuePage {
    pub fn from_records(records: Vec<QueueRecord>) -> Self {
        Self {
            page: Some(1),
            total_records: Some(records.len() as u32),
            records: Some(records),
        }
    }
}

/// Trait for queue service backends.
#[async_trait]
pub trait QueueService: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Fetch the current queue. `None` means the service returned nothing usable.
    async fn get_queue(&self, endpoint: &ServiceEndpoint)
        -> Result<Option<QueuePage>, QueueError>;

    /// Remove a record from the queue.
    async fn delete_queue_element(
        &self,
        endpoint: &ServiceEndpoint,
        record: &QueueRecord,
        remove_from_client: bool,
        blocklist: bool,
    ) -> Result<(), QueueError>;

    /// Search for every missing episode of one season.
    async fn search_season(
        &self,
        endpoint: &ServiceEndpoint,
        series_id: i64,
        season_number: u32,
    ) -> Result<(), QueueError>;

    /// Search for one movie.
    async fn search_movie(&self, endpoint: &ServiceEndpoint, movie_id: i64)
        -> Result<(), QueueError>;
}
