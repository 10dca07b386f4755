//! Mock queue service for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::queue::{QueueError, QueuePage, QueueRecord, QueueService, ServiceEndpoint};

/// A recorded mutating call, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCall {
    DeleteQueueElement {
        record_id: Option<i64>,
        remove_from_client: bool,
        blocklist: bool,
    },
    SearchSeason {
        series_id: i64,
        season_number: u32,
    },
    SearchMovie {
        movie_id: i64,
    },
}

/// Mock implementation of the QueueService trait.
///
/// Serves a scripted queue page and records every delete and search call
/// together with the endpoint it was sent to. Deleted records are dropped
/// from the scripted page.
#[derive(Debug)]
pub struct MockQueueService {
    queue: Arc<RwLock<Option<QueuePage>>>,
    calls: Arc<RwLock<Vec<(String, QueueCall)>>>,
    queue_fetches: Arc<RwLock<usize>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<QueueError>>>,
}

impl Default for MockQueueService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockQueueService {
    /// Create a mock whose queue is empty (no page at all).
    pub fn new() -> Self {
        Self {
            queue: Arc::new(RwLock::new(None)),
            calls: Arc::new(RwLock::new(Vec::new())),
            queue_fetches: Arc::new(RwLock::new(0)),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a mock serving one page with the given records.
    pub fn with_records(records: Vec<QueueRecord>) -> Self {
        Self {
            queue: Arc::new(RwLock::new(Some(QueuePage::from_records(records)))),
            ..Self::new()
        }
    }

    /// Replace the page returned by get_queue.
    pub async fn set_queue(&self, page: Option<QueuePage>) {
        *self.queue.write().await = page;
    }

    /// Recorded calls, without endpoints.
    pub async fn calls(&self) -> Vec<QueueCall> {
        self.calls
            .read()
            .await
            .iter()
            .map(|(_, call)| call.clone())
            .collect()
    }

    /// Recorded calls with the endpoint URL each was sent to.
    pub async fn calls_with_endpoints(&self) -> Vec<(String, QueueCall)> {
        self.calls.read().await.clone()
    }

    pub async fn queue_fetches(&self) -> usize {
        *self.queue_fetches.read().await
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: QueueError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<QueueError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, endpoint: &ServiceEndpoint, call: QueueCall) {
        self.calls
            .write()
            .await
            .push((endpoint.url.clone(), call));
    }
}

#[async_trait]
impl QueueService for MockQueueService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_queue(
        &self,
        _endpoint: &ServiceEndpoint,
    ) -> Result<Option<QueuePage>, QueueError> {
        *self.queue_fetches.write().await += 1;
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        Ok(self.queue.read().await.clone())
    }

    async fn delete_queue_element(
        &self,
        endpoint: &ServiceEndpoint,
        record: &QueueRecord,
        remove_from_client: bool,
        blocklist: bool,
    ) -> Result<(), QueueError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(
            endpoint,
            QueueCall::DeleteQueueElement {
                record_id: record.id,
                remove_from_client,
                blocklist,
            },
        )
        .await;

        // A deregistered record is gone from the next fetch.
        if let Some(records) = self
            .queue
            .write()
            .await
            .as_mut()
            .and_then(|page| page.records.as_mut())
        {
            records.retain(|r| r.id != record.id);
        }
        Ok(())
    }

    async fn search_season(
        &self,
        endpoint: &ServiceEndpoint,
        series_id: i64,
        season_number: u32,
    ) -> Result<(), QueueError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(
            endpoint,
            QueueCall::SearchSeason {
                series_id,
                season_number,
            },
        )
        .await;
        Ok(())
    }

    async fn search_movie(
        &self,
        endpoint: &ServiceEndpoint,
        movie_id: i64,
    ) -> Result<(), QueueError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(endpoint, QueueCall::SearchMovie { movie_id }).await;
        Ok(())
    }
}
