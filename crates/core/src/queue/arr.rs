//! Sonarr/Radarr (API v3) queue service implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;
use tracing::{debug, warn};

use super::{QueueError, QueuePage, QueueRecord, QueueService, ServiceEndpoint};

/// Records requested per queue fetch. The whole queue is needed in one go.
const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Client for the *arr family of media managers.
pub struct ArrClient {
    client: Client,
    page_size: u32,
}

impl ArrClient {
    /// Create a new client with the given request timeout.
    pub fn new(timeout_secs: u32) -> Result<Self, QueueError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .build()
            .map_err(|e| QueueError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Override the queue page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn api_url(endpoint: &ServiceEndpoint, path: &str) -> String {
        format!("{}/api/v3{}", endpoint.url.trim_end_matches('/'), path)
    }

    async fn send(
        &self,
        endpoint: &ServiceEndpoint,
        request: RequestBuilder,
    ) -> Result<Response, QueueError> {
        let response = request
            .header("X-Api-Key", &endpoint.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QueueError::Timeout
                } else if e.is_connect() {
                    QueueError::ConnectionFailed(e.to_string())
                } else {
                    QueueError::ApiError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QueueError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(response)
    }

    async fn command(
        &self,
        endpoint: &ServiceEndpoint,
        body: serde_json::Value,
    ) -> Result<(), QueueError> {
        let request = self
            .client
            .post(Self::api_url(endpoint, "/command"))
            .json(&body);
        self.send(endpoint, request).await?;
        Ok(())
    }
}

/// Parse a queue response body, treating anything unusable as "no queue".
fn parse_queue_body(body: &str) -> Option<QueuePage> {
    if body.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<QueuePage>(body) {
        Ok(page) => Some(page),
        Err(e) => {
            warn!("Ignoring unparsable queue response: {}", e);
            None
        }
    }
}

#[async_trait]
impl QueueService for ArrClient {
    fn name(&self) -> &str {
        "arr"
    }

    async fn get_queue(
        &self,
        endpoint: &ServiceEndpoint,
    ) -> Result<Option<QueuePage>, QueueError> {
        let page_size = self.page_size.to_string();
        let request = self.client.get(Self::api_url(endpoint, "/queue")).query(&[
            ("page", "1"),
            ("pageSize", page_size.as_str()),
            ("includeSeries", "true"),
            ("includeEpisode", "true"),
            ("includeMovie", "true"),
        ]);

        let body = self
            .send(endpoint, request)
            .await?
            .text()
            .await
            .map_err(|e| QueueError::ApiError(e.to_string()))?;

        let page = parse_queue_body(&body);
        debug!(
            url = %endpoint.url,
            records = page.as_ref().and_then(|p| p.records.as_ref()).map(Vec::len),
            "Fetched queue"
        );
        Ok(page)
    }

    async fn delete_queue_element(
        &self,
        endpoint: &ServiceEndpoint,
        record: &QueueRecord,
        remove_from_client: bool,
        blocklist: bool,
    ) -> Result<(), QueueError> {
        let id = record.id.ok_or_else(|| {
            QueueError::ApiError(format!(
                "queue record '{}' has no id",
                record.display_title()
            ))
        })?;

        let request = self
            .client
            .delete(Self::api_url(endpoint, &format!("/queue/{}", id)))
            .query(&[
                ("removeFromClient", remove_from_client.to_string()),
                ("blocklist", blocklist.to_string()),
            ]);
        self.send(endpoint, request).await?;
        Ok(())
    }

    async fn search_season(
        &self,
        endpoint: &ServiceEndpoint,
        series_id: i64,
        season_number: u32,
    ) -> Result<(), QueueError> {
        self.command(
            endpoint,
            json!({
                "name": "SeasonSearch",
                "seriesId": series_id,
                "seasonNumber": season_number,
            }),
        )
        .await
    }

    async fn search_movie(
        &self,
        endpoint: &ServiceEndpoint,
        movie_id: i64,
    ) -> Result<(), QueueError> {
        self.command(
            endpoint,
            json!({
                "name": "MoviesSearch",
                "movieIds": [movie_id],
            }),
        )
        .await
    }
}
