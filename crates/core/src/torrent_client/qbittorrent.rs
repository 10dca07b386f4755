//! qBittorrent torrent client implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::QBittorrentConfig;

use super::{Torrent, TorrentClient, TorrentClientError, TorrentState};

/// qBittorrent client implementation.
pub struct QBittorrentClient {
    client: Client,
    config: QBittorrentConfig,
    /// Set once logged in; the session cookie itself lives in the cookie jar.
    session: Arc<RwLock<Option<String>>>,
}

impl QBittorrentClient {
    /// Create a new qBittorrent client.
    pub fn new(config: QBittorrentConfig) -> Result<Self, TorrentClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .cookie_store(true)
            .build()
            .map_err(|e| TorrentClientError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config,
            session: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url(), endpoint)
    }

    /// Login and store session cookie.
    async fn login(&self) -> Result<(), TorrentClientError> {
        let params = [
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self
            .client
            .post(self.url("/api/v2/auth/login"))
            .form(&params)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if body.contains("Ok.") {
            debug!("qBittorrent login successful");
            let mut session = self.session.write().await;
            *session = Some("authenticated".to_string());
            Ok(())
        } else if body.contains("Fails.") || status.as_u16() == 403 {
            Err(TorrentClientError::AuthenticationFailed(
                "Invalid credentials".to_string(),
            ))
        } else {
            Err(TorrentClientError::AuthenticationFailed(format!(
                "Unexpected response: {}",
                body.chars().take(100).collect::<String>()
            )))
        }
    }

    /// Ensure we have a valid session, logging in if needed.
    async fn ensure_authenticated(&self) -> Result<(), TorrentClientError> {
        let session = self.session.read().await;
        if session.is_some() {
            return Ok(());
        }
        drop(session);
        self.login().await
    }

    /// Send an authenticated request, re-authenticating once if the session expired.
    async fn execute<F>(&self, build: F) -> Result<String, TorrentClientError>
    where
        F: Fn() -> RequestBuilder,
    {
        self.ensure_authenticated().await?;

        let mut response = build().send().await.map_err(map_request_error)?;

        if response.status().as_u16() == 403 {
            warn!("qBittorrent session expired, re-authenticating");
            {
                let mut session = self.session.write().await;
                *session = None;
            }
            self.login().await?;

            response = build().send().await.map_err(map_request_error)?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(TorrentClientError::ApiError(format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| TorrentClientError::ApiError(e.to_string()))
    }
}

fn map_request_error(e: reqwest::Error) -> TorrentClientError {
    if e.is_timeout() {
        TorrentClientError::Timeout
    } else if e.is_connect() {
        TorrentClientError::ConnectionFailed(e.to_string())
    } else {
        TorrentClientError::ApiError(e.to_string())
    }
}

/// qBittorrent torrent info response.
///
/// Every field defaults so one odd entry cannot fail the whole listing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QBTorrentInfo {
    hash: String,
    name: String,
    category: String,
    state: String,
    dlspeed: i64,
    num_complete: i64,
}

impl QBTorrentInfo {
    fn into_torrent(self) -> Torrent {
        Torrent {
            hash: self.hash.to_lowercase(),
            name: self.name,
            category: self.category,
            state: TorrentState::from_qbittorrent(&self.state),
            dlspeed: self.dlspeed.max(0) as u64,
            num_complete: self.num_complete.max(0) as u64,
        }
    }
}

fn parse_torrent_list(body: &str) -> Result<Vec<Torrent>, TorrentClientError> {
    let torrents: Vec<QBTorrentInfo> = serde_json::from_str(body)
        .map_err(|e| TorrentClientError::ApiError(format!("Failed to parse response: {}", e)))?;

    Ok(torrents
        .into_iter()
        .filter(|t| !t.hash.is_empty())
        .map(QBTorrentInfo::into_torrent)
        .collect())
}

#[async_trait]
impl TorrentClient for QBittorrentClient {
    fn name(&self) -> &str {
        "qbittorrent"
    }

    async fn list_torrents(&self) -> Result<Vec<Torrent>, TorrentClientError> {
        let url = self.url("/api/v2/torrents/info");
        let body = self
            .execute(|| self.client.get(&url).query(&[("filter", "all")]))
            .await?;

        parse_torrent_list(&body)
    }

    async fn delete_torrent(&self, torrent: &Torrent) -> Result<(), TorrentClientError> {
        let url = self.url("/api/v2/torrents/delete");
        let params = [("hashes", torrent.hash.as_str()), ("deleteFiles", "true")];

        self.execute(|| self.client.post(&url).form(&params)).await?;
        debug!(hash = %torrent.hash, "Deleted torrent from qBittorrent");

        Ok(())
    }

    async fn logout(&self) -> Result<(), TorrentClientError> {
        if self.session.read().await.is_none() {
            return Ok(());
        }

        self.client
            .post(self.url("/api/v2/auth/logout"))
            .send()
            .await
            .map_err(map_request_error)?;

        let mut session = self.session.write().await;
        *session = None;
        Ok(())
    }
}
