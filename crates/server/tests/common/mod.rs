//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with a monitor wired to mock clients, so the API can be exercised without
//! qBittorrent or an *arr instance.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use unstall_core::{
    config::{QBittorrentConfig, ServerConfig},
    testing::{MockQueueService, MockTorrentClient},
    Config, MediaKind, Monitor, MonitorConfig, MonitoredService, ServiceConfig, ServiceEndpoint,
};
use unstall_server::state::AppState;

/// Re-export fixtures for test convenience
pub use unstall_core::testing::fixtures;

/// Test fixture with a Sonarr-style service on `tv-sonarr`.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_run_cycle() {
///     let fixture = TestFixture::new();
///     let response = fixture.post("/api/v1/monitor/run").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock torrent client - script the torrent list
    pub torrent_client: Arc<MockTorrentClient>,
    /// Mock queue service - script the queue
    pub queue: Arc<MockQueueService>,
    pub monitor: Option<Arc<Monitor>>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

/// Configuration used by every fixture.
pub fn test_config(hits_required: u32) -> Config {
    Config {
        server: ServerConfig {
            host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            port: 0, // Not used for in-process testing
        },
        qbittorrent: QBittorrentConfig {
            url: "http://qbittorrent:8080".to_string(),
            username: "admin".to_string(),
            password: "hunter2".to_string(),
            timeout_secs: 30,
        },
        monitor: MonitorConfig {
            enabled: false,
            consecutive_hits_required: hits_required,
            ..Default::default()
        },
        services: vec![ServiceConfig {
            name: "sonarr".to_string(),
            category: "tv-sonarr".to_string(),
            url: "http://sonarr:8989".to_string(),
            api_key: "sonarr-secret".to_string(),
            kind: None,
            timeout_secs: 30,
        }],
    }
}

impl TestFixture {
    /// Create a fixture whose monitor confirms after one bad observation.
    pub fn new() -> Self {
        Self::with_hits(1)
    }

    pub fn with_hits(hits_required: u32) -> Self {
        let config = test_config(hits_required);
        let torrent_client = Arc::new(MockTorrentClient::new());
        let queue = Arc::new(MockQueueService::new());

        let services = vec![MonitoredService {
            name: "sonarr".to_string(),
            category: "tv-sonarr".to_string(),
            kind: MediaKind::Series,
            endpoint: ServiceEndpoint::new("http://sonarr:8989", "sonarr-secret"),
            queue: Arc::clone(&queue) as Arc<dyn unstall_core::QueueService>,
        }];
        let monitor = Arc::new(Monitor::new(
            config.monitor.clone(),
            Arc::clone(&torrent_client) as Arc<dyn unstall_core::TorrentClient>,
            services,
        ));

        let state = Arc::new(AppState::new(config, Some(Arc::clone(&monitor))));

        Self {
            router: unstall_server::api::create_router(state),
            torrent_client,
            queue,
            monitor: Some(monitor),
        }
    }

    /// Create a fixture without a monitor.
    pub fn without_monitor() -> Self {
        let state = Arc::new(AppState::new(test_config(1), None));

        Self {
            router: unstall_server::api::create_router(state),
            torrent_client: Arc::new(MockTorrentClient::new()),
            queue: Arc::new(MockQueueService::new()),
            monitor: None,
        }
    }

    /// Send a GET request to the test router.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    /// Send a POST request without a body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path).await
    }

    async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}
