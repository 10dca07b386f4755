//! In-process API tests against mock clients.

mod common;

use axum::http::StatusCode;
use common::{fixtures, TestFixture};
use unstall_core::{queue::QueuePage, testing::QueueCall, TorrentClientError, TorrentState};

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/config").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["qbittorrent"]["password_configured"], true);
    assert_eq!(response.body["services"][0]["kind"], "series");
    assert_eq!(response.body["services"][0]["api_key_configured"], true);
    assert!(!response.text.contains("hunter2"));
    assert!(!response.text.contains("sonarr-secret"));
}

#[tokio::test]
async fn test_status_before_first_cycle() {
    let fixture = TestFixture::with_hits(3);

    let response = fixture.get("/api/v1/monitor/status").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["available"], true);
    assert_eq!(response.body["running"], false);
    assert_eq!(response.body["consecutive_hits_required"], 3);
    assert_eq!(response.body["categories"][0], "tv-sonarr");
    assert!(response.body["last_report"].is_null());
}

#[tokio::test]
async fn test_run_cycle_tracks_strikes() {
    let fixture = TestFixture::with_hits(3);
    fixture
        .torrent_client
        .set_torrents(vec![fixtures::torrent(
            "abc",
            "Show.S01E01",
            "tv-sonarr",
            TorrentState::StalledDownload,
        )])
        .await;

    let response = fixture.post("/api/v1/monitor/run").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["flagged"], 1);
    assert_eq!(response.body["confirmed"], 0);

    let strikes = fixture.get("/api/v1/monitor/strikes").await;
    assert_eq!(strikes.status, StatusCode::OK);
    assert_eq!(strikes.body[0]["hash"], "abc");
    assert_eq!(strikes.body[0]["hits"], 1);
    assert_eq!(strikes.body[0]["reason"], "stalled");

    let status = fixture.get("/api/v1/monitor/status").await;
    assert_eq!(status.body["tracked_torrents"], 1);
    assert_eq!(status.body["cycles_completed"], 1);
}

#[tokio::test]
async fn test_run_cycle_removes_confirmed_torrent() {
    let fixture = TestFixture::new();
    fixture
        .torrent_client
        .set_torrents(vec![fixtures::torrent(
            "abc",
            "Show.S01E04",
            "tv-sonarr",
            TorrentState::MetadataDownload,
        )])
        .await;
    fixture
        .queue
        .set_queue(Some(QueuePage::from_records(vec![
            fixtures::episode_record(9, "Show.S01E04.1080p", 5, 1, 4),
        ])))
        .await;

    let response = fixture.post("/api/v1/monitor/run").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["removed"][0]["hash"], "abc");
    assert_eq!(
        response.body["removed"][0]["reason"],
        "stuck downloading metadata"
    );
    assert_eq!(
        fixture.queue.calls().await.last(),
        Some(&QueueCall::SearchSeason {
            series_id: 5,
            season_number: 1,
        })
    );
}

#[tokio::test]
async fn test_run_cycle_transport_error_is_bad_gateway() {
    let fixture = TestFixture::new();
    fixture
        .torrent_client
        .set_next_error(TorrentClientError::ConnectionFailed("refused".to_string()))
        .await;

    let response = fixture.post("/api/v1/monitor/run").await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("refused"));
}

#[tokio::test]
async fn test_run_cycle_without_monitor_is_conflict() {
    let fixture = TestFixture::without_monitor();

    let response = fixture.post("/api/v1/monitor/run").await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let status = fixture.get("/api/v1/monitor/status").await;
    assert_eq!(status.body["available"], false);

    let strikes = fixture.get("/api/v1/monitor/strikes").await;
    assert_eq!(strikes.body, serde_json::json!([]));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new();
    fixture.post("/api/v1/monitor/run").await;

    let response = fixture.get("/metrics").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("unstall_cycles_total"));
    assert!(response.text.contains("unstall_tracked_torrents"));
    assert!(response.text.contains("unstall_http_requests_total"));
}
