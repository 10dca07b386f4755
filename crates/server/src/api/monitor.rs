//! Stall monitor API handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use unstall_core::monitor::{MonitorStatus, TrackedTorrent};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Monitor status response
#[derive(Debug, Serialize)]
pub struct MonitorStatusResponse {
    /// Whether a monitor is configured
    pub available: bool,
    /// Monitored categories, in processing order
    pub categories: Vec<String>,
    #[serde(flatten)]
    pub status: MonitorStatus,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct MonitorErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Get monitor status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<MonitorStatusResponse> {
    match state.monitor() {
        Some(monitor) => Json(MonitorStatusResponse {
            available: true,
            categories: monitor
                .services()
                .iter()
                .map(|s| s.category.clone())
                .collect(),
            status: monitor.status().await,
        }),
        None => Json(MonitorStatusResponse {
            available: false,
            categories: Vec::new(),
            status: MonitorStatus::default(),
        }),
    }
}

/// List open streaks
pub async fn list_strikes(State(state): State<Arc<AppState>>) -> Json<Vec<TrackedTorrent>> {
    match state.monitor() {
        Some(monitor) => Json(monitor.strikes().await),
        None => Json(Vec::new()),
    }
}

/// Run one cycle now
pub async fn run_cycle(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let Some(monitor) = state.monitor() else {
        return (
            StatusCode::CONFLICT,
            Json(MonitorErrorResponse {
                error: "Monitor not available".to_string(),
            }),
        )
            .into_response();
    };

    match monitor.trigger().await {
        Ok(report) => Json(report).into_response(),
        // Every cycle error is an upstream transport or API failure.
        Err(e) => {
            (
                StatusCode::BAD_GATEWAY,
                Json(MonitorErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
