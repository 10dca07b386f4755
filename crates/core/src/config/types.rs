use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::monitor::MediaKind;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub qbittorrent: QBittorrentConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// One entry per monitored torrent category.
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// qBittorrent Web API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QBittorrentConfig {
    /// Base URL (e.g., "http://localhost:8080")
    pub url: String,
    pub username: String,
    pub password: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Detection and debounce settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorConfig {
    /// Run the periodic cycle loop. When disabled, cycles only run on demand via the API.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between two cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Downloads slower than this (kB/s) are flagged. Absent = no speed floor.
    #[serde(default)]
    pub min_download_speed_kbps: Option<f64>,

    /// Consecutive bad observations needed before a torrent is removed.
    #[serde(default = "default_hits_required")]
    pub consecutive_hits_required: u32,
}

fn default_enabled() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    600
}

fn default_hits_required() -> u32 {
    3
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            poll_interval_secs: default_poll_interval(),
            min_download_speed_kbps: None,
            consecutive_hits_required: default_hits_required(),
        }
    }
}

/// An upstream queue service (Sonarr, Radarr, ...) owning one torrent category.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Display name used in logs (e.g., "sonarr").
    pub name: String,
    /// qBittorrent category whose torrents belong to this service.
    pub category: String,
    /// Service base URL (e.g., "http://localhost:8989")
    pub url: String,
    pub api_key: String,
    /// Removal policy override. Defaults to the built-in category table.
    #[serde(default)]
    pub kind: Option<MediaKind>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl ServiceConfig {
    /// Removal policy variant for this service's torrents.
    pub fn media_kind(&self) -> MediaKind {
        self.kind
            .unwrap_or_else(|| MediaKind::for_category(&self.category))
    }
}

fn default_timeout() -> u32 {
    30
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub qbittorrent: SanitizedQBittorrentConfig,
    pub monitor: MonitorConfig,
    pub services: Vec<SanitizedServiceConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedQBittorrentConfig {
    pub url: String,
    pub username: String,
    pub password_configured: bool,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedServiceConfig {
    pub name: String,
    pub category: String,
    pub url: String,
    pub kind: MediaKind,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            qbittorrent: SanitizedQBittorrentConfig {
                url: config.qbittorrent.url.clone(),
                username: config.qbittorrent.username.clone(),
                password_configured: !config.qbittorrent.password.is_empty(),
                timeout_secs: config.qbittorrent.timeout_secs,
            },
            monitor: config.monitor.clone(),
            services: config
                .services
                .iter()
                .map(|s| SanitizedServiceConfig {
                    name: s.name.clone(),
                    category: s.category.clone(),
                    url: s.url.clone(),
                    kind: s.media_kind(),
                    api_key_configured: !s.api_key.is_empty(),
                })
                .collect(),
        }
    }
}
