pub mod config;
pub mod metrics;
pub mod monitor;
pub mod queue;
pub mod testing;
pub mod torrent_client;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, MonitorConfig,
    SanitizedConfig, ServiceConfig,
};
pub use monitor::{
    BadReason, Classifier, CycleReport, MediaKind, Monitor, MonitorError, MonitorStatus,
    MonitoredService, RemovalPlan, StrikeTracker, TitleMatcher, Verdict,
};
pub use queue::{ArrClient, QueueError, QueueRecord, QueueService, ServiceEndpoint};
pub use torrent_client::{QBittorrentClient, Torrent, TorrentClient, TorrentClientError, TorrentState};
