//! Stall detection and removal.
//!
//! A cycle runs in four steps:
//! - **Classify**: each torrent of a monitored category is judged healthy or bad
//! - **Debounce**: a bad verdict only counts after N consecutive cycles
//! - **Match**: confirmed torrents are paired with a queue record by title
//! - **Remove**: the queue record is deregistered and blocklisted, and the
//!   release is searched again where the category supports it

mod classifier;
mod episode;
mod matcher;
mod removal;
mod runner;
mod tracker;
mod types;

pub use classifier::{BadReason, Classifier, Verdict};
pub use episode::{parse_episode_number, parse_season_number};
pub use matcher::{find_match, SubstringMatcher, TitleMatcher};
pub use removal::{
    MediaKind, RemovalCoordinator, RemovalDecision, RemovalOutcome, RemovalPlan, Research,
};
pub use runner::Monitor;
pub use tracker::{StrikeEntry, StrikeTracker, TrackedTorrent};
pub use types::{CycleReport, MonitorError, MonitorStatus, MonitoredService};
