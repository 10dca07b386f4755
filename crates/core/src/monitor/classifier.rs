//! Per-torrent health rules.

use std::fmt;

use serde::Serialize;

use crate::torrent_client::{Torrent, TorrentState};

/// Why a torrent was judged bad.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BadReason {
    Stalled,
    StuckMetadata,
    Slow { kbps: f64 },
    Seedless,
}

impl BadReason {
    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            BadReason::Stalled => "stalled",
            BadReason::StuckMetadata => "stuck_metadata",
            BadReason::Slow { .. } => "slow",
            BadReason::Seedless => "seedless",
        }
    }
}

impl fmt::Display for BadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadReason::Stalled => write!(f, "stalled"),
            BadReason::StuckMetadata => write!(f, "stuck downloading metadata"),
            BadReason::Slow { kbps } => write!(f, "slow ({:?}kb/s)", kbps),
            BadReason::Seedless => write!(f, "seedless"),
        }
    }
}

/// Outcome of classifying one torrent.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Healthy,
    Bad(BadReason),
}

impl Verdict {
    pub fn is_bad(&self) -> bool {
        matches!(self, Verdict::Bad(_))
    }

    /// Human-readable reason; empty for healthy torrents.
    pub fn reason(&self) -> String {
        match self {
            Verdict::Healthy => String::new(),
            Verdict::Bad(reason) => reason.to_string(),
        }
    }
}

/// Stateless rule set deciding whether a torrent is stuck or too slow.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    min_speed_kbps: Option<f64>,
}

impl Classifier {
    /// `min_speed_kbps` of `None` disables the speed floor.
    pub fn new(min_speed_kbps: Option<f64>) -> Self {
        Self { min_speed_kbps }
    }

    pub fn min_speed_kbps(&self) -> Option<f64> {
        self.min_speed_kbps
    }

    /// Rules are checked in order; the first one that applies wins.
    pub fn classify(&self, torrent: &Torrent) -> Verdict {
        let kbps = torrent.dlspeed as f64 / 1024.0;

        match torrent.state {
            TorrentState::StalledDownload => Verdict::Bad(BadReason::Stalled),
            TorrentState::MetadataDownload => Verdict::Bad(BadReason::StuckMetadata),
            TorrentState::Downloading => match self.min_speed_kbps {
                Some(floor) if kbps < floor => Verdict::Bad(BadReason::Slow { kbps }),
                _ if torrent.num_complete == 0 => Verdict::Bad(BadReason::Seedless),
                _ => Verdict::Healthy,
            },
            TorrentState::Other => Verdict::Healthy,
        }
    }
}
