//! Season/episode extraction from queue records.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::queue::QueueRecord;

/// `S01E02`, `s01.e02`, `S01-E02`: season, up to two separator characters, episode.
static SEASON_EPISODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)s(\d{2,})\S{0,2}?e(\d{2,})").expect("valid regex"));

/// Bare `S01`, e.g. season packs.
static SEASON_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)s(\d{2,})").expect("valid regex"));

/// Season of a queue record: the structured field if present, else parsed from the title.
pub fn parse_season_number(record: &QueueRecord) -> Option<u32> {
    if let Some(season) = record.season_number {
        return Some(season);
    }

    let title = record.title.as_deref()?;
    if let Some(caps) = SEASON_EPISODE.captures(title) {
        return caps.get(1)?.as_str().parse().ok();
    }

    SEASON_ONLY.captures(title)?.get(1)?.as_str().parse().ok()
}

/// Episode of a queue record: the structured field if present, else parsed from the title.
pub fn parse_episode_number(record: &QueueRecord) -> Option<u32> {
    if let Some(episode) = record.episode.as_ref().and_then(|e| e.episode_number) {
        return Some(episode);
    }

    let title = record.title.as_deref()?;
    SEASON_EPISODE.captures(title)?.get(2)?.as_str().parse().ok()
}
