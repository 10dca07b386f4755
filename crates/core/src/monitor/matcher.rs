//! Associating torrents with queue records.
//!
//! qBittorrent and the *arr services name the same download differently and
//! share no key, so matching is a title heuristic. Substring containment can
//! give false positives when one release title is contained in an unrelated
//! one.

use crate::queue::QueueRecord;
use crate::torrent_client::Torrent;

/// Strategy deciding whether a torrent name and a queue title are the same download.
pub trait TitleMatcher: Send + Sync {
    /// Strategy name for logging.
    fn name(&self) -> &str;

    fn matches(&self, torrent_name: &str, record_title: &str) -> bool;
}

/// Either string containing the other counts as a match.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl TitleMatcher for SubstringMatcher {
    fn name(&self) -> &str {
        "substring"
    }

    fn matches(&self, torrent_name: &str, record_title: &str) -> bool {
        if torrent_name.is_empty() || record_title.is_empty() {
            return false;
        }
        record_title.contains(torrent_name) || torrent_name.contains(record_title)
    }
}

/// First queue record the matcher accepts for this torrent.
pub fn find_match<'a>(
    matcher: &dyn TitleMatcher,
    torrent: &Torrent,
    records: &'a [QueueRecord],
) -> Option<&'a QueueRecord> {
    records.iter().find(|record| {
        record
            .title
            .as_deref()
            .is_some_and(|title| matcher.matches(&torrent.name, title))
    })
}
