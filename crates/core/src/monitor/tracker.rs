//! Consecutive-hit debounce for bad verdicts.
//!
//! A torrent is only confirmed bad after `required` bad observations in a
//! row. A single healthy observation wipes the streak, and torrents that
//! vanish from the client are forgotten by [`StrikeTracker::cleanup`].

use std::collections::{HashMap, HashSet};

use serde::Serialize;

/// Streak state for one torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrikeEntry {
    pub hits: u32,
    /// Reason given by the latest bad verdict.
    pub reason: String,
    /// Its queue record is gone but the client still holds the torrent.
    pub deregistered: bool,
}

/// A tracked torrent, for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedTorrent {
    pub hash: String,
    pub hits: u32,
    pub reason: String,
    pub deregistered: bool,
}

/// Keyed hit counter, one entry per torrent hash.
#[derive(Debug, Clone)]
pub struct StrikeTracker {
    required: u32,
    entries: HashMap<String, StrikeEntry>,
}

impl StrikeTracker {
    /// `required` is clamped to at least 1.
    pub fn new(required: u32) -> Self {
        Self::with_entries(required, HashMap::new())
    }

    /// Start from an existing store.
    pub fn with_entries(required: u32, entries: HashMap<String, StrikeEntry>) -> Self {
        Self {
            required: required.max(1),
            entries,
        }
    }

    pub fn required(&self) -> u32 {
        self.required
    }

    /// Feed one verdict. Returns true once the streak reaches the threshold.
    pub fn record(&mut self, hash: &str, is_bad: bool, reason: &str) -> bool {
        if !is_bad {
            self.entries.remove(hash);
            return false;
        }

        let entry = self
            .entries
            .entry(hash.to_string())
            .or_insert_with(|| StrikeEntry {
                hits: 0,
                reason: String::new(),
                deregistered: false,
            });
        entry.hits = entry.hits.saturating_add(1);
        entry.reason = reason.to_string();

        entry.hits >= self.required
    }

    /// Forget every torrent that is no longer present in the client.
    pub fn cleanup(&mut self, current_hashes: &HashSet<&str>) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|hash, _| current_hashes.contains(hash.as_str()));
        before - self.entries.len()
    }

    /// Flag a tracked torrent whose queue record was deleted without the
    /// torrent itself going away. Returns false if the hash is not tracked.
    pub fn mark_deregistered(&mut self, hash: &str) -> bool {
        match self.entries.get_mut(hash) {
            Some(entry) => {
                entry.deregistered = true;
                true
            }
            None => false,
        }
    }

    pub fn is_deregistered(&self, hash: &str) -> bool {
        self.entries.get(hash).is_some_and(|e| e.deregistered)
    }

    /// Drop a torrent's streak (after it was removed).
    pub fn clear(&mut self, hash: &str) -> Option<StrikeEntry> {
        self.entries.remove(hash)
    }

    pub fn get(&self, hash: &str) -> Option<&StrikeEntry> {
        self.entries.get(hash)
    }

    pub fn hits(&self, hash: &str) -> u32 {
        self.entries.get(hash).map(|e| e.hits).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tracked torrents, highest streak first.
    pub fn snapshot(&self) -> Vec<TrackedTorrent> {
        let mut tracked: Vec<TrackedTorrent> = self
            .entries
            .iter()
            .map(|(hash, entry)| TrackedTorrent {
                hash: hash.clone(),
                hits: entry.hits,
                reason: entry.reason.clone(),
                deregistered: entry.deregistered,
            })
            .collect();
        tracked.sort_by(|a, b| b.hits.cmp(&a.hits).then_with(|| a.hash.cmp(&b.hash)));
        tracked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streak_confirms_on_required_hit() {
        let mut tracker = StrikeTracker::new(3);

        assert!(!tracker.record("a1", true, "stalled"));
        assert_eq!(tracker.hits("a1"), 1);
        assert!(!tracker.record("a1", true, "stalled"));
        assert_eq!(tracker.hits("a1"), 2);
        assert!(tracker.record("a1", true, "stalled"));
        assert_eq!(tracker.hits("a1"), 3);

        // Stays confirmed while bad readings keep coming.
        assert!(tracker.record("a1", true, "stalled"));
        assert_eq!(tracker.hits("a1"), 4);
    }

    #[test]
    fn test_latest_reason_wins() {
        let mut tracker = StrikeTracker::new(3);
        tracker.record("a1", true, "stalled");
        tracker.record("a1", true, "seedless");

        let entry = tracker.get("a1").unwrap();
        assert_eq!(entry.hits, 2);
        assert_eq!(entry.reason, "seedless");
    }

    #[test]
    fn test_healthy_reading_resets_streak() {
        let mut tracker = StrikeTracker::new(3);
        tracker.record("a1", true, "stalled");
        tracker.record("a1", true, "stalled");

        assert!(!tracker.record("a1", false, ""));
        assert!(tracker.get("a1").is_none());

        tracker.record("a1", true, "stalled");
        assert_eq!(tracker.hits("a1"), 1);
    }

    #[test]
    fn test_healthy_reading_for_unknown_hash_is_noop() {
        let mut tracker = StrikeTracker::new(3);
        assert!(!tracker.record("zz", false, ""));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_single_hit_threshold() {
        let mut tracker = StrikeTracker::new(1);
        assert!(tracker.record("a1", true, "stalled"));
    }

    #[test]
    fn test_zero_threshold_is_clamped() {
        let mut tracker = StrikeTracker::new(0);
        assert_eq!(tracker.required(), 1);
        assert!(tracker.record("a1", true, "stalled"));
    }

    #[test]
    fn test_cleanup_drops_only_missing_hashes() {
        let mut tracker = StrikeTracker::new(3);
        tracker.record("a1", true, "stalled");
        tracker.record("b2", true, "seedless");
        tracker.record("b2", true, "seedless");
        tracker.record("c3", true, "stalled");

        let live: HashSet<&str> = ["b2", "zz"].into_iter().collect();
        let removed = tracker.cleanup(&live);

        assert_eq!(removed, 2);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.get("b2").unwrap().hits, 2);
        assert!(tracker.get("a1").is_none());
        assert!(tracker.get("c3").is_none());
    }

    #[test]
    fn test_clear_and_snapshot() {
        let mut tracker = StrikeTracker::new(5);
        tracker.record("a1", true, "stalled");
        tracker.record("b2", true, "seedless");
        tracker.record("b2", true, "seedless");

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].hash, "b2");
        assert_eq!(snapshot[0].hits, 2);

        let cleared = tracker.clear("b2").unwrap();
        assert_eq!(cleared.hits, 2);
        assert!(tracker.clear("b2").is_none());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_deregistered_flag_survives_bad_readings() {
        let mut tracker = StrikeTracker::new(2);
        assert!(!tracker.mark_deregistered("a1"));

        tracker.record("a1", true, "stalled");
        assert!(tracker.mark_deregistered("a1"));
        tracker.record("a1", true, "seedless");
        assert!(tracker.is_deregistered("a1"));
        assert!(tracker.snapshot()[0].deregistered);

        tracker.record("a1", false, "");
        assert!(!tracker.is_deregistered("a1"));
    }

    #[test]
    fn test_isolated_instances() {
        let mut first = StrikeTracker::new(3);
        let second = StrikeTracker::new(3);
        first.record("a1", true, "stalled");
        assert_eq!(first.hits("a1"), 1);
        assert_eq!(second.hits("a1"), 0);
    }
}
