//! Upstream queue service (Sonarr/Radarr) abstraction.
//!
//! A queue record is one pending grab job. The monitor reads the queue to
//! find the record behind a bad torrent, deregisters and blocklists it, and
//! asks the service to search again.

mod arr;
mod types;

pub use arr::ArrClient;
pub use types::*;
