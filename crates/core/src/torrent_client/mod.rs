//! Torrent client abstraction.
//!
//! The monitor only needs two things from a client: a full snapshot of the
//! current torrents and the ability to delete one together with its files.

mod qbittorrent;
mod types;

pub use qbittorrent::QBittorrentClient;
pub use types::*;
