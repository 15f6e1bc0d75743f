use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::protocol::PeerAnnouncement;

/// One known remote instance, as stored in the local directory.
///
/// `directory_url` is the natural key: exactly one record exists per URL.
/// `status_code` / `available` are last-observed facts replaced wholesale on every
/// contact attempt (0 = never contacted). `last_sync` is only advanced when an
/// exchange with the peer actually succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerRecord {
    /// Store-assigned identifier, opaque to the engines.
    pub id: String,
    /// The peer's directory endpoint URL. Unique within the store.
    pub directory_url: String,
    pub title: String,
    pub summary: String,
    pub description: String,
    /// Catalog identifiers the peer exposes. May be empty when unknown.
    pub catalog_ids: Vec<String>,
    /// Publication-listing API of this peer. `None` excludes the peer from
    /// federated aggregation.
    pub publications_endpoint: Option<String>,
    /// HTTP status observed on the most recent contact attempt.
    pub status_code: u16,
    /// Reachability observed on the most recent contact attempt.
    pub available: bool,
    /// Whether this peer participates in federated aggregation by default.
    pub is_default: bool,
    /// Epoch seconds of the last successful exchange with this peer.
    pub last_sync: Option<u64>,
}

impl PeerRecord {
    /// Builds a fresh, never-contacted record from a wire announcement.
    ///
    /// The caller must have validated the announcement's directory URL first;
    /// an empty URL here would produce a record that cannot be dedup-matched.
    pub fn from_announcement(announcement: &PeerAnnouncement) -> Self {
        Self {
            id: String::new(),
            directory_url: normalize_url(&announcement.directory_url),
            title: announcement.title.clone(),
            summary: announcement.summary.clone(),
            description: announcement.description.clone(),
            catalog_ids: announcement.catalog_ids.clone(),
            publications_endpoint: announcement
                .publications_endpoint
                .as_deref()
                .filter(|endpoint| !endpoint.trim().is_empty())
                .map(str::to_string),
            status_code: 0,
            available: false,
            is_default: false,
            last_sync: None,
        }
    }

    /// The wire-format entry this record contributes to our served directory.
    pub fn announcement(&self) -> PeerAnnouncement {
        PeerAnnouncement {
            directory_url: self.directory_url.clone(),
            title: self.title.clone(),
            summary: self.summary.clone(),
            description: self.description.clone(),
            catalog_ids: self.catalog_ids.clone(),
            publications_endpoint: self.publications_endpoint.clone(),
        }
    }
}

/// Canonical form of a directory URL used for all equality checks: surrounding
/// whitespace and trailing slashes stripped, so `http://a/dir` and `http://a/dir/`
/// dedup to the same peer.
pub fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

pub fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
