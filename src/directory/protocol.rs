//! Directory Wire Protocol
//!
//! Defines the endpoint paths and Data Transfer Objects (DTOs) of the peer-to-peer
//! directory protocol. Every instance speaks both sides of it:
//!
//! - `GET /directory` returns the instance's known directory (self entry first).
//! - `POST /directory` accepts an unsolicited self-announcement from another
//!   instance and registers it as a peer.
//! - `GET <publications_endpoint>` returns an instance's publication list, consumed
//!   by the aggregation engine.
//!
//! Announcements are deliberately lenient: unknown fields are ignored and missing
//! descriptive fields default to empty. Only the directory URL is a hard
//! precondition, because a peer without it cannot be dedup-matched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::normalize_url;

// --- API Endpoints ---

/// Directory listing (GET) and peer registration (POST).
pub const ENDPOINT_DIRECTORY: &str = "/directory";
/// Federated publication search across all eligible peers.
pub const ENDPOINT_FEDERATION_PUBLICATIONS: &str = "/federation/publications";

// --- Data Transfer Objects ---

/// One directory entry: how an instance describes itself (or a peer it knows)
/// on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerAnnouncement {
    /// The announced instance's directory endpoint. Natural key; required.
    #[serde(default, rename = "directoryUrl")]
    pub directory_url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "catalogIds")]
    pub catalog_ids: Vec<String>,
    #[serde(default, rename = "publicationsEndpoint")]
    pub publications_endpoint: Option<String>,
}

impl PeerAnnouncement {
    /// The normalized directory URL, or `None` when the announcement lacks one
    /// and must be rejected as a protocol error.
    pub fn normalized_url(&self) -> Option<String> {
        let url = normalize_url(&self.directory_url);
        if url.is_empty() { None } else { Some(url) }
    }
}

/// Response shape of `GET /directory`.
///
/// `results` is intentionally not defaulted: a body without it is malformed and
/// must count as a fetch failure, never as "zero peers discovered".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryResponse {
    pub results: Vec<PeerAnnouncement>,
}

/// Response shape of a peer's publication endpoint. Publication objects are
/// passed through untyped; only the enclosing list shape is validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationsResponse {
    pub results: Vec<Value>,
}

/// Acknowledgment for an incoming registration POST.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
}
