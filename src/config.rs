//! Instance Configuration
//!
//! Process-wide configuration loaded once at startup from a JSON file. Covers the
//! identity this node announces to its peers, the outbound HTTP budget, the two
//! background scheduler intervals, and the optional seed peers used to bootstrap
//! into an existing mesh.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::directory::protocol::PeerAnnouncement;

/// How this instance describes itself on the wire. The directory URL doubles
/// as the self-identity used to break announcement cycles, so it is a hard
/// startup requirement.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceIdentity {
    pub directory_url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub catalog_ids: Vec<String>,
    #[serde(default)]
    pub publications_endpoint: Option<String>,
}

impl InstanceIdentity {
    /// The announcement payload broadcast to peers and served as the first
    /// entry of our own directory.
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

/// Outbound HTTP budget shared by all three engines.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Per-call timeout in seconds. Short by design: a struggling peer is
    /// retried on the next scheduled cycle, never immediately.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Extra headers attached to every outbound request.
    #[serde(default)]
    pub extra_headers: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            extra_headers: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub instance: InstanceIdentity,
    #[serde(default)]
    pub http: HttpConfig,
    /// Directory reconciliation interval. Hourly by default.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
    /// Self-announcement interval. Every four hours by default.
    #[serde(default = "default_broadcast_interval_secs")]
    pub broadcast_interval_secs: u64,
    /// Directory URLs of peers to register at startup.
    #[serde(default)]
    pub seeds: Vec<String>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.instance.directory_url.trim().is_empty() {
            bail!("instance.directory_url must be configured");
        }
        if self.http.request_timeout_secs == 0 {
            bail!("http.request_timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

pub fn load(path: &Path) -> Result<AppConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: AppConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    3
}

fn default_sync_interval_secs() -> u64 {
    3600
}

fn default_broadcast_interval_secs() -> u64 {
    14400
}
