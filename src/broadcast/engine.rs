use std::sync::Arc;

use crate::config::InstanceIdentity;
use crate::directory::store::{PeerFilters, PeerStore, StoreError};
use crate::directory::types::{epoch_secs, normalize_url};
use crate::fetch::client::FetchClient;

/// Outcome counters of one broadcast run, logged by the scheduler loop.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Announces this instance's own directory entry to known peers.
///
/// Like the sync engine, at most one run is expected in flight at a time;
/// the single scheduler task calling it preserves that.
pub struct BroadcastEngine {
    store: Arc<dyn PeerStore>,
    client: Arc<FetchClient>,
    identity: Arc<InstanceIdentity>,
}

impl BroadcastEngine {
    pub fn new(
        store: Arc<dyn PeerStore>,
        client: Arc<FetchClient>,
        identity: Arc<InstanceIdentity>,
    ) -> Self {
        Self {
            store,
            client,
            identity,
        }
    }

    /// POSTs the self-announcement to the given peer, or to every known peer
    /// when no target is given. Individual failures are recorded on the peer's
    /// record and counted; only a store failure propagates.
    pub async fn run(&self, target: Option<&str>) -> Result<BroadcastReport, StoreError> {
        let own_url = normalize_url(&self.identity.directory_url);

        // (record id, directory URL) pairs; a targeted broadcast to an unknown
        // URL is still attempted, just without status bookkeeping.
        let targets: Vec<(Option<String>, String)> = match target {
            Some(url) => {
                let known = self.store.find_by_directory_url(url)?;
                vec![(known.map(|record| record.id), normalize_url(url))]
            }
            None => self
                .store
                .find_all(&PeerFilters::default())?
                .into_iter()
                .map(|record| (Some(record.id), record.directory_url))
                .collect(),
        };

        let announcement = self.identity.announcement();
        let mut report = BroadcastReport::default();

        for (id, url) in targets {
            if url == own_url {
                continue;
            }
            report.attempted += 1;

            match self.client.post_json(&url, &announcement).await {
                Ok(status) => {
                    report.succeeded += 1;
                    tracing::debug!("Announced to {}", url);
                    if let Some(id) = &id {
                        self.record(id, status, true);
                    }
                }
                Err(failure) => {
                    report.failed += 1;
                    tracing::warn!("Failed to announce to {}: {}", url, failure);
                    if let Some(id) = &id {
                        self.record(id, failure.status_code(), false);
                    }
                }
            }
        }

        tracing::info!(
            "Broadcast finished: {}/{} peers reached",
            report.succeeded,
            report.attempted
        );
        Ok(report)
    }

    fn record(&self, id: &str, status_code: u16, available: bool) {
        if let Err(e) = self.store.update_status(id, status_code, available) {
            tracing::warn!("Failed to update status for peer {}: {}", id, e);
        }
        if available {
            if let Err(e) = self.store.mark_synced(id, epoch_secs()) {
                tracing::warn!("Failed to mark peer {} synced: {}", id, e);
            }
        }
    }
}
