use std::collections::HashSet;
use std::sync::Arc;

use crate::config::InstanceIdentity;
use crate::directory::protocol::DirectoryResponse;
use crate::directory::store::{PeerFilters, PeerStore, StoreError};
use crate::directory::types::{epoch_secs, normalize_url, PeerRecord};
use crate::fetch::client::FetchClient;

/// Outcome counters of one reconciliation cycle, logged by the scheduler loop.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Known peers whose directory we attempted to fetch.
    pub contacted: usize,
    /// Peers that returned a well-formed directory.
    pub reachable: usize,
    /// Peers that failed (network, timeout, non-2xx, malformed body).
    pub unreachable: usize,
    /// Previously unknown peers inserted this cycle.
    pub discovered: usize,
    /// Successful self-registrations sent to newly discovered peers.
    pub registrations_sent: usize,
    pub registrations_failed: usize,
}

/// Reconciles the local known-peer set with the peer-of-peers graph.
///
/// The engine assumes at most one cycle is in flight at a time; the caller
/// (a single scheduler task) must preserve that. A cancelled cycle leaves
/// per-record state that the next idempotent run repairs.
pub struct SyncEngine {
    store: Arc<dyn PeerStore>,
    client: Arc<FetchClient>,
    identity: Arc<InstanceIdentity>,
}

impl SyncEngine {
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

    /// Runs one full reconciliation cycle.
    ///
    /// Only a failure to read the peer list propagates; everything else is
    /// recorded per peer and the cycle continues.
    pub async fn run(&self) -> Result<SyncReport, StoreError> {
        // Previously unreachable peers are retried too, so no availability filter.
        let peers = self.store.find_all(&PeerFilters::default())?;
        let own_url = normalize_url(&self.identity.directory_url);

        let mut report = SyncReport::default();
        let mut discovered: Vec<PeerRecord> = Vec::new();
        let mut seen_this_cycle: HashSet<String> = HashSet::new();

        for peer in &peers {
            report.contacted += 1;

            match self.client.get_json(&peer.directory_url).await {
                Ok(response) => {
                    match serde_json::from_value::<DirectoryResponse>(response.body) {
                        Ok(listing) => {
                            report.reachable += 1;
                            self.merge_listing(
                                &listing,
                                &own_url,
                                &mut seen_this_cycle,
                                &mut discovered,
                                &mut report,
                            );
                            self.record_success(&peer.id, response.status);
                        }
                        Err(e) => {
                            // A body that is valid JSON but not a directory is a
                            // protocol error, not "zero peers discovered".
                            report.unreachable += 1;
                            tracing::warn!(
                                "Peer {} returned a malformed directory: {}",
                                peer.directory_url,
                                e
                            );
                            self.record_failure(&peer.id, response.status);
                        }
                    }
                }
                Err(failure) => {
                    report.unreachable += 1;
                    tracing::warn!(
                        "Failed to fetch directory from {}: {}",
                        peer.directory_url,
                        failure
                    );
                    self.record_failure(&peer.id, failure.status_code());
                }
            }
        }

        // Introduce ourselves to every peer we just learned about.
        let announcement = self.identity.announcement();
        for new_peer in &discovered {
            match self
                .client
                .post_json(&new_peer.directory_url, &announcement)
                .await
            {
                Ok(status) => {
                    report.registrations_sent += 1;
                    tracing::info!("Registered with new peer {}", new_peer.directory_url);
                    self.record_success(&new_peer.id, status);
                }
                Err(failure) => {
                    report.registrations_failed += 1;
                    tracing::warn!(
                        "Failed to register with new peer {}: {}",
                        new_peer.directory_url,
                        failure
                    );
                    self.record_failure(&new_peer.id, failure.status_code());
                }
            }
        }

        Ok(report)
    }

    fn merge_listing(
        &self,
        listing: &DirectoryResponse,
        own_url: &str,
        seen_this_cycle: &mut HashSet<String>,
        discovered: &mut Vec<PeerRecord>,
        report: &mut SyncReport,
    ) {
        for entry in &listing.results {
            let Some(url) = entry.normalized_url() else {
                tracing::warn!("Skipping directory entry without a directory URL");
                continue;
            };
            if url == own_url {
                continue;
            }
            if seen_this_cycle.contains(&url) {
                continue;
            }

            match self.store.find_by_directory_url(&url) {
                Ok(Some(_)) => {
                    // Known peer: leave it untouched, remote data may be stale.
                    seen_this_cycle.insert(url);
                }
                Ok(None) => match self.store.upsert(PeerRecord::from_announcement(entry)) {
                    Ok(created) => {
                        tracing::info!("Discovered new peer {}", created.directory_url);
                        seen_this_cycle.insert(url);
                        report.discovered += 1;
                        discovered.push(created);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to store discovered peer {}: {}", url, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to look up peer {}: {}", url, e);
                }
            }
        }
    }

    fn record_success(&self, id: &str, status_code: u16) {
        if let Err(e) = self.store.update_status(id, status_code, true) {
            tracing::warn!("Failed to update status for peer {}: {}", id, e);
        }
        if let Err(e) = self.store.mark_synced(id, epoch_secs()) {
            tracing::warn!("Failed to mark peer {} synced: {}", id, e);
        }
    }

    fn record_failure(&self, id: &str, status_code: u16) {
        if let Err(e) = self.store.update_status(id, status_code, false) {
            tracing::warn!("Failed to update status for peer {}: {}", id, e);
        }
    }
}
