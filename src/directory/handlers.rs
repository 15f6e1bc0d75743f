use axum::{extract::Extension, http::StatusCode, Json};
use std::sync::Arc;

use super::protocol::{DirectoryResponse, PeerAnnouncement, RegisterResponse};
use super::store::{PeerFilters, PeerStore};
use super::types::{normalize_url, PeerRecord};
use crate::config::InstanceIdentity;

/// Serves this instance's directory: its own announcement first, then every
/// known peer. Including self is what lets a brand-new node become known to
/// the whole mesh through a single seed contact.
pub async fn handle_get_directory(
    Extension(store): Extension<Arc<dyn PeerStore>>,
    Extension(identity): Extension<Arc<InstanceIdentity>>,
) -> (StatusCode, Json<DirectoryResponse>) {
    match store.find_all(&PeerFilters::default()) {
        Ok(peers) => {
            let mut results = vec![identity.announcement()];
            results.extend(peers.iter().map(PeerRecord::announcement));
            (StatusCode::OK, Json(DirectoryResponse { results }))
        }
        Err(e) => {
            tracing::error!("Failed to read peer store for directory listing: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DirectoryResponse { results: vec![] }),
            )
        }
    }
}

/// Accepts an unsolicited self-announcement from another instance.
///
/// The announced directory URL is the natural key: an unknown URL creates a
/// record, a known one refreshes the descriptive fields only, so locally
/// curated `is_default`/`available` flags survive re-registration. An
/// announcement without a directory URL, or announcing our own URL, is a
/// protocol error.
pub async fn handle_register(
    Extension(store): Extension<Arc<dyn PeerStore>>,
    Extension(identity): Extension<Arc<InstanceIdentity>>,
    Json(announcement): Json<PeerAnnouncement>,
) -> (StatusCode, Json<RegisterResponse>) {
    let Some(url) = announcement.normalized_url() else {
        tracing::warn!("Rejected registration without a directory URL");
        return (
            StatusCode::BAD_REQUEST,
            Json(RegisterResponse { success: false }),
        );
    };

    if url == normalize_url(&identity.directory_url) {
        tracing::warn!("Rejected registration announcing our own directory URL");
        return (
            StatusCode::BAD_REQUEST,
            Json(RegisterResponse { success: false }),
        );
    }

    let existed = match store.find_by_directory_url(&url) {
        Ok(found) => found.is_some(),
        Err(e) => {
            tracing::error!("Failed to look up peer {}: {}", url, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RegisterResponse { success: false }),
            );
        }
    };

    match store.upsert(PeerRecord::from_announcement(&announcement)) {
        Ok(record) => {
            tracing::info!(
                "Registered peer {} ({})",
                record.directory_url,
                if existed { "refreshed" } else { "new" }
            );
            let status = if existed {
                StatusCode::OK
            } else {
                StatusCode::CREATED
            };
            (status, Json(RegisterResponse { success: true }))
        }
        Err(e) => {
            tracing::error!("Failed to store peer {}: {}", url, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RegisterResponse { success: false }),
            )
        }
    }
}
