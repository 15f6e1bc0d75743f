use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use super::types::{normalize_url, PeerRecord};

/// Failure of the local peer store itself.
///
/// This is the only error class in the core that is fatal to a whole cycle or
/// request: without the store no peer operation can be recorded. Per-peer
/// network failures are never expressed through this type.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("peer store unavailable: {0}")]
    Unavailable(String),
    #[error("no peer record with id {0}")]
    NotFound(String),
}

/// Filter criteria for [`PeerStore::find_all`]. All fields are conjunctive;
/// the default filter matches every known peer.
#[derive(Debug, Clone, Default)]
pub struct PeerFilters {
    pub is_default: Option<bool>,
    pub available: Option<bool>,
    /// Matches peers exposing the given catalog identifier.
    pub catalog_id: Option<String>,
}

/// Persistence abstraction over peer "listing" records.
///
/// The engines only ever talk to this trait; the backing document store is
/// interchangeable. Writes are per-record and last-write-wins, which is safe
/// because every persisted field is a last-observed fact, not an accumulator.
pub trait PeerStore: Send + Sync {
    fn find_all(&self, filters: &PeerFilters) -> Result<Vec<PeerRecord>, StoreError>;

    fn find_by_directory_url(&self, url: &str) -> Result<Option<PeerRecord>, StoreError>;

    /// Creates the record if its directory URL is unknown, else updates the
    /// descriptive fields while preserving `id` and the locally curated
    /// operational fields (`is_default`, `available`, `status_code`,
    /// `last_sync`). Safe to call repeatedly with identical input.
    fn upsert(&self, record: PeerRecord) -> Result<PeerRecord, StoreError>;

    /// Narrow update applied after every contact attempt. Replaces, never
    /// accumulates.
    fn update_status(&self, id: &str, status_code: u16, available: bool)
        -> Result<(), StoreError>;

    /// Advances `last_sync`. Only called after a successful exchange.
    fn mark_synced(&self, id: &str, epoch_secs: u64) -> Result<(), StoreError>;
}

/// In-memory `PeerStore` backed by a concurrent map keyed on the normalized
/// directory URL.
pub struct InMemoryPeerStore {
    records: DashMap<String, PeerRecord>,
}

impl InMemoryPeerStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for InMemoryPeerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerStore for InMemoryPeerStore {
    fn find_all(&self, filters: &PeerFilters) -> Result<Vec<PeerRecord>, StoreError> {
        let mut records: Vec<PeerRecord> = self
            .records
            .iter()
            .filter(|entry| {
                let record = entry.value();
                if let Some(is_default) = filters.is_default {
                    if record.is_default != is_default {
                        return false;
                    }
                }
                if let Some(available) = filters.available {
                    if record.available != available {
                        return false;
                    }
                }
                if let Some(catalog_id) = &filters.catalog_id {
                    if !record.catalog_ids.iter().any(|id| id == catalog_id) {
                        return false;
                    }
                }
                true
            })
            .map(|entry| entry.value().clone())
            .collect();

        // Stable iteration order for the engines' fan-out loops.
        records.sort_by(|a, b| a.directory_url.cmp(&b.directory_url));
        Ok(records)
    }

    fn find_by_directory_url(&self, url: &str) -> Result<Option<PeerRecord>, StoreError> {
        let key = normalize_url(url);
        Ok(self.records.get(&key).map(|entry| entry.value().clone()))
    }

    fn upsert(&self, record: PeerRecord) -> Result<PeerRecord, StoreError> {
        let key = normalize_url(&record.directory_url);

        let stored = match self.records.get_mut(&key) {
            Some(mut existing) => {
                let current = existing.value_mut();
                current.title = record.title;
                current.summary = record.summary;
                current.description = record.description;
                current.catalog_ids = record.catalog_ids;
                current.publications_endpoint = record.publications_endpoint;
                current.clone()
            }
            None => {
                let mut fresh = record;
                fresh.directory_url = key.clone();
                if fresh.id.is_empty() {
                    fresh.id = Uuid::new_v4().to_string();
                }
                self.records.insert(key, fresh.clone());
                fresh
            }
        };

        Ok(stored)
    }

    fn update_status(
        &self,
        id: &str,
        status_code: u16,
        available: bool,
    ) -> Result<(), StoreError> {
        for mut entry in self.records.iter_mut() {
            let record = entry.value_mut();
            if record.id == id {
                record.status_code = status_code;
                record.available = available;
                return Ok(());
            }
        }
        Err(StoreError::NotFound(id.to_string()))
    }

    fn mark_synced(&self, id: &str, epoch_secs: u64) -> Result<(), StoreError> {
        for mut entry in self.records.iter_mut() {
            let record = entry.value_mut();
            if record.id == id {
                record.last_sync = Some(epoch_secs);
                return Ok(());
            }
        }
        Err(StoreError::NotFound(id.to_string()))
    }
}
