//! Peer Directory Tests
//!
//! Validates the peer data model, the natural-key store semantics (idempotent
//! upsert, filters, narrow status updates), and the HTTP surface serving the
//! directory protocol.

#[cfg(test)]
mod tests {
    use axum::extract::Extension;
    use axum::http::StatusCode;
    use axum::Json;
    use std::sync::Arc;

    use crate::config::InstanceIdentity;
    use crate::directory::handlers::{handle_get_directory, handle_register};
    use crate::directory::protocol::{DirectoryResponse, PeerAnnouncement};
    use crate::directory::store::{InMemoryPeerStore, PeerFilters, PeerStore};
    use crate::directory::types::{normalize_url, PeerRecord};

    fn announcement(url: &str, title: &str) -> PeerAnnouncement {
        PeerAnnouncement {
            directory_url: url.to_string(),
            title: title.to_string(),
            summary: String::new(),
            description: String::new(),
            catalog_ids: vec![],
            publications_endpoint: None,
        }
    }

    fn identity() -> Arc<InstanceIdentity> {
        Arc::new(InstanceIdentity {
            directory_url: "http://self.test/directory".to_string(),
            title: "Local Instance".to_string(),
            summary: String::new(),
            description: String::new(),
            catalog_ids: vec![],
            publications_endpoint: None,
        })
    }

    // ============================================================
    // WIRE TYPES
    // ============================================================

    #[test]
    fn test_announcement_defaults_missing_fields() {
        let parsed: PeerAnnouncement = serde_json::from_str(
            r#"{ "directoryUrl": "http://peer.test/directory", "extra": "ignored" }"#,
        )
        .expect("lenient parse");

        assert_eq!(parsed.directory_url, "http://peer.test/directory");
        assert_eq!(parsed.title, "");
        assert!(parsed.catalog_ids.is_empty());
        assert!(parsed.publications_endpoint.is_none());
    }

    #[test]
    fn test_announcement_without_url_has_no_natural_key() {
        let parsed: PeerAnnouncement =
            serde_json::from_str(r#"{ "title": "Anonymous" }"#).unwrap();
        assert!(parsed.normalized_url().is_none());

        let blank = announcement("   ", "Blank");
        assert!(blank.normalized_url().is_none());
    }

    #[test]
    fn test_directory_body_without_results_is_malformed() {
        let parsed = serde_json::from_str::<DirectoryResponse>(r#"{ "peers": [] }"#);
        assert!(parsed.is_err(), "missing results must not read as empty");
    }

    #[test]
    fn test_url_normalization() {
        assert_eq!(
            normalize_url(" http://peer.test/directory/ "),
            "http://peer.test/directory"
        );
        assert_eq!(
            normalize_url("http://peer.test/directory"),
            normalize_url("http://peer.test/directory///")
        );
    }

    #[test]
    fn test_record_from_announcement_starts_uncontacted() {
        let mut ann = announcement("http://peer.test/directory/", "Peer");
        ann.publications_endpoint = Some("  ".to_string());

        let record = PeerRecord::from_announcement(&ann);
        assert_eq!(record.directory_url, "http://peer.test/directory");
        assert_eq!(record.status_code, 0);
        assert!(!record.available);
        assert!(!record.is_default);
        assert!(record.last_sync.is_none());
        assert!(
            record.publications_endpoint.is_none(),
            "blank endpoint reads as not provided"
        );
    }

    // ============================================================
    // STORE
    // ============================================================

    #[test]
    fn test_upsert_is_idempotent_on_natural_key() {
        let store = InMemoryPeerStore::new();
        let ann = announcement("http://peer.test/directory", "Peer");

        let first = store.upsert(PeerRecord::from_announcement(&ann)).unwrap();
        assert!(!first.id.is_empty(), "store assigns an id");

        let second = store.upsert(PeerRecord::from_announcement(&ann)).unwrap();
        assert_eq!(second.id, first.id, "id survives re-upsert");
        assert_eq!(store.len(), 1);

        // Trailing slash is the same peer.
        let slashed = announcement("http://peer.test/directory/", "Peer");
        store.upsert(PeerRecord::from_announcement(&slashed)).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_upsert_refreshes_descriptive_fields_only() {
        let store = InMemoryPeerStore::new();

        let mut record = PeerRecord::from_announcement(&announcement(
            "http://peer.test/directory",
            "Old Title",
        ));
        record.is_default = true;
        let stored = store.upsert(record).unwrap();
        store.update_status(&stored.id, 200, true).unwrap();
        store.mark_synced(&stored.id, 1234).unwrap();

        let mut refresh = PeerRecord::from_announcement(&announcement(
            "http://peer.test/directory",
            "New Title",
        ));
        refresh.catalog_ids = vec!["cat-1".to_string()];
        let updated = store.upsert(refresh).unwrap();

        assert_eq!(updated.id, stored.id);
        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.catalog_ids, vec!["cat-1".to_string()]);
        // Curated and observed state survives the refresh.
        assert!(updated.is_default);
        assert!(updated.available);
        assert_eq!(updated.status_code, 200);
        assert_eq!(updated.last_sync, Some(1234));
    }

    #[test]
    fn test_find_all_filters() {
        let store = InMemoryPeerStore::new();

        let mut a = PeerRecord::from_announcement(&announcement("http://a.test/directory", "A"));
        a.is_default = true;
        a.catalog_ids = vec!["cat-1".to_string()];
        let a = store.upsert(a).unwrap();
        store.update_status(&a.id, 200, true).unwrap();

        let mut b = PeerRecord::from_announcement(&announcement("http://b.test/directory", "B"));
        b.is_default = true;
        store.upsert(b).unwrap();

        store
            .upsert(PeerRecord::from_announcement(&announcement(
                "http://c.test/directory",
                "C",
            )))
            .unwrap();

        assert_eq!(store.find_all(&PeerFilters::default()).unwrap().len(), 3);

        let defaults = store
            .find_all(&PeerFilters {
                is_default: Some(true),
                ..PeerFilters::default()
            })
            .unwrap();
        assert_eq!(defaults.len(), 2);

        let default_and_available = store
            .find_all(&PeerFilters {
                is_default: Some(true),
                available: Some(true),
                ..PeerFilters::default()
            })
            .unwrap();
        assert_eq!(default_and_available.len(), 1);
        assert_eq!(default_and_available[0].title, "A");

        let by_catalog = store
            .find_all(&PeerFilters {
                catalog_id: Some("cat-1".to_string()),
                ..PeerFilters::default()
            })
            .unwrap();
        assert_eq!(by_catalog.len(), 1);
        assert_eq!(by_catalog[0].title, "A");

        let none = store
            .find_all(&PeerFilters {
                catalog_id: Some("cat-404".to_string()),
                ..PeerFilters::default()
            })
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_find_all_orders_by_directory_url() {
        let store = InMemoryPeerStore::new();
        for url in ["http://c.test/d", "http://a.test/d", "http://b.test/d"] {
            store
                .upsert(PeerRecord::from_announcement(&announcement(url, "")))
                .unwrap();
        }

        let urls: Vec<String> = store
            .find_all(&PeerFilters::default())
            .unwrap()
            .into_iter()
            .map(|record| record.directory_url)
            .collect();
        assert_eq!(
            urls,
            vec!["http://a.test/d", "http://b.test/d", "http://c.test/d"]
        );
    }

    #[test]
    fn test_update_status_replaces_previous_state() {
        let store = InMemoryPeerStore::new();
        let record = store
            .upsert(PeerRecord::from_announcement(&announcement(
                "http://peer.test/directory",
                "Peer",
            )))
            .unwrap();

        store.update_status(&record.id, 503, false).unwrap();
        store.update_status(&record.id, 200, true).unwrap();

        let current = store
            .find_by_directory_url("http://peer.test/directory")
            .unwrap()
            .unwrap();
        assert_eq!(current.status_code, 200);
        assert!(current.available);
    }

    #[test]
    fn test_narrow_updates_on_unknown_id_fail() {
        let store = InMemoryPeerStore::new();
        assert!(store.update_status("ghost", 200, true).is_err());
        assert!(store.mark_synced("ghost", 1).is_err());
    }

    // ============================================================
    // HANDLERS
    // ============================================================

    #[tokio::test]
    async fn test_served_directory_lists_self_first() {
        let store: Arc<dyn PeerStore> = Arc::new(InMemoryPeerStore::new());
        store
            .upsert(PeerRecord::from_announcement(&announcement(
                "http://peer.test/directory",
                "Peer",
            )))
            .unwrap();

        let (status, Json(listing)) =
            handle_get_directory(Extension(store), Extension(identity())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(listing.results.len(), 2);
        assert_eq!(listing.results[0].directory_url, "http://self.test/directory");
        assert_eq!(listing.results[1].directory_url, "http://peer.test/directory");
    }

    #[tokio::test]
    async fn test_register_creates_then_refreshes() {
        let store: Arc<dyn PeerStore> = Arc::new(InMemoryPeerStore::new());

        let (status, Json(response)) = handle_register(
            Extension(store.clone()),
            Extension(identity()),
            Json(announcement("http://peer.test/directory", "Peer")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(response.success);

        let (status, _) = handle_register(
            Extension(store.clone()),
            Extension(identity()),
            Json(announcement("http://peer.test/directory", "Renamed")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let record = store
            .find_by_directory_url("http://peer.test/directory")
            .unwrap()
            .unwrap();
        assert_eq!(record.title, "Renamed");
        assert_eq!(
            store.find_all(&PeerFilters::default()).unwrap().len(),
            1,
            "re-registration never duplicates"
        );
    }

    #[tokio::test]
    async fn test_register_rejects_missing_and_self_urls() {
        let store: Arc<dyn PeerStore> = Arc::new(InMemoryPeerStore::new());

        let (status, Json(response)) = handle_register(
            Extension(store.clone()),
            Extension(identity()),
            Json(announcement("", "No Key")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!response.success);

        let (status, _) = handle_register(
            Extension(store.clone()),
            Extension(identity()),
            Json(announcement("http://self.test/directory/", "Us")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(store.find_all(&PeerFilters::default()).unwrap().is_empty());
    }
}
