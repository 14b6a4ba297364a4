// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the YAML file backed zone store.

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::errors::StoreError;
    use crate::store::ZoneStore;
    use crate::zone::{NewZone, Zone, ZoneId};
    use std::net::{IpAddr, Ipv4Addr};
    use tempfile::TempDir;

    fn store_path(dir: &TempDir) -> std::path::PathBuf {
        dir.path().join("zones.yaml")
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = FileZoneStore::open(store_path(&dir)).unwrap();

        assert!(store.list().unwrap().is_empty());
        assert!(!store.path().exists(), "opening must not create the file");
    }

    #[test]
    fn test_empty_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        std::fs::write(store_path(&dir), "").unwrap();

        let store = FileZoneStore::open(store_path(&dir)).unwrap();

        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let master = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 53));

        {
            let mut store = FileZoneStore::open(store_path(&dir)).unwrap();
            let mut primary = Zone::new(NewZone::master("example.com"), 2_024_030_501).unwrap();
            let mut secondary =
                Zone::new(NewZone::slave("example.net", master), 2_024_030_500).unwrap();
            store.save(&mut primary).unwrap();
            store.save(&mut secondary).unwrap();
            store
                .soft_delete(secondary.id().unwrap(), chrono::Utc::now())
                .unwrap();
        }

        let mut store = FileZoneStore::open(store_path(&dir)).unwrap();

        let live = store.list().unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].domain(), "example.com");
        assert_eq!(live[0].serial(), 2_024_030_501);
        assert!(live[0].has_pending_changes());

        let trashed = store.list_trashed().unwrap();
        assert_eq!(trashed.len(), 1);
        assert_eq!(trashed[0].master_server(), Some(master));

        // Ids keep counting after a reopen
        let mut third = Zone::new(NewZone::master("example.org"), 1).unwrap();
        store.save(&mut third).unwrap();
        assert_eq!(third.id(), Some(ZoneId(3)));
    }

    #[test]
    fn test_document_layout() {
        let dir = TempDir::new().unwrap();
        let mut store = FileZoneStore::open(store_path(&dir)).unwrap();
        let mut zone = Zone::new(NewZone::master("example.com"), 2_024_030_500).unwrap();
        store.save(&mut zone).unwrap();

        let document: ZoneStoreDocument =
            serde_yaml::from_str(&std::fs::read_to_string(store_path(&dir)).unwrap()).unwrap();

        assert_eq!(document.last_id, 1);
        assert_eq!(document.zones, vec![zone.to_record()]);
        assert!(
            !dir.path().join("zones.yaml.tmp").exists(),
            "staging file must be renamed away"
        );
    }

    #[test]
    fn test_malformed_document() {
        let dir = TempDir::new().unwrap();
        std::fs::write(store_path(&dir), "zones: {not: [a, list").unwrap();

        assert!(matches!(
            FileZoneStore::open(store_path(&dir)),
            Err(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn test_document_with_invalid_domain() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            store_path(&dir),
            "lastId: 1\nzones:\n  - id: 1\n    domain: ' '\n    serial: 1\n",
        )
        .unwrap();

        assert!(matches!(
            FileZoneStore::open(store_path(&dir)),
            Err(StoreError::Malformed { .. })
        ));
    }
    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut store = FileZoneStore::open(store_path(&dir)).unwrap();
        let mut existing = Zone::new(NewZone::master("example.com"), 2_024_030_500).unwrap();
        store.save(&mut existing).unwrap();
        let id = existing.id().unwrap();

        // A directory in the staging spot makes every write fail
        let staging = dir.path().join("zones.yaml.tmp");
        std::fs::create_dir(&staging).unwrap();

        let mut fresh = Zone::new(NewZone::master("example.net"), 2_024_030_500).unwrap();
        assert!(matches!(store.save(&mut fresh), Err(StoreError::Io { .. })));
        assert_eq!(fresh.id(), None);
        assert!(store.find_by_domain("example.net").unwrap().is_none());

        let mut raised = existing.clone();
        raised.raise_serial(true, 2_024_030_500).unwrap();
        assert!(store.save(&mut raised).is_err());
        assert_eq!(store.find(id).unwrap().unwrap().serial(), 2_024_030_500);

        assert!(store.soft_delete(id, chrono::Utc::now()).is_err());
        assert!(store.find(id).unwrap().is_some());

        std::fs::remove_dir(&staging).unwrap();

        // Retrying succeeds and nothing from the failed attempts leaks through
        store.save(&mut fresh).unwrap();
        assert_eq!(fresh.id(), Some(ZoneId(2)));

        let reopened = FileZoneStore::open(store_path(&dir)).unwrap();
        let live = reopened.list().unwrap();
        assert_eq!(live.len(), 2);
        assert_eq!(live[0].serial(), 2_024_030_500);
        assert!(reopened.list_trashed().unwrap().is_empty());
    }

    #[test]
    fn test_document_zone_without_id_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            store_path(&dir),
            "zones:\n  - domain: handwritten.com\n    serial: 2024030500\n",
        )
        .unwrap();

        let result = FileZoneStore::open(store_path(&dir));

        assert!(matches!(result, Err(StoreError::Malformed { .. })));
        assert!(
            std::fs::read_to_string(store_path(&dir))
                .unwrap()
                .contains("handwritten.com"),
            "a rejected document must stay untouched"
        );
    }

    #[test]
    fn test_document_with_repeated_id_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            store_path(&dir),
            "lastId: 1\nzones:\n  - id: 1\n    domain: example.com\n    serial: 1\n  - id: 1\n    domain: example.net\n    serial: 1\n",
        )
        .unwrap();

        assert!(matches!(
            FileZoneStore::open(store_path(&dir)),
            Err(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn test_document_with_duplicate_live_domain_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            store_path(&dir),
            "lastId: 2\nzones:\n  - id: 1\n    domain: example.com\n    serial: 1\n  - id: 2\n    domain: Example.COM\n    serial: 1\n",
        )
        .unwrap();

        assert!(matches!(
            FileZoneStore::open(store_path(&dir)),
            Err(StoreError::Malformed { .. })
        ));
    }
}
