// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for zone lifecycle orchestration.

#[cfg(test)]
mod tests {
    use crate::config::Settings;
    use crate::constants::*;
    use crate::errors::{StoreError, ZoneError};
    use crate::manager::ZoneManager;
    use crate::store::{ActivityEntry, ActivityEvent, MemoryActivityLog, MemoryZoneStore, ZoneStore};
    use crate::zone::serial::FixedClock;
    use crate::zone::{NewZone, Zone, ZoneChanges, ZoneTimers};
    use chrono::NaiveDate;
    use std::net::{IpAddr, Ipv4Addr};

    type TestManager = ZoneManager<MemoryZoneStore, MemoryActivityLog, Settings, FixedClock>;

    fn manager_on(year: i32, month: u32, day: u32) -> TestManager {
        let mut settings = Settings::defaults();
        settings.set(KEY_ZONE_DEFAULT_MNAME, "ns1.example.com");
        settings.set(KEY_ZONE_DEFAULT_RNAME, "hostmaster@example.com");

        ZoneManager::new(
            MemoryZoneStore::new(),
            MemoryActivityLog::default(),
            settings,
            FixedClock::new(NaiveDate::from_ymd_opt(year, month, day).unwrap()),
        )
    }

    fn manager() -> TestManager {
        manager_on(2024, 3, 5)
    }

    /// A persisted zone with no pending changes.
    fn pushed_zone(manager: &mut TestManager, domain: &str) -> Zone {
        let mut zone = manager.create_zone(NewZone::master(domain)).unwrap();
        manager.mark_pushed(&mut zone).unwrap();
        zone
    }

    fn entry(event: ActivityEvent, domain: &str) -> ActivityEntry {
        ActivityEntry {
            event,
            domain: domain.to_string(),
        }
    }

    // ========================================================================
    // Creation
    // ========================================================================

    #[test]
    fn test_create_zone() {
        let mut manager = manager();

        let zone = manager.create_zone(NewZone::master("Example.COM")).unwrap();

        assert_eq!(zone.domain(), "example.com");
        assert_eq!(zone.serial(), 2_024_030_500);
        assert!(zone.has_pending_changes());
        assert!(zone.id().is_some());
        assert_eq!(manager.store().writes(), 1);
        assert_eq!(
            manager.activity().entries(),
            &[entry(ActivityEvent::Created, "example.com")]
        );
        assert_eq!(manager.find(zone.id().unwrap()).unwrap(), Some(zone));
    }

    #[test]
    fn test_create_duplicate_zone_fails_without_log_entry() {
        let mut manager = manager();
        manager.create_zone(NewZone::master("example.com")).unwrap();

        let result = manager.create_zone(NewZone::master("EXAMPLE.COM"));

        assert!(matches!(
            result,
            Err(ZoneError::Store(StoreError::DuplicateDomain { .. }))
        ));
        assert_eq!(manager.activity().entries().len(), 1);
    }

    #[test]
    fn test_generate_serial_number_follows_clock() {
        let manager = manager();
        assert_eq!(manager.generate_serial_number().unwrap(), 2_024_030_500);

        manager.clock().advance_days(1);
        assert_eq!(manager.generate_serial_number().unwrap(), 2_024_030_600);
    }

    // ========================================================================
    // Pending Changes
    // ========================================================================

    #[test]
    fn test_set_pending_changes_same_value_performs_no_write() {
        let mut manager = manager();
        let mut zone = manager.create_zone(NewZone::master("example.com")).unwrap();
        let writes = manager.store().writes();

        manager.set_pending_changes(&mut zone, true).unwrap();

        assert_eq!(manager.store().writes(), writes);
        assert_eq!(manager.activity().entries().len(), 1);
    }

    #[test]
    fn test_set_pending_changes_flip_persists() {
        let mut manager = manager();
        let mut zone = manager.create_zone(NewZone::master("example.com")).unwrap();

        manager.set_pending_changes(&mut zone, false).unwrap();

        assert!(!manager.has_pending_changes(&zone));
        assert_eq!(manager.store().writes(), 2);
        let stored = manager.find(zone.id().unwrap()).unwrap().unwrap();
        assert!(!stored.has_pending_changes());

        manager.set_pending_changes(&mut zone, true).unwrap();
        assert_eq!(manager.store().writes(), 3);
    }

    #[test]
    fn test_pending_zones() {
        let mut manager = manager();
        pushed_zone(&mut manager, "clean.example");
        manager.create_zone(NewZone::master("dirty.example")).unwrap();

        let pending: Vec<String> = manager
            .pending_zones()
            .unwrap()
            .iter()
            .map(|z| z.domain().to_string())
            .collect();

        assert_eq!(pending, vec!["dirty.example".to_string()]);
    }

    // ========================================================================
    // Serial Raise
    // ========================================================================

    #[test]
    fn test_raise_twice_without_push_returns_same_serial() {
        let mut manager = manager();
        let mut zone = pushed_zone(&mut manager, "example.com");

        let first = manager.raise_serial_number(&mut zone, false).unwrap();
        let writes = manager.store().writes();
        let second = manager.raise_serial_number(&mut zone, false).unwrap();

        assert_eq!(first, 2_024_030_501);
        assert_eq!(first, second);
        assert_eq!(manager.store().writes(), writes, "short-circuit must not write");
    }

    #[test]
    fn test_raise_on_fresh_zone_keeps_creation_serial() {
        let mut manager = manager();
        let mut zone = manager.create_zone(NewZone::master("example.com")).unwrap();

        assert_eq!(
            manager.raise_serial_number(&mut zone, false).unwrap(),
            2_024_030_500
        );
        assert_eq!(manager.store().writes(), 1);
    }

    #[test]
    fn test_forced_raise_on_dirty_zone() {
        let mut manager = manager();
        let mut zone = manager.create_zone(NewZone::master("example.com")).unwrap();

        let serial = manager.raise_serial_number(&mut zone, true).unwrap();

        assert_eq!(serial, 2_024_030_501);
        assert!(zone.has_pending_changes());
        assert_eq!(
            manager.find(zone.id().unwrap()).unwrap().unwrap().serial(),
            2_024_030_501
        );
    }

    #[test]
    fn test_forced_raise_on_next_day_resets_to_base() {
        let mut manager = manager();
        let mut zone = pushed_zone(&mut manager, "example.com");
        manager.raise_serial_number(&mut zone, false).unwrap();

        manager.clock().advance_days(1);
        let serial = manager.raise_serial_number(&mut zone, true).unwrap();

        assert_eq!(serial, 2_024_030_600);
    }

    #[test]
    fn test_push_then_raise_cycle() {
        let mut manager = manager();
        let mut zone = pushed_zone(&mut manager, "example.com");

        for expected in 2_024_030_501..=2_024_030_505 {
            assert_eq!(manager.raise_serial_number(&mut zone, false).unwrap(), expected);
            manager.mark_pushed(&mut zone).unwrap();
        }
        assert!(!zone.has_pending_changes());
    }

    #[test]
    fn test_hundred_and_first_serial_of_the_day_overflows() {
        let mut manager = manager();
        let mut zone = pushed_zone(&mut manager, "example.com");

        // 2024030500 was issued at creation; 99 revisions fit after it
        for _ in 0..99 {
            manager.raise_serial_number(&mut zone, true).unwrap();
        }
        assert_eq!(zone.serial(), 2_024_030_599);

        let before = crate::metrics::SERIAL_COUNTER_OVERFLOWS_TOTAL.get();
        let serial = manager.raise_serial_number(&mut zone, true).unwrap();

        assert_eq!(serial, 2_024_030_600, "the ceiling is inherited, not corrected");
        assert!(crate::metrics::SERIAL_COUNTER_OVERFLOWS_TOTAL.get() > before);

        // The next day continues from the overflowed serial
        manager.clock().advance_days(1);
        assert_eq!(
            manager.raise_serial_number(&mut zone, true).unwrap(),
            2_024_030_601
        );
    }

    #[test]
    fn test_failed_save_leaves_zone_untouched() {
        let mut manager = manager();
        let mut zone = pushed_zone(&mut manager, "example.com");
        let id = zone.id().unwrap();
        manager.delete_zone(id).unwrap();

        let result = manager.raise_serial_number(&mut zone, false);

        assert!(matches!(
            result,
            Err(ZoneError::Store(StoreError::NotFound { .. }))
        ));
        assert_eq!(zone.serial(), 2_024_030_500);
        assert!(!zone.has_pending_changes());
    }

    // ========================================================================
    // Updates
    // ========================================================================

    #[test]
    fn test_update_clean_zone_raises_and_writes_once() {
        let mut manager = manager();
        let mut zone = pushed_zone(&mut manager, "example.com");
        let writes = manager.store().writes();

        let serial = manager
            .update_zone(
                &mut zone,
                &ZoneChanges {
                    master_server: Some(Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)))),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(serial, 2_024_030_501);
        assert!(!zone.is_master_zone());
        assert!(zone.has_pending_changes());
        assert_eq!(manager.store().writes(), writes + 1);
        assert_eq!(
            manager.activity().entries().last(),
            Some(&entry(ActivityEvent::Updated, "example.com"))
        );
    }

    #[test]
    fn test_update_dirty_zone_accumulates_under_same_serial() {
        let mut manager = manager();
        let mut zone = pushed_zone(&mut manager, "example.com");

        let changes = |refresh| ZoneChanges {
            custom_settings: Some(true),
            timers: Some(ZoneTimers {
                refresh: Some(refresh),
                ..Default::default()
            }),
            ..Default::default()
        };

        let first = manager.update_zone(&mut zone, &changes(7200)).unwrap();
        let second = manager.update_zone(&mut zone, &changes(9000)).unwrap();

        assert_eq!(first, second);
        assert_eq!(manager.timers(&zone).refresh().unwrap(), 9000);
        let stored = manager.find(zone.id().unwrap()).unwrap().unwrap();
        assert_eq!(stored.timers().refresh, Some(9000));
    }

    #[test]
    fn test_update_without_changes_performs_no_write() {
        let mut manager = manager();
        let mut zone = pushed_zone(&mut manager, "example.com");
        let writes = manager.store().writes();

        let serial = manager
            .update_zone(
                &mut zone,
                &ZoneChanges {
                    domain: Some("EXAMPLE.COM".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(serial, 2_024_030_500);
        assert_eq!(manager.store().writes(), writes);
        assert!(!zone.has_pending_changes());
    }

    #[test]
    fn test_update_rename_onto_existing_domain_fails() {
        let mut manager = manager();
        pushed_zone(&mut manager, "example.org");
        let mut zone = pushed_zone(&mut manager, "example.com");

        let result = manager.update_zone(
            &mut zone,
            &ZoneChanges {
                domain: Some("example.org".to_string()),
                ..Default::default()
            },
        );

        assert!(matches!(
            result,
            Err(ZoneError::Store(StoreError::DuplicateDomain { .. }))
        ));
        assert_eq!(zone.domain(), "example.com");
        assert_eq!(zone.serial(), 2_024_030_500);
    }

    // ========================================================================
    // Soft Delete
    // ========================================================================

    #[test]
    fn test_delete_and_restore_are_logged() {
        let mut manager = manager();
        let zone = manager.create_zone(NewZone::master("example.com")).unwrap();
        let id = zone.id().unwrap();

        manager.delete_zone(id).unwrap();
        assert!(manager.zones().unwrap().is_empty());
        assert_eq!(manager.trashed_zones().unwrap().len(), 1);

        let restored = manager.restore_zone(id).unwrap();
        assert_eq!(restored.serial(), zone.serial());
        assert!(manager.find_by_domain("example.com").unwrap().is_some());

        assert_eq!(
            manager.activity().entries(),
            &[
                entry(ActivityEvent::Created, "example.com"),
                entry(ActivityEvent::Deleted, "example.com"),
                entry(ActivityEvent::Restored, "example.com"),
            ]
        );
    }

    #[test]
    fn test_delete_tombstone_comes_from_clock() {
        let mut manager = manager();
        let first = manager.create_zone(NewZone::master("example.com")).unwrap();
        manager.delete_zone(first.id().unwrap()).unwrap();

        manager.clock().advance_days(2);
        let second = manager.create_zone(NewZone::master("example.com")).unwrap();
        let deleted = manager.delete_zone(second.id().unwrap()).unwrap();

        assert_eq!(
            deleted.deleted_at().unwrap().to_rfc3339(),
            "2024-03-07T00:00:00+00:00"
        );
        let latest = manager
            .trashed_zones()
            .unwrap()
            .into_iter()
            .max_by_key(Zone::deleted_at)
            .unwrap();
        assert_eq!(latest.id(), second.id());
    }

    // ========================================================================
    // Timers and SOA
    // ========================================================================

    #[test]
    fn test_default_timers_ignore_zone_values() {
        let mut manager = manager();
        let mut zone = pushed_zone(&mut manager, "example.com");
        manager
            .update_zone(
                &mut zone,
                &ZoneChanges {
                    timers: Some(ZoneTimers {
                        refresh: Some(1),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(
            manager.timers(&zone).refresh().unwrap(),
            DEFAULT_SOA_REFRESH_SECS
        );
    }

    #[test]
    fn test_soa_record_and_zone_header() {
        let mut manager = manager();
        let zone = manager.create_zone(NewZone::master("example.com")).unwrap();

        let soa = manager.soa_record(&zone).unwrap();
        assert_eq!(soa.serial, 2_024_030_500);
        assert_eq!(soa.hostmaster, "hostmaster.example.com");

        let header = manager.zone_header(&zone).unwrap();
        assert!(header.starts_with("$TTL 3600\n"));
        assert!(header.contains("2024030500    ; Serial (aaaammddvv)"));
    }

    #[test]
    fn test_soa_without_owner_configuration() {
        let mut manager = ZoneManager::new(
            MemoryZoneStore::new(),
            MemoryActivityLog::default(),
            Settings::defaults(),
            FixedClock::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()),
        );
        let zone = manager.create_zone(NewZone::master("example.com")).unwrap();

        assert!(matches!(
            manager.soa_record(&zone),
            Err(ZoneError::Config(_))
        ));
    }

    #[test]
    fn test_manager_over_borrowed_collaborators() {
        let mut store = MemoryZoneStore::new();
        let mut log = MemoryActivityLog::default();
        let settings = Settings::defaults();
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());

        {
            let mut manager = ZoneManager::new(&mut store, &mut log, &settings, &clock);
            manager.create_zone(NewZone::master("example.com")).unwrap();
        }

        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(log.entries().len(), 1);
    }
}
