// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use zonekeeper::config::Settings;
use zonekeeper::manager::ZoneManager;
use zonekeeper::store::{FileZoneStore, MemoryActivityLog};
use zonekeeper::zone::serial::FixedClock;

pub type FileManager = ZoneManager<FileZoneStore, MemoryActivityLog, Settings, FixedClock>;

pub const SETTINGS_YAML: &str = "\
zone_default_mname: ns1.example.com
zone_default_rname: hostmaster@example.com
zone_default_refresh: 7200
zone_default_retry: 900
zone_default_expire: 1209600
zone_default_negative_ttl: 300
zone_default_default_ttl: 1800
serial_timezone: utc
";

/// A scratch directory holding a settings file and a zone store.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        fs::write(dir.path().join("settings.yaml"), SETTINGS_YAML).expect("write settings");
        Self { dir }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.path().join("settings.yaml")
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("zones.yaml")
    }

    pub fn settings(&self) -> Settings {
        Settings::from_file(&self.settings_path()).expect("load settings")
    }

    /// Open a manager over the on-disk store, as a fresh process would.
    pub fn manager_on(&self, date: NaiveDate) -> FileManager {
        let store = FileZoneStore::open(self.store_path()).expect("open store");
        ZoneManager::new(
            store,
            MemoryActivityLog::default(),
            self.settings(),
            FixedClock::new(date),
        )
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}
