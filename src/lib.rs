// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Zonekeeper - BIND zone lifecycle management
//!
//! Zonekeeper manages the part of a BIND zone that changes on every edit: the
//! SOA serial number, the "pending changes" flag that tells the config push a
//! zone file is stale, and the effective SOA timers.
//!
//! ## Overview
//!
//! - Date-encoded `YYYYMMDDvv` serial numbers that never go backwards
//! - Edits accumulate under one serial until the zone is pushed
//! - Per-zone timer overrides with process-wide defaults
//! - Byte-exact SOA stanzas for generated zone files
//! - Pluggable persistence with soft delete and an activity log
//!
//! ## Modules
//!
//! - [`zone`] - The zone entity, serial numbers, timers and SOA rendering
//! - [`manager`] - Lifecycle orchestration over a store, log, config and clock
//! - [`store`] - Persistence and activity log collaborators
//! - [`config`] - Configuration provider and settings loading
//! - [`errors`] - Error types
//! - [`metrics`] - Prometheus metrics
//! - [`constants`] - Defaults and configuration keys
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use zonekeeper::config::Settings;
//! use zonekeeper::manager::ZoneManager;
//! use zonekeeper::store::{MemoryZoneStore, TracingActivityLog};
//! use zonekeeper::zone::serial::FixedClock;
//! use zonekeeper::zone::NewZone;
//!
//! let settings = Settings::from_yaml_str(
//!     "zone_default_mname: ns1.example.com\nzone_default_rname: hostmaster@example.com\n",
//! )
//! .unwrap();
//! let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
//! let mut manager = ZoneManager::new(MemoryZoneStore::new(), TracingActivityLog, settings, clock);
//!
//! let zone = manager.create_zone(NewZone::master("example.com")).unwrap();
//! print!("{}", manager.zone_header(&zone).unwrap());
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod manager;
pub mod metrics;
pub mod store;
pub mod zone;
