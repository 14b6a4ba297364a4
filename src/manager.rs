// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone lifecycle orchestration.
//!
//! [`ZoneManager`] ties the pure transitions on [`Zone`] to their collaborators:
//!
//! 1. Compute the transition on the zone (serial raise, pending flag, edit)
//! 2. If the zone changed, persist it through the [`ZoneStore`]
//! 3. After a successful save, record the event in the [`ActivityLog`]
//!
//! A transition that changes nothing performs no write and logs nothing. Store
//! failures are returned unchanged; nothing is retried.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use zonekeeper::config::Settings;
//! use zonekeeper::manager::ZoneManager;
//! use zonekeeper::store::{MemoryActivityLog, MemoryZoneStore};
//! use zonekeeper::zone::serial::FixedClock;
//! use zonekeeper::zone::NewZone;
//!
//! let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
//! let mut manager = ZoneManager::new(
//!     MemoryZoneStore::new(),
//!     MemoryActivityLog::default(),
//!     Settings::defaults(),
//!     clock,
//! );
//!
//! let mut zone = manager.create_zone(NewZone::master("example.com")).unwrap();
//! assert_eq!(zone.serial(), 2_024_030_500);
//!
//! // The config push has materialised the zone file
//! manager.mark_pushed(&mut zone).unwrap();
//!
//! // The next edit opens a new revision
//! assert_eq!(manager.raise_serial_number(&mut zone, false).unwrap(), 2_024_030_501);
//! ```

use crate::config::ConfigProvider;
use crate::errors::ZoneError;
use crate::metrics;
use crate::store::{ActivityEvent, ActivityLog, ZoneStore};
use crate::zone::serial::{exceeds_daily_revisions, Clock, SerialGenerator};
use crate::zone::soa::{render_zone_header, SoaRecord};
use crate::zone::timers::TimerResolver;
use crate::zone::{NewZone, SerialRaise, Zone, ZoneChanges, ZoneId};
use tracing::{debug, info, warn};

/// Runs zone lifecycle operations against a store, an activity log, the
/// configuration and a clock.
pub struct ZoneManager<S, L, C, K> {
    store: S,
    activity: L,
    config: C,
    serials: SerialGenerator<K>,
}

impl<S, L, C, K> ZoneManager<S, L, C, K>
where
    S: ZoneStore,
    L: ActivityLog,
    C: ConfigProvider,
    K: Clock,
{
    pub fn new(store: S, activity: L, config: C, clock: K) -> Self {
        Self {
            store,
            activity,
            config,
            serials: SerialGenerator::new(clock),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn activity(&self) -> &L {
        &self.activity
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn clock(&self) -> &K {
        self.serials.clock()
    }

    /// Today's base serial.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::SerialOutOfRange`] when today cannot be encoded.
    pub fn generate_serial_number(&self) -> Result<u32, ZoneError> {
        self.serials.generate()
    }

    /// Create and persist a zone with today's base serial and pending changes.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidDomain`] for unusable domains and propagates
    /// store failures such as a duplicate domain.
    pub fn create_zone(&mut self, new: NewZone) -> Result<Zone, ZoneError> {
        let serial = self.serials.generate()?;
        let mut zone = Zone::new(new, serial)?;

        self.persist(&mut zone, ActivityEvent::Created)?;
        info!(
            "Created zone {} with serial {} ({})",
            zone.domain(),
            serial,
            if zone.is_master_zone() { "master" } else { "slave" }
        );
        Ok(zone)
    }

    /// A live zone by id.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn find(&self, id: ZoneId) -> Result<Option<Zone>, ZoneError> {
        Ok(self.store.find(id)?)
    }

    /// A live zone by domain.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn find_by_domain(&self, domain: &str) -> Result<Option<Zone>, ZoneError> {
        Ok(self.store.find_by_domain(domain)?)
    }

    /// All live zones.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn zones(&self) -> Result<Vec<Zone>, ZoneError> {
        Ok(self.store.list()?)
    }

    /// All soft-deleted zones.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn trashed_zones(&self) -> Result<Vec<Zone>, ZoneError> {
        Ok(self.store.list_trashed()?)
    }

    /// Live zones whose served configuration is stale.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn pending_zones(&self) -> Result<Vec<Zone>, ZoneError> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(Zone::has_pending_changes)
            .collect())
    }

    /// Apply a field-level edit.
    ///
    /// When anything changed the serial is raised (unless edits are already
    /// pending under the current serial) and the zone is saved once. Returns
    /// the serial the zone carries afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidDomain`] for unusable domains and
    /// [`ZoneError::SerialExhausted`] when the serial cannot move; propagates
    /// store failures. The zone is left unmodified on error.
    pub fn update_zone(&mut self, zone: &mut Zone, changes: &ZoneChanges) -> Result<u32, ZoneError> {
        let mut edited = zone.clone();
        if !edited.apply_changes(changes)? {
            debug!("Update of zone {} changed nothing", zone.domain());
            return Ok(zone.serial());
        }

        let now = self.serials.generate()?;
        let raise = edited.raise_serial(false, now)?;
        self.note_raise(&edited, raise, false, now);

        self.persist(&mut edited, ActivityEvent::Updated)?;
        *zone = edited;

        info!("Updated zone {} (serial {})", zone.domain(), zone.serial());
        Ok(zone.serial())
    }

    /// Raise the serial of `zone`.
    ///
    /// A zone with pending changes keeps its serial unless `force` is set;
    /// nothing is written in that case. Otherwise the serial moves to the next
    /// revision (same day) or today's base (new day), the zone becomes dirty
    /// and is saved.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::SerialExhausted`] or
    /// [`ZoneError::SerialOutOfRange`] when no serial can be produced and
    /// propagates store failures. The zone is left unmodified on error.
    pub fn raise_serial_number(&mut self, zone: &mut Zone, force: bool) -> Result<u32, ZoneError> {
        let now = self.serials.generate()?;

        let mut raised = zone.clone();
        let raise = raised.raise_serial(force, now)?;
        self.note_raise(&raised, raise, force, now);

        if raise.is_raised() {
            self.persist(&mut raised, ActivityEvent::Updated)?;
            *zone = raised;
        }

        Ok(zone.serial())
    }

    /// Whether the served configuration of `zone` is stale.
    #[must_use]
    pub fn has_pending_changes(&self, zone: &Zone) -> bool {
        zone.has_pending_changes()
    }

    /// Set the pending-changes flag, saving only when it actually flips.
    ///
    /// # Errors
    ///
    /// Propagates store failures. The zone is left unmodified on error.
    pub fn set_pending_changes(&mut self, zone: &mut Zone, value: bool) -> Result<(), ZoneError> {
        let mut flagged = zone.clone();
        if !flagged.set_pending_changes(value) {
            debug!(
                "Zone {} pending changes already {}, nothing to save",
                zone.domain(),
                value
            );
            return Ok(());
        }

        self.persist(&mut flagged, ActivityEvent::Updated)?;
        *zone = flagged;

        info!("Zone {} pending changes set to {}", zone.domain(), value);
        Ok(())
    }

    /// Clear the pending-changes flag after the zone file has been pushed.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn mark_pushed(&mut self, zone: &mut Zone) -> Result<(), ZoneError> {
        self.set_pending_changes(zone, false)
    }

    /// Soft-delete a zone, stamped with the clock's current instant.
    ///
    /// # Errors
    ///
    /// Propagates store failures such as an unknown id.
    pub fn delete_zone(&mut self, id: ZoneId) -> Result<Zone, ZoneError> {
        let zone = self.store.soft_delete(id, self.serials.clock().now())?;
        self.after_write(&zone, ActivityEvent::Deleted);
        info!("Deleted zone {} ({})", zone.domain(), id);
        Ok(zone)
    }

    /// Restore a soft-deleted zone.
    ///
    /// # Errors
    ///
    /// Propagates store failures such as the domain having been reused.
    pub fn restore_zone(&mut self, id: ZoneId) -> Result<Zone, ZoneError> {
        let zone = self.store.restore(id)?;
        self.after_write(&zone, ActivityEvent::Restored);
        info!("Restored zone {} ({})", zone.domain(), id);
        Ok(zone)
    }

    /// Timer resolver for `zone` backed by this manager's configuration.
    pub fn timers<'a>(&'a self, zone: &'a Zone) -> TimerResolver<'a, C> {
        TimerResolver::new(zone, &self.config)
    }

    /// Resolved SOA values of `zone`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a needed default is missing.
    pub fn soa_record(&self, zone: &Zone) -> Result<SoaRecord, ZoneError> {
        Ok(SoaRecord::resolve(zone, &self.config)?)
    }

    /// `$TTL` directive and SOA stanza of `zone`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a needed default is missing.
    pub fn zone_header(&self, zone: &Zone) -> Result<String, ZoneError> {
        Ok(render_zone_header(zone, &self.config)?)
    }

    fn note_raise(&self, zone: &Zone, raise: SerialRaise, force: bool, now: u32) {
        match raise {
            SerialRaise::Unchanged(serial) => {
                metrics::record_serial_raise_skipped();
                debug!(
                    "Zone {} already has pending changes, keeping serial {}",
                    zone.domain(),
                    serial
                );
            }
            SerialRaise::Raised { previous, serial } => {
                metrics::record_serial_raised(force);
                debug!(
                    "Zone {} serial {} -> {} (force: {})",
                    zone.domain(),
                    previous,
                    serial,
                    force
                );
                if exceeds_daily_revisions(serial, now) {
                    metrics::record_serial_counter_overflow();
                    warn!(
                        "Zone {} serial {} is beyond the 100 revisions available for today ({}); it now reads as a later date",
                        zone.domain(),
                        serial,
                        now
                    );
                }
            }
        }
    }

    fn persist(&mut self, zone: &mut Zone, event: ActivityEvent) -> Result<(), ZoneError> {
        self.store.save(zone)?;
        self.after_write(zone, event);
        Ok(())
    }

    fn after_write(&mut self, zone: &Zone, event: ActivityEvent) {
        metrics::record_zone_write(event.as_str());
        self.activity.record(event, zone.domain());
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod manager_tests;
