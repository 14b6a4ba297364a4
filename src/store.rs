// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Persistence and activity log collaborators.
//!
//! The zone lifecycle never touches storage itself. It talks to a [`ZoneStore`]
//! for loading and saving zones and to an [`ActivityLog`] for the audit trail.
//!
//! Two stores are provided:
//!
//! - [`MemoryZoneStore`] keeps everything in memory and counts writes
//! - [`FileZoneStore`] keeps all zones in a single YAML document on disk
//!
//! Both enforce the same invariants through [`ZoneTable`]: ids are assigned on
//! first save, live domains are unique, a stored serial never goes down and
//! deletes are soft (tombstoned and recoverable).

pub mod file;
pub mod memory;

use crate::errors::StoreError;
use crate::zone::{normalize_domain, Zone, ZoneId};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

pub use file::FileZoneStore;
pub use memory::MemoryZoneStore;

/// Load/save access to persisted zones.
pub trait ZoneStore {
    /// A live (not deleted) zone by id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend fails.
    fn find(&self, id: ZoneId) -> Result<Option<Zone>, StoreError>;

    /// A live zone by domain; the query is normalised like zone domains are.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend fails.
    fn find_by_domain(&self, domain: &str) -> Result<Option<Zone>, StoreError>;

    /// All live zones ordered by id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend fails.
    fn list(&self) -> Result<Vec<Zone>, StoreError>;

    /// All soft-deleted zones ordered by id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend fails.
    fn list_trashed(&self) -> Result<Vec<Zone>, StoreError>;

    /// Insert or update `zone`. Inserting assigns its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SerialRegression`] when the serial would go down,
    /// [`StoreError::DuplicateDomain`] when another live zone owns the domain
    /// and [`StoreError::NotFound`] when updating an unknown or deleted zone.
    fn save(&mut self, zone: &mut Zone) -> Result<(), StoreError>;

    /// Tombstone a live zone at `deleted_at` and return it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no live zone has this id.
    fn soft_delete(&mut self, id: ZoneId, deleted_at: DateTime<Utc>) -> Result<Zone, StoreError>;

    /// Bring a tombstoned zone back and return it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown ids,
    /// [`StoreError::NotDeleted`] for live zones and
    /// [`StoreError::DuplicateDomain`] when its domain was reused meanwhile.
    fn restore(&mut self, id: ZoneId) -> Result<Zone, StoreError>;
}

impl<T: ZoneStore + ?Sized> ZoneStore for &mut T {
    fn find(&self, id: ZoneId) -> Result<Option<Zone>, StoreError> {
        (**self).find(id)
    }

    fn find_by_domain(&self, domain: &str) -> Result<Option<Zone>, StoreError> {
        (**self).find_by_domain(domain)
    }

    fn list(&self) -> Result<Vec<Zone>, StoreError> {
        (**self).list()
    }

    fn list_trashed(&self) -> Result<Vec<Zone>, StoreError> {
        (**self).list_trashed()
    }

    fn save(&mut self, zone: &mut Zone) -> Result<(), StoreError> {
        (**self).save(zone)
    }

    fn soft_delete(&mut self, id: ZoneId, deleted_at: DateTime<Utc>) -> Result<Zone, StoreError> {
        (**self).soft_delete(id, deleted_at)
    }

    fn restore(&mut self, id: ZoneId) -> Result<Zone, StoreError> {
        (**self).restore(id)
    }
}

/// In-memory zone table shared by the stock stores.
#[derive(Debug, Clone, Default)]
pub struct ZoneTable {
    zones: BTreeMap<ZoneId, Zone>,
    next_id: u64,
}

impl ZoneTable {
    /// Rebuild a table from stored zones.
    ///
    /// `next_id` is raised past the highest stored id if needed.
    ///
    /// # Errors
    ///
    /// Returns the reason when a zone has no id, two zones share an id or two
    /// live zones share a domain. Nothing is dropped silently.
    pub fn from_zones(zones: Vec<Zone>, next_id: u64) -> Result<Self, String> {
        let mut table = Self {
            zones: BTreeMap::new(),
            next_id,
        };
        for zone in zones {
            let id = zone
                .id()
                .ok_or_else(|| format!("zone '{}' has no id", zone.domain()))?;
            if !zone.is_deleted() {
                table
                    .ensure_domain_free(zone.domain(), Some(id))
                    .map_err(|e| e.to_string())?;
            }
            if let Some(previous) = table.zones.insert(id, zone) {
                return Err(format!(
                    "zone id {id} is used by both '{}' and '{}'",
                    previous.domain(),
                    table.zones[&id].domain()
                ));
            }
            table.next_id = table.next_id.max(id.0);
        }
        Ok(table)
    }

    /// Highest id handed out so far.
    #[must_use]
    pub fn last_id(&self) -> u64 {
        self.next_id
    }

    /// Every stored zone, live or deleted, ordered by id.
    pub fn all(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    #[must_use]
    pub fn find(&self, id: ZoneId) -> Option<Zone> {
        self.zones.get(&id).filter(|z| !z.is_deleted()).cloned()
    }

    #[must_use]
    pub fn find_by_domain(&self, domain: &str) -> Option<Zone> {
        let domain = normalize_domain(domain).ok()?;
        self.live().find(|z| z.domain() == domain).cloned()
    }

    #[must_use]
    pub fn list(&self) -> Vec<Zone> {
        self.live().cloned().collect()
    }

    #[must_use]
    pub fn list_trashed(&self) -> Vec<Zone> {
        self.zones
            .values()
            .filter(|z| z.is_deleted())
            .cloned()
            .collect()
    }

    /// Insert or update `zone`, enforcing the store invariants.
    ///
    /// # Errors
    ///
    /// See [`ZoneStore::save`].
    pub fn save(&mut self, zone: &mut Zone) -> Result<(), StoreError> {
        self.ensure_domain_free(zone.domain(), zone.id())?;

        match zone.id() {
            Some(id) => {
                let stored = self
                    .zones
                    .get(&id)
                    .filter(|z| !z.is_deleted())
                    .ok_or(StoreError::NotFound { id })?;
                if zone.serial() < stored.serial() {
                    return Err(StoreError::SerialRegression {
                        domain: zone.domain().to_string(),
                        stored: stored.serial(),
                        attempted: zone.serial(),
                    });
                }
                self.zones.insert(id, zone.clone());
            }
            None => {
                self.next_id += 1;
                let id = ZoneId(self.next_id);
                zone.set_id(id);
                self.zones.insert(id, zone.clone());
            }
        }

        Ok(())
    }

    /// # Errors
    ///
    /// See [`ZoneStore::soft_delete`].
    pub fn soft_delete(
        &mut self,
        id: ZoneId,
        deleted_at: DateTime<Utc>,
    ) -> Result<Zone, StoreError> {
        let zone = self
            .zones
            .get_mut(&id)
            .filter(|z| !z.is_deleted())
            .ok_or(StoreError::NotFound { id })?;
        zone.set_deleted_at(Some(deleted_at));
        Ok(zone.clone())
    }

    /// # Errors
    ///
    /// See [`ZoneStore::restore`].
    pub fn restore(&mut self, id: ZoneId) -> Result<Zone, StoreError> {
        let zone = self.zones.get(&id).ok_or(StoreError::NotFound { id })?;
        if !zone.is_deleted() {
            return Err(StoreError::NotDeleted { id });
        }
        let domain = zone.domain().to_string();
        self.ensure_domain_free(&domain, Some(id))?;

        let zone = self
            .zones
            .get_mut(&id)
            .ok_or(StoreError::NotFound { id })?;
        zone.set_deleted_at(None);
        Ok(zone.clone())
    }

    fn live(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values().filter(|z| !z.is_deleted())
    }

    fn ensure_domain_free(&self, domain: &str, owner: Option<ZoneId>) -> Result<(), StoreError> {
        match self
            .live()
            .find(|z| z.domain() == domain && z.id() != owner)
            .and_then(Zone::id)
        {
            Some(existing) => Err(StoreError::DuplicateDomain {
                domain: domain.to_string(),
                existing,
            }),
            None => Ok(()),
        }
    }
}

/// What happened to a zone, as recorded in the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityEvent {
    Created,
    Updated,
    Deleted,
    Restored,
}

impl ActivityEvent {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Restored => "restored",
        }
    }
}

impl fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink for `(event, domain)` audit entries, called after a successful save.
pub trait ActivityLog {
    fn record(&mut self, event: ActivityEvent, domain: &str);
}

impl<T: ActivityLog + ?Sized> ActivityLog for &mut T {
    fn record(&mut self, event: ActivityEvent, domain: &str) {
        (**self).record(event, domain);
    }
}

/// Writes activity entries as structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingActivityLog;

impl ActivityLog for TracingActivityLog {
    fn record(&mut self, event: ActivityEvent, domain: &str) {
        info!(event = %event, domain = domain, "Zone activity");
    }
}

/// One entry kept by [`MemoryActivityLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub event: ActivityEvent,
    pub domain: String,
}

/// Keeps activity entries in memory for inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryActivityLog {
    entries: Vec<ActivityEntry>,
}

impl MemoryActivityLog {
    #[must_use]
    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }
}

impl ActivityLog for MemoryActivityLog {
    fn record(&mut self, event: ActivityEvent, domain: &str) {
        self.entries.push(ActivityEntry {
            event,
            domain: domain.to_string(),
        });
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
