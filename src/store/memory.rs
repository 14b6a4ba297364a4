// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory zone store.

use crate::errors::StoreError;
use crate::store::{ZoneStore, ZoneTable};
use crate::zone::{Zone, ZoneId};
use chrono::{DateTime, Utc};

/// Zone store that lives in memory and counts its writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryZoneStore {
    table: ZoneTable,
    writes: usize,
}

impl MemoryZoneStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful mutating calls so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ZoneStore for MemoryZoneStore {
    fn find(&self, id: ZoneId) -> Result<Option<Zone>, StoreError> {
        Ok(self.table.find(id))
    }

    fn find_by_domain(&self, domain: &str) -> Result<Option<Zone>, StoreError> {
        Ok(self.table.find_by_domain(domain))
    }

    fn list(&self) -> Result<Vec<Zone>, StoreError> {
        Ok(self.table.list())
    }

    fn list_trashed(&self) -> Result<Vec<Zone>, StoreError> {
        Ok(self.table.list_trashed())
    }

    fn save(&mut self, zone: &mut Zone) -> Result<(), StoreError> {
        self.table.save(zone)?;
        self.writes += 1;
        Ok(())
    }

    fn soft_delete(&mut self, id: ZoneId, deleted_at: DateTime<Utc>) -> Result<Zone, StoreError> {
        let zone = self.table.soft_delete(id, deleted_at)?;
        self.writes += 1;
        Ok(zone)
    }

    fn restore(&mut self, id: ZoneId) -> Result<Zone, StoreError> {
        let zone = self.table.restore(id)?;
        self.writes += 1;
        Ok(zone)
    }
}
