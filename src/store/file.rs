// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! YAML file backed zone store.
//!
//! All zones, including tombstoned ones, live in a single document:
//!
//! ```yaml
//! lastId: 2
//! zones:
//!   - id: 1
//!     domain: example.com
//!     serial: 2024030501
//!     hasModifications: true
//!   - id: 2
//!     domain: example.net
//!     serial: 2024030500
//!     masterServer: 192.0.2.53
//!     deletedAt: 2024-03-05T10:00:00Z
//! ```
//!
//! The document is rewritten after every write. It is first written next to
//! the target and then renamed over it, so a crash never leaves half a file.

use crate::errors::StoreError;
use crate::store::{ZoneStore, ZoneTable};
use crate::zone::{Zone, ZoneId, ZoneRecord};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk layout of a [`FileZoneStore`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStoreDocument {
    /// Highest zone id handed out so far
    #[serde(default)]
    pub last_id: u64,

    /// Every stored zone, live or deleted
    #[serde(default)]
    pub zones: Vec<ZoneRecord>,
}

/// Zone store persisted to a YAML document.
#[derive(Debug)]
pub struct FileZoneStore {
    path: PathBuf,
    table: ZoneTable,
}

impl FileZoneStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file cannot be read and
    /// [`StoreError::Malformed`] when it cannot be parsed or is inconsistent
    /// (a zone without id, a repeated id or two live zones on one domain).
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if !path.exists() {
            debug!("Zone store {} does not exist yet, starting empty", path.display());
            return Ok(Self {
                path,
                table: ZoneTable::default(),
            });
        }

        let content = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let document: ZoneStoreDocument = if content.trim().is_empty() {
            ZoneStoreDocument::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| StoreError::Malformed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        };

        let zones = document
            .zones
            .into_iter()
            .map(Zone::from_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Malformed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        debug!("Loaded {} zones from {}", zones.len(), path.display());

        let table = ZoneTable::from_zones(zones, document.last_id).map_err(|reason| {
            StoreError::Malformed {
                path: path.display().to_string(),
                reason,
            }
        })?;

        Ok(Self { path, table })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `change` on a copy of the table and adopt the copy only once it
    /// is on disk. A failed write leaves memory and file in agreement.
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut ZoneTable) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut staged = self.table.clone();
        let result = change(&mut staged)?;
        self.write(&staged)?;
        self.table = staged;
        Ok(result)
    }

    fn write(&self, table: &ZoneTable) -> Result<(), StoreError> {
        let document = ZoneStoreDocument {
            last_id: table.last_id(),
            zones: table.all().map(Zone::to_record).collect(),
        };

        let yaml = serde_yaml::to_string(&document).map_err(|e| StoreError::Malformed {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let io_error = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        fs::write(&staging, yaml).map_err(io_error)?;
        fs::rename(&staging, &self.path).map_err(io_error)?;

        debug!("Wrote zone store {}", self.path.display());
        Ok(())
    }
}

impl ZoneStore for FileZoneStore {
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
        // The id is only handed back once the write has landed
        let mut saved = zone.clone();
        self.commit(|table| table.save(&mut saved))?;
        *zone = saved;
        Ok(())
    }

    fn soft_delete(&mut self, id: ZoneId, deleted_at: DateTime<Utc>) -> Result<Zone, StoreError> {
        self.commit(|table| table.soft_delete(id, deleted_at))
    }

    fn restore(&mut self, id: ZoneId) -> Result<Zone, StoreError> {
        self.commit(|table| table.restore(id))
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod file_tests;
