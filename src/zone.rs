// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The zone entity and its serial/change-tracking lifecycle.
//!
//! A [`Zone`] carries the state a BIND zone file is generated from: its domain,
//! SOA serial, master/slave designation and optional per-zone timer overrides.
//! It also carries the `has_modifications` flag telling the config push whether
//! the served zone file is stale.
//!
//! All transitions on [`Zone`] are pure. Persisting the result and recording it
//! in the activity log is the job of [`crate::manager::ZoneManager`].
//!
//! # Example
//!
//! ```rust
//! use zonekeeper::zone::{NewZone, SerialRaise, Zone};
//!
//! let mut zone = Zone::new(NewZone::master("Example.COM"), 2_024_030_500).unwrap();
//! assert_eq!(zone.domain(), "example.com");
//! assert!(zone.has_pending_changes());
//!
//! // Edits accumulate under one serial until the zone is pushed
//! assert_eq!(
//!     zone.raise_serial(false, 2_024_030_500).unwrap(),
//!     SerialRaise::Unchanged(2_024_030_500)
//! );
//!
//! zone.set_pending_changes(false);
//! assert_eq!(zone.raise_serial(false, 2_024_030_500).unwrap().serial(), 2_024_030_501);
//! ```

pub mod serial;
pub mod soa;
pub mod timers;

use crate::errors::ZoneError;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

pub use timers::ZoneTimers;

/// Primary key of a persisted zone.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ZoneId(pub u64);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of [`Zone::raise_serial`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialRaise {
    /// The zone already had pending changes; the serial was kept
    Unchanged(u32),
    /// The serial moved forward and the zone became dirty
    Raised {
        /// Serial before the raise
        previous: u32,
        /// Serial after the raise
        serial: u32,
    },
}

impl SerialRaise {
    /// The serial the zone carries after the call.
    #[must_use]
    pub fn serial(self) -> u32 {
        match self {
            Self::Unchanged(serial) | Self::Raised { serial, .. } => serial,
        }
    }

    /// Whether the zone was mutated.
    #[must_use]
    pub fn is_raised(self) -> bool {
        matches!(self, Self::Raised { .. })
    }
}

/// Input for creating a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewZone {
    /// Domain name; normalised to lower case
    pub domain: String,
    /// Server to transfer from; `None` makes this a master zone
    pub master_server: Option<IpAddr>,
    /// Whether `timers` override the configured defaults
    pub custom_settings: bool,
    /// Per-zone timer overrides
    pub timers: ZoneTimers,
}

impl NewZone {
    /// A master zone using the configured timer defaults.
    #[must_use]
    pub fn master(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            ..Self::default()
        }
    }

    /// A slave zone mirroring `master_server`.
    #[must_use]
    pub fn slave(domain: &str, master_server: IpAddr) -> Self {
        Self {
            domain: domain.to_string(),
            master_server: Some(master_server),
            ..Self::default()
        }
    }

    /// Use `timers` instead of the configured defaults.
    #[must_use]
    pub fn with_custom_timers(mut self, timers: ZoneTimers) -> Self {
        self.custom_settings = true;
        self.timers = timers;
        self
    }
}

/// A field-level edit of an existing zone. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneChanges {
    /// New domain name
    pub domain: Option<String>,
    /// New master server; `Some(None)` turns the zone into a master zone
    pub master_server: Option<Option<IpAddr>>,
    /// New custom-settings flag
    pub custom_settings: Option<bool>,
    /// Replacement timer overrides
    pub timers: Option<ZoneTimers>,
}

impl ZoneChanges {
    /// Whether this edit touches nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain.is_none()
            && self.master_server.is_none()
            && self.custom_settings.is_none()
            && self.timers.is_none()
    }
}

/// A BIND zone under management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    id: Option<ZoneId>,
    domain: String,
    serial: u32,
    master_server: Option<IpAddr>,
    custom_settings: bool,
    timers: ZoneTimers,
    has_modifications: bool,
    deleted_at: Option<DateTime<Utc>>,
}

impl Zone {
    /// Build a new, not yet persisted zone carrying `serial`.
    ///
    /// New zones start with pending changes: they have never been pushed.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidDomain`] when the domain is unusable.
    pub fn new(new: NewZone, serial: u32) -> Result<Self, ZoneError> {
        Ok(Self {
            id: None,
            domain: normalize_domain(&new.domain)?,
            serial,
            master_server: new.master_server,
            custom_settings: new.custom_settings,
            timers: new.timers,
            has_modifications: true,
            deleted_at: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> Option<ZoneId> {
        self.id
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    pub fn serial(&self) -> u32 {
        self.serial
    }

    #[must_use]
    pub fn master_server(&self) -> Option<IpAddr> {
        self.master_server
    }

    #[must_use]
    pub fn custom_settings(&self) -> bool {
        self.custom_settings
    }

    #[must_use]
    pub fn timers(&self) -> &ZoneTimers {
        &self.timers
    }

    #[must_use]
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// A zone without a master server is authoritative for its data.
    #[must_use]
    pub fn is_master_zone(&self) -> bool {
        self.master_server.is_none()
    }

    /// Whether the pushed zone file is stale relative to this state.
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        self.has_modifications
    }

    /// Set the pending-changes flag and report whether it actually changed.
    ///
    /// A `false` return means the caller has nothing to persist.
    pub fn set_pending_changes(&mut self, value: bool) -> bool {
        if self.has_modifications == value {
            return false;
        }
        self.has_modifications = value;
        true
    }

    /// Replace the domain, normalising it to lower case.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidDomain`] when the domain is unusable.
    pub fn set_domain(&mut self, domain: &str) -> Result<bool, ZoneError> {
        let domain = normalize_domain(domain)?;
        if domain == self.domain {
            return Ok(false);
        }
        self.domain = domain;
        Ok(true)
    }

    /// Apply a field-level edit and report whether anything changed.
    ///
    /// The serial is not touched here; see [`Zone::raise_serial`].
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidDomain`] when the new domain is unusable. The
    /// zone is left unmodified in that case.
    pub fn apply_changes(&mut self, changes: &ZoneChanges) -> Result<bool, ZoneError> {
        let domain = changes
            .domain
            .as_deref()
            .map(normalize_domain)
            .transpose()?;

        let mut changed = false;

        if let Some(domain) = domain {
            if domain != self.domain {
                self.domain = domain;
                changed = true;
            }
        }
        if let Some(master_server) = changes.master_server {
            if master_server != self.master_server {
                self.master_server = master_server;
                changed = true;
            }
        }
        if let Some(custom_settings) = changes.custom_settings {
            if custom_settings != self.custom_settings {
                self.custom_settings = custom_settings;
                changed = true;
            }
        }
        if let Some(timers) = changes.timers {
            if timers != self.timers {
                self.timers = timers;
                changed = true;
            }
        }

        Ok(changed)
    }

    /// Move the serial forward and mark the zone dirty.
    ///
    /// While the zone already has pending changes and `force` is false, edits
    /// accumulate under the current serial and nothing changes. Otherwise the
    /// serial becomes `current + 1` when `current >= now_serial` (another edit
    /// on the same day) and `now_serial` when the stored serial is older.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::SerialExhausted`] when the serial is already
    /// `u32::MAX`.
    pub fn raise_serial(&mut self, force: bool, now_serial: u32) -> Result<SerialRaise, ZoneError> {
        if self.has_modifications && !force {
            return Ok(SerialRaise::Unchanged(self.serial));
        }

        let previous = self.serial;
        let serial =
            serial::next_serial(previous, now_serial).ok_or_else(|| ZoneError::SerialExhausted {
                domain: self.domain.clone(),
                serial: previous,
            })?;

        self.serial = serial;
        self.has_modifications = true;

        Ok(SerialRaise::Raised { previous, serial })
    }

    pub(crate) fn set_id(&mut self, id: ZoneId) {
        self.id = Some(id);
    }

    pub(crate) fn set_deleted_at(&mut self, deleted_at: Option<DateTime<Utc>>) {
        self.deleted_at = deleted_at;
    }

    /// Rebuild a zone from its stored form.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidDomain`] when the stored domain is unusable.
    pub fn from_record(record: ZoneRecord) -> Result<Self, ZoneError> {
        Ok(Self {
            id: record.id,
            domain: normalize_domain(&record.domain)?,
            serial: record.serial,
            master_server: record.master_server,
            custom_settings: record.custom_settings,
            timers: record.timers,
            has_modifications: record.has_modifications,
            deleted_at: record.deleted_at,
        })
    }

    /// The stored form of this zone.
    #[must_use]
    pub fn to_record(&self) -> ZoneRecord {
        ZoneRecord {
            id: self.id,
            domain: self.domain.clone(),
            serial: self.serial,
            master_server: self.master_server,
            custom_settings: self.custom_settings,
            timers: self.timers,
            has_modifications: self.has_modifications,
            deleted_at: self.deleted_at,
        }
    }
}

impl TryFrom<ZoneRecord> for Zone {
    type Error = ZoneError;

    fn try_from(record: ZoneRecord) -> Result<Self, Self::Error> {
        Self::from_record(record)
    }
}

impl From<&Zone> for ZoneRecord {
    fn from(zone: &Zone) -> Self {
        zone.to_record()
    }
}

/// Stored and serialized form of a [`Zone`].
///
/// # Example
///
/// ```yaml
/// id: 1
/// domain: example.com
/// serial: 2024030501
/// customSettings: true
/// refresh: 7200
/// hasModifications: false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRecord {
    /// Primary key; absent until the zone is first saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ZoneId>,

    /// Zone domain name (lower case)
    pub domain: String,

    /// SOA serial number in `YYYYMMDDvv` form
    pub serial: u32,

    /// Server this zone is transferred from; absent for master zones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_server: Option<IpAddr>,

    /// Whether the timer fields override the configured defaults
    #[serde(default)]
    pub custom_settings: bool,

    /// Per-zone timer overrides
    #[serde(flatten)]
    pub timers: ZoneTimers,

    /// Whether the served zone file is stale
    #[serde(default)]
    pub has_modifications: bool,

    /// Soft-delete tombstone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Normalise a domain name: trim whitespace and a trailing root dot, lower-case.
///
/// # Errors
///
/// Returns [`ZoneError::InvalidDomain`] when nothing is left or the name
/// contains whitespace.
pub fn normalize_domain(domain: &str) -> Result<String, ZoneError> {
    let trimmed = domain.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);

    if trimmed.is_empty() {
        return Err(ZoneError::InvalidDomain {
            domain: domain.to_string(),
            reason: "domain cannot be empty".to_string(),
        });
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ZoneError::InvalidDomain {
            domain: domain.to_string(),
            reason: "domain cannot contain whitespace".to_string(),
        });
    }

    Ok(trimmed.to_lowercase())
}

#[cfg(test)]
#[path = "zone_tests.rs"]
mod zone_tests;
