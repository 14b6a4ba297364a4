// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for zonekeeper.
//!
//! This module provides specialized error types for:
//! - Zone entity invariants (domain names, serial number encoding)
//! - Configuration lookups (missing or malformed default values)
//! - The persistence collaborator (unknown zones, serial regressions, I/O)
//!
//! [`ZoneError`] is what the lifecycle operations return. It wraps the other two
//! so persistence and configuration failures propagate unchanged.

use crate::zone::ZoneId;
use thiserror::Error;

/// Errors raised by the zone lifecycle.
#[derive(Error, Debug)]
pub enum ZoneError {
    /// The domain name is empty after normalisation
    #[error("Invalid zone domain '{domain}': {reason}")]
    InvalidDomain {
        /// The domain as supplied by the caller
        domain: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The calendar date cannot be encoded as a `YYYYMMDD00` serial
    ///
    /// Only years 0 through 4294 fit in an unsigned 32-bit serial.
    #[error("Cannot encode year {year} as a YYYYMMDDvv serial number")]
    SerialOutOfRange {
        /// The year that was rejected
        year: i32,
    },

    /// Raising the serial would exceed the 32-bit range
    ///
    /// Wrapping around would break the monotonic ordering secondaries rely on,
    /// so the raise is refused instead.
    #[error("Serial number {serial} of zone '{domain}' cannot be raised any further")]
    SerialExhausted {
        /// The zone whose serial is exhausted
        domain: String,
        /// The current serial
        serial: u32,
    },

    /// A configuration lookup failed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The persistence collaborator failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised while resolving configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required key has no value
    #[error("Configuration key '{key}' is not set")]
    MissingKey {
        /// The key that was looked up
        key: String,
    },

    /// A key has a value that cannot be interpreted
    #[error("Configuration key '{key}' has invalid value '{value}': {reason}")]
    InvalidValue {
        /// The key that was looked up
        key: String,
        /// The raw value found
        value: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The settings document could not be read or parsed
    #[error("Failed to load settings from {source_name}: {reason}")]
    Load {
        /// File path or other description of the source
        source_name: String,
        /// Underlying failure
        reason: String,
    },
}

/// Errors raised by a [`crate::store::ZoneStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// No live zone with this id exists
    #[error("Zone {id} not found")]
    NotFound {
        /// The id that was looked up
        id: ZoneId,
    },

    /// Another live zone already uses this domain
    #[error("Domain '{domain}' is already used by zone {existing}")]
    DuplicateDomain {
        /// The conflicting domain
        domain: String,
        /// Id of the zone that owns the domain
        existing: ZoneId,
    },

    /// The save would lower the stored serial
    #[error("Refusing to lower serial of zone '{domain}' from {stored} to {attempted}")]
    SerialRegression {
        /// Domain of the zone being saved
        domain: String,
        /// Serial currently persisted
        stored: u32,
        /// Serial the caller attempted to persist
        attempted: u32,
    },

    /// The zone is not in the trash and cannot be restored
    #[error("Zone {id} is not deleted")]
    NotDeleted {
        /// The id that was looked up
        id: ZoneId,
    },

    /// Reading or writing the backing file failed
    #[error("Zone store I/O error on {path}: {source}")]
    Io {
        /// Path of the backing file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The backing document could not be encoded or decoded
    #[error("Zone store document {path} is malformed: {reason}")]
    Malformed {
        /// Path of the backing file
        path: String,
        /// Explanation of what is malformed
        reason: String,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
