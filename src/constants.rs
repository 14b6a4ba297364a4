// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for zonekeeper.
//!
//! This module contains the numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Configuration Keys
// ============================================================================

/// Primary nameserver written into the SOA MNAME field
pub const KEY_ZONE_DEFAULT_MNAME: &str = "zone_default_mname";

/// Hostmaster email written into the SOA RNAME field (`@` becomes `.`)
pub const KEY_ZONE_DEFAULT_RNAME: &str = "zone_default_rname";

/// Default SOA refresh interval
pub const KEY_ZONE_DEFAULT_REFRESH: &str = "zone_default_refresh";

/// Default SOA retry interval
pub const KEY_ZONE_DEFAULT_RETRY: &str = "zone_default_retry";

/// Default SOA expire time
pub const KEY_ZONE_DEFAULT_EXPIRE: &str = "zone_default_expire";

/// Default SOA negative caching TTL
pub const KEY_ZONE_DEFAULT_NEGATIVE_TTL: &str = "zone_default_negative_ttl";

/// Default `$TTL` for the zone file
pub const KEY_ZONE_DEFAULT_DEFAULT_TTL: &str = "zone_default_default_ttl";

/// Whether serial dates are taken from UTC or local time (`utc` or `local`)
pub const KEY_SERIAL_TIMEZONE: &str = "serial_timezone";

/// Prefix for environment variable overrides (`ZONEKEEPER_ZONE_DEFAULT_REFRESH`, ...)
pub const ENV_OVERRIDE_PREFIX: &str = "ZONEKEEPER_";

/// Every key understood by [`crate::config::Settings`]
pub const KNOWN_CONFIG_KEYS: &[&str] = &[
    KEY_ZONE_DEFAULT_MNAME,
    KEY_ZONE_DEFAULT_RNAME,
    KEY_ZONE_DEFAULT_REFRESH,
    KEY_ZONE_DEFAULT_RETRY,
    KEY_ZONE_DEFAULT_EXPIRE,
    KEY_ZONE_DEFAULT_NEGATIVE_TTL,
    KEY_ZONE_DEFAULT_DEFAULT_TTL,
    KEY_SERIAL_TIMEZONE,
];

// ============================================================================
// DNS Timer Defaults
// ============================================================================

/// Default TTL for zone files (1 hour)
pub const DEFAULT_ZONE_TTL_SECS: u32 = 3600;

/// Default SOA refresh interval (1 hour)
pub const DEFAULT_SOA_REFRESH_SECS: u32 = 3600;

/// Default SOA retry interval (10 minutes)
pub const DEFAULT_SOA_RETRY_SECS: u32 = 600;

/// Default SOA expire time (7 days)
pub const DEFAULT_SOA_EXPIRE_SECS: u32 = 604_800;

/// Default SOA negative TTL (1 day)
pub const DEFAULT_SOA_NEGATIVE_TTL_SECS: u32 = 86400;

// ============================================================================
// Serial Number Constants
// ============================================================================

/// Multiplier placing the year in `YYYYMMDDvv`
pub const SERIAL_YEAR_FACTOR: u32 = 1_000_000;

/// Multiplier placing the month in `YYYYMMDDvv`
pub const SERIAL_MONTH_FACTOR: u32 = 10_000;

/// Multiplier placing the day in `YYYYMMDDvv`
pub const SERIAL_DAY_FACTOR: u32 = 100;

/// Number of revisions that fit in the two-digit `vv` counter of a single day.
///
/// The 101st serial issued on one calendar day looks like the next day's base.
/// That overflow is logged, never corrected.
pub const SERIAL_REVISIONS_PER_DAY: u32 = 100;

/// Largest year whose `YYYYMMDD00` encoding fits in a u32
pub const SERIAL_MAX_YEAR: u32 = 4294;

// ============================================================================
// SOA Rendering
// ============================================================================

/// Indentation of the value lines inside the SOA parentheses
pub const SOA_VALUE_INDENT: usize = 33;

/// Width of the value column before the `;` comment
pub const SOA_VALUE_WIDTH: usize = 13;

/// Padding between the `@` owner and the `IN` class
pub const SOA_OWNER_PADDING: usize = 16;
