// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! SOA record rendering for BIND zone files.
//!
//! The stanza is written with fixed column widths so generated zone files stay
//! byte-identical to what existing tooling expects:
//!
//! ```text
//! @                IN	SOA	ns1.example.com. hostmaster.example.com. (
//!                                  2024030500    ; Serial (aaaammddvv)
//!                                  3600          ; Refresh
//!                                  600           ; Retry
//!                                  604800        ; Expire
//!                                  86400         ; Negative TTL
//! )
//! ```

use crate::config::ConfigProvider;
use crate::constants::{
    KEY_ZONE_DEFAULT_MNAME, KEY_ZONE_DEFAULT_RNAME, SOA_OWNER_PADDING, SOA_VALUE_INDENT,
    SOA_VALUE_WIDTH,
};
use crate::errors::ConfigError;
use crate::zone::timers::TimerResolver;
use crate::zone::Zone;
use std::fmt;

/// Fully resolved SOA values of a zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoaRecord {
    /// Primary nameserver (MNAME), without the trailing dot
    pub primary_ns: String,
    /// Hostmaster mailbox (RNAME) in DNS form, without the trailing dot
    pub hostmaster: String,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub negative_ttl: u32,
}

impl SoaRecord {
    /// Resolve the SOA values of `zone`.
    ///
    /// MNAME and RNAME always come from configuration; the timers follow the
    /// zone's custom settings.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a needed configuration value is missing
    /// or malformed.
    pub fn resolve<C: ConfigProvider + ?Sized>(
        zone: &Zone,
        config: &C,
    ) -> Result<Self, ConfigError> {
        let timers = TimerResolver::new(zone, config);

        Ok(Self {
            primary_ns: strip_root(&config.require_str(KEY_ZONE_DEFAULT_MNAME)?).to_string(),
            hostmaster: hostmaster_to_rname(&config.require_str(KEY_ZONE_DEFAULT_RNAME)?),
            serial: zone.serial(),
            refresh: timers.refresh()?,
            retry: timers.retry()?,
            expire: timers.expire()?,
            negative_ttl: timers.negative_ttl()?,
        })
    }
}

impl fmt::Display for SoaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "@{:SOA_OWNER_PADDING$}IN\tSOA\t{}. {}. (",
            "", self.primary_ns, self.hostmaster
        )?;

        let lines = [
            (self.serial, "Serial (aaaammddvv)"),
            (self.refresh, "Refresh"),
            (self.retry, "Retry"),
            (self.expire, "Expire"),
            (self.negative_ttl, "Negative TTL"),
        ];
        for (value, comment) in lines {
            writeln!(
                f,
                "{:SOA_VALUE_INDENT$}{:<SOA_VALUE_WIDTH$} ; {}",
                "", value, comment
            )?;
        }

        writeln!(f, ")")
    }
}

/// Convert a hostmaster email address into SOA RNAME form.
///
/// `hostmaster@example.com` becomes `hostmaster.example.com`. A trailing dot
/// is dropped; the renderer adds it back.
#[must_use]
pub fn hostmaster_to_rname(email: &str) -> String {
    strip_root(email.trim()).replace('@', ".")
}

fn strip_root(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Render the `$TTL` directive followed by the SOA stanza.
///
/// This is the head of every generated master zone file; resource records
/// are appended after it.
///
/// # Errors
///
/// Returns a [`ConfigError`] when a needed configuration value is missing
/// or malformed.
pub fn render_zone_header<C: ConfigProvider + ?Sized>(
    zone: &Zone,
    config: &C,
) -> Result<String, ConfigError> {
    let default_ttl = TimerResolver::new(zone, config).default_ttl()?;
    let soa = SoaRecord::resolve(zone, config)?;
    Ok(format!("$TTL {default_ttl}\n{soa}"))
}

#[cfg(test)]
#[path = "soa_tests.rs"]
mod soa_tests;
