// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Effective SOA timer values.
//!
//! A zone either uses its own timer overrides (`custom_settings`) or the
//! process-wide defaults from the injected [`ConfigProvider`].

use crate::config::ConfigProvider;
use crate::constants::{
    KEY_ZONE_DEFAULT_DEFAULT_TTL, KEY_ZONE_DEFAULT_EXPIRE, KEY_ZONE_DEFAULT_NEGATIVE_TTL,
    KEY_ZONE_DEFAULT_REFRESH, KEY_ZONE_DEFAULT_RETRY,
};
use crate::errors::ConfigError;
use crate::zone::Zone;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Per-zone timer overrides, in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneTimers {
    /// How often secondaries check for updates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<u32>,

    /// How long secondaries wait before retrying a failed refresh
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<u32>,

    /// How long secondaries keep serving without reaching the master
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire: Option<u32>,

    /// How long negative answers are cached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_ttl: Option<u32>,

    /// `$TTL` of the zone file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_ttl: Option<u32>,
}

/// One of the five zone timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerField {
    Refresh,
    Retry,
    Expire,
    NegativeTtl,
    DefaultTtl,
}

impl TimerField {
    pub const ALL: [Self; 5] = [
        Self::Refresh,
        Self::Retry,
        Self::Expire,
        Self::NegativeTtl,
        Self::DefaultTtl,
    ];

    /// Configuration key holding the default for this timer.
    #[must_use]
    pub fn config_key(self) -> &'static str {
        match self {
            Self::Refresh => KEY_ZONE_DEFAULT_REFRESH,
            Self::Retry => KEY_ZONE_DEFAULT_RETRY,
            Self::Expire => KEY_ZONE_DEFAULT_EXPIRE,
            Self::NegativeTtl => KEY_ZONE_DEFAULT_NEGATIVE_TTL,
            Self::DefaultTtl => KEY_ZONE_DEFAULT_DEFAULT_TTL,
        }
    }

    /// The override for this timer in `timers`, if set.
    #[must_use]
    pub fn value(self, timers: &ZoneTimers) -> Option<u32> {
        match self {
            Self::Refresh => timers.refresh,
            Self::Retry => timers.retry,
            Self::Expire => timers.expire,
            Self::NegativeTtl => timers.negative_ttl,
            Self::DefaultTtl => timers.default_ttl,
        }
    }
}

/// All five timers after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTimers {
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub negative_ttl: u32,
    pub default_ttl: u32,
}

/// Resolves the effective timers of one zone.
///
/// With `custom_settings` enabled a timer comes from the zone itself; a
/// custom zone that leaves a timer blank still falls back to the configured
/// default. Without `custom_settings` the zone's own values are ignored.
pub struct TimerResolver<'a, C: ConfigProvider + ?Sized> {
    zone: &'a Zone,
    config: &'a C,
}

impl<'a, C: ConfigProvider + ?Sized> TimerResolver<'a, C> {
    pub fn new(zone: &'a Zone, config: &'a C) -> Self {
        Self { zone, config }
    }

    /// Effective value of `field`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the default is needed and is missing or
    /// not an unsigned integer.
    pub fn resolve(&self, field: TimerField) -> Result<u32, ConfigError> {
        if self.zone.custom_settings() {
            if let Some(value) = field.value(self.zone.timers()) {
                return Ok(value);
            }
        }
        self.config.require_u32(field.config_key())
    }

    /// # Errors
    ///
    /// See [`TimerResolver::resolve`].
    pub fn refresh(&self) -> Result<u32, ConfigError> {
        self.resolve(TimerField::Refresh)
    }

    /// # Errors
    ///
    /// See [`TimerResolver::resolve`].
    pub fn retry(&self) -> Result<u32, ConfigError> {
        self.resolve(TimerField::Retry)
    }

    /// # Errors
    ///
    /// See [`TimerResolver::resolve`].
    pub fn expire(&self) -> Result<u32, ConfigError> {
        self.resolve(TimerField::Expire)
    }

    /// # Errors
    ///
    /// See [`TimerResolver::resolve`].
    pub fn negative_ttl(&self) -> Result<u32, ConfigError> {
        self.resolve(TimerField::NegativeTtl)
    }

    /// # Errors
    ///
    /// See [`TimerResolver::resolve`].
    pub fn default_ttl(&self) -> Result<u32, ConfigError> {
        self.resolve(TimerField::DefaultTtl)
    }

    /// Resolve all five timers at once.
    ///
    /// # Errors
    ///
    /// Fails on the first timer that cannot be resolved.
    pub fn resolve_all(&self) -> Result<ResolvedTimers, ConfigError> {
        Ok(ResolvedTimers {
            refresh: self.refresh()?,
            retry: self.retry()?,
            expire: self.expire()?,
            negative_ttl: self.negative_ttl()?,
            default_ttl: self.default_ttl()?,
        })
    }
}

#[cfg(test)]
#[path = "timers_tests.rs"]
mod timers_tests;
