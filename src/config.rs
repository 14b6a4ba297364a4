// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Configuration lookups for zone defaults.
//!
//! Zone timers and the SOA owner fields fall back to process-wide defaults. Those
//! defaults are reached through the [`ConfigProvider`] trait, which is handed to
//! every consumer explicitly; there is no global registry.
//!
//! [`Settings`] is the stock provider. It starts from the built-in timer defaults,
//! layers a YAML settings file on top and finally applies `ZONEKEEPER_*`
//! environment variables.
//!
//! # Example
//!
//! ```rust
//! use zonekeeper::config::{ConfigProvider, Settings};
//!
//! let settings = Settings::from_yaml_str(
//!     "zone_default_mname: ns1.example.com\nzone_default_refresh: 7200\n",
//! )
//! .unwrap();
//!
//! assert_eq!(settings.require_u32("zone_default_refresh").unwrap(), 7200);
//! assert_eq!(settings.require_u32("zone_default_retry").unwrap(), 600);
//! ```

use crate::constants::{
    DEFAULT_SOA_EXPIRE_SECS, DEFAULT_SOA_NEGATIVE_TTL_SECS, DEFAULT_SOA_REFRESH_SECS,
    DEFAULT_SOA_RETRY_SECS, DEFAULT_ZONE_TTL_SECS, ENV_OVERRIDE_PREFIX, KEY_SERIAL_TIMEZONE,
    KEY_ZONE_DEFAULT_DEFAULT_TTL, KEY_ZONE_DEFAULT_EXPIRE, KEY_ZONE_DEFAULT_NEGATIVE_TTL,
    KEY_ZONE_DEFAULT_REFRESH, KEY_ZONE_DEFAULT_RETRY, KNOWN_CONFIG_KEYS,
};
use crate::errors::ConfigError;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Key/value lookup for process-wide zone defaults.
///
/// Implementors only provide [`ConfigProvider::get`]; the typed helpers are
/// derived from it.
pub trait ConfigProvider {
    /// Raw value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Value for `key`, trimmed, failing when absent or blank.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] when the key is unset or blank.
    fn require_str(&self, key: &str) -> Result<String, ConfigError> {
        match self.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(ConfigError::MissingKey {
                key: key.to_string(),
            }),
        }
    }

    /// Value for `key` parsed as an unsigned 32-bit integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] when the key is unset and
    /// [`ConfigError::InvalidValue`] when it is not an unsigned integer.
    fn require_u32(&self, key: &str) -> Result<u32, ConfigError> {
        let raw = self.require_str(key)?;
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
            reason: format!("expected an unsigned 32-bit integer ({e})"),
        })
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProvider for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// Which calendar the serial generator reads the current date from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimePolicy {
    /// Coordinated Universal Time
    #[default]
    Utc,
    /// The host's local timezone
    Local,
}

impl FromStr for TimePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            other => Err(ConfigError::InvalidValue {
                key: KEY_SERIAL_TIMEZONE.to_string(),
                value: other.to_string(),
                reason: "expected 'utc' or 'local'".to_string(),
            }),
        }
    }
}

impl fmt::Display for TimePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utc => write!(f, "utc"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// In-memory settings backed by a sorted key/value map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Settings seeded with the built-in timer defaults.
    ///
    /// The SOA owner fields (`zone_default_mname`, `zone_default_rname`) have
    /// no sensible default and stay unset.
    #[must_use]
    pub fn defaults() -> Self {
        let mut settings = Self::default();
        settings.set(KEY_ZONE_DEFAULT_REFRESH, DEFAULT_SOA_REFRESH_SECS.to_string());
        settings.set(KEY_ZONE_DEFAULT_RETRY, DEFAULT_SOA_RETRY_SECS.to_string());
        settings.set(KEY_ZONE_DEFAULT_EXPIRE, DEFAULT_SOA_EXPIRE_SECS.to_string());
        settings.set(
            KEY_ZONE_DEFAULT_NEGATIVE_TTL,
            DEFAULT_SOA_NEGATIVE_TTL_SECS.to_string(),
        );
        settings.set(KEY_ZONE_DEFAULT_DEFAULT_TTL, DEFAULT_ZONE_TTL_SECS.to_string());
        settings.set(KEY_SERIAL_TIMEZONE, TimePolicy::default().to_string());
        settings
    }

    /// Parse a YAML mapping of scalar values on top of [`Settings::defaults`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when the document is not a mapping and
    /// [`ConfigError::InvalidValue`] when a value is a sequence or mapping.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse_yaml(yaml, "<inline>")
    }

    /// Load a YAML settings file on top of [`Settings::defaults`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source_name = path.display().to_string();
        let yaml = std::fs::read_to_string(path).map_err(|e| ConfigError::Load {
            source_name: source_name.clone(),
            reason: e.to_string(),
        })?;
        debug!("Loaded settings file {}", source_name);
        Self::parse_yaml(&yaml, &source_name)
    }

    fn parse_yaml(yaml: &str, source_name: &str) -> Result<Self, ConfigError> {
        let mut settings = Self::defaults();

        // An empty document is valid and means "defaults only"
        if yaml.trim().is_empty() {
            return Ok(settings);
        }

        let document: BTreeMap<String, Value> =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Load {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            })?;

        for (key, value) in document {
            if !KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
                warn!("Ignoring unknown settings key '{}' in {}", key, source_name);
                continue;
            }
            match value {
                Value::Null => {
                    settings.values.remove(&key);
                }
                Value::String(s) => settings.set(&key, s),
                Value::Number(n) => settings.set(&key, n.to_string()),
                Value::Bool(b) => settings.set(&key, b.to_string()),
                other => {
                    return Err(ConfigError::InvalidValue {
                        key,
                        value: format!("{other:?}"),
                        reason: "expected a scalar value".to_string(),
                    })
                }
            }
        }

        Ok(settings)
    }

    /// Apply `ZONEKEEPER_<KEY>` environment variables for every known key.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// `lookup` receives the upper-cased, prefixed variable name.
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in KNOWN_CONFIG_KEYS {
            let variable = format!("{ENV_OVERRIDE_PREFIX}{}", key.to_ascii_uppercase());
            if let Some(value) = lookup(&variable) {
                debug!("Settings key '{}' overridden by {}", key, variable);
                self.set(key, value);
            }
        }
        self
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Timezone policy for serial generation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for anything but `utc` or `local`.
    pub fn serial_timezone(&self) -> Result<TimePolicy, ConfigError> {
        self.get(KEY_SERIAL_TIMEZONE)
            .map_or(Ok(TimePolicy::default()), |value| value.parse())
    }
}

impl ConfigProvider for Settings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
