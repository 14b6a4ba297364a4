// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for zonekeeper error types.

#[cfg(test)]
mod tests {
    use crate::errors::*;
    use crate::zone::ZoneId;
    use std::error::Error as _;

    #[test]
    fn test_invalid_domain_error() {
        let error = ZoneError::InvalidDomain {
            domain: "  ".to_string(),
            reason: "domain cannot be empty".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Invalid zone domain '  ': domain cannot be empty"
        );
    }

    #[test]
    fn test_serial_out_of_range_error() {
        let error = ZoneError::SerialOutOfRange { year: 5000 };

        assert_eq!(
            error.to_string(),
            "Cannot encode year 5000 as a YYYYMMDDvv serial number"
        );
    }

    #[test]
    fn test_serial_exhausted_error() {
        let error = ZoneError::SerialExhausted {
            domain: "example.com".to_string(),
            serial: u32::MAX,
        };

        assert_eq!(
            error.to_string(),
            "Serial number 4294967295 of zone 'example.com' cannot be raised any further"
        );
    }

    #[test]
    fn test_config_error_is_transparent() {
        let error: ZoneError = ConfigError::MissingKey {
            key: "zone_default_mname".to_string(),
        }
        .into();

        assert_eq!(
            error.to_string(),
            "Configuration key 'zone_default_mname' is not set"
        );
        assert!(matches!(error, ZoneError::Config(_)));
    }

    #[test]
    fn test_store_error_is_transparent() {
        let error: ZoneError = StoreError::NotFound { id: ZoneId(7) }.into();

        assert_eq!(error.to_string(), "Zone 7 not found");
        assert!(matches!(
            error,
            ZoneError::Store(StoreError::NotFound { id: ZoneId(7) })
        ));
    }

    #[test]
    fn test_invalid_value_error() {
        let error = ConfigError::InvalidValue {
            key: "zone_default_refresh".to_string(),
            value: "soon".to_string(),
            reason: "expected an unsigned integer".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Configuration key 'zone_default_refresh' has invalid value 'soon': expected an unsigned integer"
        );
    }

    #[test]
    fn test_serial_regression_error() {
        let error = StoreError::SerialRegression {
            domain: "example.com".to_string(),
            stored: 2_024_030_501,
            attempted: 2_024_030_500,
        };

        assert_eq!(
            error.to_string(),
            "Refusing to lower serial of zone 'example.com' from 2024030501 to 2024030500"
        );
    }

    #[test]
    fn test_duplicate_domain_error() {
        let error = StoreError::DuplicateDomain {
            domain: "example.com".to_string(),
            existing: ZoneId(3),
        };

        assert_eq!(
            error.to_string(),
            "Domain 'example.com' is already used by zone 3"
        );
    }

    #[test]
    fn test_io_error_keeps_source() {
        let error = StoreError::Io {
            path: "/tmp/zones.yaml".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };

        assert!(error.to_string().starts_with("Zone store I/O error on /tmp/zones.yaml"));
        assert!(error.source().is_some());
    }
}
