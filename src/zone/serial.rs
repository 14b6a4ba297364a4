// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Date-encoded SOA serial numbers.
//!
//! Serials follow the common `YYYYMMDDvv` convention: the date of the first edit
//! of the day followed by a two-digit revision counter. The counter only has
//! room for 100 serials per day; the 101st carries into what looks like the next
//! day's base. That ceiling is inherited from the convention and left as is,
//! but crossing it is logged so it does not go unnoticed.
//!
//! The current date comes from a [`Clock`] so callers and tests can pin it.

use crate::config::TimePolicy;
use crate::constants::{
    SERIAL_DAY_FACTOR, SERIAL_MAX_YEAR, SERIAL_MONTH_FACTOR, SERIAL_REVISIONS_PER_DAY,
    SERIAL_YEAR_FACTOR,
};
use crate::errors::ZoneError;
use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveTime, Utc};
use std::cell::Cell;

/// Source of the current calendar date and instant.
pub trait Clock {
    /// Today's date according to this clock.
    fn today(&self) -> NaiveDate;

    /// The current instant, used for tombstones.
    fn now(&self) -> DateTime<Utc>;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }

    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Wall clock, read in UTC or local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    policy: TimePolicy,
}

impl SystemClock {
    #[must_use]
    pub fn new(policy: TimePolicy) -> Self {
        Self { policy }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        match self.policy {
            TimePolicy::Utc => Utc::now().date_naive(),
            TimePolicy::Local => Local::now().date_naive(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a date until moved explicitly.
#[derive(Debug, Clone)]
pub struct FixedClock {
    date: Cell<NaiveDate>,
}

impl FixedClock {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Cell::new(date),
        }
    }

    /// Pin the clock to `date`.
    pub fn set(&self, date: NaiveDate) {
        self.date.set(date);
    }

    /// Move the clock forward by `days`. Saturates at the end of the calendar.
    pub fn advance_days(&self, days: u64) {
        let current = self.date.get();
        self.date
            .set(current.checked_add_days(Days::new(days)).unwrap_or(current));
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date.get()
    }

    /// Midnight UTC of the pinned date.
    fn now(&self) -> DateTime<Utc> {
        self.date.get().and_time(NaiveTime::MIN).and_utc()
    }
}

/// Encode `date` as a `YYYYMMDD00` serial.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use zonekeeper::zone::serial::generate_serial_number;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// assert_eq!(generate_serial_number(date).unwrap(), 2_024_030_500);
/// ```
///
/// # Errors
///
/// Returns [`ZoneError::SerialOutOfRange`] for years that do not fit a u32
/// serial (negative or beyond 4294).
pub fn generate_serial_number(date: NaiveDate) -> Result<u32, ZoneError> {
    let year = u32::try_from(date.year())
        .ok()
        .filter(|year| *year <= SERIAL_MAX_YEAR)
        .ok_or(ZoneError::SerialOutOfRange { year: date.year() })?;

    Ok(year * SERIAL_YEAR_FACTOR + date.month() * SERIAL_MONTH_FACTOR + date.day() * SERIAL_DAY_FACTOR)
}

/// Serial generator bound to a clock.
#[derive(Debug, Clone)]
pub struct SerialGenerator<C> {
    clock: C,
}

impl<C: Clock> SerialGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Today's base serial (`YYYYMMDD00`).
    ///
    /// # Errors
    ///
    /// See [`generate_serial_number`].
    pub fn generate(&self) -> Result<u32, ZoneError> {
        generate_serial_number(self.clock.today())
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// The serial following `current` given today's base serial `now`.
///
/// Returns `None` once `current` is `u32::MAX`.
#[must_use]
pub fn next_serial(current: u32, now: u32) -> Option<u32> {
    if current >= now {
        current.checked_add(1)
    } else {
        Some(now)
    }
}

/// Whether `serial` has left the revision space of the day whose base is `now`.
#[must_use]
pub fn exceeds_daily_revisions(serial: u32, now: u32) -> bool {
    serial >= now.saturating_add(SERIAL_REVISIONS_PER_DAY)
}

/// Decode the date part of a `YYYYMMDDvv` serial, if it is a valid date.
#[must_use]
pub fn serial_date(serial: u32) -> Option<NaiveDate> {
    let year = i32::try_from(serial / SERIAL_YEAR_FACTOR).ok()?;
    let month = (serial / SERIAL_MONTH_FACTOR) % 100;
    let day = (serial / SERIAL_DAY_FACTOR) % 100;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// The two-digit revision counter of a `YYYYMMDDvv` serial.
#[must_use]
pub fn serial_revision(serial: u32) -> u32 {
    serial % SERIAL_DAY_FACTOR
}

#[cfg(test)]
#[path = "serial_tests.rs"]
mod serial_tests;
