// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the zone lifecycle.
//!
//! All metrics carry the `zonekeeper_` prefix and live in [`METRICS_REGISTRY`].
//!
//! # Metrics Categories
//!
//! - **Serial Metrics** - Serial raises, skipped raises and daily counter overflows
//! - **Persistence Metrics** - Writes issued to the zone store, by activity event
//!
//! # Example
//!
//! ```rust,no_run
//! use zonekeeper::metrics::{gather_metrics, record_serial_raised};
//!
//! record_serial_raised(true);
//! println!("{}", gather_metrics().unwrap());
//! ```

use prometheus::{CounterVec, Encoder, IntCounter, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all zonekeeper metrics
const METRICS_NAMESPACE: &str = "zonekeeper";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Serial Metrics
// ============================================================================

/// Total number of serial raises
///
/// Labels:
/// - `mode`: `forced` or `clean` (raise of a zone without pending changes)
pub static SERIAL_RAISES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_serial_raises_total"),
        "Total number of SOA serial raises by mode",
    );
    let counter = CounterVec::new(opts, &["mode"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of raise requests absorbed by pending changes
pub static SERIAL_RAISE_SKIPPED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        format!("{METRICS_NAMESPACE}_serial_raise_skipped_total"),
        "Total number of serial raise requests skipped because changes were already pending",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of serials that left their day's revision space
pub static SERIAL_COUNTER_OVERFLOWS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        format!("{METRICS_NAMESPACE}_serial_counter_overflows_total"),
        "Total number of serials issued beyond the 100 revisions available per day",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Persistence Metrics
// ============================================================================

/// Total number of zone store writes
///
/// Labels:
/// - `event`: activity event of the write (`created`, `updated`, `deleted`, `restored`)
pub static ZONE_WRITES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_zone_writes_total"),
        "Total number of zone store writes by activity event",
    );
    let counter = CounterVec::new(opts, &["event"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a serial raise
///
/// # Arguments
/// * `forced` - Whether the raise was forced past pending changes
pub fn record_serial_raised(forced: bool) {
    let mode = if forced { "forced" } else { "clean" };
    SERIAL_RAISES_TOTAL.with_label_values(&[mode]).inc();
}

/// Record a raise request that kept the current serial
pub fn record_serial_raise_skipped() {
    SERIAL_RAISE_SKIPPED_TOTAL.inc();
}

/// Record a serial beyond its day's revision space
pub fn record_serial_counter_overflow() {
    SERIAL_COUNTER_OVERFLOWS_TOTAL.inc();
}

/// Record a zone store write
///
/// # Arguments
/// * `event` - Activity event name of the write
pub fn record_zone_write(event: &str) {
    ZONE_WRITES_TOTAL.with_label_values(&[event]).inc();
}

/// Gather all metrics in Prometheus text format
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
