// Sigwatch Exporter - Prometheus metrics definitions
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Prometheus metrics for sigwatch.
//!
//! This module defines all Prometheus metrics exposed by the exporter
//! and updates them from each cycle's batch.

use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_gauge, register_gauge_vec, Counter, Encoder, Gauge, GaugeVec,
    TextEncoder,
};
use sigwatch::{ReportBatch, Status};
use std::time::Duration;

lazy_static! {
    // ============================================================
    // Per-device metrics
    // ============================================================

    /// Device status code.
    /// Values: 0 = OK, 1 = WARNING, 2 = CRITICAL, 3 = UNREACHABLE, 4 = INVALID
    pub static ref DEVICE_STATUS: GaugeVec = register_gauge_vec!(
        "sigwatch_device_status",
        "Device status (0=OK, 1=WARNING, 2=CRITICAL, 3=UNREACHABLE, 4=INVALID)",
        &["device", "kind"]
    ).unwrap();

    /// Evaluated value: variance percent, drift degrees or bitrate Mbps.
    /// Set to NaN when the value is undefined.
    pub static ref DEVICE_VALUE: GaugeVec = register_gauge_vec!(
        "sigwatch_device_value",
        "Evaluated device value (variance %, drift degrees or bitrate Mbps)",
        &["device", "kind"]
    ).unwrap();

    /// Absent samples in the device's latest window.
    pub static ref DEVICE_ABSENT_SAMPLES: GaugeVec = register_gauge_vec!(
        "sigwatch_device_absent_samples",
        "Absent samples in the latest window",
        &["device"]
    ).unwrap();

    // ============================================================
    // Cycle metrics
    // ============================================================

    /// Completed poll cycles.
    pub static ref CYCLES_TOTAL: Counter = register_counter!(
        "sigwatch_cycles_total",
        "Completed poll cycles"
    ).unwrap();

    /// Wall-clock duration of the latest cycle.
    pub static ref CYCLE_DURATION_SECONDS: Gauge = register_gauge!(
        "sigwatch_cycle_duration_seconds",
        "Duration of the latest poll cycle in seconds"
    ).unwrap();

    /// Absent samples across all cycles.
    pub static ref ABSENT_SAMPLES_TOTAL: Counter = register_counter!(
        "sigwatch_absent_samples_total",
        "Absent samples across all cycles"
    ).unwrap();

    /// Reports per status in the latest cycle.
    pub static ref REPORTS_BY_STATUS: GaugeVec = register_gauge_vec!(
        "sigwatch_reports",
        "Reports per status in the latest cycle",
        &["status"]
    ).unwrap();
}

/// Update every metric from one cycle.
pub fn record_batch(batch: &ReportBatch, elapsed: Duration) {
    for report in batch {
        let kind = report.kind().as_str();
        DEVICE_STATUS
            .with_label_values(&[report.name(), kind])
            .set(report.status().code() as f64);
        DEVICE_VALUE
            .with_label_values(&[report.name(), kind])
            .set(report.value().unwrap_or(f64::NAN));
        DEVICE_ABSENT_SAMPLES
            .with_label_values(&[report.name()])
            .set(report.absent_samples() as f64);
    }

    for status in Status::ALL {
        REPORTS_BY_STATUS
            .with_label_values(&[status.as_str()])
            .set(batch.summary.count(status) as f64);
    }

    CYCLES_TOTAL.inc();
    CYCLE_DURATION_SECONDS.set(elapsed.as_secs_f64());
    ABSENT_SAMPLES_TOTAL.inc_by(batch.summary.absent_samples as f64);
}

/// Encode all metrics to Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
