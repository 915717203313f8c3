// Sigwatch Exporter - Poll loop and Prometheus exporter
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Site baseline export
//!
//! One reachability probe per device, written out as a JSON document with the
//! VLAN summary and as a flat CSV for onboarding sheets.

use crate::config::BaselineConfig;
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sigwatch::{Device, MetricSource};
use sigwatch_poller::Sampler;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// CSV column order
pub const CSV_HEADER: [&str; 5] = ["name", "ip", "type", "snmp_reachable", "timestamp"];

/// Reachability record for one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaselineRecord {
    pub name: String,
    pub ip: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub snmp_reachable: bool,
    pub timestamp: String,
}

/// Full site baseline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Baseline {
    pub timestamp: String,
    pub vlans: BTreeMap<String, String>,
    pub devices: Vec<BaselineRecord>,
}

fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// OID used to probe a device, if any
///
/// The configured reachability OID wins, then the device's role metric, then
/// its metric whose name sorts first.
pub fn probe_oid<'a>(config: &'a BaselineConfig, device: &'a Device) -> Option<&'a str> {
    config
        .reachability_oid
        .as_deref()
        .or_else(|| device.primary_metric_id())
        .or_else(|| device.metrics.values().next().map(String::as_str))
}

/// Probe every device once, in configured order
pub async fn collect<S: MetricSource>(
    source: &S,
    sampler: &Sampler,
    devices: &[Device],
    config: &BaselineConfig,
) -> Baseline {
    let mut records = Vec::with_capacity(devices.len());

    for device in devices {
        let snmp_reachable = match probe_oid(config, device) {
            Some(oid) => sampler
                .read_text(source, &device.address, oid)
                .await
                .is_some_and(|text| !text.is_empty()),
            None => {
                warn!(device = %device.name, "no OID to probe, marking unreachable");
                false
            }
        };

        info!(
            device = %device.name,
            ip = %device.address,
            reachable = snmp_reachable,
            "baseline probe"
        );

        records.push(BaselineRecord {
            name: device.name.clone(),
            ip: device.address.clone(),
            kind: device.type_label().to_string(),
            snmp_reachable,
            timestamp: iso(Utc::now()),
        });
    }

    Baseline {
        timestamp: iso(Utc::now()),
        vlans: config.vlans.clone(),
        devices: records,
    }
}

impl Baseline {
    /// Number of reachable devices
    pub fn reachable_count(&self) -> usize {
        self.devices.iter().filter(|d| d.snmp_reachable).count()
    }

    /// Write the full document as indented JSON
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Write the device records as CSV
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(CSV_HEADER)?;
        for record in &self.devices {
            writer.write_record([
                record.name.as_str(),
                record.ip.as_str(),
                record.kind.as_str(),
                if record.snmp_reachable { "true" } else { "false" },
                record.timestamp.as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}
