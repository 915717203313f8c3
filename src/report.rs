// Sigwatch - Signal-quality telemetry evaluation
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Report records
//!
//! A [`Report`] is built once per device per cycle by [`ReportBuilder`] and
//! never changes afterwards. Serialization produces one JSON object whose
//! keys depend on the device kind:
//!
//! ```text
//! encoder  { encoder, ip, timestamp, samples, variance_percent, metrics, status }
//! laser    { laser, ip, timestamp, samples, drift_degrees,
//!            error_code, error_description, metrics, status }
//! camera   { camera, ip, timestamp, bitrate_mbps, metrics, status }
//! generic  { device, ip, type, timestamp, metrics, status }
//! ```
//!
//! Undefined values are written as `null`; no key is ever omitted. A device
//! carrying an inventory label (`ups`, `switch`) also gets `type` after `ip`.

use crate::device::{Device, DeviceKind, MetricKind};
use crate::sample::{Reading, ReadingFault, SampleSet};
use crate::signal::UNREACHABLE_DESCRIPTION;
use crate::statistic::Statistic;
use crate::status::Status;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Evaluated signal carried by a report
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Sample window and its statistic
    Windowed {
        metric: MetricKind,
        samples: SampleSet,
        statistic: Option<Statistic>,
    },
    /// One reading against a threshold pair
    Single { metric: MetricKind, reading: Reading },
    /// No evaluated signal, raw metrics only
    Raw,
}

/// Secondary-signal fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryField {
    /// Code as retrieved, `None` on retrieval failure
    pub code: Option<String>,
    /// Description from the code table
    pub description: String,
}

/// Immutable per-device report
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    name: String,
    address: String,
    kind: DeviceKind,
    device_type: Option<String>,
    captured_at: DateTime<Utc>,
    evaluation: Evaluation,
    secondary: Option<SecondaryField>,
    metrics: BTreeMap<String, Option<String>>,
    status: Status,
}

impl Report {
    /// Device name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Device address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Device kind
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Inventory label, falling back to the kind name
    pub fn type_label(&self) -> &str {
        self.device_type.as_deref().unwrap_or(self.kind.as_str())
    }

    /// Capture time
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Evaluated signal
    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    /// Secondary signal, for kinds that have one
    pub fn secondary(&self) -> Option<&SecondaryField> {
        self.secondary.as_ref()
    }

    /// Raw auxiliary metrics
    pub fn metrics(&self) -> &BTreeMap<String, Option<String>> {
        &self.metrics
    }

    /// Final status
    pub fn status(&self) -> Status {
        self.status
    }

    /// Sample window, for windowed kinds
    pub fn samples(&self) -> Option<&SampleSet> {
        match &self.evaluation {
            Evaluation::Windowed { samples, .. } => Some(samples),
            _ => None,
        }
    }

    /// Evaluated value: the statistic, or the single reading
    pub fn value(&self) -> Option<f64> {
        match &self.evaluation {
            Evaluation::Windowed { statistic, .. } => statistic.map(|s| s.value()),
            Evaluation::Single { reading, .. } => reading.value().map(|v| v.as_f64()),
            Evaluation::Raw => None,
        }
    }

    /// Samples missing from the window
    pub fn absent_samples(&self) -> usize {
        self.samples().map_or(0, SampleSet::absent_count)
    }

    /// ISO-8601 UTC timestamp
    pub fn timestamp(&self) -> String {
        self.captured_at
            .to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(self.kind.identity_key(), &self.name)?;
        map.serialize_entry("ip", &self.address)?;
        if self.kind == DeviceKind::Generic || self.device_type.is_some() {
            map.serialize_entry("type", self.type_label())?;
        }
        map.serialize_entry("timestamp", &self.timestamp())?;

        match &self.evaluation {
            Evaluation::Windowed {
                metric,
                samples,
                statistic,
            } => {
                map.serialize_entry("samples", samples)?;
                map.serialize_entry(metric.report_field(), &statistic.map(|s| s.value()))?;
            }
            Evaluation::Single { metric, reading } => {
                map.serialize_entry(metric.report_field(), &reading.value())?;
            }
            Evaluation::Raw => {}
        }

        if let Some(secondary) = &self.secondary {
            map.serialize_entry("error_code", &secondary.code)?;
            map.serialize_entry("error_description", &secondary.description)?;
        }

        map.serialize_entry("metrics", &self.metrics)?;
        map.serialize_entry("status", &self.status)?;
        map.end()
    }
}

/// Assembles a [`Report`]
///
/// Building is pure and infallible; parts that were never supplied come out
/// as explicit absent values.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    name: String,
    address: String,
    kind: DeviceKind,
    device_type: Option<String>,
    captured_at: DateTime<Utc>,
    evaluation: Option<Evaluation>,
    secondary: Option<SecondaryField>,
    metrics: BTreeMap<String, Option<String>>,
}

impl ReportBuilder {
    /// Start a report for a device at the given capture time
    pub fn new(device: &Device, captured_at: DateTime<Utc>) -> Self {
        Self {
            name: device.name.clone(),
            address: device.address.clone(),
            kind: device.kind,
            device_type: device.device_type.clone(),
            captured_at,
            evaluation: None,
            secondary: None,
            metrics: BTreeMap::new(),
        }
    }

    /// Attach a sample window and its statistic
    pub fn windowed(mut self, samples: SampleSet, statistic: Option<Statistic>) -> Self {
        if let Some(metric) = self.kind.metric_kind() {
            self.evaluation = Some(Evaluation::Windowed {
                metric,
                samples,
                statistic,
            });
        }
        self
    }

    /// Attach a single reading
    pub fn single(mut self, reading: Reading) -> Self {
        if let Some(metric) = self.kind.metric_kind() {
            self.evaluation = Some(Evaluation::Single { metric, reading });
        }
        self
    }

    /// Attach the secondary signal
    pub fn secondary(mut self, code: Option<String>, description: impl Into<String>) -> Self {
        self.secondary = Some(SecondaryField {
            code,
            description: description.into(),
        });
        self
    }

    /// Add one raw metric value
    pub fn metric(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    /// Add raw metric values
    pub fn metrics(mut self, values: impl IntoIterator<Item = (String, Option<String>)>) -> Self {
        self.metrics.extend(values);
        self
    }

    /// Finish the report with its status
    ///
    /// Kinds with a secondary signal always carry `error_code` and
    /// `error_description`; when none was attached the code is `null` and the
    /// description `UNREACHABLE`.
    pub fn build(self, status: Status) -> Report {
        let evaluation = self
            .evaluation
            .unwrap_or_else(|| match self.kind.metric_kind() {
                Some(metric) if self.kind.is_windowed() => Evaluation::Windowed {
                    metric,
                    samples: SampleSet::default(),
                    statistic: None,
                },
                Some(metric) => Evaluation::Single {
                    metric,
                    reading: Reading::Absent(ReadingFault::Unreachable),
                },
                None => Evaluation::Raw,
            });

        let secondary = match (self.secondary, self.kind.secondary_metric()) {
            (None, Some(_)) => Some(SecondaryField {
                code: None,
                description: UNREACHABLE_DESCRIPTION.to_string(),
            }),
            (secondary, _) => secondary,
        };

        Report {
            name: self.name,
            address: self.address,
            kind: self.kind,
            device_type: self.device_type,
            captured_at: self.captured_at,
            evaluation,
            secondary,
            metrics: self.metrics,
            status,
        }
    }
}
