// Sigwatch - Signal-quality telemetry evaluation
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Device inventory types
//!
//! A [`Device`] is immutable configuration: a name, an address, the metric
//! identifiers it exposes and a [`DeviceKind`] that decides how it is
//! evaluated. Each kind reads its evaluated signal from a fixed *role*
//! metric name; every other configured metric is auxiliary and reported raw.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Role metric sampled for encoders
pub const PULSE_COUNT: &str = "pulse_count";
/// Role metric sampled for lasers
pub const ALIGNMENT: &str = "alignment";
/// Secondary role metric read once for lasers
pub const ERROR_CODE: &str = "error_code";
/// Role metric read once for cameras
pub const BITRATE: &str = "bitrate";

/// Kind of device, selects the evaluation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Conveyor encoder, pulse counts sampled over a window
    Encoder,
    /// Alignment laser, angle sampled over a window plus an error code
    Laser,
    /// IP camera, bitrate read once against a threshold pair
    Camera,
    /// Anything else (UPS, switch, AP), metrics reported raw
    Generic,
}

impl DeviceKind {
    /// Key used for the device identity in emitted reports
    pub fn identity_key(&self) -> &'static str {
        match self {
            Self::Encoder => "encoder",
            Self::Laser => "laser",
            Self::Camera => "camera",
            Self::Generic => "device",
        }
    }

    /// Role metric this kind is evaluated on
    pub fn primary_metric(&self) -> Option<&'static str> {
        match self {
            Self::Encoder => Some(PULSE_COUNT),
            Self::Laser => Some(ALIGNMENT),
            Self::Camera => Some(BITRATE),
            Self::Generic => None,
        }
    }

    /// Secondary-signal metric for this kind
    pub fn secondary_metric(&self) -> Option<&'static str> {
        match self {
            Self::Laser => Some(ERROR_CODE),
            _ => None,
        }
    }

    /// Threshold family used to classify this kind
    pub fn metric_kind(&self) -> Option<MetricKind> {
        match self {
            Self::Encoder => Some(MetricKind::PulseVariance),
            Self::Laser => Some(MetricKind::AlignmentDrift),
            Self::Camera => Some(MetricKind::Bitrate),
            Self::Generic => None,
        }
    }

    /// How the primary metric's text is parsed
    pub fn numeric_format(&self) -> NumericFormat {
        match self {
            Self::Encoder => NumericFormat::Integer,
            _ => NumericFormat::Float,
        }
    }

    /// Whether the primary metric is sampled over a window
    pub fn is_windowed(&self) -> bool {
        matches!(self, Self::Encoder | Self::Laser)
    }

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Encoder => "encoder",
            Self::Laser => "laser",
            Self::Camera => "camera",
            Self::Generic => "generic",
        }
    }

    /// Kind for a lowercase name, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Encoder, Self::Laser, Self::Camera, Self::Generic]
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold family, one per evaluated signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Camera bitrate in Mbps, single reading
    Bitrate,
    /// Encoder pulse variance in percent
    PulseVariance,
    /// Laser alignment drift in degrees
    AlignmentDrift,
}

impl MetricKind {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bitrate => "bitrate",
            Self::PulseVariance => "pulse_variance",
            Self::AlignmentDrift => "alignment_drift",
        }
    }

    /// Report field carrying this kind's evaluated value
    pub fn report_field(&self) -> &'static str {
        match self {
            Self::Bitrate => "bitrate_mbps",
            Self::PulseVariance => "variance_percent",
            Self::AlignmentDrift => "drift_degrees",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric shape expected from a metric's textual value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericFormat {
    /// Whole numbers (pulse counts)
    Integer,
    /// Floating point (angles, bitrates)
    Float,
}

/// A configured device
///
/// Inventories written for the field scripts tag devices with a free-form
/// `type` (`ups`, `switch`, `access_point`). A `type` naming a [`DeviceKind`]
/// selects that kind; any other value keeps its label and evaluates as
/// [`DeviceKind::Generic`]. An explicit `kind` always wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DeviceRecord")]
pub struct Device {
    /// Unique device name
    pub name: String,
    /// Network address handed to the metric source
    pub address: String,
    /// Device kind
    pub kind: DeviceKind,
    /// Inventory label when it differs from the kind name
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    /// Metric name to source identifier (e.g. OID)
    pub metrics: BTreeMap<String, String>,
    /// Missing secondary signal forces UNREACHABLE
    pub secondary_required: bool,
}

/// Wire shape accepted for a device entry
#[derive(Deserialize)]
struct DeviceRecord {
    name: String,
    #[serde(alias = "ip")]
    address: String,
    #[serde(default)]
    kind: Option<DeviceKind>,
    #[serde(default, rename = "type")]
    device_type: Option<String>,
    #[serde(default, alias = "oids")]
    metrics: BTreeMap<String, String>,
    #[serde(default)]
    secondary_required: bool,
}

impl TryFrom<DeviceRecord> for Device {
    type Error = String;

    fn try_from(record: DeviceRecord) -> Result<Self, Self::Error> {
        let label = record
            .device_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let (kind, device_type) = match (record.kind, label) {
            (Some(kind), label) => (kind, label.filter(|l| l != kind.as_str())),
            (None, Some(label)) => match DeviceKind::from_name(&label) {
                Some(kind) => (kind, None),
                None => (DeviceKind::Generic, Some(label)),
            },
            (None, None) => {
                return Err(format!("device '{}' needs a 'kind' or 'type'", record.name))
            }
        };

        Ok(Self {
            name: record.name,
            address: record.address,
            kind,
            device_type,
            metrics: record.metrics,
            secondary_required: record.secondary_required,
        })
    }
}

impl Device {
    /// Create a device without metrics
    pub fn new(name: impl Into<String>, address: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            kind,
            device_type: None,
            metrics: BTreeMap::new(),
            secondary_required: false,
        }
    }

    /// Set the inventory label (`ups`, `switch`, ...)
    pub fn with_type(mut self, label: impl Into<String>) -> Self {
        self.device_type = Some(label.into());
        self
    }

    /// Inventory label, falling back to the kind name
    pub fn type_label(&self) -> &str {
        self.device_type.as_deref().unwrap_or(self.kind.as_str())
    }

    /// Add a metric identifier
    pub fn with_metric(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.metrics.insert(name.into(), id.into());
        self
    }

    /// Mark the secondary signal as required
    pub fn with_secondary_required(mut self, required: bool) -> Self {
        self.secondary_required = required;
        self
    }

    /// Identifier configured for a metric name
    pub fn metric_id(&self, name: &str) -> Option<&str> {
        self.metrics.get(name).map(String::as_str)
    }

    /// Identifier of the role metric
    pub fn primary_metric_id(&self) -> Option<&str> {
        self.kind.primary_metric().and_then(|m| self.metric_id(m))
    }

    /// Identifier of the secondary-signal metric
    pub fn secondary_metric_id(&self) -> Option<&str> {
        self.kind.secondary_metric().and_then(|m| self.metric_id(m))
    }

    /// Metrics reported raw (everything except role metrics)
    pub fn auxiliary_metrics(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        let primary = self.kind.primary_metric();
        let secondary = self.kind.secondary_metric();
        self.metrics
            .iter()
            .filter(move |(name, _)| {
                Some(name.as_str()) != primary && Some(name.as_str()) != secondary
            })
            .map(|(name, id)| (name.as_str(), id.as_str()))
    }
}
