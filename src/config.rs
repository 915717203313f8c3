// Sigwatch - Signal-quality telemetry evaluation
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Probe configuration
//!
//! Everything the evaluation pipeline needs is carried by [`ProbeConfig`],
//! loaded once at startup and validated before any device is polled.

use crate::classifier::{Classifier, ClassifierConfig};
use crate::device::Device;
use crate::error::ConfigError;
use crate::signal::ErrorCodeTable;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Sampling window parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Samples per window (default: 5)
    pub sample_count: usize,
    /// Delay between samples in milliseconds (default: 2000)
    pub interval_ms: u64,
    /// Deadline for one source call in milliseconds (default: 5000)
    pub call_timeout_ms: u64,
    /// Wait after the last sample too, keeping the window `sample_count`
    /// intervals long (default: true)
    pub trailing_delay: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_count: 5,
            interval_ms: 2_000,
            call_timeout_ms: 5_000,
            trailing_delay: true,
        }
    }
}

impl SamplingConfig {
    /// Delay between samples
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Deadline for one source call
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Number of delays taken in one window
    pub fn delay_count(&self) -> usize {
        if self.trailing_delay {
            self.sample_count
        } else {
            self.sample_count.saturating_sub(1)
        }
    }
}

/// How devices are scheduled within one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Concurrency {
    /// One device after another
    #[default]
    Sequential,
    /// Independent tasks, at most `max_in_flight` at once
    Parallel { max_in_flight: usize },
}

/// Full probe configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Devices in report order
    pub devices: Vec<Device>,
    /// Sampling window
    pub sampling: SamplingConfig,
    /// Thresholds per metric kind
    pub thresholds: ClassifierConfig,
    /// Secondary-signal code table
    pub error_codes: ErrorCodeTable,
    /// Delay between poll cycles in milliseconds (default: 60000)
    pub poll_interval_ms: u64,
    /// Device scheduling
    pub concurrency: Concurrency,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            sampling: SamplingConfig::default(),
            thresholds: ClassifierConfig::default(),
            error_codes: ErrorCodeTable::default(),
            poll_interval_ms: 60_000,
            concurrency: Concurrency::Sequential,
        }
    }
}

impl ProbeConfig {
    /// Create a configuration for the given devices
    pub fn with_devices(devices: Vec<Device>) -> Self {
        Self {
            devices,
            ..Default::default()
        }
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a JSON file, then validate it
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_json_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Delay between poll cycles
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Classifier built from the thresholds and code table
    pub fn classifier(&self) -> Classifier {
        Classifier::with_config(self.thresholds.clone(), self.error_codes.clone())
    }

    /// Check the configuration before use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }
        if self.sampling.sample_count == 0 {
            return Err(ConfigError::ZeroSampleCount);
        }
        if self.sampling.call_timeout_ms == 0 {
            return Err(ConfigError::ZeroCallTimeout);
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if let Concurrency::Parallel { max_in_flight: 0 } = self.concurrency {
            return Err(ConfigError::ZeroConcurrency);
        }

        for (kind, thresholds) in self.thresholds.iter() {
            let finite = thresholds.critical.is_finite()
                && thresholds.warning.map_or(true, f64::is_finite);
            if !finite {
                return Err(ConfigError::NonFiniteThreshold {
                    kind: kind.to_string(),
                });
            }
            if let Some(warning) = thresholds.warning {
                if warning >= thresholds.critical {
                    return Err(ConfigError::WarningNotBelowCritical {
                        kind: kind.to_string(),
                        warning,
                        critical: thresholds.critical,
                    });
                }
            }
        }

        let mut names = HashSet::new();
        for device in &self.devices {
            if !names.insert(device.name.as_str()) {
                return Err(ConfigError::DuplicateDevice(device.name.clone()));
            }
            if device.address.trim().is_empty() {
                return Err(ConfigError::EmptyAddress {
                    device: device.name.clone(),
                });
            }
            if let Some(metric) = device.kind.primary_metric() {
                if device.metric_id(metric).is_none() {
                    return Err(ConfigError::MissingMetric {
                        device: device.name.clone(),
                        metric: metric.to_string(),
                    });
                }
            }
            if device.secondary_required {
                if let Some(metric) = device.kind.secondary_metric() {
                    if device.metric_id(metric).is_none() {
                        return Err(ConfigError::MissingMetric {
                            device: device.name.clone(),
                            metric: metric.to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Thresholds;
    use crate::device::{DeviceKind, MetricKind, BITRATE, PULSE_COUNT};
    use std::io::Write;

    fn encoder(name: &str) -> Device {
        Device::new(name, "192.168.30.4", DeviceKind::Encoder)
            .with_metric(PULSE_COUNT, "1.3.6.1.4.1.1")
    }

    #[test]
    fn test_defaults_match_field_scripts() {
        let config = ProbeConfig::default();
        assert_eq!(config.sampling.sample_count, 5);
        assert_eq!(config.sampling.interval(), Duration::from_secs(2));
        assert!(config.sampling.trailing_delay);
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.concurrency, Concurrency::Sequential);
    }

    #[test]
    fn test_delay_count() {
        let mut sampling = SamplingConfig::default();
        assert_eq!(sampling.delay_count(), 5);
        sampling.trailing_delay = false;
        assert_eq!(sampling.delay_count(), 4);
        sampling.sample_count = 0;
        assert_eq!(sampling.delay_count(), 0);
    }

    #[test]
    fn test_validate_ok() {
        let config = ProbeConfig::with_devices(vec![encoder("ENC-01"), encoder("ENC-02")]);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert_eq!(ProbeConfig::default().validate(), Err(ConfigError::NoDevices));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let config = ProbeConfig::with_devices(vec![encoder("ENC-01"), encoder("ENC-01")]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateDevice("ENC-01".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_missing_role_metric() {
        let camera = Device::new("CAM-01", "192.168.40.2", DeviceKind::Camera)
            .with_metric("poe", "1.3.6.1.4.1.2");
        let config = ProbeConfig::with_devices(vec![camera]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingMetric {
                device: "CAM-01".to_string(),
                metric: BITRATE.to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_required_secondary_without_metric() {
        let laser = Device::new("SICK-01", "192.168.20.11", DeviceKind::Laser)
            .with_metric("alignment", "1.3.6.1.4.1.3")
            .with_secondary_required(true);
        let config = ProbeConfig::with_devices(vec![laser]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingMetric { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let mut config = ProbeConfig::with_devices(vec![encoder("ENC-01")]);
        config
            .thresholds
            .set(MetricKind::Bitrate, Thresholds::pair(12.0, 8.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WarningNotBelowCritical { .. })
        ));

        config
            .thresholds
            .set(MetricKind::Bitrate, Thresholds::critical_only(f64::NAN));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteThreshold { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_sampling() {
        let mut config = ProbeConfig::with_devices(vec![encoder("ENC-01")]);
        config.sampling.sample_count = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroSampleCount));

        let mut config = ProbeConfig::with_devices(vec![encoder("ENC-01")]);
        config.sampling.call_timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroCallTimeout));

        let mut config = ProbeConfig::with_devices(vec![encoder("ENC-01")]);
        config.poll_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPollInterval));

        let mut config = ProbeConfig::with_devices(vec![encoder("ENC-01")]);
        config.concurrency = Concurrency::Parallel { max_in_flight: 0 };
        assert_eq!(config.validate(), Err(ConfigError::ZeroConcurrency));
    }

    #[test]
    fn test_parse_partial_document() {
        let json = r#"{
            "devices": [
                { "name": "CAM-DOCK-01", "address": "192.168.40.2", "kind": "camera",
                  "metrics": { "bitrate": "1.3.6.1.4.1.5", "poe": "1.3.6.1.4.1.6" } }
            ],
            "sampling": { "sample_count": 3 },
            "thresholds": { "bitrate": { "warning": 6.0, "critical": 10.0 } },
            "concurrency": { "mode": "parallel", "max_in_flight": 4 }
        }"#;
        let config = ProbeConfig::from_json_str(json).unwrap();
        assert_eq!(config.sampling.sample_count, 3);
        assert_eq!(config.sampling.interval_ms, 2_000);
        assert_eq!(config.thresholds.bitrate, Thresholds::pair(6.0, 10.0));
        assert_eq!(config.thresholds.pulse_variance, Thresholds::critical_only(5.0));
        assert_eq!(config.concurrency, Concurrency::Parallel { max_in_flight: 4 });
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            ProbeConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "devices": [ {{ "name": "UPS-01", "address": "192.168.1.50", "kind": "generic" }} ] }}"#
        )
        .unwrap();

        let config = ProbeConfig::from_path(file.path()).unwrap();
        assert_eq!(config.devices.len(), 1);
        assert_eq!(config.devices[0].kind, DeviceKind::Generic);
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = ProbeConfig::from_path("/nonexistent/sigwatch.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
