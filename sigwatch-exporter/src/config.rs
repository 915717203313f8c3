// Sigwatch Exporter - Poll loop and Prometheus exporter
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Application configuration
//!
//! One JSON document carries the probe settings at the top level plus the
//! exporter-only `snmp` and `baseline` sections.

use serde::{Deserialize, Serialize};
use sigwatch::{ConfigError, ProbeConfig};
use sigwatch_poller::SnmpConfig;
use std::collections::BTreeMap;
use std::path::Path;

/// Environment variable overriding `snmp.community`
pub const COMMUNITY_ENV: &str = "SIGWATCH_SNMP_COMMUNITY";

/// Site baseline export settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// OID probed for reachability; falls back to each device's role metric
    pub reachability_oid: Option<String>,
    /// VLAN name to identifier, copied into the baseline document
    pub vlans: BTreeMap<String, String>,
}

/// Full exporter configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Devices, sampling, thresholds and scheduling
    #[serde(flatten)]
    pub probe: ProbeConfig,
    /// `snmpget` invocation
    pub snmp: SnmpConfig,
    /// Site baseline export
    pub baseline: BaselineConfig,
}

impl AppConfig {
    /// Parse a JSON document without validating it
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load, apply environment overrides and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut config = Self::from_json_str(&text)?;
        config.apply_env(std::env::var(COMMUNITY_ENV).ok());
        config.probe.validate()?;
        Ok(config)
    }

    /// Apply the community override when one is set
    pub fn apply_env(&mut self, community: Option<String>) {
        if let Some(community) = community.filter(|c| !c.trim().is_empty()) {
            self.snmp.community = community;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigwatch::{Concurrency, DeviceKind};
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "devices": [
            { "name": "ENC-AISLE-01", "ip": "192.168.30.4", "type": "encoder",
              "oids": { "pulse_count": "1.3.6.1.4.1.9999.1.1.1", "uptime": "1.3.6.1.2.1.1.3.0" } },
            { "name": "UPS-01", "ip": "192.168.1.50", "type": "generic",
              "oids": { "load": "1.3.6.1.2.1.33.1.4.4.1.5.1" } }
        ],
        "sampling": { "sample_count": 3, "interval_ms": 500 },
        "concurrency": { "mode": "parallel", "max_in_flight": 4 },
        "snmp": { "community": "ro-site", "extra_args": ["-t", "1"] },
        "baseline": {
            "reachability_oid": "1.3.6.1.2.1.1.3.0",
            "vlans": { "OT_VLAN": "30", "CAMERA_VLAN": "40" }
        }
    }"#;

    #[test]
    fn test_parse_full_document() {
        let config = AppConfig::from_json_str(SAMPLE).unwrap();
        assert_eq!(config.probe.devices.len(), 2);
        assert_eq!(config.probe.devices[1].kind, DeviceKind::Generic);
        assert_eq!(config.probe.sampling.sample_count, 3);
        assert_eq!(config.probe.sampling.call_timeout_ms, 5_000);
        assert_eq!(
            config.probe.concurrency,
            Concurrency::Parallel { max_in_flight: 4 }
        );
        assert_eq!(config.snmp.community, "ro-site");
        assert_eq!(config.snmp.binary, "snmpget");
        assert_eq!(config.baseline.vlans["OT_VLAN"], "30");
        assert!(config.probe.validate().is_ok());
    }

    #[test]
    fn test_shipped_example_is_valid() {
        let config =
            AppConfig::from_json_str(include_str!("../../config/sigwatch.example.json")).unwrap();
        assert!(config.probe.validate().is_ok());
        assert_eq!(config.probe.devices.len(), 4);
        assert_eq!(config.probe.devices[1].kind, DeviceKind::Laser);
        assert_eq!(config.snmp.extra_args, vec!["-t", "2", "-r", "0"]);
    }

    #[test]
    fn test_env_override() {
        let mut config = AppConfig::from_json_str(SAMPLE).unwrap();
        config.apply_env(Some("   ".to_string()));
        assert_eq!(config.snmp.community, "ro-site");
        config.apply_env(Some("from-env".to_string()));
        assert_eq!(config.snmp.community, "from-env");
        config.apply_env(None);
        assert_eq!(config.snmp.community, "from-env");
    }

    #[test]
    fn test_load_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "devices": [] }}"#).unwrap();
        assert_eq!(AppConfig::load(file.path()), Err(ConfigError::NoDevices));
    }

    #[test]
    fn test_load_missing_file() {
        let result = AppConfig::load("/nonexistent/sigwatch.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.probe.devices[0].name, "ENC-AISLE-01");
    }
}
