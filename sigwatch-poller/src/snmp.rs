// Sigwatch Poller - Device sampling and poll scheduling
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! SNMP GET through the net-snmp command-line tools
//!
//! [`SnmpGetSource`] runs `snmpget -v<version> -c <community> <address> <oid>`
//! once per call. The process output is reduced to the bare value by
//! [`parse_snmpget_output`].

use serde::{Deserialize, Serialize};
use sigwatch::{MetricSource, SourceError};
use std::process::Stdio;
use tokio::process::Command;

/// Settings for invoking `snmpget`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnmpConfig {
    /// Executable to run (default: `snmpget`)
    pub binary: String,
    /// Protocol version flag value (default: `2c`)
    pub version: String,
    /// Read-only community string
    pub community: String,
    /// Extra arguments placed before the address
    pub extra_args: Vec<String>,
}

impl Default for SnmpConfig {
    fn default() -> Self {
        Self {
            binary: "snmpget".to_string(),
            version: "2c".to_string(),
            community: "public".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl SnmpConfig {
    /// Arguments for one GET, without the binary
    pub fn args(&self, address: &str, oid: &str) -> Vec<String> {
        let mut args = vec![
            format!("-v{}", self.version),
            "-c".to_string(),
            self.community.clone(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args.push(address.to_string());
        args.push(oid.to_string());
        args
    }
}

/// Metric source backed by the `snmpget` command
#[derive(Debug, Clone)]
pub struct SnmpGetSource {
    config: SnmpConfig,
}

impl SnmpGetSource {
    /// Create a source with the given settings
    pub fn new(config: SnmpConfig) -> Self {
        Self { config }
    }

    /// Settings in use
    pub fn config(&self) -> &SnmpConfig {
        &self.config
    }
}

impl MetricSource for SnmpGetSource {
    async fn get(&self, address: &str, metric_id: &str) -> Result<String, SourceError> {
        let output = Command::new(&self.config.binary)
            .args(self.config.args(address, metric_id))
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| SourceError::Transport(format!("{}: {}", self.config.binary, e)))?;

        if !output.status.success() {
            return Err(SourceError::unreachable(
                address,
                format!("snmpget exited with {}", output.status),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_snmpget_output(&stdout)
            .ok_or_else(|| SourceError::unreachable(address, "no answer"))
    }
}

/// Reduce `snmpget` output to the bare value
///
/// Empty output or a `Timeout` marker means no answer. Otherwise the part
/// after ` = ` (when present) is taken and its type prefix, everything up to
/// the first `:`, is dropped.
pub fn parse_snmpget_output(output: &str) -> Option<String> {
    let output = output.trim();
    if output.is_empty() || output.contains("Timeout") {
        return None;
    }

    let value = match output.split_once(" = ") {
        Some((_, value)) => value,
        None => output,
    };
    let value = match value.split_once(':') {
        Some((_, value)) => value,
        None => value,
    };
    Some(value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_line() {
        assert_eq!(
            parse_snmpget_output("SNMPv2-SMI::enterprises.9999.1.1 = INTEGER: 1042\n"),
            Some("1042".to_string())
        );
    }

    #[test]
    fn test_parse_string_value_keeps_inner_colons() {
        assert_eq!(
            parse_snmpget_output("iso.3.6.1.2.1.1.3.0 = Timeticks: (12345) 0:02:03.45"),
            Some("(12345) 0:02:03.45".to_string())
        );
    }

    #[test]
    fn test_parse_value_only() {
        assert_eq!(parse_snmpget_output("STRING: 3"), Some("3".to_string()));
        assert_eq!(parse_snmpget_output("  17.5 "), Some("17.5".to_string()));
    }

    #[test]
    fn test_parse_no_answer() {
        assert_eq!(parse_snmpget_output(""), None);
        assert_eq!(parse_snmpget_output("   \n"), None);
        assert_eq!(
            parse_snmpget_output("Timeout: No Response from 192.168.20.11"),
            None
        );
    }

    #[test]
    fn test_parse_no_such_object() {
        let value = parse_snmpget_output(
            "SNMPv2-SMI::enterprises.9999.1.1 = No Such Object available on this agent at this OID",
        );
        assert_eq!(
            value,
            Some("No Such Object available on this agent at this OID".to_string())
        );
    }

    #[test]
    fn test_args() {
        let config = SnmpConfig {
            community: "ro-site".to_string(),
            extra_args: vec!["-t".to_string(), "1".to_string()],
            ..Default::default()
        };
        assert_eq!(
            config.args("192.168.20.11", "1.3.6.1.2.1.1.3.0"),
            vec!["-v2c", "-c", "ro-site", "-t", "1", "192.168.20.11", "1.3.6.1.2.1.1.3.0"]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_transport_error() {
        let source = SnmpGetSource::new(SnmpConfig {
            binary: "/nonexistent/sigwatch-snmpget".to_string(),
            ..Default::default()
        });
        let result = source.get("127.0.0.1", "1.3.6.1.2.1.1.3.0").await;
        assert!(matches!(result, Err(SourceError::Transport(_))));
    }
}
