//! Error types for sigwatch
//!
//! Retrieval errors never escape the sampling layer; they are turned into
//! absent samples. Configuration errors are fatal and surface at startup.

use thiserror::Error;

/// Result type alias for sigwatch operations
pub type Result<T> = std::result::Result<T, SigwatchError>;

/// Main error type for sigwatch operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SigwatchError {
    /// Configuration rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Metric retrieval failed
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Errors raised while loading or validating configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// No device configured
    #[error("No devices configured")]
    NoDevices,

    /// Two devices share a name
    #[error("Duplicate device name: {0}")]
    DuplicateDevice(String),

    /// Device has an empty address
    #[error("Device {device} has an empty address")]
    EmptyAddress { device: String },

    /// Device kind requires a metric that is not configured
    #[error("Device {device} is missing required metric '{metric}'")]
    MissingMetric { device: String, metric: String },

    /// Sample count must be at least one
    #[error("Sample count must be at least 1")]
    ZeroSampleCount,

    /// Per-call timeout must be non-zero
    #[error("Call timeout must be greater than zero")]
    ZeroCallTimeout,

    /// Poll interval must be non-zero
    #[error("Poll interval must be greater than zero")]
    ZeroPollInterval,

    /// Parallel mode needs at least one slot
    #[error("Parallel concurrency must allow at least one device in flight")]
    ZeroConcurrency,

    /// Threshold is NaN or infinite
    #[error("Threshold for {kind} is not a finite number")]
    NonFiniteThreshold { kind: String },

    /// Warning threshold is not below the critical threshold
    #[error("Warning threshold {warning} for {kind} must be below critical {critical}")]
    WarningNotBelowCritical {
        kind: String,
        warning: f64,
        critical: f64,
    },

    /// Malformed configuration document
    #[error("Malformed configuration: {0}")]
    Parse(String),

    /// Configuration file could not be read
    #[error("Cannot read configuration {path}: {reason}")]
    Io { path: String, reason: String },
}

/// Errors returned by a [`MetricSource`](crate::source::MetricSource)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Device did not answer or reported a timeout
    #[error("Device {address} unreachable: {reason}")]
    Unreachable { address: String, reason: String },

    /// Call exceeded the per-call deadline
    #[error("Call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Local transport failure (process spawn, I/O)
    #[error("Transport failure: {0}")]
    Transport(String),
}

impl SourceError {
    /// Shorthand for an unreachable device
    pub fn unreachable(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unreachable {
            address: address.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SigwatchError::Config(ConfigError::MissingMetric {
            device: "ENC-AISLE-01".to_string(),
            metric: "pulse_count".to_string(),
        });
        let msg = format!("{}", err);
        assert!(msg.contains("ENC-AISLE-01"));
        assert!(msg.contains("pulse_count"));
    }

    #[test]
    fn test_error_conversion() {
        let source_err = SourceError::Timeout { timeout_ms: 500 };
        let err: SigwatchError = source_err.into();
        assert!(matches!(err, SigwatchError::Source(_)));
    }

    #[test]
    fn test_unreachable_shorthand() {
        let err = SourceError::unreachable("10.0.0.5", "Timeout");
        assert_eq!(
            err,
            SourceError::Unreachable {
                address: "10.0.0.5".to_string(),
                reason: "Timeout".to_string()
            }
        );
    }
}
