// Sigwatch - Signal-quality telemetry evaluation
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Device health status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Final classification of a device
///
/// The declared order is the total order: the two failure states sort
/// below every evaluated state, and evaluated states sort by severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Not enough data reached us to evaluate
    Unreachable,
    /// Data arrived but could not be interpreted
    Invalid,
    /// Within limits
    Ok,
    /// Above the warning threshold
    Warning,
    /// Above the critical threshold or device-reported fault
    Critical,
}

impl Status {
    /// All statuses in order
    pub const ALL: [Status; 5] = [
        Status::Unreachable,
        Status::Invalid,
        Status::Ok,
        Status::Warning,
        Status::Critical,
    ];

    /// Severity rank among evaluated states (OK = 0, WARNING = 1, CRITICAL = 2)
    pub fn severity(&self) -> Option<u8> {
        match self {
            Self::Ok => Some(0),
            Self::Warning => Some(1),
            Self::Critical => Some(2),
            Self::Unreachable | Self::Invalid => None,
        }
    }

    /// Whether evaluation could not complete
    pub fn is_failure(&self) -> bool {
        self.severity().is_none()
    }

    /// Whether the status needs attention (anything but OK)
    pub fn needs_attention(&self) -> bool {
        !matches!(self, Self::Ok)
    }

    /// Uppercase name as emitted in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unreachable => "UNREACHABLE",
            Self::Invalid => "INVALID",
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }

    /// Numeric code for gauges (stable across releases)
    pub fn code(&self) -> i64 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical => 2,
            Self::Unreachable => 3,
            Self::Invalid => 4,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Status::Ok < Status::Warning);
        assert!(Status::Warning < Status::Critical);
        assert!(Status::Ok.severity() < Status::Critical.severity());
    }

    #[test]
    fn test_failure_states_have_no_severity() {
        assert!(Status::Unreachable.is_failure());
        assert!(Status::Invalid.is_failure());
        assert!(!Status::Critical.is_failure());
        assert_eq!(Status::Unreachable.severity(), None);
    }

    #[test]
    fn test_total_order_is_declared_order() {
        let mut shuffled = vec![
            Status::Critical,
            Status::Ok,
            Status::Unreachable,
            Status::Warning,
            Status::Invalid,
        ];
        shuffled.sort();
        assert_eq!(shuffled, Status::ALL.to_vec());
    }

    #[test]
    fn test_serialize_uppercase() {
        assert_eq!(
            serde_json::to_string(&Status::Unreachable).unwrap(),
            "\"UNREACHABLE\""
        );
        assert_eq!(serde_json::to_string(&Status::Ok).unwrap(), "\"OK\"");
        for status in Status::ALL {
            assert_eq!(
                serde_json::to_string(&status).unwrap(),
                format!("\"{}\"", status)
            );
        }
    }

    #[test]
    fn test_needs_attention() {
        assert!(!Status::Ok.needs_attention());
        assert!(Status::Warning.needs_attention());
        assert!(Status::Unreachable.needs_attention());
    }
}
