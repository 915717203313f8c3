// Sigwatch - Signal-quality telemetry evaluation
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Secondary signals (device-reported error codes)
//!
//! A laser reports a short code next to its alignment angle. Any code other
//! than the table's OK code overrides a healthy statistic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Description used when the code could not be retrieved
pub const UNREACHABLE_DESCRIPTION: &str = "UNREACHABLE";
/// Description used for codes missing from the table
pub const UNKNOWN_DESCRIPTION: &str = "UNKNOWN";

/// State of the secondary signal for one evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondarySignal {
    /// Device kind has no secondary signal
    NotConfigured,
    /// Retrieval failed
    Missing,
    /// Code as returned by the device (trimmed)
    Code(String),
}

impl SecondarySignal {
    /// Build from a retrieval result
    pub fn from_retrieval(value: Option<&str>) -> Self {
        match value {
            Some(code) => Self::Code(code.trim().to_string()),
            None => Self::Missing,
        }
    }

    /// The code, if one was retrieved
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Code(code) => Some(code),
            _ => None,
        }
    }
}

/// Lookup table from code to description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorCodeTable {
    /// Code meaning "no fault"
    pub ok_code: String,
    /// Known codes
    pub descriptions: BTreeMap<String, String>,
}

impl Default for ErrorCodeTable {
    fn default() -> Self {
        let descriptions = [
            ("0", "OK"),
            ("1", "Low Signal"),
            ("2", "Obstruction Detected"),
            ("3", "Alignment Fault"),
            ("4", "Hardware Error"),
        ]
        .into_iter()
        .map(|(code, desc)| (code.to_string(), desc.to_string()))
        .collect();

        Self {
            ok_code: "0".to_string(),
            descriptions,
        }
    }
}

impl ErrorCodeTable {
    /// Describe a secondary signal
    ///
    /// Missing signals map to `UNREACHABLE`, unknown codes to `UNKNOWN`.
    pub fn describe(&self, signal: &SecondarySignal) -> Option<String> {
        match signal {
            SecondarySignal::NotConfigured => None,
            SecondarySignal::Missing => Some(UNREACHABLE_DESCRIPTION.to_string()),
            SecondarySignal::Code(code) => Some(
                self.descriptions
                    .get(code.trim())
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_DESCRIPTION.to_string()),
            ),
        }
    }

    /// Whether a code is the nominal one
    pub fn is_ok_code(&self, code: &str) -> bool {
        code.trim() == self.ok_code
    }

    /// Whether a code is present in the table
    pub fn is_known(&self, code: &str) -> bool {
        self.descriptions.contains_key(code.trim())
    }
}
