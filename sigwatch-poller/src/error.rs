// Sigwatch Poller - Device sampling and poll scheduling
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the poller

use thiserror::Error;

/// Main error type for poller operations
#[derive(Error, Debug)]
pub enum PollerError {
    /// Configuration rejected before the first cycle
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] sigwatch::ConfigError),
}

/// Result type alias for poller operations
pub type Result<T> = std::result::Result<T, PollerError>;
