// Sigwatch Exporter - Poll loop and Prometheus exporter
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the exporter binary

use thiserror::Error;

/// Fatal exporter errors
#[derive(Error, Debug)]
pub enum ExporterError {
    /// Configuration could not be loaded or was rejected
    #[error("Configuration error: {0}")]
    Config(#[from] sigwatch::ConfigError),

    /// Poller refused to start
    #[error("Poller error: {0}")]
    Poller(#[from] sigwatch_poller::PollerError),

    /// File or stream I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Neither a config file nor simulation was requested
    #[error("No configuration given (use --config, or --simulate for the demo site)")]
    MissingConfig,

    /// HTTP listener could not be bound
    #[error("Cannot bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    /// Simulation requested in a build without it
    #[cfg(not(feature = "simulate"))]
    #[error("Simulation support not compiled in (enable the 'simulate' feature)")]
    SimulationUnavailable,
}

/// Result type alias for exporter operations
pub type Result<T> = std::result::Result<T, ExporterError>;
