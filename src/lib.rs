//! # Sigwatch - Signal-quality telemetry evaluation
//!
//! Evaluates noisy scalar telemetry from networked field devices (conveyor
//! encoders, alignment lasers, IP cameras) and turns it into one structured
//! report per device per cycle.
//!
//! ## Key Features
//!
//! - **Sampling windows**: repeated readings with explicit absent samples
//! - **Stability statistics**: variance percentage and absolute drift
//! - **Named strategies**: threshold-pair, windowed variance, windowed drift
//! - **Canonical reports**: kind-specific JSON with explicit nulls
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use sigwatch::{Classifier, MetricKind, SampleSet, SecondarySignal, Status};
//!
//! let classifier = Classifier::new();
//! let window = SampleSet::from_integers(
//!     &[Some(100), Some(105), Some(98), Some(102), Some(101)],
//!     Utc::now(),
//! );
//!
//! let (statistic, classification) = classifier.classify_window(
//!     MetricKind::PulseVariance,
//!     &window,
//!     &SecondarySignal::NotConfigured,
//!     false,
//! );
//!
//! assert_eq!(statistic.map(|s| s.value()), Some(7.14));
//! assert_eq!(classification.status, Status::Critical);
//! ```
//!
//! ## Modules
//!
//! - [`device`]: Device inventory and kinds
//! - [`sample`]: Readings, samples and sample windows
//! - [`statistic`]: Variance and drift evaluation
//! - [`classifier`]: Status strategies and thresholds
//! - [`report`]: Report records and their JSON shape
//! - [`batch`]: Ordered per-cycle batches
//! - [`source`]: Metric retrieval capability
//! - [`config`]: Probe configuration and validation

// Modules
pub mod batch;
pub mod classifier;
pub mod config;
pub mod device;
pub mod error;
pub mod report;
pub mod sample;
pub mod signal;
pub mod source;
pub mod statistic;
pub mod status;

// Re-exports for convenient access
pub use batch::{BatchSummary, ReportBatch};
pub use classifier::{
    Classification, ClassificationReason, Classifier, ClassifierConfig, Strategy,
    ThresholdPairStrategy, Thresholds, WindowedDriftStrategy, WindowedVarianceStrategy,
};
pub use config::{Concurrency, ProbeConfig, SamplingConfig};
pub use device::{Device, DeviceKind, MetricKind, NumericFormat};
pub use error::{ConfigError, Result, SigwatchError, SourceError};
pub use report::{Evaluation, Report, ReportBuilder, SecondaryField};
pub use sample::{Reading, ReadingFault, Sample, SampleSet, SampleValue};
pub use signal::{ErrorCodeTable, SecondarySignal};
pub use source::MetricSource;
pub use statistic::Statistic;
pub use status::Status;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
