// Sigwatch - Signal-quality telemetry evaluation
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Status classification
//!
//! This module maps an evaluated signal to a [`Status`]. Each metric kind is
//! handled by a named strategy:
//!
//! - [`ThresholdPairStrategy`]: one reading against a warning/critical pair
//!   (camera bitrate). Boundaries are inclusive.
//! - [`WindowedVarianceStrategy`] and [`WindowedDriftStrategy`]: a statistic
//!   computed over a sample window, plus an optional secondary signal.
//!   The critical boundary is exclusive.
//!
//! Windowed precedence, first match wins: undefined statistic, secondary
//! signal override, critical threshold, warning threshold, OK.

use crate::device::MetricKind;
use crate::sample::{Reading, ReadingFault, SampleSet};
use crate::signal::{ErrorCodeTable, SecondarySignal};
use crate::statistic::{self, Statistic};
use crate::status::Status;
use serde::{Deserialize, Serialize};

/// Classification result
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Assigned status
    pub status: Status,
    /// Reason for this classification
    pub reason: ClassificationReason,
}

impl Classification {
    /// Create a new classification
    pub fn new(status: Status, reason: ClassificationReason) -> Self {
        Self { status, reason }
    }

    /// Classification for a statistic that could not be computed
    pub fn undefined() -> Self {
        Self::new(Status::Unreachable, ClassificationReason::StatisticUndefined)
    }
}

/// Reason for a classification decision
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationReason {
    /// Too few valid samples, or a zero minimum for variance
    StatisticUndefined,
    /// Single reading could not be retrieved
    ReadingUnreachable,
    /// Single reading was not a number
    ReadingNotNumeric,
    /// Device reported a non-nominal code
    SecondaryFault { code: String },
    /// Required secondary signal could not be retrieved
    SecondaryMissing,
    /// Value exceeded the critical threshold
    CriticalThresholdExceeded { threshold: f64, actual: f64 },
    /// Value exceeded the warning threshold
    WarningThresholdExceeded { threshold: f64, actual: f64 },
    /// Value within limits
    WithinLimits,
}

/// Warning/critical pair for one metric kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Warning level; `None` means OK/CRITICAL only
    #[serde(default)]
    pub warning: Option<f64>,
    /// Critical level
    pub critical: f64,
}

impl Thresholds {
    /// Warning and critical levels
    pub fn pair(warning: f64, critical: f64) -> Self {
        Self {
            warning: Some(warning),
            critical,
        }
    }

    /// Critical level only
    pub fn critical_only(critical: f64) -> Self {
        Self {
            warning: None,
            critical,
        }
    }
}

/// Thresholds for every metric kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Camera bitrate, Mbps (default 8 / 12)
    pub bitrate: Thresholds,
    /// Encoder pulse variance, percent (default 5.0)
    pub pulse_variance: Thresholds,
    /// Laser alignment drift, degrees (default 3.0)
    pub alignment_drift: Thresholds,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            bitrate: Thresholds::pair(8.0, 12.0),
            pulse_variance: Thresholds::critical_only(5.0),
            alignment_drift: Thresholds::critical_only(3.0),
        }
    }
}

impl ClassifierConfig {
    /// Thresholds for a metric kind
    pub fn get(&self, kind: MetricKind) -> Thresholds {
        match kind {
            MetricKind::Bitrate => self.bitrate,
            MetricKind::PulseVariance => self.pulse_variance,
            MetricKind::AlignmentDrift => self.alignment_drift,
        }
    }

    /// Replace thresholds for a metric kind
    pub fn set(&mut self, kind: MetricKind, thresholds: Thresholds) {
        match kind {
            MetricKind::Bitrate => self.bitrate = thresholds,
            MetricKind::PulseVariance => self.pulse_variance = thresholds,
            MetricKind::AlignmentDrift => self.alignment_drift = thresholds,
        }
    }

    /// All kinds with their thresholds
    pub fn iter(&self) -> impl Iterator<Item = (MetricKind, Thresholds)> + '_ {
        [
            MetricKind::Bitrate,
            MetricKind::PulseVariance,
            MetricKind::AlignmentDrift,
        ]
        .into_iter()
        .map(move |kind| (kind, self.get(kind)))
    }
}

/// Single-reading classification against an inclusive threshold pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPairStrategy {
    pub thresholds: Thresholds,
}

impl ThresholdPairStrategy {
    /// Classify one reading
    pub fn classify(&self, reading: &Reading) -> Classification {
        let value = match reading {
            Reading::Value(v) => v.as_f64(),
            Reading::Absent(ReadingFault::NotNumeric) => {
                return Classification::new(
                    Status::Invalid,
                    ClassificationReason::ReadingNotNumeric,
                )
            }
            Reading::Absent(_) => {
                return Classification::new(
                    Status::Unreachable,
                    ClassificationReason::ReadingUnreachable,
                )
            }
        };

        if value >= self.thresholds.critical {
            return Classification::new(
                Status::Critical,
                ClassificationReason::CriticalThresholdExceeded {
                    threshold: self.thresholds.critical,
                    actual: value,
                },
            );
        }

        match self.thresholds.warning {
            Some(warning) if value >= warning => Classification::new(
                Status::Warning,
                ClassificationReason::WarningThresholdExceeded {
                    threshold: warning,
                    actual: value,
                },
            ),
            _ => Classification::new(Status::Ok, ClassificationReason::WithinLimits),
        }
    }
}

/// Percent-variance evaluation over a window (encoders)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowedVarianceStrategy {
    pub thresholds: Thresholds,
}

impl WindowedVarianceStrategy {
    /// Compute the statistic
    pub fn evaluate(&self, samples: &SampleSet) -> Option<Statistic> {
        statistic::variance_percent(samples)
    }

    /// Classify a computed statistic
    pub fn classify(
        &self,
        statistic: Option<Statistic>,
        secondary: &SecondarySignal,
        secondary_required: bool,
        codes: &ErrorCodeTable,
    ) -> Classification {
        classify_windowed(
            &self.thresholds,
            statistic,
            secondary,
            secondary_required,
            codes,
        )
    }
}

/// Absolute-drift evaluation over a window (lasers)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowedDriftStrategy {
    pub thresholds: Thresholds,
}

impl WindowedDriftStrategy {
    /// Compute the statistic
    pub fn evaluate(&self, samples: &SampleSet) -> Option<Statistic> {
        statistic::drift(samples)
    }

    /// Classify a computed statistic
    pub fn classify(
        &self,
        statistic: Option<Statistic>,
        secondary: &SecondarySignal,
        secondary_required: bool,
        codes: &ErrorCodeTable,
    ) -> Classification {
        classify_windowed(
            &self.thresholds,
            statistic,
            secondary,
            secondary_required,
            codes,
        )
    }
}

fn classify_windowed(
    thresholds: &Thresholds,
    statistic: Option<Statistic>,
    secondary: &SecondarySignal,
    secondary_required: bool,
    codes: &ErrorCodeTable,
) -> Classification {
    let value = match statistic {
        Some(stat) => stat.value(),
        None => return Classification::undefined(),
    };

    if let Some(classification) = check_secondary(secondary, secondary_required, codes) {
        return classification;
    }

    if value > thresholds.critical {
        return Classification::new(
            Status::Critical,
            ClassificationReason::CriticalThresholdExceeded {
                threshold: thresholds.critical,
                actual: value,
            },
        );
    }

    match thresholds.warning {
        Some(warning) if value > warning => Classification::new(
            Status::Warning,
            ClassificationReason::WarningThresholdExceeded {
                threshold: warning,
                actual: value,
            },
        ),
        _ => Classification::new(Status::Ok, ClassificationReason::WithinLimits),
    }
}

fn check_secondary(
    secondary: &SecondarySignal,
    required: bool,
    codes: &ErrorCodeTable,
) -> Option<Classification> {
    match secondary {
        SecondarySignal::Code(code) if !codes.is_ok_code(code) => Some(Classification::new(
            Status::Critical,
            ClassificationReason::SecondaryFault { code: code.clone() },
        )),
        SecondarySignal::Missing if required => Some(Classification::new(
            Status::Unreachable,
            ClassificationReason::SecondaryMissing,
        )),
        _ => None,
    }
}

/// Strategy selected for a metric kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    ThresholdPair(ThresholdPairStrategy),
    WindowedVariance(WindowedVarianceStrategy),
    WindowedDrift(WindowedDriftStrategy),
}

impl Strategy {
    /// Strategy for a metric kind with the given thresholds
    pub fn for_kind(kind: MetricKind, thresholds: Thresholds) -> Self {
        match kind {
            MetricKind::Bitrate => Self::ThresholdPair(ThresholdPairStrategy { thresholds }),
            MetricKind::PulseVariance => {
                Self::WindowedVariance(WindowedVarianceStrategy { thresholds })
            }
            MetricKind::AlignmentDrift => Self::WindowedDrift(WindowedDriftStrategy { thresholds }),
        }
    }

    /// Whether this strategy consumes a sample window
    pub fn is_windowed(&self) -> bool {
        !matches!(self, Self::ThresholdPair(_))
    }
}

/// Device classifier
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
    error_codes: ErrorCodeTable,
}

impl Classifier {
    /// Create a classifier with default thresholds and error codes
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with custom thresholds
    pub fn with_config(config: ClassifierConfig, error_codes: ErrorCodeTable) -> Self {
        Self {
            config,
            error_codes,
        }
    }

    /// Threshold configuration
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Error code table
    pub fn error_codes(&self) -> &ErrorCodeTable {
        &self.error_codes
    }

    /// Strategy for a metric kind
    pub fn strategy(&self, kind: MetricKind) -> Strategy {
        Strategy::for_kind(kind, self.config.get(kind))
    }

    /// Evaluate a sample window and classify it
    ///
    /// Returns the statistic alongside the classification. A threshold-pair
    /// kind passed here is evaluated on the window's last valid reading.
    pub fn classify_window(
        &self,
        kind: MetricKind,
        samples: &SampleSet,
        secondary: &SecondarySignal,
        secondary_required: bool,
    ) -> (Option<Statistic>, Classification) {
        let (statistic, classification) = match self.strategy(kind) {
            Strategy::WindowedVariance(s) => {
                let stat = s.evaluate(samples);
                let c = s.classify(stat, secondary, secondary_required, &self.error_codes);
                (stat, c)
            }
            Strategy::WindowedDrift(s) => {
                let stat = s.evaluate(samples);
                let c = s.classify(stat, secondary, secondary_required, &self.error_codes);
                (stat, c)
            }
            Strategy::ThresholdPair(s) => {
                let reading = samples
                    .samples()
                    .iter()
                    .rev()
                    .map(|sample| sample.reading)
                    .find(Reading::is_valid)
                    .or_else(|| samples.samples().last().map(|sample| sample.reading))
                    .unwrap_or(Reading::Absent(ReadingFault::Unreachable));
                (None, s.classify(&reading))
            }
        };

        #[cfg(feature = "logging")]
        log::debug!(
            "{} window: statistic={:?} status={} reason={:?}",
            kind,
            statistic,
            classification.status,
            classification.reason
        );

        (statistic, classification)
    }

    /// Classify a single reading against the kind's threshold pair
    pub fn classify_reading(&self, kind: MetricKind, reading: &Reading) -> Classification {
        let thresholds = self.config.get(kind);
        let classification = ThresholdPairStrategy { thresholds }.classify(reading);

        #[cfg(feature = "logging")]
        log::debug!(
            "{} reading: {:?} status={} reason={:?}",
            kind,
            reading,
            classification.status,
            classification.reason
        );

        classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleValue;
    use chrono::{DateTime, TimeZone, Utc};

    fn at() -> DateTime<Utc> {
        Utc.timestamp_opt(1_760_000_000, 0).unwrap()
    }

    fn codes() -> ErrorCodeTable {
        ErrorCodeTable::default()
    }

    fn drift_strategy() -> WindowedDriftStrategy {
        WindowedDriftStrategy {
            thresholds: Thresholds::critical_only(3.0),
        }
    }

    fn bitrate_strategy() -> ThresholdPairStrategy {
        ThresholdPairStrategy {
            thresholds: Thresholds::pair(8.0, 12.0),
        }
    }

    fn float(v: f64) -> Reading {
        Reading::Value(SampleValue::Float(v))
    }

    #[test]
    fn test_undefined_statistic_is_unreachable() {
        let c = drift_strategy().classify(None, &SecondarySignal::Code("3".into()), false, &codes());
        assert_eq!(c.status, Status::Unreachable);
        assert_eq!(c.reason, ClassificationReason::StatisticUndefined);
    }

    #[test]
    fn test_secondary_code_overrides_low_drift() {
        let c = drift_strategy().classify(
            Some(Statistic::DriftDegrees(0.5)),
            &SecondarySignal::Code("3".into()),
            false,
            &codes(),
        );
        assert_eq!(c.status, Status::Critical);
        assert_eq!(
            c.reason,
            ClassificationReason::SecondaryFault {
                code: "3".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_secondary_code_is_critical() {
        let c = drift_strategy().classify(
            Some(Statistic::DriftDegrees(0.1)),
            &SecondarySignal::Code("42".into()),
            false,
            &codes(),
        );
        assert_eq!(c.status, Status::Critical);
    }

    #[test]
    fn test_ok_code_falls_through() {
        let c = drift_strategy().classify(
            Some(Statistic::DriftDegrees(0.5)),
            &SecondarySignal::Code("0".into()),
            false,
            &codes(),
        );
        assert_eq!(c.status, Status::Ok);
    }

    #[test]
    fn test_missing_secondary_optional_vs_required() {
        let strategy = drift_strategy();
        let stat = Some(Statistic::DriftDegrees(0.5));

        let optional = strategy.classify(stat, &SecondarySignal::Missing, false, &codes());
        assert_eq!(optional.status, Status::Ok);

        let required = strategy.classify(stat, &SecondarySignal::Missing, true, &codes());
        assert_eq!(required.status, Status::Unreachable);
        assert_eq!(required.reason, ClassificationReason::SecondaryMissing);
    }

    #[test]
    fn test_critical_threshold_is_exclusive() {
        let strategy = drift_strategy();
        let none = SecondarySignal::NotConfigured;
        let at_limit = strategy.classify(Some(Statistic::DriftDegrees(3.0)), &none, false, &codes());
        assert_eq!(at_limit.status, Status::Ok);

        let above = strategy.classify(Some(Statistic::DriftDegrees(3.01)), &none, false, &codes());
        assert_eq!(above.status, Status::Critical);
    }

    #[test]
    fn test_windowed_warning_when_configured() {
        let strategy = WindowedVarianceStrategy {
            thresholds: Thresholds::pair(2.5, 5.0),
        };
        let none = SecondarySignal::NotConfigured;
        let classify = |v| {
            strategy
                .classify(Some(Statistic::VariancePercent(v)), &none, false, &codes())
                .status
        };
        assert_eq!(classify(2.5), Status::Ok);
        assert_eq!(classify(3.0), Status::Warning);
        assert_eq!(classify(5.0), Status::Warning);
        assert_eq!(classify(7.14), Status::Critical);
    }

    #[test]
    fn test_threshold_pair_boundaries() {
        let strategy = bitrate_strategy();
        assert_eq!(strategy.classify(&float(12.0)).status, Status::Critical);
        assert_eq!(strategy.classify(&float(11.99)).status, Status::Warning);
        assert_eq!(strategy.classify(&float(8.0)).status, Status::Warning);
        assert_eq!(strategy.classify(&float(7.99)).status, Status::Ok);
    }

    #[test]
    fn test_threshold_pair_absent_readings() {
        let strategy = bitrate_strategy();
        assert_eq!(
            strategy
                .classify(&Reading::Absent(ReadingFault::Unreachable))
                .status,
            Status::Unreachable
        );
        assert_eq!(
            strategy.classify(&Reading::Absent(ReadingFault::Timeout)).status,
            Status::Unreachable
        );
        assert_eq!(
            strategy
                .classify(&Reading::Absent(ReadingFault::NotNumeric))
                .status,
            Status::Invalid
        );
    }

    #[test]
    fn test_threshold_pair_without_warning() {
        let strategy = ThresholdPairStrategy {
            thresholds: Thresholds::critical_only(12.0),
        };
        assert_eq!(strategy.classify(&float(10.0)).status, Status::Ok);
        assert_eq!(strategy.classify(&float(12.0)).status, Status::Critical);
    }

    #[test]
    fn test_strategy_selection() {
        let classifier = Classifier::new();
        assert!(matches!(
            classifier.strategy(MetricKind::Bitrate),
            Strategy::ThresholdPair(_)
        ));
        assert!(matches!(
            classifier.strategy(MetricKind::PulseVariance),
            Strategy::WindowedVariance(_)
        ));
        assert!(matches!(
            classifier.strategy(MetricKind::AlignmentDrift),
            Strategy::WindowedDrift(_)
        ));
        assert!(!classifier.strategy(MetricKind::Bitrate).is_windowed());
    }

    #[test]
    fn test_classify_window_variance() {
        let classifier = Classifier::new();
        let samples = SampleSet::from_integers(
            &[Some(100), Some(105), Some(98), Some(102), Some(101)],
            at(),
        );
        let (stat, c) = classifier.classify_window(
            MetricKind::PulseVariance,
            &samples,
            &SecondarySignal::NotConfigured,
            false,
        );
        assert_eq!(stat, Some(Statistic::VariancePercent(7.14)));
        assert_eq!(c.status, Status::Critical);
    }

    #[test]
    fn test_classify_window_zero_minimum() {
        let classifier = Classifier::new();
        let samples = SampleSet::from_integers(&[Some(0), Some(5), Some(3)], at());
        let (stat, c) = classifier.classify_window(
            MetricKind::PulseVariance,
            &samples,
            &SecondarySignal::NotConfigured,
            false,
        );
        assert_eq!(stat, None);
        assert_eq!(c.status, Status::Unreachable);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = Classifier::new();
        let samples = SampleSet::from_floats(&[Some(10.0), Some(10.5), Some(9.8), Some(10.2)], at());
        let secondary = SecondarySignal::Code("0".into());
        let first = classifier.classify_window(MetricKind::AlignmentDrift, &samples, &secondary, false);
        for _ in 0..10 {
            let again =
                classifier.classify_window(MetricKind::AlignmentDrift, &samples, &secondary, false);
            assert_eq!(again, first);
        }
        assert_eq!(first.1.status, Status::Ok);
    }

    #[test]
    fn test_default_thresholds() {
        let config = ClassifierConfig::default();
        assert_eq!(config.bitrate, Thresholds::pair(8.0, 12.0));
        assert_eq!(config.pulse_variance.warning, None);
        assert_eq!(config.alignment_drift.critical, 3.0);
        assert_eq!(config.iter().count(), 3);
    }
}
