// Sigwatch - Signal-quality telemetry evaluation
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Stability statistics over a sample set
//!
//! Both statistics look only at the valid subset of a [`SampleSet`] and are
//! undefined (`None`) with fewer than two valid samples. Results are rounded
//! to two decimals, half away from zero.

use crate::sample::{SampleSet, SampleValue};
use serde::Serialize;

/// Minimum number of valid samples for a statistic
pub const MIN_VALID_SAMPLES: usize = 2;

/// A derived stability metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Statistic {
    /// `(max - min) / min * 100`
    VariancePercent(f64),
    /// `|max - min|`
    DriftDegrees(f64),
}

impl Statistic {
    /// Scalar value
    pub fn value(&self) -> f64 {
        match *self {
            Self::VariancePercent(v) | Self::DriftDegrees(v) => v,
        }
    }

    /// Report field name for this statistic
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::VariancePercent(_) => "variance_percent",
            Self::DriftDegrees(_) => "drift_degrees",
        }
    }
}

/// Round to two decimal places, half away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Smallest and largest valid value, if at least two are present
fn valid_range(samples: &SampleSet) -> Option<(SampleValue, SampleValue)> {
    if samples.valid_count() < MIN_VALID_SAMPLES {
        return None;
    }
    let mut values = samples.valid_values();
    let first = values.next()?;
    Some(values.fold((first, first), |(lo, hi), v| {
        let lo = if v.as_f64() < lo.as_f64() { v } else { lo };
        let hi = if v.as_f64() > hi.as_f64() { v } else { hi };
        (lo, hi)
    }))
}

/// Percent variance between the minimum and maximum valid values
///
/// Undefined when fewer than two values are valid or when the minimum is
/// zero.
pub fn variance_percent(samples: &SampleSet) -> Option<Statistic> {
    let (min, max) = valid_range(samples)?;

    // Integer spans are exact; only the ratio goes through f64.
    let span = match (min.as_i64(), max.as_i64()) {
        (Some(lo), Some(hi)) => hi.checked_sub(lo)? as f64,
        _ => max.as_f64() - min.as_f64(),
    };
    let minimum = min.as_f64();
    if minimum == 0.0 {
        return None;
    }

    Some(Statistic::VariancePercent(round2(span / minimum * 100.0)))
}

/// Absolute drift between the minimum and maximum valid values
pub fn drift(samples: &SampleSet) -> Option<Statistic> {
    let (min, max) = valid_range(samples)?;
    Some(Statistic::DriftDegrees(round2(
        (max.as_f64() - min.as_f64()).abs(),
    )))
}
