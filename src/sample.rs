// Sigwatch - Signal-quality telemetry evaluation
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Samples and sample sets
//!
//! A [`SampleSet`] keeps one slot per retrieval attempt. Failed or garbled
//! reads stay in the set as absent samples so positions line up with the
//! sampling cadence.

use crate::device::NumericFormat;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Numeric value of a successful reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SampleValue {
    /// Whole number (pulse count)
    Integer(i64),
    /// Floating point (angle, bitrate)
    Float(f64),
}

impl SampleValue {
    /// Value as f64
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Integer(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// Integer value, if this is one
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Integer(v) => Some(v),
            Self::Float(_) => None,
        }
    }
}

impl fmt::Display for SampleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Why a reading is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingFault {
    /// Source reported failure
    Unreachable,
    /// Call exceeded its deadline
    Timeout,
    /// Source answered with a non-numeric payload
    NotNumeric,
}

impl ReadingFault {
    /// Whether the device failed to answer at all
    pub fn is_retrieval_failure(&self) -> bool {
        matches!(self, Self::Unreachable | Self::Timeout)
    }
}

/// Outcome of one retrieval attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Parsed numeric value
    Value(SampleValue),
    /// No usable value
    Absent(ReadingFault),
}

impl Reading {
    /// Parse a source payload
    ///
    /// Surrounding whitespace is ignored. Non-finite floats are rejected
    /// along with any other non-numeric text.
    pub fn parse(text: &str, format: NumericFormat) -> Self {
        let text = text.trim();
        let value = match format {
            NumericFormat::Integer => text.parse::<i64>().ok().map(SampleValue::Integer),
            NumericFormat::Float => text
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(SampleValue::Float),
        };
        match value {
            Some(v) => Self::Value(v),
            None => Self::Absent(ReadingFault::NotNumeric),
        }
    }

    /// The value, if present
    pub fn value(&self) -> Option<SampleValue> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Absent(_) => None,
        }
    }

    /// The fault, if absent
    pub fn fault(&self) -> Option<ReadingFault> {
        match self {
            Self::Value(_) => None,
            Self::Absent(f) => Some(*f),
        }
    }

    /// Whether a value is present
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

/// One reading stamped with the time it was taken
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub reading: Reading,
    pub taken_at: DateTime<Utc>,
}

impl Sample {
    /// Create a sample
    pub fn new(reading: Reading, taken_at: DateTime<Utc>) -> Self {
        Self { reading, taken_at }
    }

    /// Value, if present
    pub fn value(&self) -> Option<SampleValue> {
        self.reading.value()
    }
}

// Emitted as the bare number or null.
impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

/// Ordered readings of one metric over one evaluation window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    /// Create an empty set sized for `capacity` samples
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Build a set of integer readings, `None` meaning unreachable
    pub fn from_integers(values: &[Option<i64>], taken_at: DateTime<Utc>) -> Self {
        Self::from_values(
            values.iter().map(|v| v.map(SampleValue::Integer)),
            taken_at,
        )
    }

    /// Build a set of float readings, `None` meaning unreachable
    pub fn from_floats(values: &[Option<f64>], taken_at: DateTime<Utc>) -> Self {
        Self::from_values(values.iter().map(|v| v.map(SampleValue::Float)), taken_at)
    }

    /// Build a set of `count` absent samples sharing one fault
    pub fn absent(count: usize, fault: ReadingFault, taken_at: DateTime<Utc>) -> Self {
        let samples = (0..count)
            .map(|_| Sample::new(Reading::Absent(fault), taken_at))
            .collect();
        Self { samples }
    }

    fn from_values(
        values: impl Iterator<Item = Option<SampleValue>>,
        taken_at: DateTime<Utc>,
    ) -> Self {
        let samples = values
            .map(|v| {
                let reading = match v {
                    Some(v) => Reading::Value(v),
                    None => Reading::Absent(ReadingFault::Unreachable),
                };
                Sample::new(reading, taken_at)
            })
            .collect();
        Self { samples }
    }

    /// Append a sample
    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// All samples in order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of slots, valid or not
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample was taken
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Present values in order
    pub fn valid_values(&self) -> impl Iterator<Item = SampleValue> + '_ {
        self.samples.iter().filter_map(Sample::value)
    }

    /// Number of present values
    pub fn valid_count(&self) -> usize {
        self.valid_values().count()
    }

    /// Number of absent values
    pub fn absent_count(&self) -> usize {
        self.len() - self.valid_count()
    }

    /// Count of absent samples with the given fault
    pub fn fault_count(&self, fault: ReadingFault) -> usize {
        self.samples
            .iter()
            .filter(|s| s.reading.fault() == Some(fault))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(1_760_000_000, 0).unwrap()
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(
            Reading::parse(" 1042 ", NumericFormat::Integer),
            Reading::Value(SampleValue::Integer(1042))
        );
        assert_eq!(
            Reading::parse("10.5", NumericFormat::Integer),
            Reading::Absent(ReadingFault::NotNumeric)
        );
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(
            Reading::parse("10.25", NumericFormat::Float),
            Reading::Value(SampleValue::Float(10.25))
        );
        assert_eq!(
            Reading::parse("12", NumericFormat::Float),
            Reading::Value(SampleValue::Float(12.0))
        );
    }

    #[test]
    fn test_parse_rejects_garbage_and_non_finite() {
        for text in ["", "No Such Object", "NaN", "inf"] {
            assert_eq!(
                Reading::parse(text, NumericFormat::Float),
                Reading::Absent(ReadingFault::NotNumeric),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_sample_set_counts() {
        let set = SampleSet::from_integers(&[Some(100), None, Some(98), None, Some(101)], epoch());
        assert_eq!(set.len(), 5);
        assert_eq!(set.valid_count(), 3);
        assert_eq!(set.absent_count(), 2);
        assert_eq!(set.fault_count(ReadingFault::Unreachable), 2);
        assert_eq!(set.fault_count(ReadingFault::Timeout), 0);
    }

    #[test]
    fn test_absent_is_not_zero() {
        let set = SampleSet::from_integers(&[None, Some(0)], epoch());
        let values: Vec<_> = set.valid_values().collect();
        assert_eq!(values, vec![SampleValue::Integer(0)]);
    }

    #[test]
    fn test_serialize_as_nullable_numbers() {
        let ints = SampleSet::from_integers(&[Some(100), None, Some(105)], epoch());
        assert_eq!(serde_json::to_string(&ints).unwrap(), "[100,null,105]");

        let floats = SampleSet::from_floats(&[Some(10.5), None], epoch());
        assert_eq!(serde_json::to_string(&floats).unwrap(), "[10.5,null]");
    }

    #[test]
    fn test_fault_classes() {
        assert!(ReadingFault::Timeout.is_retrieval_failure());
        assert!(ReadingFault::Unreachable.is_retrieval_failure());
        assert!(!ReadingFault::NotNumeric.is_retrieval_failure());
    }
}
