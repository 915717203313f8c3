// Sigwatch Poller - Device sampling and poll scheduling
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Sampler
//!
//! The [`Sampler`] is the only place that talks to a [`MetricSource`]. Every
//! call is bounded by the configured deadline, and every failure becomes an
//! absent reading; nothing here returns an error to the caller.

use chrono::Utc;
use sigwatch::{
    MetricSource, NumericFormat, Reading, ReadingFault, Sample, SampleSet, SamplingConfig,
    SourceError,
};
use std::time::Duration;
use tracing::{debug, warn};

/// Sampling cadence and per-call deadline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sampler {
    sample_count: usize,
    interval: Duration,
    call_timeout: Duration,
    delay_count: usize,
}

impl Sampler {
    /// Create a sampler from the sampling configuration
    pub fn new(config: &SamplingConfig) -> Self {
        Self {
            sample_count: config.sample_count,
            interval: config.interval(),
            call_timeout: config.call_timeout(),
            delay_count: config.delay_count(),
        }
    }

    /// Samples per window
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Delay between samples
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Deadline for one call
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// One bounded call to the source
    pub async fn fetch<S: MetricSource>(
        &self,
        source: &S,
        address: &str,
        metric_id: &str,
    ) -> Result<String, SourceError> {
        match tokio::time::timeout(self.call_timeout, source.get(address, metric_id)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout {
                timeout_ms: self.call_timeout.as_millis() as u64,
            }),
        }
    }

    /// Fetch once and keep the trimmed text, `None` on any failure
    pub async fn read_text<S: MetricSource>(
        &self,
        source: &S,
        address: &str,
        metric_id: &str,
    ) -> Option<String> {
        match self.fetch(source, address, metric_id).await {
            Ok(text) => Some(text.trim().to_string()),
            Err(e) => {
                debug!(address, metric = metric_id, error = %e, "metric not retrieved");
                None
            }
        }
    }

    /// Fetch once and parse
    pub async fn read_once<S: MetricSource>(
        &self,
        source: &S,
        address: &str,
        metric_id: &str,
        format: NumericFormat,
    ) -> Reading {
        to_reading(self.fetch(source, address, metric_id).await, format)
    }

    /// Collect a full window of `sample_count` readings
    ///
    /// Failed reads are recorded as absent, never dropped, so the window
    /// always has exactly `sample_count` entries. Each delay starts after the
    /// previous call has returned.
    pub async fn sample<S: MetricSource>(
        &self,
        source: &S,
        address: &str,
        metric_id: &str,
        format: NumericFormat,
    ) -> SampleSet {
        let mut samples = SampleSet::with_capacity(self.sample_count);

        for i in 0..self.sample_count {
            let reading = self.read_once(source, address, metric_id, format).await;
            match reading {
                Reading::Absent(ReadingFault::Timeout) => warn!(
                    address,
                    metric = metric_id,
                    index = i,
                    timeout_ms = self.call_timeout.as_millis() as u64,
                    "sample timed out"
                ),
                Reading::Absent(fault) => {
                    debug!(address, metric = metric_id, index = i, ?fault, "absent sample")
                }
                Reading::Value(_) => {}
            }
            samples.push(Sample::new(reading, Utc::now()));

            if i < self.delay_count {
                tokio::time::sleep(self.interval).await;
            }
        }

        samples
    }
}

/// Map a source outcome onto a reading
pub fn to_reading(result: Result<String, SourceError>, format: NumericFormat) -> Reading {
    match result {
        Ok(text) => Reading::parse(&text, format),
        Err(SourceError::Timeout { .. }) => Reading::Absent(ReadingFault::Timeout),
        Err(_) => Reading::Absent(ReadingFault::Unreachable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigwatch::SampleValue;

    #[test]
    fn test_to_reading() {
        assert_eq!(
            to_reading(Ok(" 42 ".to_string()), NumericFormat::Integer),
            Reading::Value(SampleValue::Integer(42))
        );
        assert_eq!(
            to_reading(Ok("abc".to_string()), NumericFormat::Float),
            Reading::Absent(ReadingFault::NotNumeric)
        );
        assert_eq!(
            to_reading(
                Err(SourceError::Timeout { timeout_ms: 10 }),
                NumericFormat::Float
            ),
            Reading::Absent(ReadingFault::Timeout)
        );
        assert_eq!(
            to_reading(
                Err(SourceError::unreachable("10.0.0.1", "Timeout")),
                NumericFormat::Float
            ),
            Reading::Absent(ReadingFault::Unreachable)
        );
    }

    #[test]
    fn test_sampler_from_config() {
        let config = SamplingConfig {
            sample_count: 4,
            interval_ms: 250,
            call_timeout_ms: 100,
            trailing_delay: false,
        };
        let sampler = Sampler::new(&config);
        assert_eq!(sampler.sample_count(), 4);
        assert_eq!(sampler.interval(), Duration::from_millis(250));
        assert_eq!(sampler.call_timeout(), Duration::from_millis(100));
        assert_eq!(sampler.delay_count, 3);
    }
}
