// Sigwatch Testdata - Simulated devices
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Seeded simulation of a device fleet.
//!
//! Every simulated metric is a [`SignalPattern`] rendered through a
//! [`ValueFormat`], with an optional [`FaultProfile`] deciding when the device
//! stays silent or answers garbage. One RNG seeded at construction drives the
//! whole fleet, so a given seed and call order always produce the same text.

use crate::patterns::{FaultProfile, SignalPattern, ValueFormat};
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use sigwatch::{MetricSource, SourceError};
use std::collections::HashMap;
use std::sync::Mutex;

/// Text answered by a device that returns garbage.
pub const GARBAGE_TEXT: &str = "No Such Object available on this agent at this OID";

/// Simulated behaviour of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Value pattern.
    pub pattern: SignalPattern,
    /// Text rendering.
    pub format: ValueFormat,
    /// Failure probabilities.
    #[serde(default)]
    pub faults: FaultProfile,
}

impl MetricConfig {
    /// Create a metric without faults.
    pub fn new(pattern: SignalPattern, format: ValueFormat) -> Self {
        Self {
            pattern,
            format,
            faults: FaultProfile::none(),
        }
    }

    /// Integer-valued metric.
    pub fn integer(pattern: SignalPattern) -> Self {
        Self::new(pattern, ValueFormat::Integer)
    }

    /// Decimal-valued metric with two places.
    pub fn decimal(pattern: SignalPattern) -> Self {
        Self::new(pattern, ValueFormat::Decimal { places: 2 })
    }

    /// Set the failure probabilities.
    pub fn with_faults(mut self, faults: FaultProfile) -> Self {
        self.faults = faults;
        self
    }
}

#[derive(Debug)]
struct MetricState {
    config: MetricConfig,
    calls: u64,
}

#[derive(Debug)]
struct Fleet {
    rng: StdRng,
    metrics: HashMap<(String, String), MetricState>,
}

/// Metric source backed by seeded signal patterns.
#[derive(Debug)]
pub struct SimulatedSource {
    fleet: Mutex<Fleet>,
    seed: u64,
}

impl SimulatedSource {
    /// Create an empty simulation.
    pub fn new(seed: u64) -> Self {
        Self {
            fleet: Mutex::new(Fleet {
                rng: StdRng::seed_from_u64(seed),
                metrics: HashMap::new(),
            }),
            seed,
        }
    }

    /// Seed used for this simulation.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Add or replace a simulated metric.
    pub fn with_metric(
        self,
        address: impl Into<String>,
        metric_id: impl Into<String>,
        config: MetricConfig,
    ) -> Self {
        self.insert(address, metric_id, config);
        self
    }

    /// Add or replace a simulated metric in place.
    pub fn insert(
        &self,
        address: impl Into<String>,
        metric_id: impl Into<String>,
        config: MetricConfig,
    ) {
        if let Ok(mut fleet) = self.fleet.lock() {
            fleet
                .metrics
                .insert((address.into(), metric_id.into()), MetricState { config, calls: 0 });
        }
    }

    /// Number of simulated metrics.
    pub fn metric_count(&self) -> usize {
        self.fleet.lock().map(|f| f.metrics.len()).unwrap_or(0)
    }

    /// Produce the next answer for a metric.
    pub fn next_value(&self, address: &str, metric_id: &str) -> Result<String, SourceError> {
        let mut fleet = self
            .fleet
            .lock()
            .map_err(|_| SourceError::Transport("simulation state poisoned".to_string()))?;
        let Fleet { rng, metrics } = &mut *fleet;

        let state = metrics
            .get_mut(&(address.to_string(), metric_id.to_string()))
            .ok_or_else(|| SourceError::unreachable(address, "Timeout"))?;
        let call = state.calls;
        state.calls += 1;

        let faults = state.config.faults;
        if faults.unreachable > 0.0 && rng.gen::<f64>() < faults.unreachable {
            return Err(SourceError::unreachable(address, "Timeout"));
        }
        if faults.garbage > 0.0 && rng.gen::<f64>() < faults.garbage {
            return Ok(GARBAGE_TEXT.to_string());
        }

        let value = state.config.pattern.evaluate(call, rng);
        Ok(state.config.format.render(value))
    }
}

impl MetricSource for SimulatedSource {
    async fn get(&self, address: &str, metric_id: &str) -> Result<String, SourceError> {
        self.next_value(address, metric_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(seed: u64) -> SimulatedSource {
        SimulatedSource::new(seed)
            .with_metric(
                "10.0.0.1",
                "pulse",
                MetricConfig::integer(SignalPattern::jitter(1000.0, 5.0)),
            )
            .with_metric(
                "10.0.0.1",
                "angle",
                MetricConfig::decimal(SignalPattern::gaussian(10.0, 0.2)),
            )
    }

    #[test]
    fn test_same_seed_same_values() {
        let a = source(42);
        let b = source(42);
        for _ in 0..20 {
            assert_eq!(a.next_value("10.0.0.1", "pulse"), b.next_value("10.0.0.1", "pulse"));
            assert_eq!(a.next_value("10.0.0.1", "angle"), b.next_value("10.0.0.1", "angle"));
        }
    }

    #[test]
    fn test_values_parse_in_format() {
        let sim = source(1);
        for _ in 0..20 {
            let pulse = sim.next_value("10.0.0.1", "pulse").unwrap();
            let pulse: i64 = pulse.parse().unwrap();
            assert!((995..=1005).contains(&pulse));

            let angle = sim.next_value("10.0.0.1", "angle").unwrap();
            assert!(angle.parse::<f64>().is_ok());
        }
    }

    #[test]
    fn test_unknown_metric_is_unreachable() {
        let sim = source(1);
        assert!(matches!(
            sim.next_value("10.0.0.2", "pulse"),
            Err(SourceError::Unreachable { .. })
        ));
    }

    #[test]
    fn test_offline_and_garbage() {
        let sim = SimulatedSource::new(3)
            .with_metric(
                "10.0.0.5",
                "down",
                MetricConfig::integer(SignalPattern::constant(1.0))
                    .with_faults(FaultProfile::offline()),
            )
            .with_metric(
                "10.0.0.5",
                "junk",
                MetricConfig::integer(SignalPattern::constant(1.0)).with_faults(FaultProfile {
                    unreachable: 0.0,
                    garbage: 1.0,
                }),
            );

        assert!(sim.next_value("10.0.0.5", "down").is_err());
        assert_eq!(sim.next_value("10.0.0.5", "junk").unwrap(), GARBAGE_TEXT);
        assert_eq!(sim.metric_count(), 2);
    }

    #[tokio::test]
    async fn test_metric_source_impl() {
        let sim = SimulatedSource::new(9).with_metric(
            "10.0.0.7",
            "bitrate",
            MetricConfig::decimal(SignalPattern::constant(9.5)),
        );
        assert_eq!(sim.get("10.0.0.7", "bitrate").await, Ok("9.50".to_string()));
    }
}
