// Sigwatch Testdata - Site presets
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Ready-made sites and fault scenarios.
//!
//! [`simulate_devices`] turns any inventory into a [`SimulatedSource`] by
//! giving each configured metric a plausible behaviour for its device kind,
//! then bending it according to a [`Scenario`].

use crate::patterns::{FaultProfile, SignalPattern};
use crate::simulated::{MetricConfig, SimulatedSource};
use serde::{Deserialize, Serialize};
use sigwatch::device::{ALIGNMENT, BITRATE, ERROR_CODE, PULSE_COUNT};
use sigwatch::{Device, DeviceKind};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Site-wide fault scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Everything within limits.
    #[default]
    Nominal,
    /// Encoders miss pulses: wide pulse variance.
    EncoderSlip,
    /// Lasers drift and report an alignment fault.
    LaserMisaligned,
    /// Cameras stream above the critical bitrate.
    CameraOverload,
    /// Every other device stops answering.
    PartialOutage,
    /// Devices answer intermittently.
    Flaky,
}

impl Scenario {
    /// All scenarios.
    pub const ALL: [Scenario; 6] = [
        Scenario::Nominal,
        Scenario::EncoderSlip,
        Scenario::LaserMisaligned,
        Scenario::CameraOverload,
        Scenario::PartialOutage,
        Scenario::Flaky,
    ];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Nominal => "nominal",
            Scenario::EncoderSlip => "encoder_slip",
            Scenario::LaserMisaligned => "laser_misaligned",
            Scenario::CameraOverload => "camera_overload",
            Scenario::PartialOutage => "partial_outage",
            Scenario::Flaky => "flaky",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown scenario name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown scenario '{0}' (expected one of: nominal, encoder_slip, laser_misaligned, camera_overload, partial_outage, flaky)")]
pub struct UnknownScenario(pub String);

impl FromStr for Scenario {
    type Err = UnknownScenario;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.as_str() == wanted)
            .ok_or_else(|| UnknownScenario(s.to_string()))
    }
}

/// Demo inventory matching the field scripts' sites.
pub fn demo_site() -> Vec<Device> {
    vec![
        Device::new("ENC-AISLE-01", "192.168.30.4", DeviceKind::Encoder)
            .with_metric(PULSE_COUNT, "1.3.6.1.4.1.9999.1.1.1")
            .with_metric("uptime", "1.3.6.1.2.1.1.3.0"),
        Device::new("ENC-AISLE-02", "192.168.30.5", DeviceKind::Encoder)
            .with_metric(PULSE_COUNT, "1.3.6.1.4.1.9999.1.1.1")
            .with_metric("uptime", "1.3.6.1.2.1.1.3.0"),
        Device::new("SICK-DOCK-01", "192.168.20.11", DeviceKind::Laser)
            .with_metric(ALIGNMENT, "1.3.6.1.4.1.9999.2.1.1")
            .with_metric(ERROR_CODE, "1.3.6.1.4.1.9999.2.1.2")
            .with_metric("uptime", "1.3.6.1.2.1.1.3.0"),
        Device::new("CAM-DOCK-01", "192.168.40.2", DeviceKind::Camera)
            .with_metric(BITRATE, "1.3.6.1.4.1.9999.3.1.1")
            .with_metric("poe", "1.3.6.1.4.1.9999.3.1.2")
            .with_metric("uptime", "1.3.6.1.2.1.1.3.0"),
        Device::new("UPS-01", "192.168.1.50", DeviceKind::Generic)
            .with_metric("runtime", "1.3.6.1.2.1.33.1.2.3.0")
            .with_metric("load", "1.3.6.1.2.1.33.1.4.4.1.5.1")
            .with_metric("battery", "1.3.6.1.2.1.33.1.2.4.0")
            .with_metric("temperature", "1.3.6.1.2.1.33.1.2.7.0"),
    ]
}

/// Build a simulation for an inventory under a scenario.
pub fn simulate_devices(devices: &[Device], scenario: Scenario, seed: u64) -> SimulatedSource {
    let source = SimulatedSource::new(seed);

    for (index, device) in devices.iter().enumerate() {
        let offline = scenario == Scenario::PartialOutage && index % 2 == 1;

        for (name, id) in &device.metrics {
            let mut config = metric_behaviour(device.kind, name, scenario);
            if offline {
                config = config.with_faults(FaultProfile::offline());
            } else if scenario == Scenario::Flaky {
                config = config.with_faults(FaultProfile {
                    unreachable: 0.2,
                    garbage: 0.05,
                });
            }
            source.insert(device.address.clone(), id.clone(), config);
        }
    }

    source
}

fn metric_behaviour(kind: DeviceKind, metric: &str, scenario: Scenario) -> MetricConfig {
    match (kind, metric) {
        (DeviceKind::Encoder, PULSE_COUNT) => {
            let spread = if scenario == Scenario::EncoderSlip {
                60.0
            } else {
                10.0
            };
            MetricConfig::integer(SignalPattern::jitter(1000.0, spread))
        }
        (DeviceKind::Laser, ALIGNMENT) => {
            if scenario == Scenario::LaserMisaligned {
                MetricConfig::decimal(SignalPattern::Drift {
                    start: 12.0,
                    rate_per_call: 1.1,
                })
            } else {
                MetricConfig::decimal(SignalPattern::gaussian(12.0, 0.1))
            }
        }
        (DeviceKind::Laser, ERROR_CODE) => {
            let code = if scenario == Scenario::LaserMisaligned {
                3.0
            } else {
                0.0
            };
            MetricConfig::integer(SignalPattern::constant(code))
        }
        (DeviceKind::Camera, BITRATE) => {
            let mean = if scenario == Scenario::CameraOverload {
                14.5
            } else {
                6.0
            };
            MetricConfig::decimal(SignalPattern::gaussian(mean, 0.4))
        }
        (_, "uptime") => MetricConfig::integer(SignalPattern::Drift {
            start: 8_640_000.0,
            rate_per_call: 200.0,
        }),
        (_, "poe") => MetricConfig::decimal(SignalPattern::gaussian(7.5, 0.3)),
        (_, "runtime") => MetricConfig::integer(SignalPattern::constant(42.0)),
        (_, "load") => MetricConfig::integer(SignalPattern::jitter(35.0, 5.0)),
        (_, "battery") => MetricConfig::integer(SignalPattern::constant(100.0)),
        (_, "temperature") => MetricConfig::decimal(SignalPattern::gaussian(24.0, 0.5)),
        _ => MetricConfig::integer(SignalPattern::jitter(50.0, 10.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_serde_matches_cli_names() {
        let json = serde_json::to_string(&Scenario::LaserMisaligned).unwrap();
        assert_eq!(json, "\"laser_misaligned\"");
        for scenario in Scenario::ALL {
            let text = serde_json::to_string(&scenario).unwrap();
            let back: Scenario = serde_json::from_str(&text).unwrap();
            assert_eq!(back, scenario);
            assert_eq!(text.trim_matches('"').parse::<Scenario>(), Ok(scenario));
        }
    }

    #[test]
    fn test_scenario_from_str() {
        assert_eq!("nominal".parse::<Scenario>(), Ok(Scenario::Nominal));
        assert_eq!("Encoder-Slip".parse::<Scenario>(), Ok(Scenario::EncoderSlip));
        assert!("meltdown".parse::<Scenario>().is_err());
        for scenario in Scenario::ALL {
            assert_eq!(scenario.to_string().parse::<Scenario>(), Ok(scenario));
        }
    }

    #[test]
    fn test_demo_site_covers_every_kind() {
        let site = demo_site();
        for kind in [
            DeviceKind::Encoder,
            DeviceKind::Laser,
            DeviceKind::Camera,
            DeviceKind::Generic,
        ] {
            assert!(site.iter().any(|d| d.kind == kind));
        }
    }

    #[test]
    fn test_simulation_covers_every_metric() {
        let site = demo_site();
        let sim = simulate_devices(&site, Scenario::Nominal, 42);
        let expected: usize = site.iter().map(|d| d.metrics.len()).sum();
        assert_eq!(sim.metric_count(), expected);
    }

    #[test]
    fn test_partial_outage_silences_odd_devices() {
        let site = demo_site();
        let sim = simulate_devices(&site, Scenario::PartialOutage, 42);
        let second = &site[1];
        let id = second.primary_metric_id().unwrap();
        assert!(sim.next_value(&second.address, id).is_err());

        let first = &site[0];
        let id = first.primary_metric_id().unwrap();
        assert!(sim.next_value(&first.address, id).is_ok());
    }

    #[test]
    fn test_misaligned_laser_reports_fault_code() {
        let site = demo_site();
        let sim = simulate_devices(&site, Scenario::LaserMisaligned, 1);
        let laser = site.iter().find(|d| d.kind == DeviceKind::Laser).unwrap();
        let code = sim
            .next_value(&laser.address, laser.secondary_metric_id().unwrap())
            .unwrap();
        assert_eq!(code, "3");
    }
}
