// Sigwatch Exporter - Poll loop and Prometheus exporter
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Metric source selected at startup

use crate::config::AppConfig;
use crate::error::Result;
use sigwatch::{MetricSource, SourceError};
use sigwatch_poller::SnmpGetSource;
use tracing::info;

#[cfg(feature = "simulate")]
use sigwatch_testdata::{simulate_devices, Scenario, SimulatedSource};

/// Simulation settings from the command line
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Scenario name
    pub scenario: String,
    /// RNG seed
    pub seed: u64,
}

/// Real SNMP or simulated devices
pub enum AnySource {
    /// `snmpget` against real devices
    Snmp(SnmpGetSource),
    /// Seeded simulation of the configured inventory
    #[cfg(feature = "simulate")]
    Simulated(SimulatedSource),
}

impl AnySource {
    /// Build the source for this run
    pub fn from_config(config: &AppConfig, simulate: Option<&SimulationOptions>) -> Result<Self> {
        match simulate {
            None => {
                info!(
                    binary = %config.snmp.binary,
                    version = %config.snmp.version,
                    "using snmpget"
                );
                Ok(AnySource::Snmp(SnmpGetSource::new(config.snmp.clone())))
            }
            Some(options) => Self::simulated(config, options),
        }
    }

    #[cfg(feature = "simulate")]
    fn simulated(config: &AppConfig, options: &SimulationOptions) -> Result<Self> {
        let scenario = options
            .scenario
            .parse::<Scenario>()
            .map_err(|e| sigwatch::ConfigError::Parse(e.to_string()))?;
        info!(%scenario, seed = options.seed, "using simulated devices");
        Ok(AnySource::Simulated(simulate_devices(
            &config.probe.devices,
            scenario,
            options.seed,
        )))
    }

    #[cfg(not(feature = "simulate"))]
    fn simulated(_config: &AppConfig, _options: &SimulationOptions) -> Result<Self> {
        Err(crate::error::ExporterError::SimulationUnavailable)
    }

    /// Short label for logs and the status page
    pub fn label(&self) -> &'static str {
        match self {
            AnySource::Snmp(_) => "snmp",
            #[cfg(feature = "simulate")]
            AnySource::Simulated(_) => "simulated",
        }
    }
}

impl MetricSource for AnySource {
    async fn get(
        &self,
        address: &str,
        metric_id: &str,
    ) -> std::result::Result<String, SourceError> {
        match self {
            AnySource::Snmp(source) => source.get(address, metric_id).await,
            #[cfg(feature = "simulate")]
            AnySource::Simulated(source) => source.get(address, metric_id).await,
        }
    }
}
