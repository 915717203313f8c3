// Sigwatch Exporter - Poll loop and Prometheus exporter
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Sigwatch Exporter
//!
//! Polls the configured devices, prints each cycle as a JSON array and
//! optionally serves Prometheus metrics.
//!
//! ## Usage
//!
//! ```bash
//! # One cycle against real devices
//! sigwatch-exporter --config site.json once
//!
//! # Poll forever with the HTTP exporter on port 9105
//! sigwatch-exporter --config site.json run --port 9105
//!
//! # Demo site, misaligned laser scenario
//! sigwatch-exporter --simulate --scenario laser_misaligned --pretty once
//!
//! # Site baseline
//! sigwatch-exporter --config site.json baseline --json site.json --csv site.csv
//! ```

mod baseline;
mod config;
mod emit;
mod error;
mod metrics;
mod server;
mod source;

use clap::{Parser, Subcommand};
use config::AppConfig;
use error::{ExporterError, Result};
use server::AppState;
use source::{AnySource, SimulationOptions};
use sigwatch_poller::{Aggregator, CancellationToken, PollScheduler, Sampler};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Sigwatch signal-quality poller and Prometheus exporter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use simulated devices instead of snmpget
    #[arg(long, global = true)]
    simulate: bool,

    /// Simulation scenario
    #[arg(long, default_value = "nominal", global = true)]
    scenario: String,

    /// Simulation seed
    #[arg(long, default_value = "42", global = true)]
    seed: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one cycle and print the reports
    Once {
        /// Write the reports here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Poll every interval until Ctrl-C
    Run {
        /// Serve metrics and reports on this port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Probe reachability and export the site baseline
    Baseline {
        /// JSON output path
        #[arg(long, default_value = "site-baseline.json")]
        json: PathBuf,
        /// CSV output path
        #[arg(long, default_value = "site-baseline.csv")]
        csv: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    // stdout carries the reports
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Sigwatch Exporter v{}", env!("CARGO_PKG_VERSION"));

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "exporter failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let simulation = args.simulate.then(|| SimulationOptions {
        scenario: args.scenario.clone(),
        seed: args.seed,
    });
    let source = AnySource::from_config(&config, simulation.as_ref())?;

    match args.command {
        Command::Once { output } => {
            run_once(&config, source, output.as_deref(), args.pretty).await
        }
        Command::Run { port } => run_loop(&config, source, port, args.pretty).await,
        Command::Baseline { json, csv } => run_baseline(&config, source, &json, &csv).await,
    }
}

fn load_config(args: &Args) -> Result<AppConfig> {
    if let Some(path) = &args.config {
        info!(path = %path.display(), "loading configuration");
        return Ok(AppConfig::load(path)?);
    }
    if args.simulate {
        return demo_config();
    }
    Err(ExporterError::MissingConfig)
}

#[cfg(feature = "simulate")]
fn demo_config() -> Result<AppConfig> {
    info!("no configuration given, using the demo site");
    let mut config = AppConfig::default();
    config.probe = sigwatch::ProbeConfig::with_devices(sigwatch_testdata::demo_site());
    config.probe.validate()?;
    Ok(config)
}

#[cfg(not(feature = "simulate"))]
fn demo_config() -> Result<AppConfig> {
    Err(ExporterError::SimulationUnavailable)
}

async fn run_once(
    config: &AppConfig,
    source: AnySource,
    output: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let aggregator = Aggregator::new(&config.probe, source)?;
    let batch = aggregator.run_cycle().await;

    match output {
        Some(path) => {
            emit::save_batch(path, &batch, pretty)?;
            info!(path = %path.display(), reports = batch.len(), "reports written");
        }
        None => emit::print_batch(&batch, pretty)?,
    }
    Ok(())
}

async fn run_loop(
    config: &AppConfig,
    source: AnySource,
    port: Option<u16>,
    pretty: bool,
) -> Result<()> {
    let aggregator = Aggregator::new(&config.probe, source)?;
    let state = Arc::new(AppState::new(
        aggregator.source().label(),
        aggregator.devices().len(),
    ));

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, stopping after the current cycle");
                cancel.cancel();
            }
        });
    }

    let http = match port {
        Some(port) => {
            let listener = server::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;
            Some(tokio::spawn(server::serve(
                listener,
                state.clone(),
                cancel.clone(),
            )))
        }
        None => None,
    };

    let scheduler =
        PollScheduler::with_cancellation(aggregator, config.probe.poll_interval(), cancel.clone());
    let cycles = scheduler
        .run(|batch| {
            let elapsed = (chrono::Utc::now() - batch.captured_at)
                .to_std()
                .unwrap_or_default();
            metrics::record_batch(&batch, elapsed);
            if let Err(e) = emit::print_batch(&batch, pretty) {
                error!(error = %e, "cannot print reports");
            }
            state.publish(batch);
        })
        .await;

    info!(cycles, "poll loop finished");

    if let Some(handle) = http {
        match handle.await {
            Ok(result) => result?,
            Err(e) => error!(error = %e, "server task failed"),
        }
    }
    Ok(())
}

async fn run_baseline(
    config: &AppConfig,
    source: AnySource,
    json: &Path,
    csv: &Path,
) -> Result<()> {
    let sampler = Sampler::new(&config.probe.sampling);
    let site =
        baseline::collect(&source, &sampler, &config.probe.devices, &config.baseline).await;

    site.write_json(json)?;
    site.write_csv(csv)?;

    info!(
        devices = site.devices.len(),
        reachable = site.reachable_count(),
        json = %json.display(),
        csv = %csv.display(),
        "baseline export complete"
    );
    Ok(())
}
