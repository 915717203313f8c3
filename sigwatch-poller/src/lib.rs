// Sigwatch Poller - Device sampling and poll scheduling
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Sigwatch Poller - Device sampling and poll scheduling
//!
//! Async layer around the `sigwatch` evaluation core: it talks to a
//! [`MetricSource`](sigwatch::MetricSource), builds sample windows, runs the
//! per-device pipeline over an inventory and repeats that on a schedule.
//!
//! ## Features
//!
//! - **Bounded calls**: every retrieval has a deadline; a timeout is one absent sample
//! - **Ordered batches**: sequential or bounded-parallel, always in configured order
//! - **Cooperative shutdown**: cancellation is honoured between cycles
//! - **SNMP transport**: `snmpget` driven through `tokio::process`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sigwatch::ProbeConfig;
//! use sigwatch_poller::{Aggregator, PollScheduler, SnmpConfig, SnmpGetSource};
//!
//! # async fn demo() -> sigwatch_poller::Result<()> {
//! let config = ProbeConfig::from_path("sigwatch.json")?;
//! let source = SnmpGetSource::new(SnmpConfig::default());
//! let aggregator = Aggregator::new(&config, source)?;
//!
//! let scheduler = PollScheduler::new(aggregator, config.poll_interval());
//! scheduler
//!     .run(|batch| println!("{}", serde_json::to_string(&batch.reports).unwrap()))
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  tick   ┌────────────┐  per device  ┌──────────┐
//! │ PollScheduler│───────▶│ Aggregator │─────────────▶│ Pipeline │
//! └──────┬───────┘         └─────┬──────┘              └────┬─────┘
//!        │ ReportBatch           │                          │ Sampler
//!        ▼                       │ ordered reports          ▼
//!      sink ◀────────────────────┘                    MetricSource
//! ```

mod aggregator;
mod error;
mod pipeline;
mod sampler;
mod scheduler;
mod snmp;

// Public API
pub use aggregator::Aggregator;
pub use error::{PollerError, Result};
pub use pipeline::Pipeline;
pub use sampler::{to_reading, Sampler};
pub use scheduler::{PollScheduler, MIN_INTERVAL};
pub use snmp::{parse_snmpget_output, SnmpConfig, SnmpGetSource};

// Cancellation type used by the scheduler
pub use tokio_util::sync::CancellationToken;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
