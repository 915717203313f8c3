// Sigwatch Poller - Device sampling and poll scheduling
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Recurring poll cycles
//!
//! [`PollScheduler`] runs one aggregation cycle per tick and hands each batch
//! to a sink. Cancellation is checked between ticks only; a cycle that has
//! started always completes and reaches the sink.

use crate::aggregator::Aggregator;
use sigwatch::{MetricSource, ReportBatch};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shortest accepted tick period
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Ticks every poll interval until cancelled
pub struct PollScheduler<S> {
    aggregator: Aggregator<S>,
    interval: Duration,
    cancel: CancellationToken,
}

impl<S: MetricSource + 'static> PollScheduler<S> {
    /// Create a scheduler with its own cancellation token
    pub fn new(aggregator: Aggregator<S>, interval: Duration) -> Self {
        Self::with_cancellation(aggregator, interval, CancellationToken::new())
    }

    /// Create a scheduler driven by an existing token
    ///
    /// Intervals shorter than [`MIN_INTERVAL`] are raised to it.
    pub fn with_cancellation(
        aggregator: Aggregator<S>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        if interval < MIN_INTERVAL {
            warn!(
                interval_ms = interval.as_millis() as u64,
                "poll interval below minimum, clamping"
            );
        }
        let interval = interval.max(MIN_INTERVAL);
        Self {
            aggregator,
            interval,
            cancel,
        }
    }

    /// Token that stops the loop at the next tick boundary
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Delay between cycle starts
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run cycles until cancelled, returning how many completed
    ///
    /// The first cycle starts immediately. A cycle that overruns the interval
    /// pushes the following ticks back rather than bursting to catch up.
    pub async fn run<F>(&self, mut sink: F) -> u64
    where
        F: FnMut(ReportBatch),
    {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            devices = self.aggregator.devices().len(),
            "poll scheduler started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycles = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!(cycles, "poll scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let batch = self.aggregator.run_cycle().await;
                    cycles += 1;
                    debug!(cycle = cycles, reports = batch.len(), "batch handed to sink");
                    sink(batch);
                }
            }
        }

        cycles
    }
}
