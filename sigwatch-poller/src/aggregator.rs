// Sigwatch Poller - Device sampling and poll scheduling
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Aggregator for running one cycle over every device
//!
//! The [`Aggregator`] owns the device list and runs the [`Pipeline`] once per
//! device, sequentially or as bounded parallel tasks. Either way the batch
//! comes back in configured device order and one device never stops the
//! others.

use crate::error::Result;
use crate::pipeline::Pipeline;
use chrono::Utc;
use sigwatch::{
    Concurrency, Device, MetricSource, ProbeConfig, ReadingFault, Report, ReportBatch,
    ReportBuilder, SampleSet, Status,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Runs the pipeline over all configured devices
pub struct Aggregator<S> {
    source: Arc<S>,
    pipeline: Arc<Pipeline>,
    devices: Arc<[Device]>,
    concurrency: Concurrency,
}

impl<S> Clone for Aggregator<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            pipeline: Arc::clone(&self.pipeline),
            devices: Arc::clone(&self.devices),
            concurrency: self.concurrency,
        }
    }
}

impl<S: MetricSource + 'static> Aggregator<S> {
    /// Validate the configuration and create an aggregator
    pub fn new(config: &ProbeConfig, source: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source: Arc::new(source),
            pipeline: Arc::new(Pipeline::from_config(config)),
            devices: config.devices.clone().into(),
            concurrency: config.concurrency,
        })
    }

    /// Devices in report order
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Scheduling mode
    pub fn concurrency(&self) -> Concurrency {
        self.concurrency
    }

    /// Metric source shared by all devices
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run one cycle over every device
    pub async fn run_cycle(&self) -> ReportBatch {
        let captured_at = Utc::now();
        let started = Instant::now();

        let reports = match self.concurrency {
            Concurrency::Sequential => self.run_sequential().await,
            Concurrency::Parallel { max_in_flight } => self.run_parallel(max_in_flight).await,
        };

        let batch = ReportBatch::new(captured_at, reports);
        info!(
            devices = batch.len(),
            ok = batch.summary.count(Status::Ok),
            warning = batch.summary.count(Status::Warning),
            critical = batch.summary.count(Status::Critical),
            failed = batch.summary.failures(),
            absent_samples = batch.summary.absent_samples,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cycle complete"
        );
        batch
    }

    async fn run_sequential(&self) -> Vec<Report> {
        let mut reports = Vec::with_capacity(self.devices.len());
        for device in self.devices.iter() {
            reports.push(self.pipeline.evaluate(self.source.as_ref(), device).await);
        }
        reports
    }

    async fn run_parallel(&self, max_in_flight: usize) -> Vec<Report> {
        let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
        let mut tasks = JoinSet::new();

        for (index, device) in self.devices.iter().enumerate() {
            let source = Arc::clone(&self.source);
            let pipeline = Arc::clone(&self.pipeline);
            let permits = Arc::clone(&permits);
            let device = device.clone();
            tasks.spawn(async move {
                // The semaphore is never closed.
                let _permit = permits.acquire_owned().await.ok();
                (index, pipeline.evaluate(source.as_ref(), &device).await)
            });
        }

        let mut slots: Vec<Option<Report>> = vec![None; self.devices.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, report)) => slots[index] = Some(report),
                Err(e) => warn!(error = %e, "device task failed"),
            }
        }

        let sample_count = self.pipeline.sampler().sample_count();
        slots
            .into_iter()
            .zip(self.devices.iter())
            .map(|(slot, device)| slot.unwrap_or_else(|| failed_report(device, sample_count)))
            .collect()
    }
}

/// Report for a device whose task never returned
///
/// Windowed kinds get a full window of unreachable samples.
fn failed_report(device: &Device, sample_count: usize) -> Report {
    warn!(device = %device.name, "no report from device task");
    let captured_at = Utc::now();
    let builder = ReportBuilder::new(device, captured_at);
    let builder = if device.kind.is_windowed() {
        builder.windowed(
            SampleSet::absent(sample_count, ReadingFault::Unreachable, captured_at),
            None,
        )
    } else {
        builder
    };
    builder.build(Status::Unreachable)
}
