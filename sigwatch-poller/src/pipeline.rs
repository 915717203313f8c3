// Sigwatch Poller - Device sampling and poll scheduling
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Per-device pipeline
//!
//! Sample → evaluate → classify → build, for one device. The pipeline never
//! fails: every missing piece of data flows into the report as an absent
//! value and the classification decides what that means.

use crate::sampler::{to_reading, Sampler};
use chrono::Utc;
use sigwatch::{
    Classifier, Device, DeviceKind, MetricSource, ProbeConfig, Reading, ReadingFault, Report,
    ReportBuilder, SampleSet, SecondarySignal, Status,
};
use std::time::Instant;
use tracing::{debug, info_span, Instrument};

/// Evaluates one device per call
#[derive(Debug, Clone)]
pub struct Pipeline {
    sampler: Sampler,
    classifier: Classifier,
}

impl Pipeline {
    /// Create a pipeline from its parts
    pub fn new(sampler: Sampler, classifier: Classifier) -> Self {
        Self {
            sampler,
            classifier,
        }
    }

    /// Create a pipeline from a probe configuration
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(Sampler::new(&config.sampling), config.classifier())
    }

    /// Sampler in use
    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    /// Classifier in use
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Run the full pipeline for one device
    pub async fn evaluate<S: MetricSource>(&self, source: &S, device: &Device) -> Report {
        let span = info_span!("device", device = %device.name, kind = %device.kind);
        async {
            let started = Instant::now();
            let report = match device.kind {
                DeviceKind::Encoder | DeviceKind::Laser => {
                    self.evaluate_window(source, device).await
                }
                DeviceKind::Camera => self.evaluate_single(source, device).await,
                DeviceKind::Generic => self.evaluate_raw(source, device).await,
            };
            debug!(
                status = %report.status(),
                value = ?report.value(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "device evaluated"
            );
            report
        }
        .instrument(span)
        .await
    }

    async fn evaluate_window<S: MetricSource>(&self, source: &S, device: &Device) -> Report {
        let format = device.kind.numeric_format();
        let Some(metric_kind) = device.kind.metric_kind() else {
            return ReportBuilder::new(device, Utc::now()).build(Status::Unreachable);
        };

        let samples = match device.primary_metric_id() {
            Some(id) => self.sampler.sample(source, &device.address, id, format).await,
            None => SampleSet::default(),
        };

        // An unconfigured error-code metric is treated like a failed read.
        let secondary = if device.kind.secondary_metric().is_some() {
            let code = match device.secondary_metric_id() {
                Some(id) => self.sampler.read_text(source, &device.address, id).await,
                None => None,
            };
            SecondarySignal::from_retrieval(code.as_deref())
        } else {
            SecondarySignal::NotConfigured
        };

        let metrics = self.read_auxiliary(source, device).await;

        let (statistic, classification) = self.classifier.classify_window(
            metric_kind,
            &samples,
            &secondary,
            device.secondary_required,
        );
        debug!(
            valid = samples.valid_count(),
            reason = ?classification.reason,
            "window classified"
        );

        let mut builder = ReportBuilder::new(device, Utc::now())
            .windowed(samples, statistic)
            .metrics(metrics);
        if let Some(description) = self.classifier.error_codes().describe(&secondary) {
            builder = builder.secondary(secondary.code().map(str::to_string), description);
        }
        builder.build(classification.status)
    }

    async fn evaluate_single<S: MetricSource>(&self, source: &S, device: &Device) -> Report {
        let Some(metric_kind) = device.kind.metric_kind() else {
            return ReportBuilder::new(device, Utc::now()).build(Status::Unreachable);
        };

        let (reading, raw) = match (device.kind.primary_metric(), device.primary_metric_id()) {
            (Some(name), Some(id)) => {
                let result = self.sampler.fetch(source, &device.address, id).await;
                let raw = result.as_ref().ok().map(|text| text.trim().to_string());
                let reading = to_reading(result, device.kind.numeric_format());
                (reading, Some((name, raw)))
            }
            _ => (Reading::Absent(ReadingFault::Unreachable), None),
        };

        let mut metrics = self.read_auxiliary(source, device).await;
        if let Some((name, raw)) = raw {
            metrics.push((name.to_string(), raw));
        }

        let classification = self.classifier.classify_reading(metric_kind, &reading);
        debug!(reason = ?classification.reason, "reading classified");

        ReportBuilder::new(device, Utc::now())
            .single(reading)
            .metrics(metrics)
            .build(classification.status)
    }

    async fn evaluate_raw<S: MetricSource>(&self, source: &S, device: &Device) -> Report {
        let metrics = self.read_auxiliary(source, device).await;
        let status = raw_status(&metrics);
        ReportBuilder::new(device, Utc::now())
            .metrics(metrics)
            .build(status)
    }

    async fn read_auxiliary<S: MetricSource>(
        &self,
        source: &S,
        device: &Device,
    ) -> Vec<(String, Option<String>)> {
        let mut values = Vec::new();
        for (name, id) in device.auxiliary_metrics() {
            let value = self.sampler.read_text(source, &device.address, id).await;
            values.push((name.to_string(), value));
        }
        values
    }
}

/// OK when at least one raw metric answered
fn raw_status(metrics: &[(String, Option<String>)]) -> Status {
    if metrics.iter().any(|(_, value)| value.is_some()) {
        Status::Ok
    } else {
        Status::Unreachable
    }
}
