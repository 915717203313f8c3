// Sigwatch - Signal-quality telemetry evaluation
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Metric retrieval capability
//!
//! A [`MetricSource`] answers one `(address, metric_id)` question with the
//! device's textual value. One call, one answer: no retries, no caching.
//! Every failure is reported as a [`SourceError`]; callers turn it into an
//! absent sample.

use crate::error::SourceError;
use std::future::Future;
use std::sync::Arc;

/// Single-shot retrieval of one named value from one device
pub trait MetricSource: Send + Sync {
    /// Fetch the raw text of `metric_id` from the device at `address`
    fn get(
        &self,
        address: &str,
        metric_id: &str,
    ) -> impl Future<Output = Result<String, SourceError>> + Send;
}

impl<T: MetricSource> MetricSource for Arc<T> {
    fn get(
        &self,
        address: &str,
        metric_id: &str,
    ) -> impl Future<Output = Result<String, SourceError>> + Send {
        (**self).get(address, metric_id)
    }
}

impl<T: MetricSource> MetricSource for &T {
    fn get(
        &self,
        address: &str,
        metric_id: &str,
    ) -> impl Future<Output = Result<String, SourceError>> + Send {
        (**self).get(address, metric_id)
    }
}
