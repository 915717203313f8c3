// Sigwatch Testdata - Scripted sources
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Deterministic metric source driven by per-metric scripts.
//!
//! Each `(address, metric_id)` pair owns a queue of [`Response`]s consumed one
//! per call. When a queue runs dry the last response repeats. Pairs with no
//! script answer as unreachable.

use serde::{Deserialize, Serialize};
use sigwatch::{MetricSource, SourceError};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// Answer with this text.
    Value(String),
    /// Device does not answer.
    Unreachable,
    /// Answer with this text after a delay.
    Delayed { text: String, delay_ms: u64 },
    /// Never answer.
    Hang,
}

impl Response {
    /// Text answer.
    pub fn value(text: impl Into<String>) -> Self {
        Response::Value(text.into())
    }

    /// Delayed text answer.
    pub fn delayed(text: impl Into<String>, delay: Duration) -> Self {
        Response::Delayed {
            text: text.into(),
            delay_ms: delay.as_millis() as u64,
        }
    }
}

/// A call seen by the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Device address.
    pub address: String,
    /// Metric identifier.
    pub metric_id: String,
    /// Time since the source was created (tokio clock).
    pub at: Duration,
}

#[derive(Debug, Default)]
struct Script {
    queue: VecDeque<Response>,
    last: Option<Response>,
}

impl Script {
    fn next(&mut self) -> Option<Response> {
        match self.queue.pop_front() {
            Some(response) => {
                self.last = Some(response.clone());
                Some(response)
            }
            None => self.last.clone(),
        }
    }
}

/// Metric source that replays scripted responses.
#[derive(Debug)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<(String, String), Script>>,
    calls: Mutex<Vec<Call>>,
    started: tokio::time::Instant,
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedSource {
    /// Create a source with no scripts.
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            started: tokio::time::Instant::now(),
        }
    }

    /// Append responses for a metric.
    pub fn script(
        self,
        address: impl Into<String>,
        metric_id: impl Into<String>,
        responses: impl IntoIterator<Item = Response>,
    ) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts
                .entry((address.into(), metric_id.into()))
                .or_default()
                .queue
                .extend(responses);
        }
        self
    }

    /// Answer every call for a metric the same way.
    pub fn always(
        self,
        address: impl Into<String>,
        metric_id: impl Into<String>,
        response: Response,
    ) -> Self {
        self.script(address, metric_id, [response])
    }

    /// Script a sequence of text values.
    pub fn values<I, T>(
        self,
        address: impl Into<String>,
        metric_id: impl Into<String>,
        values: I,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.script(
            address,
            metric_id,
            values.into_iter().map(|v| Response::Value(v.into())),
        )
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of calls made for one metric.
    pub fn call_count(&self, address: &str, metric_id: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.address == address && c.metric_id == metric_id)
            .count()
    }

    fn next_response(&self, address: &str, metric_id: &str) -> Option<Response> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(Call {
                address: address.to_string(),
                metric_id: metric_id.to_string(),
                at: self.started.elapsed(),
            });
        }
        self.scripts
            .lock()
            .ok()?
            .get_mut(&(address.to_string(), metric_id.to_string()))?
            .next()
    }
}

impl MetricSource for ScriptedSource {
    async fn get(&self, address: &str, metric_id: &str) -> Result<String, SourceError> {
        match self.next_response(address, metric_id) {
            Some(Response::Value(text)) => Ok(text),
            Some(Response::Delayed { text, delay_ms }) => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(text)
            }
            Some(Response::Hang) => std::future::pending().await,
            Some(Response::Unreachable) => Err(SourceError::unreachable(address, "scripted")),
            None => Err(SourceError::unreachable(address, "no script")),
        }
    }
}
