// Sigwatch Testdata - Signal patterns
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Signal patterns for simulated device metrics.
//!
//! A pattern is evaluated once per call to the simulated device, so the
//! "time" axis here is the call index rather than wall-clock time. That keeps
//! simulated windows reproducible under paused tokio time.

use rand::prelude::*;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Signal pattern definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalPattern {
    /// Constant value.
    Constant { value: f64 },

    /// Gaussian noise around a mean.
    Gaussian { mean: f64, std_dev: f64 },

    /// Uniform jitter in `[base - spread, base + spread]`.
    Jitter { base: f64, spread: f64 },

    /// Linear drift.
    ///
    /// `value = start + rate_per_call * call`
    Drift { start: f64, rate_per_call: f64 },

    /// Sinusoidal wobble.
    ///
    /// `value = offset + amplitude * sin(2*PI*call/period_calls)`
    Sine {
        amplitude: f64,
        period_calls: u64,
        offset: f64,
    },

    /// Level change after a number of calls.
    Step {
        before: f64,
        after: f64,
        at_call: u64,
    },

    /// Sum of patterns.
    Composite(Vec<SignalPattern>),
}

impl SignalPattern {
    /// Evaluate the pattern for the given call index.
    pub fn evaluate(&self, call: u64, rng: &mut (impl Rng + ?Sized)) -> f64 {
        match self {
            SignalPattern::Constant { value } => *value,

            SignalPattern::Gaussian { mean, std_dev } => match Normal::new(*mean, *std_dev) {
                Ok(normal) => normal.sample(rng),
                Err(_) => *mean,
            },

            SignalPattern::Jitter { base, spread } => {
                if *spread <= 0.0 {
                    *base
                } else {
                    base + rng.gen_range(-spread..=*spread)
                }
            }

            SignalPattern::Drift {
                start,
                rate_per_call,
            } => start + rate_per_call * call as f64,

            SignalPattern::Sine {
                amplitude,
                period_calls,
                offset,
            } => {
                let period = (*period_calls).max(1) as f64;
                offset + amplitude * (2.0 * PI * call as f64 / period).sin()
            }

            SignalPattern::Step {
                before,
                after,
                at_call,
            } => {
                if call >= *at_call {
                    *after
                } else {
                    *before
                }
            }

            SignalPattern::Composite(patterns) => {
                patterns.iter().map(|p| p.evaluate(call, rng)).sum()
            }
        }
    }

    /// Constant pattern.
    pub fn constant(value: f64) -> Self {
        SignalPattern::Constant { value }
    }

    /// Gaussian noise pattern.
    pub fn gaussian(mean: f64, std_dev: f64) -> Self {
        SignalPattern::Gaussian { mean, std_dev }
    }

    /// Uniform jitter pattern.
    pub fn jitter(base: f64, spread: f64) -> Self {
        SignalPattern::Jitter { base, spread }
    }
}

/// How a pattern value is rendered as device text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueFormat {
    /// Rounded to a whole number.
    Integer,
    /// Fixed number of decimals.
    Decimal { places: usize },
}

impl ValueFormat {
    /// Render a value.
    pub fn render(&self, value: f64) -> String {
        match self {
            ValueFormat::Integer => format!("{}", value.round() as i64),
            ValueFormat::Decimal { places } => format!("{:.*}", places, value),
        }
    }
}

/// Probability of each simulated failure mode per call.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FaultProfile {
    /// Device does not answer.
    pub unreachable: f64,
    /// Device answers with non-numeric text.
    pub garbage: f64,
}

impl FaultProfile {
    /// No failures.
    pub fn none() -> Self {
        Self::default()
    }

    /// Only unreachable failures.
    pub fn dropouts(rate: f64) -> Self {
        Self {
            unreachable: rate,
            garbage: 0.0,
        }
    }

    /// Always unreachable.
    pub fn offline() -> Self {
        Self::dropouts(1.0)
    }
}
