// Sigwatch Testdata - Scripted and simulated metric sources
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Sigwatch Testdata
//!
//! Metric sources for exercising the sigwatch pipeline without real devices.
//!
//! - **Scripted sources**: exact per-call answers, delays and hangs for tests
//! - **Simulated sources**: seeded signal patterns with injected faults
//! - **Site presets**: a demo inventory and named fault scenarios
//!
//! ## Quick Start
//!
//! ```rust
//! use sigwatch_testdata::{demo_site, simulate_devices, Scenario};
//!
//! let devices = demo_site();
//! let source = simulate_devices(&devices, Scenario::CameraOverload, 42);
//! assert!(source.metric_count() > 0);
//! ```
//!
//! ```rust
//! use sigwatch_testdata::{Response, ScriptedSource};
//!
//! let source = ScriptedSource::new()
//!     .values("192.168.30.4", "1.3.6.1.4.1.9999.1.1.1", ["100", "105", "98"])
//!     .always("192.168.30.5", "1.3.6.1.4.1.9999.1.1.1", Response::Unreachable);
//! ```

pub mod patterns;
pub mod presets;
pub mod scripted;
pub mod simulated;

// Re-exports for convenience
pub use patterns::{FaultProfile, SignalPattern, ValueFormat};
pub use presets::{demo_site, simulate_devices, Scenario, UnknownScenario};
pub use scripted::{Call, Response, ScriptedSource};
pub use simulated::{MetricConfig, SimulatedSource, GARBAGE_TEXT};
