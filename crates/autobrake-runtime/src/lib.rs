//! `autobrake-runtime` – the per-frame brake node.
//!
//! Wires the event bus to the collision predictor: kinematic updates are
//! remembered, every scan is judged once, and the verdict goes back out on
//! the bus.
//!
//! # Modules
//!
//! - [`node`] – [`AutobrakeNode`][node::AutobrakeNode]: holds the latest
//!   [`KinematicState`][autobrake_types::KinematicState], runs the
//!   [`CollisionPredictor`] for each scan, optionally debounces the result,
//!   and publishes verdicts and faults.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]:
//!   initialises the global `tracing` subscriber with an optional OTLP span
//!   exporter.  Set `OTEL_EXPORTER_OTLP_ENDPOINT` to enable live trace export
//!   to Jaeger, Grafana Tempo, or any OTLP-compatible collector.

pub mod node;
pub mod telemetry;

pub use node::{AutobrakeNode, NodeInputs};
pub use telemetry::{LogFormat, TracerProviderGuard, init_tracing};

// Re-exported so callers can build a node without a direct dependency on
// autobrake-kernel.
pub use autobrake_kernel::{BrakeDebouncer, CollisionPredictor};
