//! # core-telemetry
//!
//! Structured logging (`tracing`) and Prometheus metrics wiring shared by
//! every engine crate.

pub mod tracing_setup;

#[cfg(feature = "metrics")]
pub mod metrics;

pub use tracing_setup::{init_tracing, TelemetryConfig, TracingGuard};
