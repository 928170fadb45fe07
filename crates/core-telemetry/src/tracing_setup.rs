//! `tracing` subscriber setup: an `EnvFilter`-driven formatter, the only
//! telemetry sink this crate keeps. No OTLP/remote exporter layer is
//! wired up — nothing in this repo consumes one (see `DESIGN.md`).

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TelemetryConfig {
    /// `tracing_subscriber::EnvFilter` directive string, e.g. `"info"` or
    /// `"core_node=debug,pbft_engine=trace"`.
    pub log_filter: String,
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { log_filter: "info".to_string(), json: false }
    }
}

/// A guard whose `Drop` flushes any buffered output. Kept as a named type
/// (rather than `()`) so callers hold it for the node's lifetime, mirroring
/// `quantum_telemetry::TracingGuard`.
pub struct TracingGuard;

pub fn init_tracing(config: &TelemetryConfig) -> TracingGuard {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter);
    if config.json {
        let _ = subscriber.json().try_init();
    } else {
        let _ = subscriber.try_init();
    }
    TracingGuard
}
