//! `vesta-node`: the consensus-core binary. Loads configuration,
//! initializes tracing, bootstraps the `Engine`, and runs it until a
//! subsystem task exits (which should never happen in normal operation —
//! a returned `JoinHandle` means that task panicked or was cancelled).

use core_node::{Engine, EngineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(std::path::Path::new(&path))?,
        None => EngineConfig::default(),
    };

    let _telemetry_guard = core_telemetry::init_tracing(&config.telemetry);
    tracing::info!(chain_id = config.chain_id, data_dir = ?config.data_dir, "starting vesta-node");

    let engine = Engine::bootstrap(config)?;
    let mut tasks = tokio::task::JoinSet::new();
    engine.spawn(&mut tasks);

    // Any task returning is abnormal: the PBFT driver, proposer retry
    // loop, sync drain and event logger are all meant to run for the
    // lifetime of the process.
    if let Some(result) = tasks.join_next().await {
        result?;
    }
    tasks.shutdown().await;
    Ok(())
}
