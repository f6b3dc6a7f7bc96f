//! # Oracle Node
//!
//! Entry point of a data-deal oracle node.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `OC_*` environment variables
//! 2. Initialize logging and metrics
//! 3. Establish the enclave identity and unseal (or create) the keys
//! 4. Anchor the light client and obtain the oracle key
//! 5. Start the event reactor and the chain event bridge
//! 6. Run until Ctrl+C or SIGTERM

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, OracleNode};
use oracle_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.context("Failed to listen for Ctrl+C")?,
        _ = terminate.recv() => info!("SIGTERM received"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")
}

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(&TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = NodeConfig::from_env().context("Failed to load configuration")?;

    info!("===========================================");
    info!("  Oracle Node v{}", env!("CARGO_PKG_VERSION"));
    info!("  Chain: {} via {}", config.chain.chain_id, config.chain.rpc_url);
    info!("===========================================");

    let mut node = OracleNode::build(config)
        .await
        .context("Failed to bootstrap the oracle node")?;
    node.start().await.context("Failed to start the oracle node")?;

    info!("Node is running. Press Ctrl+C to stop.");
    wait_for_signal().await?;

    node.shutdown().await;
    Ok(())
}
