//! # Chain Indexer
//!
//! Ingests blocks and transactions from a node's RPC interface into
//! PostgreSQL and serves them over HTTP.

use anyhow::{Context, Result};
use indexer_runtime::{load_config, IndexerRuntime};
use indexer_telemetry::TelemetryConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    indexer_telemetry::init_telemetry(&telemetry).context("initializing telemetry")?;
    info!(
        service = %telemetry.service_name,
        version = ix_01_sync_engine::VERSION,
        "Starting chain indexer"
    );

    let config = load_config();
    IndexerRuntime::new(config).run().await
}
