//! # Indexer Runtime
//!
//! Process wiring for the chain indexer.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging and register metrics
//! 2. Load configuration (defaults, then `IX_*` env) and validate it
//! 3. Connect storage, retrying within the startup budget
//! 4. Seed the sync frontier from `max(height) + 1`
//! 5. Spawn the query API server
//! 6. Run the sync orchestrator until Ctrl+C

pub mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use ix_01_sync_engine::{
    BlockReader, BlockStore, JsonRpcNodeClient, MemoryBlockStore, PgBlockStore, SyncOrchestrator,
};
use ix_02_query_api::QueryApiService;
use tracing::{error, info, warn};

pub use config::{apply_env, load_config, IndexerConfig, StorageBackend};

/// Owns the configuration and drives both subsystems.
pub struct IndexerRuntime {
    config: IndexerConfig,
}

impl IndexerRuntime {
    pub fn new(config: IndexerConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Connect storage and run until Ctrl+C or a fatal error.
    pub async fn run(self) -> Result<()> {
        self.config.validate()?;

        match self.config.storage {
            StorageBackend::Postgres => {
                let store = PgBlockStore::connect_with_retry(&self.config.database)
                    .await
                    .context("connecting to database")?;
                self.run_with_store(Arc::new(store)).await
            }
            StorageBackend::Memory => {
                warn!("Using in-memory storage; indexed data is lost on exit");
                self.run_with_store(Arc::new(MemoryBlockStore::new())).await
            }
        }
    }

    async fn run_with_store<S>(self, store: Arc<S>) -> Result<()>
    where
        S: BlockStore + BlockReader + 'static,
    {
        let node = Arc::new(
            JsonRpcNodeClient::new(&self.config.node).context("building node client")?,
        );
        info!(url = %node.url(), "Node client ready");

        let mut orchestrator =
            SyncOrchestrator::from_store(self.config.sync.clone(), node, Arc::clone(&store))
                .await
                .context("initializing sync state")?;

        let reader: Arc<dyn BlockReader> = store;
        let api = QueryApiService::new(self.config.api.clone(), reader, orchestrator.subscribe())
            .context("building query api")?;
        let api_handle = tokio::spawn(api.serve());

        info!("Indexer is running. Press Ctrl+C to stop.");
        tokio::select! {
            _ = orchestrator.run() => {}
            result = api_handle => {
                match result {
                    Ok(Ok(())) => warn!("[ix-02] Query API stopped"),
                    Ok(Err(e)) => {
                        error!(error = %e, "[ix-02] Query API failed");
                        return Err(e).context("query api");
                    }
                    Err(e) => return Err(e).context("query api task"),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("listening for ctrl_c")?;
                info!("Shutdown signal received");
            }
        }

        info!(frontier = orchestrator.frontier(), "Shutdown complete");
        Ok(())
    }
}
