//! # Block Processor
//!
//! Fetches one height from the node, resolves its transactions and hands the
//! assembled block to the store.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use indexer_telemetry::metrics::{BLOCKS_INGESTED, BLOCK_DURATION, TRANSACTIONS_INGESTED};

use super::tx_resolver::TransactionResolver;
use crate::domain::{Block, BlockHeader, SyncError};
use crate::ports::{BlockStore, NodeClient};

/// Result of processing one height.
#[derive(Clone, Debug)]
pub struct ProcessedBlock {
    /// The block as written.
    pub block: Block,
    /// Wall-clock time spent on fetch, resolve and store.
    pub duration: Duration,
}

/// Per-height ingestion pipeline.
pub struct BlockProcessor<N: NodeClient, S: BlockStore> {
    node: Arc<N>,
    store: Arc<S>,
    resolver: TransactionResolver<N>,
}

impl<N: NodeClient, S: BlockStore> BlockProcessor<N, S> {
    /// Create a processor.
    pub fn new(node: Arc<N>, store: Arc<S>, tx_sub_batch_size: usize) -> Self {
        let resolver = TransactionResolver::new(Arc::clone(&node), tx_sub_batch_size);
        Self {
            node,
            store,
            resolver,
        }
    }

    /// Ingest the block at `height`.
    ///
    /// Any failing step fails the whole height; nothing is retried here.
    pub async fn process(&self, height: u64) -> Result<ProcessedBlock, SyncError> {
        let started = Instant::now();

        let hash = self
            .node
            .block_hash(height)
            .await
            .map_err(|e| SyncError::fetch(height, e))?;
        let body = self
            .node
            .block(&hash)
            .await
            .map_err(|e| SyncError::fetch(height, e))?;

        let transactions = self.resolver.resolve(height, &body.transaction_ids).await?;

        let block = Block {
            header: BlockHeader {
                height,
                hash,
                timestamp: body.timestamp,
                anchor_height: body.anchor_height,
            },
            transactions,
        };

        self.store
            .store(&block)
            .await
            .map_err(|e| SyncError::persist(height, e))?;

        let duration = started.elapsed();
        BLOCKS_INGESTED.inc();
        TRANSACTIONS_INGESTED.inc_by(block.transaction_count() as f64);
        BLOCK_DURATION.observe(duration.as_secs_f64());

        debug!(
            height,
            txs = block.transaction_count(),
            elapsed_ms = duration.as_millis() as u64,
            "[ix-01] Block stored"
        );

        Ok(ProcessedBlock { block, duration })
    }
}
