//! # Transaction Resolver
//!
//! Resolves a block's transaction ids into stored transaction rows.
//! Sub-batches run one after another; ids inside a sub-batch are fetched
//! concurrently.

use futures::future::try_join_all;
use std::sync::Arc;
use tracing::debug;

use crate::algorithms::normalize_transaction;
use crate::domain::{SyncError, Transaction};
use crate::ports::NodeClient;

/// Bounded-concurrency transaction fetcher.
pub struct TransactionResolver<N: NodeClient> {
    node: Arc<N>,
    sub_batch_size: usize,
}

impl<N: NodeClient> TransactionResolver<N> {
    /// Create a resolver fetching at most `sub_batch_size` ids at once.
    pub fn new(node: Arc<N>, sub_batch_size: usize) -> Self {
        Self {
            node,
            sub_batch_size: sub_batch_size.max(1),
        }
    }

    /// Resolve `ids` for the block at `height`, preserving order.
    ///
    /// The first failing id fails the whole block.
    pub async fn resolve(
        &self,
        height: u64,
        ids: &[String],
    ) -> Result<Vec<Transaction>, SyncError> {
        let mut resolved = Vec::with_capacity(ids.len());

        for (index, chunk) in ids.chunks(self.sub_batch_size).enumerate() {
            debug!(
                height,
                sub_batch = index,
                size = chunk.len(),
                "[ix-01] Resolving transaction sub-batch"
            );
            let fetched = try_join_all(chunk.iter().map(|id| self.resolve_one(height, id))).await?;
            resolved.extend(fetched);
        }

        Ok(resolved)
    }

    async fn resolve_one(&self, height: u64, id: &str) -> Result<Transaction, SyncError> {
        let remote = self
            .node
            .transaction(id)
            .await
            .map_err(|e| SyncError::fetch(height, format!("transaction {id}: {e}")))?;
        Ok(normalize_transaction(id, height, remote))
    }
}
