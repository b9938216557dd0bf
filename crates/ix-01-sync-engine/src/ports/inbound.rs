//! # Inbound Ports
//!
//! Read-only projections over the persisted store, consumed by the query API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BlockHeader, StoreError, Transaction};

/// Block reader - inbound port.
#[async_trait]
pub trait BlockReader: Send + Sync {
    /// Block at `height`.
    async fn block_by_height(&self, height: u64) -> Result<Option<BlockHeader>, StoreError>;

    /// Block with `hash`.
    async fn block_by_hash(&self, hash: &str) -> Result<Option<BlockHeader>, StoreError>;

    /// Most recent blocks, highest first.
    async fn latest_blocks(&self, limit: u32) -> Result<Vec<BlockHeader>, StoreError>;

    /// Transaction with `id`.
    async fn transaction_by_id(&self, id: &str) -> Result<Option<Transaction>, StoreError>;

    /// Transactions of one block, ordered by id.
    async fn transactions_in_block(&self, height: u64) -> Result<Vec<Transaction>, StoreError>;

    /// Most recent transactions, by block height descending then id.
    async fn latest_transactions(&self, limit: u32) -> Result<Vec<Transaction>, StoreError>;

    /// Transactions whose parent block timestamp is at or after `since`.
    async fn count_transactions_since(&self, since: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Number of stored blocks.
    async fn block_count(&self) -> Result<u64, StoreError>;
}
