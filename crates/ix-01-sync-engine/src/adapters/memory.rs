//! In-memory block store.
//!
//! Implements `BlockStore` and `BlockReader` with the same upsert and
//! uniqueness rules as the PostgreSQL adapter. A single write lock makes
//! every `store` call all-or-nothing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::domain::{Block, BlockHeader, StoreError, Transaction};
use crate::ports::{BlockReader, BlockStore};

#[derive(Default)]
struct Tables {
    blocks: BTreeMap<u64, BlockHeader>,
    hashes: HashMap<String, u64>,
    transactions: HashMap<String, Transaction>,
}

/// Block store backed by process memory.
#[derive(Default)]
pub struct MemoryBlockStore {
    tables: RwLock<Tables>,
    failing_stores: AtomicU32,
}

impl MemoryBlockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` calls to `store` fail without writing.
    pub fn fail_next_stores(&self, count: u32) {
        self.failing_stores.store(count, Ordering::SeqCst);
    }

    /// Number of stored transactions.
    pub fn transaction_count(&self) -> usize {
        self.tables.read().transactions.len()
    }

    fn take_injected_failure(&self) -> bool {
        self.failing_stores
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn store(&self, block: &Block) -> Result<(), StoreError> {
        if self.take_injected_failure() {
            return Err(StoreError::Connection("injected failure".to_string()));
        }

        let header = &block.header;
        let mut tables = self.tables.write();

        // Validate before mutating anything.
        if let Some(&owner) = tables.hashes.get(&header.hash) {
            if owner != header.height {
                return Err(StoreError::Query(format!(
                    "duplicate block hash {} (held by height {owner})",
                    header.hash
                )));
            }
        }

        if let Some(previous) = tables.blocks.insert(header.height, header.clone()) {
            if previous.hash != header.hash {
                tables.hashes.remove(&previous.hash);
            }
        }
        tables.hashes.insert(header.hash.clone(), header.height);

        for tx in &block.transactions {
            tables.transactions.insert(tx.id.clone(), tx.clone());
        }

        Ok(())
    }

    async fn max_height(&self) -> Result<Option<u64>, StoreError> {
        Ok(self.tables.read().blocks.keys().next_back().copied())
    }
}

#[async_trait]
impl BlockReader for MemoryBlockStore {
    async fn block_by_height(&self, height: u64) -> Result<Option<BlockHeader>, StoreError> {
        Ok(self.tables.read().blocks.get(&height).cloned())
    }

    async fn block_by_hash(&self, hash: &str) -> Result<Option<BlockHeader>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .hashes
            .get(hash)
            .and_then(|height| tables.blocks.get(height))
            .cloned())
    }

    async fn latest_blocks(&self, limit: u32) -> Result<Vec<BlockHeader>, StoreError> {
        Ok(self
            .tables
            .read()
            .blocks
            .values()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn transaction_by_id(&self, id: &str) -> Result<Option<Transaction>, StoreError> {
        Ok(self.tables.read().transactions.get(id).cloned())
    }

    async fn transactions_in_block(&self, height: u64) -> Result<Vec<Transaction>, StoreError> {
        let mut txs: Vec<Transaction> = self
            .tables
            .read()
            .transactions
            .values()
            .filter(|tx| tx.block_height == height)
            .cloned()
            .collect();
        txs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(txs)
    }

    async fn latest_transactions(&self, limit: u32) -> Result<Vec<Transaction>, StoreError> {
        let mut txs: Vec<Transaction> = self.tables.read().transactions.values().cloned().collect();
        txs.sort_by(|a, b| b.block_height.cmp(&a.block_height).then(a.id.cmp(&b.id)));
        txs.truncate(limit as usize);
        Ok(txs)
    }

    async fn count_transactions_since(&self, since: DateTime<Utc>) -> Result<u64, StoreError> {
        let tables = self.tables.read();
        let count = tables
            .transactions
            .values()
            .filter(|tx| {
                tables
                    .blocks
                    .get(&tx.block_height)
                    .is_some_and(|b| b.timestamp >= since)
            })
            .count();
        Ok(count as u64)
    }

    async fn block_count(&self) -> Result<u64, StoreError> {
        Ok(self.tables.read().blocks.len() as u64)
    }
}
