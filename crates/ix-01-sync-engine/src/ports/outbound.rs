//! # Outbound Ports
//!
//! Traits for external dependencies (node RPC, relational store).

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::domain::{Block, NodeError, StoreError};

/// Block body as returned by the node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoteBlock {
    /// Block production time.
    pub timestamp: DateTime<Utc>,
    /// Settlement chain anchor height.
    pub anchor_height: u64,
    /// Transaction ids in block order.
    pub transaction_ids: Vec<String>,
}

/// Transaction detail as returned by the node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoteTransaction {
    /// Runtime transaction representation.
    pub payload: serde_json::Value,
    /// Raw remote status (`processing`, `success`, ...).
    pub status: String,
    /// Settlement chain transaction ids; absent or empty when unsettled.
    pub settlement_ids: Option<Vec<String>>,
}

/// Node client - outbound port.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Whether the node is ready to serve chain data.
    async fn is_ready(&self) -> Result<bool, NodeError>;

    /// Latest block height.
    async fn chain_height(&self) -> Result<u64, NodeError>;

    /// Hash of the block at `height`. Fails if the height is unknown.
    async fn block_hash(&self, height: u64) -> Result<String, NodeError>;

    /// Block body by hash.
    async fn block(&self, hash: &str) -> Result<RemoteBlock, NodeError>;

    /// Transaction detail by id.
    async fn transaction(&self, id: &str) -> Result<RemoteTransaction, NodeError>;
}

/// Block store - outbound port.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Upsert one block and all its transactions, atomically.
    ///
    /// On error nothing is committed.
    async fn store(&self, block: &Block) -> Result<(), StoreError>;

    /// Highest stored height, `None` when empty.
    async fn max_height(&self) -> Result<Option<u64>, StoreError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

#[derive(Default)]
struct MockChain {
    hashes: BTreeMap<u64, String>,
    blocks: HashMap<String, RemoteBlock>,
    transactions: HashMap<String, RemoteTransaction>,
    failing_heights: HashSet<u64>,
    failing_transactions: HashSet<String>,
    hash_requests: HashMap<u64, u64>,
}

/// Mock node for testing.
///
/// Serves a deterministic chain and supports failure injection per height
/// and per transaction id.
pub struct MockNodeClient {
    ready: AtomicBool,
    chain_height: AtomicU64,
    chain: Mutex<MockChain>,
    ready_checks: AtomicU64,
    transaction_fetches: AtomicU64,
}

impl Default for MockNodeClient {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(true),
            chain_height: AtomicU64::new(0),
            chain: Mutex::new(MockChain::default()),
            ready_checks: AtomicU64::new(0),
            transaction_fetches: AtomicU64::new(0),
        }
    }
}

impl MockNodeClient {
    /// Hash served for `height`.
    pub fn hash_for(height: u64) -> String {
        format!("0x{height:064x}")
    }

    /// Id of the `index`-th transaction of `height`.
    pub fn txid_for(height: u64, index: usize) -> String {
        format!("tx-{height}-{index}")
    }

    /// Chain with heights `0..blocks` and `txs_per_block` transactions each.
    ///
    /// Even-indexed transactions are `processing` with no settlement ids,
    /// odd-indexed ones are `success` with one settlement id.
    pub fn with_chain(blocks: u64, txs_per_block: usize) -> Self {
        let node = Self::default();
        for height in 0..blocks {
            node.push_block(height, txs_per_block);
        }
        node
    }

    /// Append (or replace) the block at `height`, raising the tip if needed.
    pub fn push_block(&self, height: u64, txs: usize) {
        let genesis = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_default();
        let hash = Self::hash_for(height);
        let transaction_ids: Vec<String> = (0..txs).map(|i| Self::txid_for(height, i)).collect();

        let mut chain = self.chain.lock();
        for (index, id) in transaction_ids.iter().enumerate() {
            let settled = index % 2 == 1;
            chain.transactions.insert(
                id.clone(),
                RemoteTransaction {
                    payload: serde_json::json!({ "id": id, "height": height, "index": index }),
                    status: if settled { "success" } else { "processing" }.to_string(),
                    settlement_ids: settled.then(|| vec![format!("settle-{id}")]),
                },
            );
        }
        chain.blocks.insert(
            hash.clone(),
            RemoteBlock {
                timestamp: genesis + ChronoDuration::seconds(height as i64 * 12),
                anchor_height: 800_000 + height / 10,
                transaction_ids,
            },
        );
        chain.hashes.insert(height, hash);
        drop(chain);

        self.chain_height.fetch_max(height, Ordering::SeqCst);
    }

    /// Override a transaction's remote record.
    pub fn set_transaction(&self, id: &str, tx: RemoteTransaction) {
        self.chain.lock().transactions.insert(id.to_string(), tx);
    }

    /// Set readiness.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Override the reported chain height.
    pub fn set_chain_height(&self, height: u64) {
        self.chain_height.store(height, Ordering::SeqCst);
    }

    /// Make every fetch for `height` fail.
    pub fn fail_height(&self, height: u64) {
        self.chain.lock().failing_heights.insert(height);
    }

    /// Make fetches for transaction `id` fail.
    pub fn fail_transaction(&self, id: &str) {
        self.chain.lock().failing_transactions.insert(id.to_string());
    }

    /// Clear all injected failures.
    pub fn heal(&self) {
        let mut chain = self.chain.lock();
        chain.failing_heights.clear();
        chain.failing_transactions.clear();
    }

    /// Readiness checks served so far.
    pub fn ready_checks(&self) -> u64 {
        self.ready_checks.load(Ordering::SeqCst)
    }

    /// Block hash requests served for `height`.
    pub fn hash_requests(&self, height: u64) -> u64 {
        self.chain
            .lock()
            .hash_requests
            .get(&height)
            .copied()
            .unwrap_or(0)
    }

    /// Transaction fetches served so far.
    pub fn transaction_fetches(&self) -> u64 {
        self.transaction_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeClient for MockNodeClient {
    async fn is_ready(&self) -> Result<bool, NodeError> {
        self.ready_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.ready.load(Ordering::SeqCst))
    }

    async fn chain_height(&self) -> Result<u64, NodeError> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(NodeError::Unavailable("Mock node not ready".to_string()));
        }
        Ok(self.chain_height.load(Ordering::SeqCst))
    }

    async fn block_hash(&self, height: u64) -> Result<String, NodeError> {
        let mut chain = self.chain.lock();
        *chain.hash_requests.entry(height).or_insert(0) += 1;
        if chain.failing_heights.contains(&height) {
            return Err(NodeError::Unavailable(format!("Mock failure at {height}")));
        }
        chain
            .hashes
            .get(&height)
            .cloned()
            .ok_or_else(|| NodeError::NotFound(format!("height {height}")))
    }

    async fn block(&self, hash: &str) -> Result<RemoteBlock, NodeError> {
        self.chain
            .lock()
            .blocks
            .get(hash)
            .cloned()
            .ok_or_else(|| NodeError::NotFound(format!("block {hash}")))
    }

    async fn transaction(&self, id: &str) -> Result<RemoteTransaction, NodeError> {
        self.transaction_fetches.fetch_add(1, Ordering::SeqCst);
        let chain = self.chain.lock();
        if chain.failing_transactions.contains(id) {
            return Err(NodeError::Unavailable(format!("Mock failure for {id}")));
        }
        chain
            .transactions
            .get(id)
            .cloned()
            .ok_or_else(|| NodeError::NotFound(format!("transaction {id}")))
    }
}
