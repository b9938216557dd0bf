//! JSON response bodies.

use chrono::{DateTime, Utc};
use ix_01_sync_engine::{BlockHeader, SyncPhase, SyncStatus, Transaction, TxStatus};
use serde::{Deserialize, Serialize};

/// `GET /health`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthView {
    pub status: String,
}

impl HealthView {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// One block row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockView {
    pub height: u64,
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    pub anchor_height: u64,
}

impl From<BlockHeader> for BlockView {
    fn from(header: BlockHeader) -> Self {
        Self {
            height: header.height,
            hash: header.hash,
            timestamp: header.timestamp,
            anchor_height: header.anchor_height,
        }
    }
}

/// One transaction row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    pub txid: String,
    pub block_height: u64,
    pub data: serde_json::Value,
    pub status: TxStatus,
    pub settlement_ids: Vec<String>,
}

impl From<Transaction> for TransactionView {
    fn from(tx: Transaction) -> Self {
        Self {
            txid: tx.id,
            block_height: tx.block_height,
            data: tx.payload,
            status: tx.status,
            settlement_ids: tx.settlement_ids,
        }
    }
}

/// `GET /stats`: transaction counts over trailing windows of block time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatsView {
    pub tx_last_hour: u64,
    pub tx_last_day: u64,
    pub tx_last_week: u64,
    pub tps_last_hour: f64,
    pub total_blocks: u64,
}

/// `GET /status`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    pub phase: SyncPhase,
    pub frontier: u64,
    pub chain_height: Option<u64>,
    pub percent_complete: f64,
    pub estimated_time_to_completion_ms: Option<u64>,
    pub elapsed_time_ms: u64,
    pub average_block_time_ms: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub last_block_at: Option<DateTime<Utc>>,
}

impl From<&SyncStatus> for StatusView {
    fn from(status: &SyncStatus) -> Self {
        Self {
            phase: status.phase,
            frontier: status.frontier,
            chain_height: status.chain_height,
            percent_complete: status.percent_complete,
            estimated_time_to_completion_ms: status.estimated_remaining_ms,
            elapsed_time_ms: status.elapsed_ms,
            average_block_time_ms: status.average_block_millis,
            started_at: status.started_at,
            last_block_at: status.last_block_at,
        }
    }
}
