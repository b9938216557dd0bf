//! # Domain Entities
//!
//! Rows owned by the persistence layer: one block per height, one
//! transaction per id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Finality status of a stored transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// The node still reports the transaction as processing.
    Pending,
    /// Any other remote status.
    Finalized,
}

impl TxStatus {
    /// Remote status string that maps to `Pending`.
    pub const REMOTE_PROCESSING: &'static str = "processing";

    /// Normalize a remote status.
    pub fn from_remote(status: &str) -> Self {
        if status == Self::REMOTE_PROCESSING {
            Self::Pending
        } else {
            Self::Finalized
        }
    }

    /// SMALLINT column value.
    pub const fn code(self) -> i16 {
        match self {
            Self::Pending => 0,
            Self::Finalized => 1,
        }
    }

    /// Parse a SMALLINT column value.
    pub const fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Finalized),
            _ => None,
        }
    }
}

/// Block row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Height (primary identity).
    pub height: u64,
    /// Block hash (unique).
    pub hash: String,
    /// Block production time.
    pub timestamp: DateTime<Utc>,
    /// Height of the settlement chain block anchoring this block.
    pub anchor_height: u64,
}

/// Transaction row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction id (primary identity, unique across blocks).
    pub id: String,
    /// Parent block height.
    pub block_height: u64,
    /// Opaque runtime transaction representation.
    pub payload: serde_json::Value,
    /// Normalized finality status.
    pub status: TxStatus,
    /// Settlement chain transaction ids. Empty, never absent.
    pub settlement_ids: Vec<String>,
}

/// A block assembled for a single atomic write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block row.
    pub header: BlockHeader,
    /// Resolved transactions in the order the node listed them.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Block height.
    pub fn height(&self) -> u64 {
        self.header.height
    }

    /// Number of transactions in the block.
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}
