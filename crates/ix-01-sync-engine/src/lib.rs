//! # IX-01 Sync Engine
//!
//! Continuous ingestion of blocks and transactions from a node's RPC interface
//! into a relational store.
//!
//! **Subsystem ID:** 01
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Keep the persisted chain complete, ordered and idempotent:
//! - Discover the chain height from the node
//! - Fan out bounded-concurrency windows of block fetches
//! - Resolve per-block transaction detail in sub-batches
//! - Write each block with its transactions in one database transaction
//! - Advance the frontier only after a fully successful round
//!
//! ## State Machine
//!
//! ```text
//! AwaitingNode ──ready──→ CatchingUp ──frontier > tip──→ Synced
//!      ↑                      ↑                            │
//!      └──── not ready ───────┴────── new blocks ──────────┘
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! ix-01-sync-engine/
//! ├── domain/          # Block, Transaction, SyncState, ProgressTracker, errors
//! ├── algorithms/      # Round planning, frontier advance, status normalization
//! ├── ports/           # BlockReader (inbound) + NodeClient, BlockStore (outbound)
//! ├── application/     # TransactionResolver, BlockProcessor, SyncOrchestrator
//! ├── adapters/        # JSON-RPC node client, PostgreSQL and in-memory stores
//! └── config.rs        # SyncConfig, DatabaseConfig, NodeClientConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{JsonRpcNodeClient, MemoryBlockStore, PgBlockStore};
pub use algorithms::{next_frontier, normalize_settlement_ids, plan_round};
pub use application::{
    BlockProcessor, ProcessedBlock, StepOutcome, SyncOrchestrator, TransactionResolver,
};
pub use config::{DatabaseConfig, NodeClientConfig, SyncConfig};
pub use domain::{
    Block, BlockHeader, HeightRange, NodeError, ProgressTracker, StoreError, SyncError,
    SyncPhase, SyncState, SyncStatus, Transaction, TxStatus,
};
pub use ports::{BlockReader, BlockStore, MockNodeClient, NodeClient, RemoteBlock, RemoteTransaction};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
