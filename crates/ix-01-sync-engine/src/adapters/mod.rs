//! # Adapters
//!
//! Port implementations for real infrastructure and for tests.

pub mod jsonrpc;
pub mod memory;
pub mod postgres;

pub use jsonrpc::JsonRpcNodeClient;
pub use memory::MemoryBlockStore;
pub use postgres::PgBlockStore;
