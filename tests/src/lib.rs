//! # Chain Indexer Test Suite
//!
//! Cross-crate integration tests.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── sync_flow.rs   # orchestrator + memory store + mock node
//! │   ├── api_flow.rs    # orchestrator status and rows seen through the HTTP API
//! │   └── rpc_flow.rs    # JSON-RPC client against a local fake node
//! └── benches/           # criterion benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ix-tests
//! cargo test -p ix-tests integration::rpc_flow
//! cargo bench -p ix-tests
//! ```

pub mod integration;
