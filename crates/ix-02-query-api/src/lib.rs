//! # Query API (Subsystem 02)
//!
//! Read-only HTTP access to indexed data and to the sync engine's
//! published status.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /health` | `{"status":"ok"}` |
//! | `GET /blocks?limit=N` | latest blocks, height descending |
//! | `GET /blocks/:id` | block by height (numeric) or hash |
//! | `GET /blocks/:id/transactions` | transactions of one block |
//! | `GET /transactions?limit=N` | latest transactions |
//! | `GET /transactions/:txid` | one transaction |
//! | `GET /stats` | trailing-window transaction counts |
//! | `GET /status` | sync progress snapshot |
//! | `GET /metrics` | Prometheus text format |
//!
//! Handlers never write. Storage is reached through the `BlockReader`
//! port and sync progress through a `watch` receiver, so the API holds no
//! reference to the orchestrator.

pub mod domain;
pub mod handlers;
pub mod service;

pub use domain::{ApiConfig, ApiError, BlockView, QueryApiError, StatsView, StatusView, TransactionView};
pub use service::{AppState, QueryApiService};
