//! # Application Layer
//!
//! Services wiring the ports together: transaction resolution, per-block
//! processing and the sync orchestrator loop.

pub mod block_processor;
pub mod orchestrator;
pub mod tx_resolver;

pub use block_processor::{BlockProcessor, ProcessedBlock};
pub use orchestrator::{StepOutcome, SyncOrchestrator};
pub use tx_resolver::TransactionResolver;
