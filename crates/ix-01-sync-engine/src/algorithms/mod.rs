//! # Algorithms
//!
//! Pure functions used by the orchestrator and resolver.

pub mod normalize;
pub mod round_plan;

pub use normalize::*;
pub use round_plan::*;
