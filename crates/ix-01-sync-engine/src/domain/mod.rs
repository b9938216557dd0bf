//! # Domain Module
//!
//! Core domain types for the Sync Engine.

pub mod entities;
pub mod errors;
pub mod progress;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use progress::*;
pub use value_objects::*;
