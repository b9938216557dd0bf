//! # Domain Errors
//!
//! Error taxonomy for the Sync Engine and its ports.

use thiserror::Error;

/// Sync engine error types.
///
/// Everything except `Startup` and `InvalidConfig` is retried by the
/// orchestrator loop.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Node readiness check failed or the transport is down.
    #[error("Node unavailable: {0}")]
    NodeUnavailable(String),

    /// Remote data for a height (or one of its transactions) is missing or malformed.
    #[error("Fetch failed at height {height}: {reason}")]
    Fetch {
        /// Height being processed
        height: u64,
        /// Underlying cause
        reason: String,
    },

    /// Storage rejected the block's transaction; nothing was committed.
    #[error("Persist failed at height {height}: {reason}")]
    Persist {
        /// Height being processed
        height: u64,
        /// Underlying cause
        reason: String,
    },

    /// The initial database connection exhausted its retry budget.
    #[error("Startup failed after {attempts} attempts: {reason}")]
    Startup {
        /// Attempts made
        attempts: u32,
        /// Last error seen
        reason: String,
    },

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SyncError {
    /// Wrap a node error raised while processing `height`.
    pub fn fetch(height: u64, err: impl std::fmt::Display) -> Self {
        Self::Fetch {
            height,
            reason: err.to_string(),
        }
    }

    /// Wrap a storage error raised while writing `height`.
    pub fn persist(height: u64, err: impl std::fmt::Display) -> Self {
        Self::Persist {
            height,
            reason: err.to_string(),
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NodeUnavailable(_) => "node",
            Self::Fetch { .. } => "fetch",
            Self::Persist { .. } => "persist",
            Self::Startup { .. } => "startup",
            Self::InvalidConfig(_) => "config",
        }
    }

    /// Height the error is attached to, if any.
    pub fn height(&self) -> Option<u64> {
        match self {
            Self::Fetch { height, .. } | Self::Persist { height, .. } => Some(*height),
            _ => None,
        }
    }

    /// Whether the process must terminate.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Startup { .. } | Self::InvalidConfig(_))
    }
}

/// Errors raised by a `NodeClient`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NodeError {
    /// Transport failure or node not serving requests.
    #[error("node unavailable: {0}")]
    Unavailable(String),

    /// The node does not know the requested height, hash or id.
    #[error("not found: {0}")]
    NotFound(String),

    /// The node answered with data that could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors raised by a `BlockStore` or `BlockReader`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Connection could not be acquired or was lost.
    #[error("connection error: {0}")]
    Connection(String),

    /// Statement failed (constraint violation, syntax, serialization).
    #[error("query error: {0}")]
    Query(String),

    /// Value could not be converted between domain and column types.
    #[error("conversion error: {0}")]
    Conversion(String),
}
