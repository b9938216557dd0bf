//! # Value Objects
//!
//! Height windows, orchestrator state and the published status snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::progress::ProgressTracker;

/// Inclusive range of heights processed as one fan-out unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeightRange {
    /// First height.
    pub from: u64,
    /// Last height (inclusive).
    pub to: u64,
}

impl HeightRange {
    /// Create a range. `from` must not exceed `to`.
    pub const fn new(from: u64, to: u64) -> Self {
        debug_assert!(from <= to);
        Self { from, to }
    }

    /// Number of heights in the range.
    pub const fn len(&self) -> u64 {
        self.to - self.from + 1
    }

    /// Always false; a range holds at least one height.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether `height` lies inside the range.
    pub const fn contains(&self, height: u64) -> bool {
        height >= self.from && height <= self.to
    }

    /// Iterate all heights.
    pub fn heights(&self) -> impl Iterator<Item = u64> {
        self.from..=self.to
    }
}

impl fmt::Display for HeightRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.from, self.to)
    }
}

/// Orchestrator state machine phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// Node not ready; polling readiness.
    AwaitingNode,
    /// Frontier at or below the chain height; running rounds.
    CatchingUp,
    /// Frontier past the chain height; polling for new blocks.
    Synced,
}

/// Process-local sync state.
///
/// Never persisted; rebuilt at startup from `max(height) + 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncState {
    /// Next height to ingest.
    pub frontier: u64,
    /// Latest height reported by the node, once known.
    pub chain_height: Option<u64>,
    /// Current phase.
    pub phase: SyncPhase,
}

impl SyncState {
    /// Seed from the highest persisted height.
    pub fn from_max_height(max_height: Option<u64>) -> Self {
        Self {
            frontier: max_height.map_or(0, |h| h + 1),
            chain_height: None,
            phase: SyncPhase::AwaitingNode,
        }
    }

    /// Heights still to ingest up to the known chain height.
    pub fn remaining_blocks(&self) -> u64 {
        match self.chain_height {
            Some(tip) => (tip + 1).saturating_sub(self.frontier),
            None => 0,
        }
    }
}

/// Read-only snapshot published for the status endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Current phase.
    pub phase: SyncPhase,
    /// Next height to ingest.
    pub frontier: u64,
    /// Latest known chain height.
    pub chain_height: Option<u64>,
    /// When the orchestrator started.
    pub started_at: DateTime<Utc>,
    /// When the last block was processed.
    pub last_block_at: Option<DateTime<Utc>>,
    /// Smoothed per-block processing time.
    pub average_block_millis: Option<f64>,
    /// Share of known heights ingested, 0 to 100.
    pub percent_complete: f64,
    /// Estimated time to reach the chain height.
    pub estimated_remaining_ms: Option<u64>,
    /// Time since start.
    pub elapsed_ms: u64,
}

impl SyncStatus {
    /// Capture the current state.
    pub fn capture(state: &SyncState, tracker: &ProgressTracker) -> Self {
        Self {
            phase: state.phase,
            frontier: state.frontier,
            chain_height: state.chain_height,
            started_at: tracker.started_at(),
            last_block_at: tracker.last_block_at(),
            average_block_millis: tracker.average_block_millis(),
            percent_complete: ProgressTracker::percent_complete(state.frontier, state.chain_height),
            estimated_remaining_ms: tracker
                .estimate(state.remaining_blocks())
                .map(|d| d.as_millis() as u64),
            elapsed_ms: tracker.elapsed().as_millis() as u64,
        }
    }
}
