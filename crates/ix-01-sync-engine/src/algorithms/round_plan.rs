//! # Round Planning
//!
//! Partition the fetch frontier into contiguous windows and compute the
//! frontier after a successful round.

use crate::domain::HeightRange;

/// Windows for one round.
///
/// Splits `[frontier, chain_height]` into `batch_size`-wide windows and keeps
/// the first `concurrent_batches`. The last window may be short. Empty when
/// `frontier > chain_height`.
pub fn plan_round(
    frontier: u64,
    chain_height: u64,
    batch_size: u64,
    concurrent_batches: usize,
) -> Vec<HeightRange> {
    let mut windows = Vec::with_capacity(concurrent_batches);
    if batch_size == 0 {
        return windows;
    }

    let mut from = frontier;
    while from <= chain_height && windows.len() < concurrent_batches {
        let to = from.saturating_add(batch_size - 1).min(chain_height);
        windows.push(HeightRange::new(from, to));
        match to.checked_add(1) {
            Some(next) => from = next,
            None => break,
        }
    }
    windows
}

/// Frontier after a round whose `completed` windows all succeeded.
///
/// Walks windows contiguously from `current`; a gap stops the advance so the
/// frontier never skips a height that was not ingested.
pub fn next_frontier(current: u64, completed: &[HeightRange]) -> u64 {
    let mut sorted: Vec<HeightRange> = completed.to_vec();
    sorted.sort_by_key(|w| w.from);

    let mut frontier = current;
    for window in sorted {
        if window.from > frontier {
            break;
        }
        frontier = frontier.max(window.to.saturating_add(1));
    }
    frontier
}
