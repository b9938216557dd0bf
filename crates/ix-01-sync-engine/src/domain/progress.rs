//! # Progress Tracker
//!
//! Smoothed per-block timing and completion estimates. No I/O.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Exponential moving average of per-block processing time.
#[derive(Clone, Debug)]
pub struct ProgressTracker {
    weight: f64,
    average_block_millis: Option<f64>,
    samples: u64,
    started_at: DateTime<Utc>,
    started: Instant,
    last_block_at: Option<DateTime<Utc>>,
}

impl ProgressTracker {
    /// Create a tracker. `weight` is the share given to each new sample.
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            average_block_millis: None,
            samples: 0,
            started_at: Utc::now(),
            started: Instant::now(),
            last_block_at: None,
        }
    }

    /// Record one block's processing time.
    ///
    /// The first sample seeds the average directly.
    pub fn record(&mut self, duration_millis: f64) {
        let next = match self.average_block_millis {
            None => duration_millis,
            Some(avg) => avg + self.weight * (duration_millis - avg),
        };
        self.average_block_millis = Some(next);
        self.samples += 1;
        self.last_block_at = Some(Utc::now());
    }

    /// Record one block's processing time.
    pub fn record_duration(&mut self, duration: Duration) {
        self.record(duration.as_secs_f64() * 1_000.0);
    }

    /// Smoothed per-block time, once at least one block was recorded.
    pub fn average_block_millis(&self) -> Option<f64> {
        self.average_block_millis
    }

    /// Number of recorded samples.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Wall-clock start time.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Wall-clock time of the last recorded block.
    pub fn last_block_at(&self) -> Option<DateTime<Utc>> {
        self.last_block_at
    }

    /// Time since the tracker was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// `remaining_blocks × average`, or `None` before the first sample.
    pub fn estimate(&self, remaining_blocks: u64) -> Option<Duration> {
        let avg = self.average_block_millis?;
        let millis = remaining_blocks as f64 * avg;
        if !millis.is_finite() || millis < 0.0 {
            return None;
        }
        Some(Duration::from_secs_f64(millis / 1_000.0))
    }

    /// Share of heights `0..=chain_height` already ingested, 0 to 100.
    pub fn percent_complete(frontier: u64, chain_height: Option<u64>) -> f64 {
        let Some(tip) = chain_height else {
            return 0.0;
        };
        let total = tip as f64 + 1.0;
        (frontier as f64 / total * 100.0).clamp(0.0, 100.0)
    }
}
