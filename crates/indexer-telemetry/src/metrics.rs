//! Prometheus metrics for the indexer.
//!
//! All metrics follow the naming convention: `ix_<subsystem>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, Opts, Registry,
    TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SYNC ENGINE METRICS (Subsystem 1)
    // =========================================================================

    /// Total blocks written to storage
    pub static ref BLOCKS_INGESTED: Counter = Counter::new(
        "ix_sync_blocks_ingested_total",
        "Total number of blocks written to storage"
    ).expect("metric creation failed");

    /// Total transactions written to storage
    pub static ref TRANSACTIONS_INGESTED: Counter = Counter::new(
        "ix_sync_transactions_ingested_total",
        "Total number of transactions written to storage"
    ).expect("metric creation failed");

    /// Next height to ingest
    pub static ref SYNC_FRONTIER: Gauge = Gauge::new(
        "ix_sync_frontier",
        "Next block height not yet durably ingested"
    ).expect("metric creation failed");

    /// Latest height reported by the node
    pub static ref CHAIN_HEIGHT: Gauge = Gauge::new(
        "ix_sync_chain_height",
        "Latest chain height reported by the node"
    ).expect("metric creation failed");

    /// Failed rounds by error kind
    pub static ref ROUND_FAILURES: CounterVec = CounterVec::new(
        Opts::new("ix_sync_round_failures_total", "Failed sync rounds by error kind"),
        &["kind"]  // kind: node/fetch/persist
    ).expect("metric creation failed");

    /// Per-block processing duration
    pub static ref BLOCK_DURATION: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "ix_sync_block_duration_seconds",
            "Time spent fetching, resolving and storing one block"
        ).buckets(exponential_buckets(0.001, 2.0, 15).expect("valid buckets"))
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(BLOCKS_INGESTED.clone()),
        Box::new(TRANSACTIONS_INGESTED.clone()),
        Box::new(SYNC_FRONTIER.clone()),
        Box::new(CHAIN_HEIGHT.clone()),
        Box::new(ROUND_FAILURES.clone()),
        Box::new(BLOCK_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Render all registered metrics in the Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
