//! # Sync Orchestrator
//!
//! The process's main control loop. Each step checks node readiness, reads
//! the chain height, runs one round of concurrent windows and advances the
//! frontier only when every window in the round succeeded.
//!
//! ## Cadence
//!
//! | Situation | Next step after |
//! |-----------|-----------------|
//! | Node not ready / unreachable | `node_retry_delay` (5s) |
//! | Round failed | `round_retry_delay` (2s) |
//! | Still behind the chain height | `catch_up_delay` (100ms) |
//! | Frontier past the chain height | `synced_poll_delay` (1s) |

use futures::future::{join_all, try_join_all};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use indexer_telemetry::metrics::{CHAIN_HEIGHT, ROUND_FAILURES, SYNC_FRONTIER};

use super::block_processor::BlockProcessor;
use crate::algorithms::{next_frontier, plan_round};
use crate::config::SyncConfig;
use crate::domain::{HeightRange, ProgressTracker, SyncError, SyncPhase, SyncState, SyncStatus};
use crate::ports::{BlockStore, NodeClient};

/// What one step did and how long to wait before the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    /// Phase after the step.
    pub phase: SyncPhase,
    /// Sleep before the next step.
    pub delay: Duration,
}

/// Sync Orchestrator - exclusive owner of the sync state.
pub struct SyncOrchestrator<N: NodeClient, S: BlockStore> {
    config: SyncConfig,
    node: Arc<N>,
    processor: BlockProcessor<N, S>,
    state: SyncState,
    tracker: Mutex<ProgressTracker>,
    status_tx: watch::Sender<SyncStatus>,
}

impl<N: NodeClient, S: BlockStore> SyncOrchestrator<N, S> {
    /// Create an orchestrator starting at `frontier`.
    pub fn new(config: SyncConfig, node: Arc<N>, store: Arc<S>, frontier: u64) -> Self {
        let processor = BlockProcessor::new(Arc::clone(&node), store, config.tx_sub_batch_size);
        let tracker = ProgressTracker::new(config.ema_weight);
        let state = SyncState {
            frontier,
            chain_height: None,
            phase: SyncPhase::AwaitingNode,
        };
        let (status_tx, _) = watch::channel(SyncStatus::capture(&state, &tracker));
        SYNC_FRONTIER.set(frontier as f64);

        Self {
            config,
            node,
            processor,
            state,
            tracker: Mutex::new(tracker),
            status_tx,
        }
    }

    /// Create an orchestrator seeded from the store's highest height.
    pub async fn from_store(
        config: SyncConfig,
        node: Arc<N>,
        store: Arc<S>,
    ) -> Result<Self, SyncError> {
        config.validate()?;
        let max_height = store.max_height().await.map_err(|e| SyncError::Startup {
            attempts: 1,
            reason: format!("reading max height: {e}"),
        })?;
        let state = SyncState::from_max_height(max_height);
        info!(
            frontier = state.frontier,
            "[ix-01] Sync state initialized from storage"
        );
        Ok(Self::new(config, node, store, state.frontier))
    }

    /// Subscribe to status snapshots published after every step.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    /// Next height to ingest.
    pub fn frontier(&self) -> u64 {
        self.state.frontier
    }

    /// Current phase.
    pub fn phase(&self) -> SyncPhase {
        self.state.phase
    }

    /// Current status snapshot.
    pub fn status(&self) -> SyncStatus {
        SyncStatus::capture(&self.state, &self.tracker.lock())
    }

    /// Run forever.
    pub async fn run(&mut self) {
        info!(frontier = self.state.frontier, "[ix-01] Sync orchestrator started");
        loop {
            let outcome = self.step().await;
            tokio::time::sleep(outcome.delay).await;
        }
    }

    /// Run exactly one state machine iteration.
    pub async fn step(&mut self) -> StepOutcome {
        let outcome = match self.node.is_ready().await {
            Ok(true) => self.sync_once().await,
            Ok(false) => {
                info!("[ix-01] Node not ready, waiting");
                self.awaiting_node()
            }
            Err(e) => {
                warn!(error = %e, "[ix-01] Node readiness check failed");
                ROUND_FAILURES.with_label_values(&["node"]).inc();
                self.awaiting_node()
            }
        };

        self.state.phase = outcome.phase;
        self.status_tx.send_replace(self.status());
        outcome
    }

    fn awaiting_node(&self) -> StepOutcome {
        StepOutcome {
            phase: SyncPhase::AwaitingNode,
            delay: self.config.node_retry_delay(),
        }
    }

    async fn sync_once(&mut self) -> StepOutcome {
        let chain_height = match self.node.chain_height().await {
            Ok(height) => height,
            Err(e) => {
                warn!(error = %e, "[ix-01] Failed to read chain height");
                ROUND_FAILURES.with_label_values(&["node"]).inc();
                return self.awaiting_node();
            }
        };
        self.state.chain_height = Some(chain_height);
        CHAIN_HEIGHT.set(chain_height as f64);

        if self.state.frontier > chain_height {
            return StepOutcome {
                phase: SyncPhase::Synced,
                delay: self.config.synced_poll_delay(),
            };
        }

        let windows = plan_round(
            self.state.frontier,
            chain_height,
            self.config.batch_size,
            self.config.concurrent_batches,
        );

        match self.run_round(&windows).await {
            Ok(()) => {
                let previous = self.state.frontier;
                self.state.frontier = next_frontier(previous, &windows);
                SYNC_FRONTIER.set(self.state.frontier as f64);
                info!(
                    from = previous,
                    frontier = self.state.frontier,
                    chain_height,
                    windows = windows.len(),
                    "[ix-01] Round complete"
                );

                if self.state.frontier > chain_height {
                    StepOutcome {
                        phase: SyncPhase::Synced,
                        delay: self.config.synced_poll_delay(),
                    }
                } else {
                    StepOutcome {
                        phase: SyncPhase::CatchingUp,
                        delay: self.config.catch_up_delay(),
                    }
                }
            }
            Err(e) => {
                ROUND_FAILURES.with_label_values(&[e.kind()]).inc();
                error!(
                    frontier = self.state.frontier,
                    error = %e,
                    "[ix-01] Round failed, retrying from same frontier"
                );
                StepOutcome {
                    phase: SyncPhase::CatchingUp,
                    delay: self.config.round_retry_delay(),
                }
            }
        }
    }

    /// Launch every window and wait for all of them.
    async fn run_round(&self, windows: &[HeightRange]) -> Result<(), SyncError> {
        let results = join_all(windows.iter().map(|w| self.run_window(*w))).await;

        let mut first_error = None;
        for (window, result) in windows.iter().zip(results) {
            if let Err(e) = result {
                error!(
                    from = window.from,
                    to = window.to,
                    height = ?e.height(),
                    error = %e,
                    "[ix-01] Window failed"
                );
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Process every height of one window concurrently.
    async fn run_window(&self, window: HeightRange) -> Result<(), SyncError> {
        try_join_all(window.heights().map(|height| self.process_height(height))).await?;
        Ok(())
    }

    async fn process_height(&self, height: u64) -> Result<(), SyncError> {
        let processed = self.processor.process(height).await?;
        self.tracker.lock().record_duration(processed.duration);
        Ok(())
    }
}
