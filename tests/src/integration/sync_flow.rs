//! # Sync Flow
//!
//! Orchestrator, block processor and memory store working together against
//! the mock node:
//!
//! 1. Catch-up from empty storage to the chain tip
//! 2. Restart from storage without re-ingesting
//! 3. Recovery after node outage, fetch failure and write failure
//! 4. Transaction status transitions on re-ingestion

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ix_01_sync_engine::{
        BlockReader, BlockStore, MemoryBlockStore, MockNodeClient, RemoteTransaction,
        SyncConfig, SyncOrchestrator, SyncPhase, TxStatus,
    };

    type Orchestrator = SyncOrchestrator<MockNodeClient, MemoryBlockStore>;

    fn config(batch_size: u64, concurrent_batches: usize) -> SyncConfig {
        SyncConfig {
            batch_size,
            concurrent_batches,
            ..SyncConfig::for_testing()
        }
    }

    async fn orchestrator(
        config: SyncConfig,
        node: &Arc<MockNodeClient>,
        store: &Arc<MemoryBlockStore>,
    ) -> Orchestrator {
        SyncOrchestrator::from_store(config, Arc::clone(node), Arc::clone(store))
            .await
            .unwrap()
    }

    async fn step_until_synced(orchestrator: &mut Orchestrator, max_steps: usize) -> usize {
        for step in 1..=max_steps {
            if orchestrator.step().await.phase == SyncPhase::Synced {
                return step;
            }
        }
        panic!("not synced after {max_steps} steps");
    }

    #[tokio::test]
    async fn test_catch_up_from_empty_store() {
        let node = Arc::new(MockNodeClient::with_chain(250, 3));
        let store = Arc::new(MemoryBlockStore::new());
        let mut orch = orchestrator(config(50, 2), &node, &store).await;

        // 250 heights, 100 per round.
        let steps = step_until_synced(&mut orch, 10).await;
        assert_eq!(steps, 3);
        assert_eq!(orch.frontier(), 250);
        assert_eq!(store.block_count().await.unwrap(), 250);
        assert_eq!(store.transaction_count(), 750);
        assert_eq!(store.max_height().await.unwrap(), Some(249));

        let status = orch.status();
        assert_eq!(status.percent_complete, 100.0);
        assert_eq!(status.estimated_remaining_ms, Some(0));
    }

    #[tokio::test]
    async fn test_restart_resumes_after_max_height() {
        let node = Arc::new(MockNodeClient::with_chain(40, 1));
        let store = Arc::new(MemoryBlockStore::new());
        let mut first = orchestrator(config(10, 2), &node, &store).await;
        first.step().await;
        assert_eq!(first.frontier(), 20);
        drop(first);

        let mut second = orchestrator(config(10, 2), &node, &store).await;
        assert_eq!(second.frontier(), 20);
        step_until_synced(&mut second, 5).await;

        assert_eq!(node.hash_requests(0), 1);
        assert_eq!(node.hash_requests(39), 1);
        assert_eq!(store.block_count().await.unwrap(), 40);
    }

    #[tokio::test]
    async fn test_node_outage_then_recovery() {
        let node = Arc::new(MockNodeClient::with_chain(30, 0));
        let store = Arc::new(MemoryBlockStore::new());
        let mut orch = orchestrator(config(10, 3), &node, &store).await;

        node.set_ready(false);
        for _ in 0..3 {
            let outcome = orch.step().await;
            assert_eq!(outcome.phase, SyncPhase::AwaitingNode);
        }
        assert_eq!(store.block_count().await.unwrap(), 0);

        node.set_ready(true);
        assert_eq!(orch.step().await.phase, SyncPhase::Synced);
        assert_eq!(orch.frontier(), 30);
    }

    #[tokio::test]
    async fn test_transaction_failure_holds_frontier() {
        let node = Arc::new(MockNodeClient::with_chain(20, 4));
        let store = Arc::new(MemoryBlockStore::new());
        let mut orch = orchestrator(config(10, 2), &node, &store).await;

        node.fail_transaction(&MockNodeClient::txid_for(13, 2));
        let outcome = orch.step().await;
        assert_eq!(outcome.phase, SyncPhase::CatchingUp);
        assert_eq!(orch.frontier(), 0);
        assert!(store.block_by_height(13).await.unwrap().is_none());

        node.heal();
        step_until_synced(&mut orch, 3).await;
        assert_eq!(orch.frontier(), 20);
        assert_eq!(store.transactions_in_block(13).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_write_failure_rolls_back_and_retries() {
        let node = Arc::new(MockNodeClient::with_chain(10, 2));
        let store = Arc::new(MemoryBlockStore::new());
        let mut orch = orchestrator(config(10, 1), &node, &store).await;

        store.fail_next_stores(1);
        orch.step().await;
        assert_eq!(orch.frontier(), 0);

        orch.step().await;
        assert_eq!(orch.frontier(), 10);
        assert_eq!(store.block_count().await.unwrap(), 10);
        assert_eq!(store.transaction_count(), 20);
    }

    #[tokio::test]
    async fn test_new_blocks_after_synced() {
        let node = Arc::new(MockNodeClient::with_chain(5, 1));
        let store = Arc::new(MemoryBlockStore::new());
        let mut orch = orchestrator(config(10, 1), &node, &store).await;
        step_until_synced(&mut orch, 2).await;

        for h in 5..8 {
            node.push_block(h, 1);
        }
        assert_eq!(orch.step().await.phase, SyncPhase::Synced);
        assert_eq!(orch.frontier(), 8);
        assert_eq!(store.max_height().await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn test_status_and_settlements_normalized() {
        let node = Arc::new(MockNodeClient::with_chain(3, 2));
        node.set_transaction(
            &MockNodeClient::txid_for(2, 0),
            RemoteTransaction {
                payload: serde_json::json!({ "custom": true }),
                status: "Processing".to_string(),
                settlement_ids: Some(vec![]),
            },
        );
        let store = Arc::new(MemoryBlockStore::new());
        let mut orch = orchestrator(config(10, 1), &node, &store).await;
        step_until_synced(&mut orch, 2).await;

        let pending = store.transaction_by_id("tx-1-0").await.unwrap().unwrap();
        assert_eq!(pending.status, TxStatus::Pending);
        assert!(pending.settlement_ids.is_empty());

        let settled = store.transaction_by_id("tx-1-1").await.unwrap().unwrap();
        assert_eq!(settled.status, TxStatus::Finalized);
        assert_eq!(settled.settlement_ids, vec!["settle-tx-1-1"]);

        // Status matching is exact.
        let custom = store.transaction_by_id("tx-2-0").await.unwrap().unwrap();
        assert_eq!(custom.status, TxStatus::Finalized);
        assert!(custom.settlement_ids.is_empty());
    }

    #[tokio::test]
    async fn test_reingest_updates_finality() {
        let node = Arc::new(MockNodeClient::with_chain(2, 1));
        let store = Arc::new(MemoryBlockStore::new());
        let mut orch = orchestrator(config(10, 1), &node, &store).await;
        step_until_synced(&mut orch, 2).await;
        assert_eq!(
            store.transaction_by_id("tx-1-0").await.unwrap().unwrap().status,
            TxStatus::Pending
        );

        // A restart below the stored tip re-ingests through the upsert path.
        node.set_transaction(
            "tx-1-0",
            RemoteTransaction {
                payload: serde_json::json!({ "id": "tx-1-0" }),
                status: "success".to_string(),
                settlement_ids: Some(vec!["settle-late".to_string()]),
            },
        );
        let mut replay = SyncOrchestrator::new(
            config(10, 1),
            Arc::clone(&node),
            Arc::clone(&store),
            0,
        );
        step_until_synced(&mut replay, 2).await;

        let tx = store.transaction_by_id("tx-1-0").await.unwrap().unwrap();
        assert_eq!(tx.status, TxStatus::Finalized);
        assert_eq!(tx.settlement_ids, vec!["settle-late"]);
        assert_eq!(store.transaction_count(), 2);
        assert_eq!(store.block_count().await.unwrap(), 2);
    }
}
