//! # API Flow
//!
//! The query API reading what the sync engine wrote:
//!
//! 1. `/status` follows the orchestrator's published snapshots
//! 2. Ingested rows are visible through `/blocks` and `/transactions`
//! 3. `/metrics` exposes sync counters after ingestion

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use ix_01_sync_engine::{
        BlockReader, MemoryBlockStore, MockNodeClient, SyncConfig, SyncOrchestrator,
    };
    use ix_02_query_api::{ApiConfig, QueryApiService};
    use serde_json::Value;
    use tower::ServiceExt;

    struct Harness {
        node: Arc<MockNodeClient>,
        orchestrator: SyncOrchestrator<MockNodeClient, MemoryBlockStore>,
        router: Router,
    }

    fn harness(blocks: u64, txs: usize) -> Harness {
        let node = Arc::new(MockNodeClient::with_chain(blocks, txs));
        let store = Arc::new(MemoryBlockStore::new());
        let config = SyncConfig {
            batch_size: 10,
            concurrent_batches: 2,
            ..SyncConfig::for_testing()
        };
        let orchestrator = SyncOrchestrator::new(config, Arc::clone(&node), Arc::clone(&store), 0);

        let reader: Arc<dyn BlockReader> = store;
        let service =
            QueryApiService::new(ApiConfig::default(), reader, orchestrator.subscribe()).unwrap();
        Harness {
            node,
            orchestrator,
            router: service.router(),
        }
    }

    async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_status_tracks_orchestrator() {
        let mut h = harness(40, 0);

        let (_, body) = get(&h.router, "/status").await;
        assert_eq!(body["phase"], "awaiting_node");
        assert_eq!(body["frontier"], 0);
        assert!(body["chain_height"].is_null());
        assert_eq!(body["percent_complete"], 0.0);

        h.orchestrator.step().await;
        let (_, body) = get(&h.router, "/status").await;
        assert_eq!(body["phase"], "catching_up");
        assert_eq!(body["frontier"], 20);
        assert_eq!(body["chain_height"], 39);
        assert_eq!(body["percent_complete"], 50.0);
        assert!(body["average_block_time_ms"].is_number());
        assert!(body["estimated_time_to_completion_ms"].is_number());

        h.orchestrator.step().await;
        let (_, body) = get(&h.router, "/status").await;
        assert_eq!(body["phase"], "synced");
        assert_eq!(body["percent_complete"], 100.0);
    }

    #[tokio::test]
    async fn test_status_reports_awaiting_node() {
        let mut h = harness(5, 0);
        h.node.set_ready(false);
        h.orchestrator.step().await;

        let (_, body) = get(&h.router, "/status").await;
        assert_eq!(body["phase"], "awaiting_node");
    }

    #[tokio::test]
    async fn test_ingested_rows_visible() {
        let mut h = harness(12, 2);
        while h.orchestrator.frontier() < 12 {
            h.orchestrator.step().await;
        }

        let (_, body) = get(&h.router, "/blocks?limit=3").await;
        let heights: Vec<u64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["height"].as_u64().unwrap())
            .collect();
        assert_eq!(heights, vec![11, 10, 9]);

        let hash = MockNodeClient::hash_for(7);
        let (status, body) = get(&h.router, &format!("/blocks/{hash}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["height"], 7);
        assert_eq!(body["anchor_height"], 800_000);
        assert_eq!(body["timestamp"], "2023-11-14T22:14:44Z");

        let (_, body) = get(&h.router, "/blocks/7/transactions").await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["status"], "pending");
        assert_eq!(body[1]["settlement_ids"][0], "settle-tx-7-1");

        let (status, body) = get(&h.router, "/transactions/tx-3-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["height"], 3);

        let (_, body) = get(&h.router, "/stats").await;
        assert_eq!(body["total_blocks"], 12);
        // Mock block times are far in the past.
        assert_eq!(body["tx_last_week"], 0);
    }

    #[tokio::test]
    async fn test_metrics_after_ingestion() {
        indexer_telemetry::register_metrics().unwrap();
        let mut h = harness(10, 1);
        h.orchestrator.step().await;

        let response = h
            .router
            .clone()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(text.contains("ix_sync_blocks_ingested_total"));
        assert!(text.contains("ix_sync_block_duration_seconds_bucket"));
    }
}
