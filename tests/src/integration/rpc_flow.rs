//! # RPC Flow
//!
//! `JsonRpcNodeClient` against a local JSON-RPC server that serves the mock
//! chain, then a full sync through the real client.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use ix_01_sync_engine::{MockNodeClient, NodeClient, NodeError};
use serde_json::{json, Value};
use tokio::net::TcpListener;

fn rpc_error(id: &Value, err: NodeError) -> Value {
    let code = match err {
        NodeError::NotFound(_) => -5,
        _ => -32000,
    };
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": err.to_string() } })
}

async fn dispatch(node: &MockNodeClient, method: &str, params: &Value) -> Result<Value, NodeError> {
    let first = params.get(0).cloned().unwrap_or(Value::Null);
    match method {
        "getnodestatus" => Ok(json!({ "ready": node.is_ready().await? })),
        "getblockcount" => Ok(json!(node.chain_height().await?)),
        "getblockhash" => {
            let height = first
                .as_u64()
                .ok_or_else(|| NodeError::Malformed("height param".into()))?;
            Ok(json!(node.block_hash(height).await?))
        }
        "getblock" => {
            let block = node.block(first.as_str().unwrap_or_default()).await?;
            Ok(json!({
                "timestamp": block.timestamp.timestamp(),
                "anchor_height": block.anchor_height,
                "tx": block.transaction_ids,
            }))
        }
        "gettransaction" => {
            let tx = node.transaction(first.as_str().unwrap_or_default()).await?;
            Ok(json!({
                "data": tx.payload,
                "status": tx.status,
                "settlement_ids": tx.settlement_ids,
            }))
        }
        other => Err(NodeError::Unavailable(format!("method {other} unsupported"))),
    }
}

async fn handle(State(node): State<Arc<MockNodeClient>>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request["params"].clone();

    let body = match dispatch(&node, &method, &params).await {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(e) => rpc_error(&id, e),
    };
    Json(body)
}

/// Serve `node` over JSON-RPC on an ephemeral port. Returns the endpoint URL.
pub async fn spawn_fake_node(node: Arc<MockNodeClient>) -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let router = Router::new().route("/", post(handle)).with_state(node);
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ix_01_sync_engine::{
        BlockReader, JsonRpcNodeClient, MemoryBlockStore, NodeClientConfig, SyncConfig,
        SyncOrchestrator, SyncPhase, TxStatus,
    };

    async fn client_for(node: Arc<MockNodeClient>) -> JsonRpcNodeClient {
        let url = spawn_fake_node(node).await.unwrap();
        JsonRpcNodeClient::new(&NodeClientConfig {
            url,
            request_timeout_ms: 5_000,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_client_methods() {
        let node = Arc::new(MockNodeClient::with_chain(5, 2));
        let client = client_for(Arc::clone(&node)).await;

        assert!(client.is_ready().await.unwrap());
        assert_eq!(client.chain_height().await.unwrap(), 4);

        let hash = client.block_hash(3).await.unwrap();
        assert_eq!(hash, MockNodeClient::hash_for(3));

        let block = client.block(&hash).await.unwrap();
        assert_eq!(block, node.block(&hash).await.unwrap());

        let tx = client.transaction("tx-3-1").await.unwrap();
        assert_eq!(tx.status, "success");
        assert_eq!(tx.settlement_ids, Some(vec!["settle-tx-3-1".to_string()]));
    }

    #[tokio::test]
    async fn test_client_error_mapping() {
        let node = Arc::new(MockNodeClient::with_chain(2, 0));
        let client = client_for(Arc::clone(&node)).await;

        assert!(matches!(
            client.block_hash(50).await,
            Err(NodeError::NotFound(_))
        ));

        node.fail_height(1);
        assert!(matches!(
            client.block_hash(1).await,
            Err(NodeError::Unavailable(_))
        ));

        node.set_ready(false);
        assert!(!client.is_ready().await.unwrap());
    }

    #[tokio::test]
    async fn test_sync_over_rpc() {
        let node = Arc::new(MockNodeClient::with_chain(25, 3));
        let client = Arc::new(client_for(node).await);
        let store = Arc::new(MemoryBlockStore::new());
        let config = SyncConfig {
            batch_size: 5,
            concurrent_batches: 3,
            tx_sub_batch_size: 2,
            ..SyncConfig::for_testing()
        };
        let mut orch = SyncOrchestrator::from_store(config, client, Arc::clone(&store))
            .await
            .unwrap();

        let mut steps = 0;
        while orch.step().await.phase != SyncPhase::Synced {
            steps += 1;
            assert!(steps < 10, "sync did not converge");
        }

        assert_eq!(orch.frontier(), 25);
        assert_eq!(store.block_count().await.unwrap(), 25);
        assert_eq!(store.transaction_count(), 75);

        let header = store.block_by_height(24).await.unwrap().unwrap();
        assert_eq!(header.hash, MockNodeClient::hash_for(24));
        assert_eq!(header.timestamp.timestamp(), 1_700_000_000 + 24 * 12);

        let tx = store.transaction_by_id("tx-24-2").await.unwrap().unwrap();
        assert_eq!(tx.status, TxStatus::Pending);
    }
}
