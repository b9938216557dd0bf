//! # JSON-RPC Node Client
//!
//! JSON-RPC 2.0 over HTTP. Methods:
//!
//! | Method | Params | Result |
//! |--------|--------|--------|
//! | `getnodestatus` | `[]` | `{ "ready": bool }` |
//! | `getblockcount` | `[]` | latest height |
//! | `getblockhash` | `[height]` | hash |
//! | `getblock` | `[hash]` | `{ "timestamp", "anchor_height", "tx" }` |
//! | `gettransaction` | `[txid]` | `{ "data", "status", "settlement_ids" }` |

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::config::NodeClientConfig;
use crate::domain::NodeError;
use crate::ports::{NodeClient, RemoteBlock, RemoteTransaction};

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct WireNodeStatus {
    ready: bool,
}

#[derive(Debug, Deserialize)]
struct WireBlock {
    timestamp: i64,
    anchor_height: u64,
    #[serde(default)]
    tx: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireTransaction {
    data: Value,
    status: String,
    #[serde(default)]
    settlement_ids: Option<Vec<String>>,
}

/// Map a JSON-RPC error object to a node error.
fn classify_rpc_error(code: i64, message: &str) -> NodeError {
    if message.to_ascii_lowercase().contains("not found") {
        NodeError::NotFound(message.to_string())
    } else {
        NodeError::Unavailable(format!("rpc error {code}: {message}"))
    }
}

fn decode_response<T: DeserializeOwned>(method: &str, body: Value) -> Result<T, NodeError> {
    let response: RpcResponse = serde_json::from_value(body)
        .map_err(|e| NodeError::Malformed(format!("{method}: invalid envelope: {e}")))?;

    if let Some(err) = response.error {
        return Err(classify_rpc_error(err.code, &err.message));
    }

    let result = response
        .result
        .ok_or_else(|| NodeError::Malformed(format!("{method}: missing result")))?;
    serde_json::from_value(result).map_err(|e| NodeError::Malformed(format!("{method}: {e}")))
}

fn into_remote_block(wire: WireBlock) -> Result<RemoteBlock, NodeError> {
    let timestamp = Utc
        .timestamp_opt(wire.timestamp, 0)
        .single()
        .ok_or_else(|| NodeError::Malformed(format!("invalid timestamp {}", wire.timestamp)))?;
    Ok(RemoteBlock {
        timestamp,
        anchor_height: wire.anchor_height,
        transaction_ids: wire.tx,
    })
}

fn into_remote_transaction(wire: WireTransaction) -> RemoteTransaction {
    RemoteTransaction {
        payload: wire.data,
        status: wire.status,
        settlement_ids: wire.settlement_ids,
    }
}

/// Node client speaking JSON-RPC over HTTP.
pub struct JsonRpcNodeClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcNodeClient {
    /// Build a client for `config.url`.
    pub fn new(config: &NodeClientConfig) -> Result<Self, NodeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| NodeError::Unavailable(format!("http client: {e}")))?;
        Ok(Self {
            http,
            url: config.url.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, NodeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(id, method, "[ix-01] RPC request");

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| NodeError::Unavailable(format!("{method}: {e}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| NodeError::Unavailable(format!("{method}: {e}")))?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) => decode_response(method, body),
            Err(_) if !status.is_success() => {
                Err(NodeError::Unavailable(format!("{method}: HTTP {status}")))
            }
            Err(e) => Err(NodeError::Malformed(format!("{method}: {e}"))),
        }
    }
}

#[async_trait]
impl NodeClient for JsonRpcNodeClient {
    async fn is_ready(&self) -> Result<bool, NodeError> {
        let status: WireNodeStatus = self.call("getnodestatus", json!([])).await?;
        Ok(status.ready)
    }

    async fn chain_height(&self) -> Result<u64, NodeError> {
        self.call("getblockcount", json!([])).await
    }

    async fn block_hash(&self, height: u64) -> Result<String, NodeError> {
        self.call("getblockhash", json!([height])).await
    }

    async fn block(&self, hash: &str) -> Result<RemoteBlock, NodeError> {
        let wire: WireBlock = self.call("getblock", json!([hash])).await?;
        into_remote_block(wire)
    }

    async fn transaction(&self, id: &str) -> Result<RemoteTransaction, NodeError> {
        let wire: WireTransaction = self.call("gettransaction", json!([id])).await?;
        Ok(into_remote_transaction(wire))
    }
}
