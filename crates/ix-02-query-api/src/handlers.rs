//! Route handlers.
//!
//! Each handler is a thin pass-through over the `BlockReader` port.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::domain::{ApiError, BlockView, HealthView, StatsView, StatusView, TransactionView};
use crate::service::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// `?limit=N`
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<u32>,
}

/// Path segment naming a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockId {
    Height(u64),
    Hash(String),
}

impl BlockId {
    /// Numeric segments are heights, anything else a hash.
    pub fn parse(segment: &str) -> Self {
        match segment.parse::<u64>() {
            Ok(height) => Self::Height(height),
            Err(_) => Self::Hash(segment.to_string()),
        }
    }
}

pub async fn health() -> Json<HealthView> {
    Json(HealthView::ok())
}

pub async fn latest_blocks(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<BlockView>>, ApiError> {
    let limit = state.config.page_size(page.limit);
    let blocks = state.reader.latest_blocks(limit).await?;
    Ok(Json(blocks.into_iter().map(BlockView::from).collect()))
}

async fn find_block(state: &AppState, id: &str) -> Result<BlockView, ApiError> {
    let header = match BlockId::parse(id) {
        BlockId::Height(height) => state.reader.block_by_height(height).await?,
        BlockId::Hash(hash) => state.reader.block_by_hash(&hash).await?,
    };
    header
        .map(BlockView::from)
        .ok_or_else(|| ApiError::NotFound(format!("block {id} not found")))
}

pub async fn block(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlockView>, ApiError> {
    find_block(&state, &id).await.map(Json)
}

pub async fn block_transactions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TransactionView>>, ApiError> {
    let block = find_block(&state, &id).await?;
    let txs = state.reader.transactions_in_block(block.height).await?;
    Ok(Json(txs.into_iter().map(TransactionView::from).collect()))
}

pub async fn latest_transactions(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<TransactionView>>, ApiError> {
    let limit = state.config.page_size(page.limit);
    let txs = state.reader.latest_transactions(limit).await?;
    Ok(Json(txs.into_iter().map(TransactionView::from).collect()))
}

pub async fn transaction(
    State(state): State<AppState>,
    Path(txid): Path<String>,
) -> Result<Json<TransactionView>, ApiError> {
    state
        .reader
        .transaction_by_id(&txid)
        .await?
        .map(|tx| Json(TransactionView::from(tx)))
        .ok_or_else(|| ApiError::NotFound(format!("transaction {txid} not found")))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsView>, ApiError> {
    let now = Utc::now();
    let reader = &state.reader;

    let tx_last_hour = reader.count_transactions_since(now - Duration::hours(1)).await?;
    let tx_last_day = reader.count_transactions_since(now - Duration::days(1)).await?;
    let tx_last_week = reader.count_transactions_since(now - Duration::weeks(1)).await?;
    let total_blocks = reader.block_count().await?;

    Ok(Json(StatsView {
        tx_last_hour,
        tx_last_day,
        tx_last_week,
        tps_last_hour: tx_last_hour as f64 / 3600.0,
        total_blocks,
    }))
}

pub async fn status(State(state): State<AppState>) -> Json<StatusView> {
    let view = StatusView::from(&*state.status.borrow());
    Json(view)
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        indexer_telemetry::gather_metrics(),
    )
}
