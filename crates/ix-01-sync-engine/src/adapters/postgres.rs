//! # PostgreSQL Block Store
//!
//! `sqlx` implementation of `BlockStore` and `BlockReader`.
//!
//! Schema:
//!
//! ```text
//! blocks(height BIGINT PK, hash TEXT UNIQUE, timestamp TIMESTAMPTZ, anchor_height BIGINT)
//! transactions(txid TEXT PK, block_height BIGINT FK, data JSONB, status SMALLINT, settlement_ids TEXT[])
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::domain::{Block, BlockHeader, StoreError, SyncError, Transaction, TxStatus};
use crate::ports::{BlockReader, BlockStore};

const UPSERT_BLOCK: &str = "\
    INSERT INTO blocks (height, hash, timestamp, anchor_height) \
    VALUES ($1, $2, $3, $4) \
    ON CONFLICT (height) DO UPDATE SET \
        hash = EXCLUDED.hash, \
        timestamp = EXCLUDED.timestamp, \
        anchor_height = EXCLUDED.anchor_height";

const UPSERT_TRANSACTION: &str = "\
    INSERT INTO transactions (txid, block_height, data, status, settlement_ids) \
    VALUES ($1, $2, $3, $4, $5) \
    ON CONFLICT (txid) DO UPDATE SET \
        block_height = EXCLUDED.block_height, \
        data = EXCLUDED.data, \
        status = EXCLUDED.status, \
        settlement_ids = EXCLUDED.settlement_ids";

const BLOCK_COLUMNS: &str = "height, hash, timestamp, anchor_height";
const TRANSACTION_COLUMNS: &str = "txid, block_height, data, status, settlement_ids";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => StoreError::Connection(err.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::Conversion(err.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

fn to_db(value: u64, field: &str) -> Result<i64, StoreError> {
    i64::try_from(value)
        .map_err(|_| StoreError::Conversion(format!("{field} {value} exceeds BIGINT")))
}

fn from_db(value: i64, field: &str) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Conversion(format!("negative {field} {value}")))
}

fn header_from_row(row: &PgRow) -> Result<BlockHeader, StoreError> {
    Ok(BlockHeader {
        height: from_db(row.try_get("height")?, "height")?,
        hash: row.try_get("hash")?,
        timestamp: row.try_get("timestamp")?,
        anchor_height: from_db(row.try_get("anchor_height")?, "anchor_height")?,
    })
}

fn transaction_from_row(row: &PgRow) -> Result<Transaction, StoreError> {
    let code: i16 = row.try_get("status")?;
    let status = TxStatus::from_code(code)
        .ok_or_else(|| StoreError::Conversion(format!("unknown status code {code}")))?;
    let Json(payload): Json<serde_json::Value> = row.try_get("data")?;
    let settlement_ids: Option<Vec<String>> = row.try_get("settlement_ids")?;

    Ok(Transaction {
        id: row.try_get("txid")?,
        block_height: from_db(row.try_get("block_height")?, "block_height")?,
        payload,
        status,
        settlement_ids: settlement_ids.unwrap_or_default(),
    })
}

/// Pool settings derived from `DatabaseConfig`.
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
}

/// Block store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgBlockStore {
    pool: PgPool,
}

impl PgBlockStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, retrying up to `connect_attempts` times.
    ///
    /// Exhausting the budget is fatal (`SyncError::Startup`).
    pub async fn connect_with_retry(config: &DatabaseConfig) -> Result<Self, SyncError> {
        config.validate()?;
        let attempts = config.connect_attempts;
        let delay = Duration::from_millis(config.connect_retry_delay_ms);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match pool_options(config).connect(&config.url).await {
                Ok(pool) => {
                    info!(attempt, "[ix-01] Connected to database");
                    return Ok(Self::new(pool));
                }
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "[ix-01] Database connection failed");
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(SyncError::Startup {
            attempts,
            reason: last_error,
        })
    }

    /// Underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BlockStore for PgBlockStore {
    async fn store(&self, block: &Block) -> Result<(), StoreError> {
        let header = &block.header;
        let height = to_db(header.height, "height")?;

        // Dropping `tx` without commit rolls back.
        let mut tx = self.pool.begin().await?;

        sqlx::query(UPSERT_BLOCK)
            .bind(height)
            .bind(&header.hash)
            .bind(header.timestamp)
            .bind(to_db(header.anchor_height, "anchor_height")?)
            .execute(&mut *tx)
            .await?;

        for transaction in &block.transactions {
            sqlx::query(UPSERT_TRANSACTION)
                .bind(&transaction.id)
                .bind(to_db(transaction.block_height, "block_height")?)
                .bind(Json(&transaction.payload))
                .bind(transaction.status.code())
                .bind(transaction.settlement_ids.as_slice())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn max_height(&self) -> Result<Option<u64>, StoreError> {
        let max: Option<i64> = sqlx::query_scalar("SELECT MAX(height) FROM blocks")
            .fetch_one(&self.pool)
            .await?;
        max.map(|h| from_db(h, "height")).transpose()
    }
}

#[async_trait]
impl BlockReader for PgBlockStore {
    async fn block_by_height(&self, height: u64) -> Result<Option<BlockHeader>, StoreError> {
        let sql = format!("SELECT {BLOCK_COLUMNS} FROM blocks WHERE height = $1");
        let row = sqlx::query(&sql)
            .bind(to_db(height, "height")?)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(header_from_row).transpose()
    }

    async fn block_by_hash(&self, hash: &str) -> Result<Option<BlockHeader>, StoreError> {
        let sql = format!("SELECT {BLOCK_COLUMNS} FROM blocks WHERE hash = $1");
        let row = sqlx::query(&sql)
            .bind(hash)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(header_from_row).transpose()
    }

    async fn latest_blocks(&self, limit: u32) -> Result<Vec<BlockHeader>, StoreError> {
        let sql = format!("SELECT {BLOCK_COLUMNS} FROM blocks ORDER BY height DESC LIMIT $1");
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(header_from_row).collect()
    }

    async fn transaction_by_id(&self, id: &str) -> Result<Option<Transaction>, StoreError> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE txid = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(transaction_from_row).transpose()
    }

    async fn transactions_in_block(&self, height: u64) -> Result<Vec<Transaction>, StoreError> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE block_height = $1 ORDER BY txid"
        );
        let rows = sqlx::query(&sql)
            .bind(to_db(height, "height")?)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(transaction_from_row).collect()
    }

    async fn latest_transactions(&self, limit: u32) -> Result<Vec<Transaction>, StoreError> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             ORDER BY block_height DESC, txid LIMIT $1"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(transaction_from_row).collect()
    }

    async fn count_transactions_since(&self, since: DateTime<Utc>) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions t \
             JOIN blocks b ON b.height = t.block_height \
             WHERE b.timestamp >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        from_db(count, "count")
    }

    async fn block_count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blocks")
            .fetch_one(&self.pool)
            .await?;
        from_db(count, "count")
    }
}
