//! Runtime configuration: defaults plus `IX_*` environment overrides.

use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, Result};
use indexer_telemetry::TelemetryConfig;
use ix_01_sync_engine::{DatabaseConfig, NodeClientConfig, SyncConfig};
use ix_02_query_api::ApiConfig;
use tracing::{info, warn};

/// Storage backend selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL through `DatabaseConfig`.
    Postgres,
    /// Process memory; nothing survives a restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend {other}")),
        }
    }
}

/// Complete indexer configuration.
#[derive(Clone, Debug)]
pub struct IndexerConfig {
    pub telemetry: TelemetryConfig,
    pub storage: StorageBackend,
    pub database: DatabaseConfig,
    pub node: NodeClientConfig,
    pub sync: SyncConfig,
    pub api: ApiConfig,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            telemetry: TelemetryConfig::default(),
            storage: StorageBackend::Postgres,
            database: DatabaseConfig::default(),
            node: NodeClientConfig::default(),
            sync: SyncConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl IndexerConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.sync.validate().context("sync configuration")?;
        self.api.validate().context("api configuration")?;
        if self.storage == StorageBackend::Postgres {
            self.database.validate().context("database configuration")?;
        }
        if self.node.url.is_empty() {
            anyhow::bail!("node url is empty");
        }
        Ok(())
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> IndexerConfig {
    let mut config = IndexerConfig {
        telemetry: TelemetryConfig::from_env(),
        ..Default::default()
    };
    apply_env(&mut config, |key| std::env::var(key).ok());
    config
}

fn parse_into<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, target: &mut T)
where
    T: FromStr,
    T::Err: Display,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(e) => warn!(key, value = %raw, error = %e, "Ignoring invalid environment override"),
        }
    }
}

/// Apply `IX_*` overrides read through `lookup`. Invalid values are ignored.
pub fn apply_env(config: &mut IndexerConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup("IX_DATABASE_URL") {
        config.database.url = url;
        info!("Loaded database url from environment");
    }
    if let Some(url) = lookup("IX_NODE_URL") {
        config.node.url = url;
    }
    parse_into(&lookup, "IX_STORAGE", &mut config.storage);
    parse_into(&lookup, "IX_API_PORT", &mut config.api.port);
    parse_into(&lookup, "IX_BATCH_SIZE", &mut config.sync.batch_size);
    parse_into(&lookup, "IX_CONCURRENT_BATCHES", &mut config.sync.concurrent_batches);
    parse_into(&lookup, "IX_TX_BATCH_SIZE", &mut config.sync.tx_sub_batch_size);
    parse_into(&lookup, "IX_DB_MAX_CONNECTIONS", &mut config.database.max_connections);
    parse_into(&lookup, "IX_DB_MIN_CONNECTIONS", &mut config.database.min_connections);
}
