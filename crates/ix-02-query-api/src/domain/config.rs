//! Query API configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use super::error::QueryApiError;

/// HTTP server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Page size when `limit` is absent.
    pub default_page_size: u32,
    /// Upper bound applied to every `limit`.
    pub max_page_size: u32,
    /// Allowed CORS origins ("*" for all).
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            default_page_size: 10,
            max_page_size: 100,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

impl ApiConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), QueryApiError> {
        if self.max_page_size == 0 {
            return Err(QueryApiError::Config("max_page_size cannot be 0".into()));
        }
        if self.default_page_size > self.max_page_size {
            return Err(QueryApiError::Config(format!(
                "default_page_size ({}) exceeds max_page_size ({})",
                self.default_page_size, self.max_page_size
            )));
        }
        self.socket_addr().map(|_| ())
    }

    /// Parsed bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, QueryApiError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| QueryApiError::Config(format!("invalid bind address: {e}")))
    }

    /// Effective page size for a requested `limit`.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }
}
