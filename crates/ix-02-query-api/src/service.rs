//! Query API service: router construction and server loop.

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use ix_01_sync_engine::{BlockReader, SyncStatus};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::domain::{ApiConfig, QueryApiError};
use crate::handlers;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub reader: Arc<dyn BlockReader>,
    pub status: watch::Receiver<SyncStatus>,
    pub config: Arc<ApiConfig>,
}

/// Read-only HTTP service.
pub struct QueryApiService {
    config: Arc<ApiConfig>,
    state: AppState,
}

impl QueryApiService {
    /// Create the service. Fails on invalid configuration.
    pub fn new(
        config: ApiConfig,
        reader: Arc<dyn BlockReader>,
        status: watch::Receiver<SyncStatus>,
    ) -> Result<Self, QueryApiError> {
        config.validate()?;
        let config = Arc::new(config);
        let state = AppState {
            reader,
            status,
            config: Arc::clone(&config),
        };
        Ok(Self { config, state })
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&self.config));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/blocks", get(handlers::latest_blocks))
            .route("/blocks/:id", get(handlers::block))
            .route("/blocks/:id/transactions", get(handlers::block_transactions))
            .route("/transactions", get(handlers::latest_transactions))
            .route("/transactions/:txid", get(handlers::transaction))
            .route("/stats", get(handlers::stats))
            .route("/status", get(handlers::status))
            .route("/metrics", get(handlers::metrics))
            .layer(middleware)
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until the server fails.
    pub async fn serve(self) -> Result<(), QueryApiError> {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| QueryApiError::Bind(format!("{addr}: {e}")))?;
        self.serve_on(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), QueryApiError> {
        if let Ok(addr) = listener.local_addr() {
            info!(addr = %addr, "[ix-02] Query API listening");
        }
        axum::serve(listener, self.router())
            .await
            .map_err(|e| QueryApiError::Serve(e.to_string()))
    }
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.cors_allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    cors.allow_origin(origins)
}
