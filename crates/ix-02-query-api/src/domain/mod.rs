//! Query API domain: configuration, errors, response views.

pub mod config;
pub mod error;
pub mod views;

pub use config::ApiConfig;
pub use error::{ApiError, QueryApiError};
pub use views::{BlockView, HealthView, StatsView, StatusView, TransactionView};
