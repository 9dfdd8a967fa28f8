//! # HMS API
//!
//! REST server for the pharmacy ledger.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        HMS API Server                                   │
//! │                                                                         │
//! │  Client ───► HTTP (8000) ───► routes ───► hms-db ───► SQLite           │
//! │                                 │            │                          │
//! │                                 │            ├── MedicineRepository     │
//! │                                 │            ├── SaleRepository (read)  │
//! │                                 │            └── SaleLedger (writes)    │
//! │                                 ▼                                       │
//! │                              ApiError ───► { code, field, message,     │
//! │                                              retryable }                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers share one [`Database`] through axum state; it is a cheap clone
//! around the connection pool.

pub mod config;
pub mod error;
pub mod routes;

use axum::Router;
use hms_db::Database;
use tracing_subscriber::EnvFilter;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};

/// Builds the application router over an open database.
pub fn app(db: Database) -> Router {
    routes::router().with_state(db)
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
