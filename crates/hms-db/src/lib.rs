//! # hms-db: Database Layer for the HMS Pharmacy Ledger
//!
//! This crate provides database access for medicines and sales.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        HMS Pharmacy Data Flow                           │
//! │                                                                         │
//! │  HTTP handler (POST /api/sales)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     hms-db (THIS CRATE)                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ MedicineRepo  │    │  (embedded)  │  │   │
//! │  │   │               │    │ SaleRepo (RO) │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───┤               │    │              │  │   │
//! │  │   │               │    ├───────────────┤    └──────────────┘  │   │
//! │  │   │               │◄───│  SaleLedger   │ create/update/delete │   │
//! │  │   └───────────────┘    │ (stock moves) │ one transaction each │   │
//! │  │                        └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and ledger error types
//! - [`repository`] - Medicine CRUD and sale reads
//! - [`ledger`] - Stock-reconciling sale writes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hms_core::NewSale;
//! use hms_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("hms.db")).await?;
//!
//! let sale = db.ledger().create(NewSale::new(&medicine_id, 4)).await?;
//! let revenue = db.sales().total_revenue(None, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, LedgerError, LedgerResult};
pub use ledger::SaleLedger;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::medicine::MedicineRepository;
pub use repository::sale::SaleRepository;
