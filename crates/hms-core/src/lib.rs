//! # hms-core: Pure Business Logic for the HMS Pharmacy Ledger
//!
//! This crate holds the domain model behind medicine sales: money math,
//! entity types, input validation and the stock-delta planning that the
//! database layer executes transactionally.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        HMS Pharmacy Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    REST API (apps/api)                          │   │
//! │  │    POST /api/sales, PUT /api/sales/{id}, DELETE ...             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ hms-core (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   stock   │  │ validation│  │   │
//! │  │   │ Medicine  │  │   Money   │  │ StockMove │  │   rules   │  │   │
//! │  │   │   Sale    │  │ rounding  │  │ planning  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    hms-db (Database Layer)                      │   │
//! │  │        SQLite queries, migrations, repositories, SaleLedger     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Medicine, Sale, request payloads)
//! - [`money`] - Money type with integer arithmetic and explicit rounding
//! - [`stock`] - Stock movements needed to move a sale between two states
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use hms_core::money::Money;
//!
//! // Unit price of 5.00, four units sold
//! let price = Money::parse_decimal("5.00").unwrap();
//! let total = price.checked_multiply_quantity(4).unwrap();
//!
//! assert_eq!(total.to_decimal_string(), "20.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, StockField, ValidationError};
pub use money::Money;
pub use stock::{plan_update, SaleLine, StockMove};
pub use types::*;
