//! # Error Types
//!
//! Domain-specific error types for hms-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  hms-core errors (this file)                                           │
//! │  ├── CoreError        - Domain errors (stock, quantity, not found)     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  hms-db errors (separate crate)                                        │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── LedgerError      - CoreError | DbError from a ledger operation    │
//! │                                                                         │
//! │  API errors (apps/api)                                                 │
//! │  └── ApiError         - What the client sees: {code, field, message}   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → ApiError → Client    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error that the client can fix names the offending request field,
//! so the API can answer `{"field": "quantity", "message": "..."}`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Stock Field
// =============================================================================

/// The request field blamed for an insufficient-stock rejection.
///
/// ```text
/// create, or update that switches medicine  → Medicine
/// update that raises quantity on same item  → Quantity
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockField {
    Medicine,
    Quantity,
}

impl StockField {
    /// Returns the wire name of the field.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StockField::Medicine => "medicine",
            StockField::Quantity => "quantity",
        }
    }
}

impl fmt::Display for StockField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. Each one is raised
/// before or inside the transaction that would have mutated stock, so a
/// `CoreError` always means "nothing was written".
#[derive(Debug, Error)]
pub enum CoreError {
    /// Sale quantity is zero or negative.
    #[error("Quantity must be greater than zero (got {requested})")]
    InvalidQuantity { requested: i64 },

    /// Not enough units on hand to cover the requested deduction.
    ///
    /// ## User Workflow
    /// ```text
    /// Update sale quantity 7 → 20 (needs 13 more)
    ///      │
    ///      ▼
    /// UPDATE medicines ... WHERE stock >= 13   → 0 rows
    ///      │
    ///      ▼
    /// InsufficientStock { field: Quantity, available: 3, requested: 13 }
    ///      │
    ///      ▼
    /// Client shows: "quantity: Insufficient stock ..." next to the input
    /// ```
    #[error("Insufficient stock for medicine {medicine_id}: available {available}, requested {requested}")]
    InsufficientStock {
        field: StockField,
        medicine_id: String,
        available: i64,
        requested: i64,
    },

    /// Medicine cannot be found.
    #[error("Medicine not found: {0}")]
    MedicineNotFound(String),

    /// Sale cannot be found.
    ///
    /// ## When This Occurs
    /// - Sale ID doesn't exist
    /// - Sale was already deleted (a second delete never credits stock twice)
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the request field the error should be reported against.
    pub fn field(&self) -> Option<&str> {
        match self {
            CoreError::InvalidQuantity { .. } => Some("quantity"),
            CoreError::InsufficientStock { field, .. } => Some(field.as_str()),
            CoreError::MedicineNotFound(_) => Some("medicine"),
            CoreError::SaleNotFound(_) => None,
            CoreError::Validation(e) => Some(e.field()),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID, malformed amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }

    /// Re-targets the error at another field name.
    ///
    /// `Money::parse_decimal` reports against a generic `amount`; callers
    /// rename it to `price` or `total_amount`.
    pub fn for_field(self, name: &str) -> Self {
        let field = name.to_string();
        match self {
            ValidationError::Required { .. } => ValidationError::Required { field },
            ValidationError::TooLong { max, .. } => ValidationError::TooLong { field, max },
            ValidationError::OutOfRange { min, max, .. } => {
                ValidationError::OutOfRange { field, min, max }
            }
            ValidationError::Negative { .. } => ValidationError::Negative { field },
            ValidationError::InvalidFormat { reason, .. } => {
                ValidationError::InvalidFormat { field, reason }
            }
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            field: StockField::Quantity,
            medicine_id: "med-1".to_string(),
            available: 3,
            requested: 17,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for medicine med-1: available 3, requested 17"
        );

        let err = CoreError::InvalidQuantity { requested: 0 };
        assert_eq!(err.to_string(), "Quantity must be greater than zero (got 0)");
    }

    #[test]
    fn test_error_fields() {
        let stock = |field| CoreError::InsufficientStock {
            field,
            medicine_id: "m".to_string(),
            available: 0,
            requested: 1,
        };
        assert_eq!(stock(StockField::Medicine).field(), Some("medicine"));
        assert_eq!(stock(StockField::Quantity).field(), Some("quantity"));
        assert_eq!(CoreError::InvalidQuantity { requested: -1 }.field(), Some("quantity"));
        assert_eq!(CoreError::MedicineNotFound("x".into()).field(), Some("medicine"));
        assert_eq!(CoreError::SaleNotFound("x".into()).field(), None);
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.field(), Some("name"));
    }

    #[test]
    fn test_for_field_renames() {
        let err = ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: "bad".to_string(),
        }
        .for_field("total_amount");
        assert_eq!(err.field(), "total_amount");
        assert_eq!(err.to_string(), "total_amount has invalid format: bad");
    }
}
