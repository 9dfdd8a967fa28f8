//! # Validation Module
//!
//! Input validation for medicines and sales.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (apps/api)                                      │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Decimal parsing of price / total_amount                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: Business rule validation                        │
//! │  ├── quantity > 0                                                      │
//! │  └── names, prices, stock levels                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (quantity > 0)                          │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use hms_core::validation::{validate_medicine_name, validate_sale_quantity};
//!
//! validate_medicine_name("Amoxicillin 500mg").unwrap();
//! validate_sale_quantity(5).unwrap();
//! assert!(validate_sale_quantity(0).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{NewMedicine, NewSale, SaleChanges};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a medicine name or category.
pub const MAX_NAME_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a medicine name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
///
/// ## Example
/// ```rust
/// use hms_core::validation::validate_medicine_name;
///
/// assert!(validate_medicine_name("Paracetamol").is_ok());
/// assert!(validate_medicine_name("").is_err());
/// ```
pub fn validate_medicine_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, MAX_NAME_LEN)
}

/// Validates a medicine category. Same rules as the name.
pub fn validate_category(category: &str) -> ValidationResult<()> {
    validate_text("category", category, MAX_NAME_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - No upper bound; stock is the only limit
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POST /api/sales  { "quantity": 0, ... }                                │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_sale_quantity(0) ← THIS FUNCTION                             │
/// │       │                                                                 │
/// │       ├── qty <= 0? → InvalidQuantity (field: quantity)                │
/// │       │               no transaction is opened                         │
/// │       │                                                                 │
/// │       └── OK → SaleLedger deducts stock                                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_sale_quantity(qty: i64) -> CoreResult<()> {
    if qty <= 0 {
        return Err(CoreError::InvalidQuantity { requested: qty });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free samples)
///
/// ## Example
/// ```rust
/// use hms_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    non_negative("price", cents)
}

/// Validates an explicit sale total in cents.
pub fn validate_total_cents(cents: i64) -> ValidationResult<()> {
    non_negative("total_amount", cents)
}

/// Validates a stock level.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    non_negative("stock", stock)
}

fn non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Payload Validators
// =============================================================================

/// Validates every field of a medicine create/replace payload.
pub fn validate_new_medicine(medicine: &NewMedicine) -> ValidationResult<()> {
    validate_medicine_name(&medicine.name)?;
    validate_category(&medicine.category)?;
    validate_price_cents(medicine.price_cents)?;
    validate_stock(medicine.stock)?;
    Ok(())
}

/// Validates a new sale before any stock is touched.
///
/// The medicine reference is not checked here; a missing medicine is
/// reported by the ledger when the deduction matches no row.
pub fn validate_new_sale(sale: &NewSale) -> CoreResult<()> {
    validate_sale_quantity(sale.quantity)?;
    if let Some(total) = sale.total {
        validate_total_cents(total.cents())?;
    }
    Ok(())
}

/// Validates the supplied fields of a sale edit.
pub fn validate_sale_changes(changes: &SaleChanges) -> CoreResult<()> {
    if let Some(qty) = changes.quantity {
        validate_sale_quantity(qty)?;
    }
    if let Some(total) = changes.total {
        validate_total_cents(total.cents())?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
