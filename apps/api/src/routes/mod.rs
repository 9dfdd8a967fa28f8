//! # Routes
//!
//! ```text
//! GET     /health
//!
//! GET     /api/medicines              list (by name)
//! POST    /api/medicines              create                 → 201
//! GET     /api/medicines/count        { "medicine_count": n }
//! GET     /api/medicines/low_stock    stock < 10 (?threshold=)
//! GET     /api/medicines/{id}
//! PUT     /api/medicines/{id}         replace
//! DELETE  /api/medicines/{id}         cascades to its sales  → 204
//!
//! GET     /api/sales                  list (newest first)
//! POST    /api/sales                  SaleLedger::create     → 201
//! GET     /api/sales/total_revenue    ?start_date=&end_date=
//! GET     /api/sales/today_sales      { date, sales, total_revenue, sales_count }
//! GET     /api/sales/{id}
//! PUT     /api/sales/{id}             SaleLedger::update (full)
//! PATCH   /api/sales/{id}             SaleLedger::update (partial)
//! DELETE  /api/sales/{id}             SaleLedger::delete     → 204
//! ```

pub mod health;
pub mod medicines;
pub mod sales;

use axum::routing::get;
use axum::Router;
use hms_core::{Money, ValidationError};
use hms_db::Database;
use serde::Deserialize;

/// Builds the route table. State is attached by [`crate::app`].
pub fn router() -> Router<Database> {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/medicines",
            get(medicines::list_medicines).post(medicines::create_medicine),
        )
        .route("/api/medicines/count", get(medicines::count_medicines))
        .route("/api/medicines/low_stock", get(medicines::low_stock_medicines))
        .route(
            "/api/medicines/{id}",
            get(medicines::get_medicine)
                .put(medicines::update_medicine)
                .delete(medicines::delete_medicine),
        )
        .route("/api/sales", get(sales::list_sales).post(sales::create_sale))
        .route("/api/sales/total_revenue", get(sales::total_revenue))
        .route("/api/sales/today_sales", get(sales::today_sales))
        .route(
            "/api/sales/{id}",
            get(sales::get_sale)
                .put(sales::replace_sale)
                .patch(sales::patch_sale)
                .delete(sales::delete_sale),
        )
}

// =============================================================================
// Decimal Amounts
// =============================================================================

/// A money amount as clients send it: `"12.50"` or `12.5`.
///
/// Numbers go through their decimal text, so no float arithmetic touches
/// the value before it becomes cents.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl AmountInput {
    /// Parses into [`Money`], reporting errors against `field`.
    pub fn to_money(&self, field: &str) -> Result<Money, ValidationError> {
        let parsed = match self {
            AmountInput::Text(s) => Money::parse_decimal(s),
            AmountInput::Number(n) => Money::parse_decimal(&n.to_string()),
        };
        parsed.map_err(|e| e.for_field(field))
    }
}

// =============================================================================
// Test Helpers
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_input_accepts_text_and_numbers() {
        let text: AmountInput = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(text.to_money("price").unwrap().cents(), 1250);

        let number: AmountInput = serde_json::from_str("12.5").unwrap();
        assert_eq!(number.to_money("price").unwrap().cents(), 1250);

        let whole: AmountInput = serde_json::from_str("7").unwrap();
        assert_eq!(whole.to_money("price").unwrap().cents(), 700);
    }

    #[test]
    fn test_amount_input_error_names_field() {
        let bad: AmountInput = serde_json::from_str("\"abc\"").unwrap();
        let err = bad.to_money("total_amount").unwrap_err();
        assert_eq!(err.field(), "total_amount");
    }
}
