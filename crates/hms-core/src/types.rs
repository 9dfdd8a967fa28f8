//! # Domain Types
//!
//! Core domain types used throughout the pharmacy ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────┐                        │
//! │  │    Medicine     │ 1    * │      Sale       │                        │
//! │  │  ─────────────  │◄───────│  ─────────────  │                        │
//! │  │  id (UUID)      │        │  id (UUID)      │                        │
//! │  │  name, category │        │  medicine_id    │                        │
//! │  │  price_cents    │        │  quantity > 0   │                        │
//! │  │  stock >= 0     │        │  total_cents    │                        │
//! │  └─────────────────┘        │  sale_date      │                        │
//! │                             └─────────────────┘                        │
//! │                                                                         │
//! │  Requests:  NewMedicine   NewSale   SaleChanges                        │
//! │  Responses: SaleDetail (sale + resolved medicine)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::stock::SaleLine;

/// Generates a new entity ID (UUID v4).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Medicine
// =============================================================================

/// A medicine stocked by the pharmacy.
///
/// `stock` is only ever changed by the sale ledger's conditional updates or
/// by an explicit medicine edit; it is never cached in application memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Medicine {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Category (e.g. "Antibiotic", "Analgesic").
    pub category: String,

    /// Free-text description.
    pub description: String,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Medicine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Fields supplied when creating or replacing a medicine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMedicine {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    pub stock: i64,
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale of one medicine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,

    /// The medicine sold.
    pub medicine_id: String,

    /// Units sold. Always positive.
    pub quantity: i64,

    /// Sale total in cents (unit price × quantity unless set explicitly).
    pub total_cents: i64,

    /// Calendar date of the sale.
    #[ts(as = "String")]
    pub sale_date: NaiveDate,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the stock-relevant part of the sale.
    pub fn line(&self) -> SaleLine {
        SaleLine::new(self.medicine_id.clone(), self.quantity)
    }
}

/// A sale together with the medicine it references.
///
/// Serialises flat, with the medicine nested under `medicine_detail`:
/// ```json
/// { "id": "...", "medicine_id": "...", "quantity": 4, "total_cents": 2000,
///   "sale_date": "2026-10-17", ..., "medicine_detail": { "name": "..." } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub medicine_detail: Medicine,
}

// =============================================================================
// Sale Requests
// =============================================================================

/// A sale to record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub medicine_id: String,
    pub quantity: i64,

    /// Explicit total. Computed from the medicine price when absent.
    #[serde(default)]
    pub total: Option<Money>,

    /// Sale date. Defaults to today (UTC) when absent.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub sale_date: Option<NaiveDate>,
}

impl NewSale {
    /// Creates a sale request with a computed total and today's date.
    pub fn new(medicine_id: impl Into<String>, quantity: i64) -> Self {
        NewSale {
            medicine_id: medicine_id.into(),
            quantity,
            total: None,
            sale_date: None,
        }
    }

    /// Sets an explicit total.
    pub fn with_total(mut self, total: Money) -> Self {
        self.total = Some(total);
        self
    }

    /// Sets the sale date.
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.sale_date = Some(date);
        self
    }
}

/// A partial edit of an existing sale. `None` keeps the current value.
///
/// When `total` is `None` the stored total is recomputed from the
/// (possibly new) medicine's price and the (possibly new) quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleChanges {
    #[serde(default)]
    pub medicine_id: Option<String>,

    #[serde(default)]
    pub quantity: Option<i64>,

    #[serde(default)]
    pub total: Option<Money>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub sale_date: Option<NaiveDate>,
}

impl SaleChanges {
    /// Changes only the quantity.
    pub fn quantity(quantity: i64) -> Self {
        SaleChanges {
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    /// Moves the sale to another medicine with a new quantity.
    pub fn move_to(medicine_id: impl Into<String>, quantity: i64) -> Self {
        SaleChanges {
            medicine_id: Some(medicine_id.into()),
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    /// Returns the sale line the edit leads to, starting from `current`.
    pub fn target_line(&self, current: &Sale) -> SaleLine {
        SaleLine::new(
            self.medicine_id
                .clone()
                .unwrap_or_else(|| current.medicine_id.clone()),
            self.quantity.unwrap_or(current.quantity),
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(medicine_id: &str, quantity: i64) -> Sale {
        let now = Utc::now();
        Sale {
            id: new_id(),
            medicine_id: medicine_id.to_string(),
            quantity,
            total_cents: 500 * quantity,
            sale_date: now.date_naive(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_new_ids_are_unique_uuids() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_target_line_keeps_unchanged_fields() {
        let current = sale("med-a", 4);

        let line = SaleChanges::default().target_line(&current);
        assert_eq!(line, SaleLine::new("med-a", 4));

        let line = SaleChanges::quantity(7).target_line(&current);
        assert_eq!(line, SaleLine::new("med-a", 7));

        let line = SaleChanges::move_to("med-b", 3).target_line(&current);
        assert_eq!(line, SaleLine::new("med-b", 3));
    }

    #[test]
    fn test_sale_detail_serializes_flat() {
        let s = sale("med-a", 2);
        let now = s.created_at;
        let detail = SaleDetail {
            sale: s.clone(),
            medicine_detail: Medicine {
                id: "med-a".to_string(),
                name: "Amoxicillin".to_string(),
                category: "Antibiotic".to_string(),
                description: String::new(),
                price_cents: 500,
                stock: 8,
                created_at: now,
                updated_at: now,
            },
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], s.id.as_str());
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["medicine_detail"]["name"], "Amoxicillin");
    }

    #[test]
    fn test_new_sale_defaults_from_json() {
        let parsed: NewSale =
            serde_json::from_str(r#"{"medicine_id":"m","quantity":3}"#).unwrap();
        assert_eq!(parsed, NewSale::new("m", 3));
    }
}
