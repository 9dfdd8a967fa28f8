//! # Stock Planning
//!
//! Computes which stock movements move a sale from one state to another.
//! The database layer executes the plan, in order, inside one transaction.
//!
//! ## Update Cases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  current (A, 4)  →  target          plan                                │
//! │  ─────────────────────────────────  ─────────────────────────────────   │
//! │  (A, 7)   quantity up by 3          Deduct  A 3  (blame: quantity)     │
//! │  (A, 1)   quantity down by 3        Restore A 3                        │
//! │  (A, 4)   unchanged                 (nothing)                          │
//! │  (B, 3)   medicine changed          Restore A 4, Deduct B 3            │
//! │                                               (blame: medicine)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Restores always come before deductions. A failed deduction aborts the
//! transaction, which also undoes any restore already applied.

use crate::error::StockField;

/// The stock-relevant state of a sale: which medicine, how many units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLine {
    pub medicine_id: String,
    pub quantity: i64,
}

impl SaleLine {
    pub fn new(medicine_id: impl Into<String>, quantity: i64) -> Self {
        SaleLine {
            medicine_id: medicine_id.into(),
            quantity,
        }
    }
}

/// One change to a medicine's stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockMove {
    /// Give units back (always succeeds).
    Restore { medicine_id: String, quantity: i64 },

    /// Take units out, only if at least `quantity` are on hand.
    /// `field` is the request field to blame when they are not.
    Deduct {
        medicine_id: String,
        quantity: i64,
        field: StockField,
    },
}

impl StockMove {
    /// The medicine this move touches.
    pub fn medicine_id(&self) -> &str {
        match self {
            StockMove::Restore { medicine_id, .. } | StockMove::Deduct { medicine_id, .. } => {
                medicine_id
            }
        }
    }

    /// Signed change in stock (negative for deductions).
    pub fn delta(&self) -> i64 {
        match self {
            StockMove::Restore { quantity, .. } => *quantity,
            StockMove::Deduct { quantity, .. } => -quantity,
        }
    }
}

/// Plans the stock movements for editing a sale from `current` to `target`.
///
/// Both lines are expected to carry positive quantities.
pub fn plan_update(current: &SaleLine, target: &SaleLine) -> Vec<StockMove> {
    if current.medicine_id != target.medicine_id {
        return vec![
            StockMove::Restore {
                medicine_id: current.medicine_id.clone(),
                quantity: current.quantity,
            },
            StockMove::Deduct {
                medicine_id: target.medicine_id.clone(),
                quantity: target.quantity,
                field: StockField::Medicine,
            },
        ];
    }

    let delta = target.quantity - current.quantity;
    match delta {
        d if d > 0 => vec![StockMove::Deduct {
            medicine_id: target.medicine_id.clone(),
            quantity: d,
            field: StockField::Quantity,
        }],
        d if d < 0 => vec![StockMove::Restore {
            medicine_id: target.medicine_id.clone(),
            quantity: -d,
        }],
        _ => Vec::new(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_increase_deducts_difference() {
        let plan = plan_update(&SaleLine::new("a", 4), &SaleLine::new("a", 7));
        assert_eq!(
            plan,
            vec![StockMove::Deduct {
                medicine_id: "a".into(),
                quantity: 3,
                field: StockField::Quantity,
            }]
        );
    }

    #[test]
    fn test_quantity_decrease_restores_difference() {
        let plan = plan_update(&SaleLine::new("a", 7), &SaleLine::new("a", 2));
        assert_eq!(
            plan,
            vec![StockMove::Restore {
                medicine_id: "a".into(),
                quantity: 5,
            }]
        );
    }

    #[test]
    fn test_unchanged_line_needs_no_moves() {
        assert!(plan_update(&SaleLine::new("a", 4), &SaleLine::new("a", 4)).is_empty());
    }

    #[test]
    fn test_medicine_change_restores_before_deducting() {
        let plan = plan_update(&SaleLine::new("a", 5), &SaleLine::new("b", 3));
        assert_eq!(
            plan,
            vec![
                StockMove::Restore {
                    medicine_id: "a".into(),
                    quantity: 5,
                },
                StockMove::Deduct {
                    medicine_id: "b".into(),
                    quantity: 3,
                    field: StockField::Medicine,
                },
            ]
        );
    }

    #[test]
    fn test_medicine_change_with_same_quantity_still_moves_stock() {
        let plan = plan_update(&SaleLine::new("a", 2), &SaleLine::new("b", 2));
        let deltas: Vec<(&str, i64)> = plan.iter().map(|m| (m.medicine_id(), m.delta())).collect();
        assert_eq!(deltas, vec![("a", 2), ("b", -2)]);
    }

    /// Deducting on create, applying a chain of updates, then restoring on
    /// delete nets to zero on every medicine touched.
    #[test]
    fn test_moves_reconcile_over_a_sale_lifetime() {
        use std::collections::HashMap;

        let states = [
            SaleLine::new("a", 4),
            SaleLine::new("a", 7),
            SaleLine::new("b", 3),
            SaleLine::new("b", 1),
            SaleLine::new("a", 6),
        ];

        let mut net: HashMap<String, i64> = HashMap::new();
        let first = &states[0];
        let last = &states[states.len() - 1];

        *net.entry(first.medicine_id.clone()).or_default() -= first.quantity;
        for pair in states.windows(2) {
            for m in plan_update(&pair[0], &pair[1]) {
                *net.entry(m.medicine_id().to_string()).or_default() += m.delta();
            }
        }
        *net.entry(last.medicine_id.clone()).or_default() += last.quantity;

        assert!(net.values().all(|v| *v == 0), "unbalanced: {:?}", net);
    }
}
