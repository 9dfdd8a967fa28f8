//! # Sale Ledger
//!
//! The only code path that creates, edits or deletes sales. Every call is
//! one SQLite transaction that writes the sale row and moves medicine stock
//! together, or writes nothing.
//!
//! ## Transaction Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(NewSale)                                                        │
//! │    1. UPDATE medicines SET stock = stock - q                            │
//! │         WHERE id = m AND stock >= q RETURNING price_cents               │
//! │    2. INSERT INTO sales ...                                             │
//! │                                                                         │
//! │  update(id, SaleChanges)                                                │
//! │    1. UPDATE sales SET updated_at = now WHERE id = ? RETURNING *        │
//! │    2. plan_update(current, target) → Restore* then Deduct*             │
//! │    3. UPDATE sales SET medicine_id, quantity, total_cents, sale_date   │
//! │                                                                         │
//! │  delete(id)                                                             │
//! │    1. DELETE FROM sales WHERE id = ? RETURNING *                        │
//! │    2. UPDATE medicines SET stock = stock + q                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! The first statement of every transaction is a write, so SQLite hands the
//! transaction its write lock before anything is read. A second writer
//! waits (up to `busy_timeout`) and then runs against the committed result
//! of the first; it never acts on a stale stock value. Deductions re-check
//! `stock >= q` inside the UPDATE itself. A lock wait that times out comes
//! back as [`DbError::Conflict`](crate::error::DbError::Conflict), which is retryable.
//!
//! Returning early with `?` drops the transaction, and dropping an
//! uncommitted sqlx transaction rolls it back.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument, warn};

use crate::error::LedgerResult;
use crate::repository::medicine::fetch_medicine;
use crate::repository::sale::fetch_detail;
use hms_core::validation::{validate_new_sale, validate_sale_changes};
use hms_core::{
    new_id, plan_update, CoreError, Money, NewSale, Sale, SaleChanges,
    SaleDetail, StockField, StockMove, ValidationError,
};

const SALE_COLUMNS: &str =
    "id, medicine_id, quantity, total_cents, sale_date, created_at, updated_at";

/// Stock-reconciling sale writer.
///
/// ## Usage
/// ```rust,ignore
/// let ledger = db.ledger();
///
/// let sale = ledger.create(NewSale::new(&medicine_id, 4)).await?;
/// let sale = ledger.update(&sale.sale.id, SaleChanges::quantity(7)).await?;
/// ledger.delete(&sale.sale.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SaleLedger {
    pool: SqlitePool,
}

impl SaleLedger {
    /// Creates a new SaleLedger.
    pub fn new(pool: SqlitePool) -> Self {
        SaleLedger { pool }
    }

    /// Records a sale and deducts its quantity from the medicine's stock.
    ///
    /// ## Errors
    /// - `InvalidQuantity` - quantity <= 0 (no transaction is opened)
    /// - `MedicineNotFound` - unknown medicine
    /// - `InsufficientStock { field: Medicine }` - stock < quantity
    /// - `Db(Conflict)` - lock wait timed out
    #[instrument(skip(self, input), fields(medicine_id = %input.medicine_id, quantity = input.quantity))]
    pub async fn create(&self, input: NewSale) -> LedgerResult<SaleDetail> {
        validate_new_sale(&input)?;

        let mut tx = self.pool.begin().await?;

        let price_cents = deduct_stock(
            &mut *tx,
            &input.medicine_id,
            input.quantity,
            StockField::Medicine,
        )
        .await?;

        let total = match input.total {
            Some(total) => total,
            None => line_total(price_cents, input.quantity)?,
        };

        let now = Utc::now();
        let sale = Sale {
            id: new_id(),
            medicine_id: input.medicine_id,
            quantity: input.quantity,
            total_cents: total.cents(),
            sale_date: input.sale_date.unwrap_or_else(|| now.date_naive()),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, medicine_id, quantity, total_cents,
                sale_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.medicine_id)
        .bind(sale.quantity)
        .bind(sale.total_cents)
        .bind(sale.sale_date)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        let detail = load_detail(&mut *tx, &sale.id).await?;
        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            total_cents = sale.total_cents,
            stock = detail.medicine_detail.stock,
            "Sale recorded"
        );
        Ok(detail)
    }

    /// Edits a sale and moves stock by the difference.
    ///
    /// Fields left `None` in `changes` keep their current value. Unless an
    /// explicit total is given, the total is recomputed from the target
    /// medicine's price and the target quantity.
    ///
    /// ## Errors
    /// - `InvalidQuantity` - new quantity <= 0 (no transaction is opened)
    /// - `SaleNotFound` - unknown sale
    /// - `MedicineNotFound` - new medicine doesn't exist
    /// - `InsufficientStock { field: Quantity }` - same medicine, not enough for the increase
    /// - `InsufficientStock { field: Medicine }` - new medicine can't cover the quantity
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: &str, changes: SaleChanges) -> LedgerResult<SaleDetail> {
        validate_sale_changes(&changes)?;

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        // Claim the row first so the write lock is ours before we read it.
        let current = sqlx::query_as::<_, Sale>(&format!(
            "UPDATE sales SET updated_at = ?2 WHERE id = ?1 RETURNING {SALE_COLUMNS}"
        ))
        .bind(id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::SaleNotFound(id.to_string()))?;

        let target = changes.target_line(&current);
        let moves = plan_update(&current.line(), &target);
        debug!(
            from = %current.medicine_id,
            to = %target.medicine_id,
            moves = moves.len(),
            "Planned stock moves"
        );

        let mut target_price = None;
        for stock_move in &moves {
            if let Some(price) = apply_move(&mut *tx, stock_move).await? {
                target_price = Some(price);
            }
        }

        let total = match changes.total {
            Some(total) => total,
            None => {
                let price_cents = match target_price {
                    Some(price) => price,
                    None => fetch_medicine(&mut *tx, &target.medicine_id)
                        .await?
                        .ok_or_else(|| CoreError::MedicineNotFound(target.medicine_id.clone()))?
                        .price_cents,
                };
                line_total(price_cents, target.quantity)?
            }
        };

        sqlx::query(
            r#"
            UPDATE sales SET
                medicine_id = ?2,
                quantity = ?3,
                total_cents = ?4,
                sale_date = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&target.medicine_id)
        .bind(target.quantity)
        .bind(total.cents())
        .bind(changes.sale_date.unwrap_or(current.sale_date))
        .execute(&mut *tx)
        .await?;

        let detail = load_detail(&mut *tx, id).await?;
        tx.commit().await?;

        info!(
            sale_id = %id,
            quantity = target.quantity,
            total_cents = total.cents(),
            "Sale updated"
        );
        Ok(detail)
    }

    /// Deletes a sale and gives its quantity back to the medicine.
    ///
    /// Deleting the same sale twice fails with `SaleNotFound` the second
    /// time; stock is credited exactly once.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> LedgerResult<Sale> {
        let mut tx = self.pool.begin().await?;

        let sale = sqlx::query_as::<_, Sale>(&format!(
            "DELETE FROM sales WHERE id = ?1 RETURNING {SALE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::SaleNotFound(id.to_string()))?;

        restore_stock(&mut *tx, &sale.medicine_id, sale.quantity).await?;
        tx.commit().await?;

        info!(
            sale_id = %id,
            medicine_id = %sale.medicine_id,
            restored = sale.quantity,
            "Sale deleted"
        );
        Ok(sale)
    }
}

// =============================================================================
// Stock Statements
// =============================================================================

/// Applies one stock move inside the open transaction.
///
/// Returns the medicine's unit price for deductions, `None` for restores.
async fn apply_move(
    conn: &mut SqliteConnection,
    stock_move: &StockMove,
) -> LedgerResult<Option<i64>> {
    match stock_move {
        StockMove::Deduct {
            medicine_id,
            quantity,
            field,
        } => deduct_stock(conn, medicine_id, *quantity, *field)
            .await
            .map(Some),
        StockMove::Restore {
            medicine_id,
            quantity,
        } => restore_stock(conn, medicine_id, *quantity).await.map(|_| None),
    }
}

/// Takes `quantity` units if at least that many are on hand.
async fn deduct_stock(
    conn: &mut SqliteConnection,
    medicine_id: &str,
    quantity: i64,
    field: StockField,
) -> LedgerResult<i64> {
    let price_cents: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE medicines
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        RETURNING price_cents
        "#,
    )
    .bind(medicine_id)
    .bind(quantity)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(price_cents) = price_cents {
        debug!(medicine_id, quantity, "Stock deducted");
        return Ok(price_cents);
    }

    // Nothing matched: either the medicine is gone or stock is short.
    let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM medicines WHERE id = ?1")
        .bind(medicine_id)
        .fetch_optional(&mut *conn)
        .await?;

    match available {
        None => Err(CoreError::MedicineNotFound(medicine_id.to_string()).into()),
        Some(available) => {
            warn!(
                medicine_id,
                available,
                requested = quantity,
                field = %field,
                "Insufficient stock"
            );
            Err(CoreError::InsufficientStock {
                field,
                medicine_id: medicine_id.to_string(),
                available,
                requested: quantity,
            }
            .into())
        }
    }
}

/// Gives `quantity` units back.
///
/// Refuses to push stock past `i64::MAX`; SQLite would otherwise abort the
/// statement with an integer overflow.
async fn restore_stock(
    conn: &mut SqliteConnection,
    medicine_id: &str,
    quantity: i64,
) -> LedgerResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE medicines
        SET stock = stock + ?2, updated_at = ?3
        WHERE id = ?1 AND stock <= ?4 - ?2
        "#,
    )
    .bind(medicine_id)
    .bind(quantity)
    .bind(Utc::now())
    .bind(i64::MAX)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM medicines WHERE id = ?1")
            .bind(medicine_id)
            .fetch_optional(&mut *conn)
            .await?;

        if exists.is_none() {
            return Err(CoreError::MedicineNotFound(medicine_id.to_string()).into());
        }

        warn!(medicine_id, quantity, "Restoring stock would overflow");
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        }
        .into());
    }

    debug!(medicine_id, quantity, "Stock restored");
    Ok(())
}

async fn load_detail(conn: &mut SqliteConnection, id: &str) -> LedgerResult<SaleDetail> {
    fetch_detail(conn, id)
        .await?
        .ok_or_else(|| CoreError::SaleNotFound(id.to_string()).into())
}

/// `price × quantity`, exact in cents.
fn line_total(price_cents: i64, quantity: i64) -> Result<Money, ValidationError> {
    Money::from_cents(price_cents)
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| ValidationError::OutOfRange {
            field: "total_amount".to_string(),
            min: 0,
            max: i64::MAX,
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use hms_core::{Medicine, NewMedicine};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn medicine(db: &Database, name: &str, price_cents: i64, stock: i64) -> Medicine {
        db.medicines()
            .insert(&NewMedicine {
                name: name.to_string(),
                category: "General".to_string(),
                description: String::new(),
                price_cents,
                stock,
            })
            .await
            .unwrap()
    }

    async fn stock(db: &Database, id: &str) -> i64 {
        db.medicines().get_by_id(id).await.unwrap().unwrap().stock
    }

    fn insufficient(err: &LedgerError) -> Option<(StockField, i64, i64)> {
        match err {
            LedgerError::Core(CoreError::InsufficientStock {
                field,
                available,
                requested,
                ..
            }) => Some((*field, *available, *requested)),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_create_update_walkthrough() {
        let db = db().await;
        let ledger = db.ledger();
        let med = medicine(&db, "Amoxicillin", 500, 10).await;

        let sale = ledger.create(NewSale::new(&med.id, 4)).await.unwrap();
        assert_eq!(sale.sale.total_cents, 2000);
        assert_eq!(sale.medicine_detail.stock, 6);
        assert_eq!(stock(&db, &med.id).await, 6);

        let sale = ledger
            .update(&sale.sale.id, SaleChanges::quantity(7))
            .await
            .unwrap();
        assert_eq!(sale.sale.total_cents, 3500);
        assert_eq!(stock(&db, &med.id).await, 3);

        let err = ledger
            .update(&sale.sale.id, SaleChanges::quantity(20))
            .await
            .unwrap_err();
        assert_eq!(insufficient(&err), Some((StockField::Quantity, 3, 13)));
        assert_eq!(stock(&db, &med.id).await, 3);

        let unchanged = db.sales().get_by_id(&sale.sale.id).await.unwrap().unwrap();
        assert_eq!(unchanged.quantity, 7);
        assert_eq!(unchanged.total_cents, 3500);
        assert_eq!(unchanged.updated_at, sale.sale.updated_at);
    }

    #[tokio::test]
    async fn test_quantity_decrease_restores_stock() {
        let db = db().await;
        let ledger = db.ledger();
        let med = medicine(&db, "Ibuprofen", 120, 10).await;

        let sale = ledger.create(NewSale::new(&med.id, 8)).await.unwrap();
        let sale = ledger
            .update(&sale.sale.id, SaleChanges::quantity(3))
            .await
            .unwrap();

        assert_eq!(stock(&db, &med.id).await, 7);
        assert_eq!(sale.sale.total_cents, 360);
    }

    #[tokio::test]
    async fn test_medicine_switch_moves_stock_between_medicines() {
        let db = db().await;
        let ledger = db.ledger();
        let a = medicine(&db, "A", 100, 5).await;
        let b = medicine(&db, "B", 300, 5).await;

        let sale = ledger.create(NewSale::new(&a.id, 5)).await.unwrap();
        assert_eq!(stock(&db, &a.id).await, 0);

        let sale = ledger
            .update(&sale.sale.id, SaleChanges::move_to(&b.id, 3))
            .await
            .unwrap();

        assert_eq!(stock(&db, &a.id).await, 5);
        assert_eq!(stock(&db, &b.id).await, 2);
        assert_eq!(sale.sale.medicine_id, b.id);
        assert_eq!(sale.sale.total_cents, 900);
        assert_eq!(sale.medicine_detail.name, "B");
    }

    #[tokio::test]
    async fn test_failed_medicine_switch_rolls_back_restore() {
        let db = db().await;
        let ledger = db.ledger();
        let a = medicine(&db, "A", 100, 5).await;
        let b = medicine(&db, "B", 100, 1).await;

        let sale = ledger.create(NewSale::new(&a.id, 5)).await.unwrap();

        let err = ledger
            .update(&sale.sale.id, SaleChanges::move_to(&b.id, 3))
            .await
            .unwrap_err();
        assert_eq!(insufficient(&err), Some((StockField::Medicine, 1, 3)));

        assert_eq!(stock(&db, &a.id).await, 0);
        assert_eq!(stock(&db, &b.id).await, 1);
        let unchanged = db.sales().get_by_id(&sale.sale.id).await.unwrap().unwrap();
        assert_eq!(unchanged.medicine_id, a.id);
    }

    #[tokio::test]
    async fn test_switch_to_unknown_medicine() {
        let db = db().await;
        let ledger = db.ledger();
        let a = medicine(&db, "A", 100, 5).await;
        let sale = ledger.create(NewSale::new(&a.id, 2)).await.unwrap();

        let err = ledger
            .update(&sale.sale.id, SaleChanges::move_to("nope", 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::MedicineNotFound(ref id)) if id == "nope"
        ));
        assert_eq!(stock(&db, &a.id).await, 3);
    }

    #[tokio::test]
    async fn test_create_rejections_leave_stock_untouched() {
        let db = db().await;
        let ledger = db.ledger();
        let med = medicine(&db, "Zinc", 50, 3).await;

        let err = ledger.create(NewSale::new(&med.id, 0)).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InvalidQuantity { requested: 0 })
        ));

        let err = ledger.create(NewSale::new(&med.id, 4)).await.unwrap_err();
        assert_eq!(insufficient(&err), Some((StockField::Medicine, 3, 4)));

        let err = ledger.create(NewSale::new("missing", 1)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::MedicineNotFound(_))));

        assert_eq!(stock(&db, &med.id).await, 3);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_can_take_exactly_all_stock() {
        let db = db().await;
        let med = medicine(&db, "Iron", 75, 4).await;

        db.ledger().create(NewSale::new(&med.id, 4)).await.unwrap();
        assert_eq!(stock(&db, &med.id).await, 0);
    }

    #[tokio::test]
    async fn test_explicit_total_and_date_are_kept() {
        let db = db().await;
        let ledger = db.ledger();
        let med = medicine(&db, "Cetirizine", 500, 10).await;
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();

        let sale = ledger
            .create(
                NewSale::new(&med.id, 2)
                    .with_total(Money::from_cents(899))
                    .on(date),
            )
            .await
            .unwrap();
        assert_eq!(sale.sale.total_cents, 899);
        assert_eq!(sale.sale.sale_date, date);

        let changes = SaleChanges {
            quantity: Some(3),
            total: Some(Money::from_cents(1234)),
            ..Default::default()
        };
        let sale = ledger.update(&sale.sale.id, changes).await.unwrap();
        assert_eq!(sale.sale.total_cents, 1234);
        assert_eq!(sale.sale.sale_date, date);
        assert_eq!(stock(&db, &med.id).await, 7);
    }

    #[tokio::test]
    async fn test_update_without_changes_recomputes_total_from_current_price() {
        let db = db().await;
        let ledger = db.ledger();
        let med = medicine(&db, "Loratadine", 200, 10).await;
        let sale = ledger.create(NewSale::new(&med.id, 2)).await.unwrap();

        db.medicines()
            .update(
                &med.id,
                &NewMedicine {
                    name: med.name.clone(),
                    category: med.category.clone(),
                    description: String::new(),
                    price_cents: 250,
                    stock: 8,
                },
            )
            .await
            .unwrap();

        let sale = ledger
            .update(&sale.sale.id, SaleChanges::default())
            .await
            .unwrap();
        assert_eq!(sale.sale.total_cents, 500);
        assert_eq!(stock(&db, &med.id).await, 8);
    }

    #[tokio::test]
    async fn test_delete_restores_once() {
        let db = db().await;
        let ledger = db.ledger();
        let med = medicine(&db, "Aspirin", 100, 10).await;

        let sale = ledger.create(NewSale::new(&med.id, 6)).await.unwrap();
        assert_eq!(stock(&db, &med.id).await, 4);

        let deleted = ledger.delete(&sale.sale.id).await.unwrap();
        assert_eq!(deleted.quantity, 6);
        assert_eq!(stock(&db, &med.id).await, 10);

        let err = ledger.delete(&sale.sale.id).await.unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::SaleNotFound(_))));
        assert_eq!(stock(&db, &med.id).await, 10);
    }

    #[tokio::test]
    async fn test_update_unknown_sale() {
        let db = db().await;
        let err = db
            .ledger()
            .update("missing", SaleChanges::quantity(1))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::SaleNotFound(_))));
    }

    #[tokio::test]
    async fn test_total_overflow_is_rejected() {
        let db = db().await;
        let med = medicine(&db, "Gold", i64::MAX / 2, 10).await;

        let err = db.ledger().create(NewSale::new(&med.id, 3)).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(stock(&db, &med.id).await, 10);
    }

    #[tokio::test]
    async fn test_deleting_medicine_cascades_sales() {
        let db = db().await;
        let med = medicine(&db, "Naproxen", 100, 10).await;
        db.ledger().create(NewSale::new(&med.id, 1)).await.unwrap();

        db.medicines().delete(&med.id).await.unwrap();
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_restore_past_i64_max_is_rejected() {
        let db = db().await;
        let ledger = db.ledger();
        let med = medicine(&db, "Cetirizine", 100, 10).await;
        let sale = ledger.create(NewSale::new(&med.id, 5)).await.unwrap();

        sqlx::query("UPDATE medicines SET stock = ?2 WHERE id = ?1")
            .bind(&med.id)
            .bind(i64::MAX - 2)
            .execute(db.pool())
            .await
            .unwrap();

        let err = ledger.delete(&sale.sale.id).await.unwrap_err();
        match &err {
            LedgerError::Core(CoreError::Validation(ValidationError::OutOfRange {
                field, ..
            })) => assert_eq!(field, "stock"),
            other => panic!("expected a stock range error, got {:?}", other),
        }
        assert!(!err.is_retryable());

        // Rolled back: the sale and the stock are untouched.
        assert_eq!(stock(&db, &med.id).await, i64::MAX - 2);
        assert!(db.sales().get_by_id(&sale.sale.id).await.unwrap().is_some());

        let err = ledger
            .update(&sale.sale.id, SaleChanges::quantity(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }
}
