//! # Sale Repository
//!
//! Read-only queries over recorded sales.
//!
//! Sales are written exclusively by [`SaleLedger`](crate::ledger::SaleLedger)
//! so that every row change is paired with its stock movement.
//!
//! ## Query Surface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get_by_id(id)            → Sale                                        │
//! │  get_detail(id)           → SaleDetail (sale ⋈ medicine)                │
//! │  list()                   → newest first                                │
//! │  list_for_medicine(id)    → newest first, one medicine                  │
//! │  list_for_date(day)       → newest first, one sale_date                 │
//! │  count()                                                                │
//! │  total_revenue(from, to)  → Σ total_cents, optional inclusive dates     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use hms_core::{Medicine, Money, Sale, SaleDetail};

const SALE_COLUMNS: &str =
    "id, medicine_id, quantity, total_cents, sale_date, created_at, updated_at";

/// Flat row of `sales JOIN medicines`.
#[derive(Debug, sqlx::FromRow)]
struct SaleDetailRow {
    id: String,
    medicine_id: String,
    quantity: i64,
    total_cents: i64,
    sale_date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    medicine_name: String,
    medicine_category: String,
    medicine_description: String,
    medicine_price_cents: i64,
    medicine_stock: i64,
    medicine_created_at: DateTime<Utc>,
    medicine_updated_at: DateTime<Utc>,
}

impl From<SaleDetailRow> for SaleDetail {
    fn from(row: SaleDetailRow) -> Self {
        SaleDetail {
            medicine_detail: Medicine {
                id: row.medicine_id.clone(),
                name: row.medicine_name,
                category: row.medicine_category,
                description: row.medicine_description,
                price_cents: row.medicine_price_cents,
                stock: row.medicine_stock,
                created_at: row.medicine_created_at,
                updated_at: row.medicine_updated_at,
            },
            sale: Sale {
                id: row.id,
                medicine_id: row.medicine_id,
                quantity: row.quantity,
                total_cents: row.total_cents,
                sale_date: row.sale_date,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const DETAIL_SELECT: &str = r#"
    SELECT
        s.id, s.medicine_id, s.quantity, s.total_cents,
        s.sale_date, s.created_at, s.updated_at,
        m.name        AS medicine_name,
        m.category    AS medicine_category,
        m.description AS medicine_description,
        m.price_cents AS medicine_price_cents,
        m.stock       AS medicine_stock,
        m.created_at  AS medicine_created_at,
        m.updated_at  AS medicine_updated_at
    FROM sales s
    INNER JOIN medicines m ON m.id = s.medicine_id
"#;

/// Loads a sale with its medicine through any executor.
///
/// The ledger calls this inside its transaction so the returned stock
/// reflects the uncommitted movement.
pub(crate) async fn fetch_detail<'e, E>(executor: E, id: &str) -> DbResult<Option<SaleDetail>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, SaleDetailRow>(&format!("{DETAIL_SELECT} WHERE s.id = ?1"))
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(SaleDetail::from))
}

/// Repository for sale read operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a sale together with the medicine it references.
    pub async fn get_detail(&self, id: &str) -> DbResult<Option<SaleDetail>> {
        fetch_detail(&self.pool, id).await
    }

    /// Lists all sales, newest first.
    pub async fn list(&self) -> DbResult<Vec<SaleDetail>> {
        let rows = sqlx::query_as::<_, SaleDetailRow>(&format!(
            "{DETAIL_SELECT} ORDER BY s.created_at DESC, s.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed sales");
        Ok(rows.into_iter().map(SaleDetail::from).collect())
    }

    /// Lists the sales of one medicine, newest first.
    pub async fn list_for_medicine(&self, medicine_id: &str) -> DbResult<Vec<SaleDetail>> {
        let rows = sqlx::query_as::<_, SaleDetailRow>(&format!(
            "{DETAIL_SELECT} WHERE s.medicine_id = ?1 ORDER BY s.created_at DESC, s.id"
        ))
        .bind(medicine_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SaleDetail::from).collect())
    }

    /// Lists the sales recorded on one `sale_date`, newest first.
    pub async fn list_for_date(&self, date: NaiveDate) -> DbResult<Vec<SaleDetail>> {
        let rows = sqlx::query_as::<_, SaleDetailRow>(&format!(
            "{DETAIL_SELECT} WHERE s.sale_date = ?1 ORDER BY s.created_at DESC, s.id"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        debug!(%date, count = rows.len(), "Listed sales for date");
        Ok(rows.into_iter().map(SaleDetail::from).collect())
    }

    /// Counts all sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Sums sale totals, optionally restricted to an inclusive date range.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // Revenue for October 2026
    /// let oct = repo.total_revenue(
    ///     NaiveDate::from_ymd_opt(2026, 10, 1),
    ///     NaiveDate::from_ymd_opt(2026, 10, 31),
    /// ).await?;
    /// ```
    pub async fn total_revenue(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> DbResult<Money> {
        debug!(?start, ?end, "Computing total revenue");

        let cents: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_cents), 0)
            FROM sales
            WHERE (?1 IS NULL OR sale_date >= ?1)
              AND (?2 IS NULL OR sale_date <= ?2)
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(cents))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use hms_core::{NewMedicine, NewSale};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seeded() -> (Database, Medicine) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let medicine = db
            .medicines()
            .insert(&NewMedicine {
                name: "Paracetamol".to_string(),
                category: "Analgesic".to_string(),
                description: String::new(),
                price_cents: 250,
                stock: 100,
            })
            .await
            .unwrap();
        (db, medicine)
    }

    #[tokio::test]
    async fn test_get_detail_resolves_medicine() {
        let (db, medicine) = seeded().await;
        let created = db
            .ledger()
            .create(NewSale::new(&medicine.id, 3))
            .await
            .unwrap();

        let detail = db.sales().get_detail(&created.sale.id).await.unwrap().unwrap();
        assert_eq!(detail.sale.quantity, 3);
        assert_eq!(detail.sale.total_cents, 750);
        assert_eq!(detail.medicine_detail.name, "Paracetamol");
        assert_eq!(detail.medicine_detail.stock, 97);

        assert!(db.sales().get_detail("missing").await.unwrap().is_none());
        assert!(db.sales().get_by_id(&created.sale.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (db, medicine) = seeded().await;
        let first = db.ledger().create(NewSale::new(&medicine.id, 1)).await.unwrap();
        let second = db.ledger().create(NewSale::new(&medicine.id, 2)).await.unwrap();

        let ids: Vec<String> = db
            .sales()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.sale.id)
            .collect();
        assert_eq!(ids, vec![second.sale.id, first.sale.id]);

        assert_eq!(db.sales().count().await.unwrap(), 2);
        assert_eq!(
            db.sales().list_for_medicine(&medicine.id).await.unwrap().len(),
            2
        );
        assert!(db.sales().list_for_medicine("other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_total_revenue_date_range_is_inclusive() {
        let (db, medicine) = seeded().await;
        let ledger = db.ledger();
        for (day, qty) in [(1, 1), (15, 2), (31, 4)] {
            ledger
                .create(NewSale::new(&medicine.id, qty).on(date(2026, 10, day)))
                .await
                .unwrap();
        }

        let sales = db.sales();
        assert_eq!(sales.total_revenue(None, None).await.unwrap().cents(), 1750);
        assert_eq!(
            sales
                .total_revenue(Some(date(2026, 10, 1)), Some(date(2026, 10, 15)))
                .await
                .unwrap()
                .cents(),
            750
        );
        assert_eq!(
            sales
                .total_revenue(Some(date(2026, 10, 15)), None)
                .await
                .unwrap()
                .cents(),
            1500
        );
        assert_eq!(
            sales
                .total_revenue(None, Some(date(2026, 9, 30)))
                .await
                .unwrap()
                .cents(),
            0
        );
    }

    #[tokio::test]
    async fn test_list_for_date_matches_sale_date_only() {
        let (db, medicine) = seeded().await;
        let ledger = db.ledger();
        let earlier = ledger
            .create(NewSale::new(&medicine.id, 1).on(date(2026, 10, 16)))
            .await
            .unwrap();
        let first = ledger
            .create(NewSale::new(&medicine.id, 2).on(date(2026, 10, 17)))
            .await
            .unwrap();
        let second = ledger
            .create(NewSale::new(&medicine.id, 3).on(date(2026, 10, 17)))
            .await
            .unwrap();

        let ids: Vec<String> = db
            .sales()
            .list_for_date(date(2026, 10, 17))
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.sale.id)
            .collect();
        assert_eq!(ids, vec![second.sale.id, first.sale.id]);
        assert!(!ids.contains(&earlier.sale.id));
        assert!(db
            .sales()
            .list_for_date(date(2026, 10, 18))
            .await
            .unwrap()
            .is_empty());
    }
}
