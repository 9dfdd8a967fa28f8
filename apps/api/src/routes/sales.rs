//! # Sale Routes
//!
//! Reads go through [`hms_db::SaleRepository`]; every write goes through
//! [`hms_db::SaleLedger`] so stock moves in the same transaction.
//!
//! ## Request Body
//! ```json
//! {
//!   "medicine": "550e8400-e29b-41d4-a716-446655440000",
//!   "quantity": 4,
//!   "total_amount": "20.00",
//!   "date": "2026-10-17"
//! }
//! ```
//! `total_amount` is computed from the medicine price when omitted and
//! `date` defaults to today (UTC). `PATCH` accepts any subset of fields.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use hms_core::{Money, NewSale, SaleChanges, SaleDetail};
use hms_db::Database;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AmountInput;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// Request / Response Bodies
// =============================================================================

/// Body for `POST` and `PUT`.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleBody {
    pub medicine: String,
    pub quantity: i64,
    #[serde(default)]
    pub total_amount: Option<AmountInput>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl SaleBody {
    fn into_new_sale(self) -> ApiResult<NewSale> {
        Ok(NewSale {
            total: parse_total(self.total_amount.as_ref())?,
            medicine_id: self.medicine,
            quantity: self.quantity,
            sale_date: self.date,
        })
    }

    fn into_changes(self) -> ApiResult<SaleChanges> {
        Ok(SaleChanges {
            total: parse_total(self.total_amount.as_ref())?,
            medicine_id: Some(self.medicine),
            quantity: Some(self.quantity),
            sale_date: self.date,
        })
    }
}

/// Body for `PATCH`. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalePatchBody {
    #[serde(default)]
    pub medicine: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub total_amount: Option<AmountInput>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl SalePatchBody {
    fn into_changes(self) -> ApiResult<SaleChanges> {
        Ok(SaleChanges {
            total: parse_total(self.total_amount.as_ref())?,
            medicine_id: self.medicine,
            quantity: self.quantity,
            sale_date: self.date,
        })
    }
}

fn parse_total(amount: Option<&AmountInput>) -> ApiResult<Option<Money>> {
    Ok(amount.map(|a| a.to_money("total_amount")).transpose()?)
}

/// Query of `GET /api/sales/total_revenue`. Both bounds are inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevenueQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Body of `GET /api/sales/total_revenue`.
#[derive(Debug, Serialize)]
pub struct RevenueSummary {
    pub total_revenue_cents: i64,
    pub total_revenue: String,
}

/// Body of `GET /api/sales/today_sales`.
#[derive(Debug, Serialize)]
pub struct TodaySales {
    pub date: NaiveDate,
    pub sales: Vec<SaleDetail>,
    pub total_revenue_cents: i64,
    pub total_revenue: String,
    pub sales_count: usize,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/sales`
pub async fn list_sales(State(db): State<Database>) -> ApiResult<Json<Vec<SaleDetail>>> {
    Ok(Json(db.sales().list().await?))
}

/// `POST /api/sales`
pub async fn create_sale(
    State(db): State<Database>,
    Json(body): Json<SaleBody>,
) -> ApiResult<(StatusCode, Json<SaleDetail>)> {
    let detail = db.ledger().create(body.into_new_sale()?).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// `GET /api/sales/{id}`
pub async fn get_sale(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> ApiResult<Json<SaleDetail>> {
    db.sales()
        .get_detail(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Sale", &id))
}

/// `PUT /api/sales/{id}`
pub async fn replace_sale(
    State(db): State<Database>,
    Path(id): Path<String>,
    Json(body): Json<SaleBody>,
) -> ApiResult<Json<SaleDetail>> {
    let changes = body.into_changes()?;
    Ok(Json(db.ledger().update(&id, changes).await?))
}

/// `PATCH /api/sales/{id}`
pub async fn patch_sale(
    State(db): State<Database>,
    Path(id): Path<String>,
    Json(body): Json<SalePatchBody>,
) -> ApiResult<Json<SaleDetail>> {
    let changes = body.into_changes()?;
    Ok(Json(db.ledger().update(&id, changes).await?))
}

/// `DELETE /api/sales/{id}`
///
/// The sold units go back to stock.
pub async fn delete_sale(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let sale = db.ledger().delete(&id).await?;

    info!(sale_id = %sale.id, restored = sale.quantity, "Sale removed via API");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/sales/total_revenue`
pub async fn total_revenue(
    State(db): State<Database>,
    Query(range): Query<RevenueQuery>,
) -> ApiResult<Json<RevenueSummary>> {
    let total = db
        .sales()
        .total_revenue(range.start_date, range.end_date)
        .await?;

    Ok(Json(RevenueSummary {
        total_revenue_cents: total.cents(),
        total_revenue: total.to_decimal_string(),
    }))
}

/// `GET /api/sales/today_sales`
///
/// Sales whose `sale_date` is today (UTC) and their revenue.
pub async fn today_sales(State(db): State<Database>) -> ApiResult<Json<TodaySales>> {
    let today = Utc::now().date_naive();
    let repo = db.sales();

    let sales = repo.list_for_date(today).await?;
    let total = repo.total_revenue(Some(today), Some(today)).await?;

    Ok(Json(TodaySales {
        date: today,
        sales_count: sales.len(),
        sales,
        total_revenue_cents: total.cents(),
        total_revenue: total.to_decimal_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::routes::test_support;

    fn sale_body(medicine: &str, quantity: i64) -> SaleBody {
        SaleBody {
            medicine: medicine.to_string(),
            quantity,
            total_amount: None,
            date: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_sale_lifecycle_moves_stock() {
        let db = test_support::db().await;
        let med = test_support::medicine(&db, 500, 10).await;

        let (status, Json(created)) =
            create_sale(State(db.clone()), Json(sale_body(&med.id, 4))).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.sale.total_cents, 2000);
        assert_eq!(created.medicine_detail.stock, 6);

        let Json(updated) = patch_sale(
            State(db.clone()),
            Path(created.sale.id.clone()),
            Json(SalePatchBody {
                quantity: Some(7),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.sale.total_cents, 3500);
        assert_eq!(test_support::stock(&db, &med.id).await, 3);

        let err = patch_sale(
            State(db.clone()),
            Path(created.sale.id.clone()),
            Json(SalePatchBody {
                quantity: Some(20),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.field.as_deref(), Some("quantity"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(test_support::stock(&db, &med.id).await, 3);

        let status = delete_sale(State(db.clone()), Path(created.sale.id.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(test_support::stock(&db, &med.id).await, 10);

        let err = delete_sale(State(db), Path(created.sale.id)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_create_insufficient_stock_blames_medicine() {
        let db = test_support::db().await;
        let med = test_support::medicine(&db, 500, 2).await;

        let err = create_sale(State(db.clone()), Json(sale_body(&med.id, 3)))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.field.as_deref(), Some("medicine"));
        assert_eq!(err.message, "Insufficient stock for the selected medicine.");
        assert_eq!(test_support::stock(&db, &med.id).await, 2);
    }

    #[tokio::test]
    async fn test_create_zero_quantity() {
        let db = test_support::db().await;
        let med = test_support::medicine(&db, 500, 2).await;

        let err = create_sale(State(db), Json(sale_body(&med.id, 0)))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidQuantity);
        assert_eq!(err.field.as_deref(), Some("quantity"));
    }

    #[tokio::test]
    async fn test_create_unknown_medicine_is_not_found() {
        let db = test_support::db().await;

        let err = create_sale(
            State(db),
            Json(sale_body("550e8400-e29b-41d4-a716-446655440000", 1)),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.field.as_deref(), Some("medicine"));
    }

    #[tokio::test]
    async fn test_replace_moves_sale_between_medicines() {
        let db = test_support::db().await;
        let a = test_support::medicine(&db, 100, 5).await;
        let b = test_support::medicine(&db, 300, 5).await;

        let (_, Json(created)) =
            create_sale(State(db.clone()), Json(sale_body(&a.id, 5))).await.unwrap();

        let Json(moved) = replace_sale(
            State(db.clone()),
            Path(created.sale.id),
            Json(sale_body(&b.id, 3)),
        )
        .await
        .unwrap();

        assert_eq!(moved.sale.medicine_id, b.id);
        assert_eq!(moved.sale.total_cents, 900);
        assert_eq!(test_support::stock(&db, &a.id).await, 5);
        assert_eq!(test_support::stock(&db, &b.id).await, 2);
    }

    #[tokio::test]
    async fn test_explicit_total_and_bad_total() {
        let db = test_support::db().await;
        let med = test_support::medicine(&db, 500, 10).await;

        let mut body = sale_body(&med.id, 2);
        body.total_amount = Some(AmountInput::Text("9.99".to_string()));
        body.date = Some(date(2026, 3, 14));
        let (_, Json(created)) = create_sale(State(db.clone()), Json(body)).await.unwrap();
        assert_eq!(created.sale.total_cents, 999);
        assert_eq!(created.sale.sale_date, date(2026, 3, 14));

        let mut body = sale_body(&med.id, 2);
        body.total_amount = Some(AmountInput::Text("9,99".to_string()));
        let err = create_sale(State(db.clone()), Json(body)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field.as_deref(), Some("total_amount"));

        // Rejected before the ledger ran.
        assert_eq!(test_support::stock(&db, &med.id).await, 8);
    }

    #[tokio::test]
    async fn test_total_revenue_over_date_range() {
        let db = test_support::db().await;
        let med = test_support::medicine(&db, 250, 100).await;

        for (day, qty) in [(1, 2), (15, 4), (31, 1)] {
            let mut body = sale_body(&med.id, qty);
            body.date = Some(date(2026, 10, day));
            create_sale(State(db.clone()), Json(body)).await.unwrap();
        }

        let Json(all) = total_revenue(State(db.clone()), Query(RevenueQuery::default()))
            .await
            .unwrap();
        assert_eq!(all.total_revenue_cents, 1750);
        assert_eq!(all.total_revenue, "17.50");

        let Json(mid) = total_revenue(
            State(db),
            Query(RevenueQuery {
                start_date: Some(date(2026, 10, 2)),
                end_date: Some(date(2026, 10, 15)),
            }),
        )
        .await
        .unwrap();
        assert_eq!(mid.total_revenue_cents, 1000);
    }

    #[tokio::test]
    async fn test_today_sales_skips_other_dates() {
        let db = test_support::db().await;
        let med = test_support::medicine(&db, 250, 100).await;

        create_sale(State(db.clone()), Json(sale_body(&med.id, 2))).await.unwrap();
        create_sale(State(db.clone()), Json(sale_body(&med.id, 3))).await.unwrap();
        let mut old = sale_body(&med.id, 4);
        old.date = Some(date(2020, 1, 1));
        create_sale(State(db.clone()), Json(old)).await.unwrap();

        let Json(today) = today_sales(State(db)).await.unwrap();

        assert_eq!(today.date, Utc::now().date_naive());
        assert_eq!(today.sales_count, 2);
        assert_eq!(today.sales.len(), 2);
        assert!(today.sales.iter().all(|s| s.sale.sale_date == today.date));
        assert_eq!(today.total_revenue_cents, 1250);
        assert_eq!(today.total_revenue, "12.50");
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let db = test_support::db().await;
        let med = test_support::medicine(&db, 500, 10).await;
        let (_, Json(created)) =
            create_sale(State(db.clone()), Json(sale_body(&med.id, 1))).await.unwrap();

        let Json(fetched) = get_sale(State(db.clone()), Path(created.sale.id.clone()))
            .await
            .unwrap();
        assert_eq!(fetched.medicine_detail.id, med.id);

        let Json(all) = list_sales(State(db.clone())).await.unwrap();
        assert_eq!(all.len(), 1);

        let err = get_sale(State(db), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
