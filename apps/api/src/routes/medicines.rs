//! # Medicine Routes
//!
//! Plain CRUD over [`hms_db::MedicineRepository`]. Editing `stock` here is
//! a manual correction; sales adjust it through the ledger instead.
//!
//! ## Request Body
//! ```json
//! {
//!   "name": "Amoxicillin 500mg",
//!   "category": "Antibiotic",
//!   "description": "Broad-spectrum antibiotic",
//!   "price": "12.50",
//!   "stock": 40
//! }
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hms_core::{Medicine, NewMedicine};
use hms_db::Database;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AmountInput;
use crate::error::{ApiError, ApiResult};

/// Body for create and replace.
#[derive(Debug, Clone, Deserialize)]
pub struct MedicineBody {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub price: AmountInput,
    pub stock: i64,
}

impl MedicineBody {
    fn into_new_medicine(self) -> ApiResult<NewMedicine> {
        Ok(NewMedicine {
            price_cents: self.price.to_money("price")?.cents(),
            name: self.name,
            category: self.category,
            description: self.description,
            stock: self.stock,
        })
    }
}

/// Stock below which a medicine is reported by `GET /api/medicines/low_stock`.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Query of `GET /api/medicines/low_stock`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<i64>,
}

/// Body of `GET /api/medicines/count`.
#[derive(Debug, Serialize)]
pub struct MedicineCount {
    pub medicine_count: i64,
}

/// `GET /api/medicines`
pub async fn list_medicines(State(db): State<Database>) -> ApiResult<Json<Vec<Medicine>>> {
    Ok(Json(db.medicines().list().await?))
}

/// `POST /api/medicines`
pub async fn create_medicine(
    State(db): State<Database>,
    Json(body): Json<MedicineBody>,
) -> ApiResult<(StatusCode, Json<Medicine>)> {
    let input = body.into_new_medicine()?;
    let medicine = db.medicines().insert(&input).await?;

    info!(medicine_id = %medicine.id, name = %medicine.name, "Medicine created");
    Ok((StatusCode::CREATED, Json(medicine)))
}

/// `GET /api/medicines/{id}`
pub async fn get_medicine(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> ApiResult<Json<Medicine>> {
    db.medicines()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Medicine", &id))
}

/// `PUT /api/medicines/{id}`
pub async fn update_medicine(
    State(db): State<Database>,
    Path(id): Path<String>,
    Json(body): Json<MedicineBody>,
) -> ApiResult<Json<Medicine>> {
    let input = body.into_new_medicine()?;
    Ok(Json(db.medicines().update(&id, &input).await?))
}

/// `DELETE /api/medicines/{id}`
///
/// Sales of the medicine go with it.
pub async fn delete_medicine(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    db.medicines().delete(&id).await?;

    info!(medicine_id = %id, "Medicine deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/medicines/count`
pub async fn count_medicines(State(db): State<Database>) -> ApiResult<Json<MedicineCount>> {
    Ok(Json(MedicineCount {
        medicine_count: db.medicines().count().await?,
    }))
}

/// `GET /api/medicines/low_stock`
///
/// Medicines with stock strictly below `threshold` (default 10).
pub async fn low_stock_medicines(
    State(db): State<Database>,
    Query(query): Query<LowStockQuery>,
) -> ApiResult<Json<Vec<Medicine>>> {
    let threshold = query.threshold.unwrap_or(LOW_STOCK_THRESHOLD);
    Ok(Json(db.medicines().list_low_stock(threshold).await?))
}
