//! # Medicine Repository
//!
//! Database operations for medicines.
//!
//! ## Key Operations
//! - CRUD operations
//! - Stock lookups shared with the sale ledger
//!
//! ## Who Writes `stock`
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MedicineRepository::insert / update  → sets stock to an absolute value │
//! │                                         (receiving, stock-take)         │
//! │                                                                         │
//! │  SaleLedger                           → relative, conditional moves     │
//! │                                         stock = stock - n WHERE >= n    │
//! │                                         stock = stock + n               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use hms_core::validation::validate_new_medicine;
use hms_core::{new_id, Medicine, NewMedicine};

const MEDICINE_COLUMNS: &str =
    "id, name, category, description, price_cents, stock, created_at, updated_at";

/// Loads one medicine through any executor (pool or open transaction).
pub(crate) async fn fetch_medicine<'e, E>(executor: E, id: &str) -> DbResult<Option<Medicine>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let medicine = sqlx::query_as::<_, Medicine>(&format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(medicine)
}

/// Repository for medicine database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = MedicineRepository::new(pool);
///
/// let medicine = repo.insert(&NewMedicine { name: "Amoxicillin".into(), .. }).await?;
/// let found = repo.get_by_id(&medicine.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct MedicineRepository {
    pool: SqlitePool,
}

impl MedicineRepository {
    /// Creates a new MedicineRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MedicineRepository { pool }
    }

    /// Gets a medicine by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Medicine))` - Medicine found
    /// * `Ok(None)` - Medicine not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Medicine>> {
        fetch_medicine(&self.pool, id).await
    }

    /// Lists all medicines ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Medicine>> {
        let medicines = sqlx::query_as::<_, Medicine>(&format!(
            "SELECT {MEDICINE_COLUMNS} FROM medicines ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = medicines.len(), "Listed medicines");
        Ok(medicines)
    }

    /// Lists medicines whose stock is strictly below `threshold`.
    pub async fn list_low_stock(&self, threshold: i64) -> DbResult<Vec<Medicine>> {
        let medicines = sqlx::query_as::<_, Medicine>(&format!(
            "SELECT {MEDICINE_COLUMNS} FROM medicines WHERE stock < ?1 ORDER BY name, id"
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        debug!(threshold, count = medicines.len(), "Listed low-stock medicines");
        Ok(medicines)
    }

    /// Inserts a new medicine.
    ///
    /// ## Returns
    /// * `Ok(Medicine)` - Inserted medicine with generated id and timestamps
    /// * `Err(DbError::Invalid)` - Empty name, negative price or stock
    pub async fn insert(&self, input: &NewMedicine) -> DbResult<Medicine> {
        validate_new_medicine(input)?;

        let now = Utc::now();
        let medicine = Medicine {
            id: new_id(),
            name: input.name.trim().to_string(),
            category: input.category.trim().to_string(),
            description: input.description.clone(),
            price_cents: input.price_cents,
            stock: input.stock,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %medicine.id, name = %medicine.name, "Inserting medicine");

        sqlx::query(
            r#"
            INSERT INTO medicines (
                id, name, category, description,
                price_cents, stock, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&medicine.id)
        .bind(&medicine.name)
        .bind(&medicine.category)
        .bind(&medicine.description)
        .bind(medicine.price_cents)
        .bind(medicine.stock)
        .bind(medicine.created_at)
        .bind(medicine.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(medicine)
    }

    /// Replaces every editable field of a medicine, stock included.
    ///
    /// ## Returns
    /// * `Ok(Medicine)` - The updated row
    /// * `Err(DbError::NotFound)` - Medicine doesn't exist
    pub async fn update(&self, id: &str, input: &NewMedicine) -> DbResult<Medicine> {
        validate_new_medicine(input)?;

        debug!(id = %id, "Updating medicine");

        let medicine = sqlx::query_as::<_, Medicine>(&format!(
            r#"
            UPDATE medicines SET
                name = ?2,
                category = ?3,
                description = ?4,
                price_cents = ?5,
                stock = ?6,
                updated_at = ?7
            WHERE id = ?1
            RETURNING {MEDICINE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(input.category.trim())
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.stock)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        medicine.ok_or_else(|| DbError::not_found("Medicine", id))
    }

    /// Deletes a medicine. Its sales are removed by the foreign key cascade;
    /// no stock is restored anywhere.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting medicine");

        let result = sqlx::query("DELETE FROM medicines WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Medicine", id));
        }

        Ok(())
    }

    /// Counts all medicines.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM medicines")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
