//! # Database Error Types
//!
//! Error types for database operations and ledger transactions.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                    busy / locked → Conflict (retryable)        │
//! │       ▼                                                                 │
//! │  LedgerError ← DbError, or a CoreError raised inside the transaction   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (apps/api) ← Serialized for the client                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use hms_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a non-existent medicine_id
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation.
    ///
    /// ## When This Occurs
    /// - A write would have made `stock` negative
    /// - A sale row with `quantity <= 0`
    ///
    /// The ledger checks these conditions itself, so seeing this error
    /// means a direct write bypassed it.
    #[error("Check constraint violation: {message}")]
    CheckViolation { message: String },

    /// Another writer holds the database lock, or our snapshot went stale.
    ///
    /// ## When This Occurs
    /// - `busy_timeout` elapsed while waiting for the write lock
    /// - SQLITE_BUSY_SNAPSHOT in WAL mode
    ///
    /// Nothing was committed. The caller may retry.
    #[error("Concurrent modification conflict: {0}")]
    Conflict(String),

    /// Input rejected before reaching SQL.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns true if retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::Conflict(_) | DbError::PoolExhausted)
    }
}

// SQLite primary/extended result codes we care about.
const SQLITE_BUSY: &str = "5";
const SQLITE_LOCKED: &str = "6";
const SQLITE_BUSY_SNAPSHOT: &str = "517";
const SQLITE_CONSTRAINT_CHECK: &str = "275";
const SQLITE_CONSTRAINT_FOREIGNKEY: &str = "787";
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → code / message decides:
///     5, 6, 517, "locked"     →   DbError::Conflict
///     2067, "UNIQUE"          →   DbError::UniqueViolation
///     787,  "FOREIGN KEY"     →   DbError::ForeignKeyViolation
///     275,  "CHECK"           →   DbError::CheckViolation
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();
                let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();

                if matches!(
                    code.as_str(),
                    SQLITE_BUSY | SQLITE_LOCKED | SQLITE_BUSY_SNAPSHOT
                ) || msg.contains("database is locked")
                {
                    DbError::Conflict(msg)
                } else if code == SQLITE_CONSTRAINT_UNIQUE
                    || msg.contains("UNIQUE constraint failed")
                {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if code == SQLITE_CONSTRAINT_FOREIGNKEY
                    || msg.contains("FOREIGN KEY constraint failed")
                {
                    DbError::ForeignKeyViolation { message: msg }
                } else if code == SQLITE_CONSTRAINT_CHECK || msg.contains("CHECK constraint failed")
                {
                    DbError::CheckViolation { message: msg }
                } else {
                    DbError::QueryFailed(msg)
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Ledger Error
// =============================================================================

/// Errors from a stock-mutating sale operation.
///
/// `Core` is a business rejection (insufficient stock, bad quantity, missing
/// sale or medicine). `Db` is an infrastructure failure. Either way the
/// transaction was rolled back.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl LedgerError {
    /// Returns true if retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            LedgerError::Core(_) => false,
            LedgerError::Db(e) => e.is_retryable(),
        }
    }

    /// Returns true for `InsufficientStock`.
    pub fn is_insufficient_stock(&self) -> bool {
        matches!(self, LedgerError::Core(CoreError::InsufficientStock { .. }))
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Db(err.into())
    }
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Core(err.into())
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hms_core::StockField;

    #[test]
    fn test_retryable_classification() {
        assert!(DbError::Conflict("database is locked".into()).is_retryable());
        assert!(DbError::PoolExhausted.is_retryable());
        assert!(!DbError::not_found("Sale", "x").is_retryable());

        let stock: LedgerError = CoreError::InsufficientStock {
            field: StockField::Medicine,
            medicine_id: "m".into(),
            available: 1,
            requested: 2,
        }
        .into();
        assert!(!stock.is_retryable());
        assert!(stock.is_insufficient_stock());

        let conflict: LedgerError = DbError::Conflict("busy".into()).into();
        assert!(conflict.is_retryable());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
