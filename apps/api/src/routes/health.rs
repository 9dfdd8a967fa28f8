//! Liveness and database readiness.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use hms_db::{migrations, Database};
use serde::Serialize;
use tracing::warn;

/// Health response body.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: bool,
    pub migrations_embedded: usize,
    pub migrations_applied: usize,
}

/// `GET /health`
///
/// 200 when the database answers and every embedded migration is applied,
/// 503 otherwise.
pub async fn health(State(db): State<Database>) -> (StatusCode, Json<HealthStatus>) {
    let database = db.health_check().await;

    let (embedded, applied, migrated) = match migrations::migration_status(db.pool()).await {
        Ok((embedded, applied)) => (embedded, applied, embedded == applied),
        Err(e) => {
            warn!(error = %e, "Could not read migration status");
            (0, 0, false)
        }
    };

    let ready = database && migrated;
    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (
        status,
        Json(HealthStatus {
            status: if ready { "ok" } else { "degraded" },
            database,
            migrations_embedded: embedded,
            migrations_applied: applied,
        }),
    )
}
