use db_infra::{connect_pool, db_url, reconcile, DbKind, ReconcileReport};
use sea_orm::DatabaseConnection;

use crate::error::AppError;
use crate::infra::schema::SCHEMA;
use crate::state::app_state::AppState;

/// Open a pool for `kind` using the environment-derived URL. No schema work.
pub async fn connect_db(kind: DbKind) -> Result<DatabaseConnection, AppError> {
    let url = db_url(kind)?;
    Ok(connect_pool(kind, &url).await?)
}

/// Connect and reconcile against the compiled-in schema. The service must
/// not bind before this returns `Ok`.
pub async fn bootstrap_db(kind: DbKind) -> Result<(DatabaseConnection, ReconcileReport), AppError> {
    let conn = connect_db(kind).await?;
    let report = reconcile(&conn, &SCHEMA).await?;
    Ok((conn, report))
}

pub fn require_db(state: &AppState) -> Result<&DatabaseConnection, AppError> {
    state
        .db()
        .ok_or_else(|| AppError::db_unavailable("Database connection not configured"))
}
