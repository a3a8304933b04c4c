//! `sea_orm::DbErr` -> `AppError` translation with PII-safe logging.

use sea_orm::DbErr;
use tracing::{error, warn};

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::logging::pii::Redacted;
use crate::trace_ctx;

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// `table.column` from SQLite's "UNIQUE constraint failed: t.c" message.
fn sqlite_unique_target(msg: &str) -> Option<&str> {
    let (_, rest) = msg.split_once("UNIQUE constraint failed: ")?;
    rest.split(|c: char| c.is_whitespace() || c == ',' || c == '"')
        .next()
        .filter(|s| !s.is_empty())
}

fn is_email_conflict(msg: &str) -> bool {
    sqlite_unique_target(msg) == Some("users.email") || msg.contains("users_email_key")
}

pub fn map_db_err(e: DbErr) -> AppError {
    let msg = e.to_string();
    let trace_id = trace_ctx::trace_id();

    match &e {
        DbErr::RecordNotFound(_) => {
            return AppError::not_found(ErrorCode::NotFound, "Record not found");
        }
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "Database unavailable");
            return AppError::db_unavailable("Database unavailable");
        }
        _ => {}
    }

    if mentions_sqlstate(&msg, "23505")
        || msg.contains("duplicate key value violates unique constraint")
        || msg.contains("UNIQUE constraint failed")
    {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "Unique constraint violation");
        if is_email_conflict(&msg) {
            return AppError::conflict(ErrorCode::EmailTaken, "Email already registered");
        }
        return AppError::conflict(ErrorCode::UniqueViolation, "Unique constraint violation");
    }

    if mentions_sqlstate(&msg, "23503") || msg.contains("FOREIGN KEY constraint failed") {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "Foreign key violation");
        return AppError::bad_request(ErrorCode::FkViolation, "Referenced record does not exist");
    }

    if mentions_sqlstate(&msg, "23514") || msg.contains("CHECK constraint failed") {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "Check constraint violation");
        return AppError::bad_request(ErrorCode::CheckViolation, "Value out of allowed range");
    }

    if msg.contains("timed out") || msg.contains("timeout") {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "Database timeout");
        return AppError::db_unavailable("Database timeout");
    }

    error!(trace_id = %trace_id, raw_error = %Redacted(&msg), "Unhandled database error");
    AppError::db("Database operation failed")
}

#[cfg(test)]
mod tests {
    use sea_orm::RuntimeErr;

    use super::*;

    fn exec_err(msg: &str) -> DbErr {
        DbErr::Exec(RuntimeErr::Internal(msg.to_string()))
    }

    #[test]
    fn sqlite_email_unique_is_email_taken() {
        let err = map_db_err(exec_err(
            "error returned from database: (code: 2067) UNIQUE constraint failed: users.email",
        ));
        assert_eq!(err.code(), ErrorCode::EmailTaken);
        assert_eq!(err.status().as_u16(), 409);
    }

    #[test]
    fn postgres_email_unique_is_email_taken() {
        let err = map_db_err(exec_err(
            "duplicate key value violates unique constraint \"users_email_key\"",
        ));
        assert_eq!(err.code(), ErrorCode::EmailTaken);
    }

    #[test]
    fn other_unique_is_generic_conflict() {
        let err = map_db_err(exec_err("UNIQUE constraint failed: workouts.name"));
        assert_eq!(err.code(), ErrorCode::UniqueViolation);
    }

    #[test]
    fn check_and_fk_are_bad_requests() {
        let check = map_db_err(exec_err("CHECK constraint failed: duration > 0"));
        assert_eq!(check.code(), ErrorCode::CheckViolation);
        assert_eq!(check.status().as_u16(), 400);

        let fk = map_db_err(exec_err("FOREIGN KEY constraint failed"));
        assert_eq!(fk.code(), ErrorCode::FkViolation);
    }

    #[test]
    fn record_not_found_is_404() {
        let err = map_db_err(DbErr::RecordNotFound("users".into()));
        assert_eq!(err.status().as_u16(), 404);
    }

    #[test]
    fn unknown_errors_hide_detail() {
        let err = map_db_err(exec_err("near \"SELEC\": syntax error ana@example.test"));
        assert_eq!(err.code(), ErrorCode::DbError);
        assert!(!err.to_string().contains("ana@"));
    }
}
