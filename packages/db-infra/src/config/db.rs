use std::env;
use std::fmt;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::error::DbInfraError;

/// Which engine the service talks to.
///
/// Postgres is the production target. The SQLite variants exist for local
/// development and for tests that need a real catalog without a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Postgres,
    SqliteFile,
    SqliteMemory,
}

impl DbKind {
    pub fn is_sqlite(self) -> bool {
        matches!(self, DbKind::SqliteFile | DbKind::SqliteMemory)
    }
}

impl fmt::Display for DbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DbKind::Postgres => "postgres",
            DbKind::SqliteFile => "sqlite-file",
            DbKind::SqliteMemory => "sqlite-memory",
        };
        f.write_str(s)
    }
}

impl FromStr for DbKind {
    type Err = DbInfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DbKind::Postgres),
            "sqlite" | "sqlite-file" | "sqlite_file" => Ok(DbKind::SqliteFile),
            "sqlite-memory" | "sqlite_memory" | "memory" => Ok(DbKind::SqliteMemory),
            other => Err(DbInfraError::config(format!(
                "unknown DB_KIND '{other}' (expected postgres, sqlite-file or sqlite-memory)"
            ))),
        }
    }
}

/// Builds a connection URL for `kind` from environment variables.
///
/// `DATABASE_URL` wins when set for the file-backed engines. Otherwise
/// Postgres is assembled from `POSTGRES_HOST`, `POSTGRES_PORT`, `POSTGRES_DB`,
/// `POSTGRES_USER` and `POSTGRES_PASSWORD`; SQLite files from `SQLITE_PATH`.
pub fn db_url(kind: DbKind) -> Result<String, DbInfraError> {
    if kind == DbKind::SqliteMemory {
        return Ok("sqlite::memory:".to_string());
    }

    if let Some(url) = optional_var("DATABASE_URL") {
        return Ok(url);
    }

    match kind {
        DbKind::Postgres => {
            let host = optional_var("POSTGRES_HOST").unwrap_or_else(|| "localhost".to_string());
            let port = optional_var("POSTGRES_PORT").unwrap_or_else(|| "5432".to_string());
            let db_name = must_var("POSTGRES_DB")?;
            let user = must_var("POSTGRES_USER")?;
            let password = must_var("POSTGRES_PASSWORD")?;
            let password = utf8_percent_encode(&password, NON_ALPHANUMERIC);
            Ok(format!(
                "postgresql://{user}:{password}@{host}:{port}/{db_name}"
            ))
        }
        DbKind::SqliteFile => {
            let path = optional_var("SQLITE_PATH").unwrap_or_else(|| "fittrack.db".to_string());
            Ok(format!("sqlite://{path}?mode=rwc"))
        }
        DbKind::SqliteMemory => Ok("sqlite::memory:".to_string()),
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn must_var(name: &str) -> Result<String, DbInfraError> {
    optional_var(name).ok_or_else(|| {
        DbInfraError::config(format!("Required environment variable '{name}' is not set"))
    })
}
