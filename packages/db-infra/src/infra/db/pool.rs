use std::future::Future;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::DbKind;
use crate::error::DbInfraError;

const PG_MAX_CONNECTIONS: u32 = 25;
const PG_MIN_CONNECTIONS: u32 = 5;

async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, DbInfraError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbInfraError>>,
{
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(
                        "connection_retry=success attempts={} interval_ms={}",
                        attempt, interval_ms
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                last_error = Some(e);
                if attempt < max_attempts {
                    warn!(
                        "connection_retry=failed attempt={} max_attempts={} interval_ms={}",
                        attempt, max_attempts, interval_ms
                    );
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| DbInfraError::config("no connection attempt was made")))
}

/// Open the application pool for `kind`.
///
/// SQLite pools are pinned to a single connection: an in-memory database
/// only exists on the connection that created it, and the table rebuild in
/// the reconciler toggles `PRAGMA foreign_keys`, which is per-connection.
pub async fn connect_pool(kind: DbKind, url: &str) -> Result<DatabaseConnection, DbInfraError> {
    let mut opt = ConnectOptions::new(url.to_string());
    opt.acquire_timeout(Duration::from_secs(5)).sqlx_logging(true);

    if kind.is_sqlite() {
        opt.min_connections(1).max_connections(1);
        // An idle reap would silently drop an in-memory database.
        opt.idle_timeout(Duration::from_secs(u32::MAX as u64))
            .max_lifetime(Duration::from_secs(u32::MAX as u64));
    } else {
        opt.min_connections(PG_MIN_CONNECTIONS)
            .max_connections(PG_MAX_CONNECTIONS);
    }

    info!(
        "db_connect=start db_kind={} url={}",
        kind,
        sanitize_db_url(url)
    );

    let conn = if kind == DbKind::Postgres {
        retry_connection(
            || {
                let opt = opt.clone();
                async move {
                    Database::connect(opt).await.map_err(|e| {
                        DbInfraError::config(format!("failed to connect to Postgres: {e}"))
                    })
                }
            },
            5,
            500,
        )
        .await?
    } else {
        Database::connect(opt)
            .await
            .map_err(|e| DbInfraError::config(format!("failed to open SQLite database: {e}")))?
    };

    info!("db_connect=done db_kind={}", kind);
    Ok(conn)
}

/// Mask the password segment of a connection URL for logging.
pub fn sanitize_db_url(url: &str) -> String {
    let Some((auth_part, host_part)) = url.split_once('@') else {
        return url.to_string();
    };
    match auth_part.rfind(':') {
        Some(colon_pos) if auth_part[..colon_pos].contains("//") => {
            format!("{}:***@{}", &auth_part[..colon_pos], host_part)
        }
        _ => url.to_string(),
    }
}
