//! Read-only queries against the live catalog.
//!
//! Every failure here is reported as [`DbInfraError::Catalog`]: if the
//! catalog cannot be read, the reconciler cannot decide anything safely.

use sea_orm::{ConnectionTrait, QueryResult, Statement, Value};

use super::check_clause::{check_clauses, references_column};
use super::dialect::Dialect;
use crate::error::DbInfraError;

/// Live metadata for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub primary_key: bool,
    /// Postgres column backed by a user-defined enum type.
    pub is_enum: bool,
}

/// A CHECK constraint that mentions a particular column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConstraint {
    /// Constraint name (Postgres only; SQLite checks are anonymous text).
    pub name: Option<String>,
    pub definition: String,
}

async fn query_all<C: ConnectionTrait>(
    conn: &C,
    dialect: Dialect,
    object: &str,
    sql: &str,
    values: Vec<Value>,
) -> Result<Vec<QueryResult>, DbInfraError> {
    conn.query_all(Statement::from_sql_and_values(dialect.backend(), sql, values))
        .await
        .map_err(|e| DbInfraError::catalog(object, e))
}

fn get<T: sea_orm::TryGetable>(
    row: &QueryResult,
    object: &str,
    column: &str,
) -> Result<T, DbInfraError> {
    row.try_get::<T>("", column)
        .map_err(|e| DbInfraError::catalog(object, e))
}

pub async fn table_exists<C: ConnectionTrait>(
    conn: &C,
    dialect: Dialect,
    table: &str,
) -> Result<bool, DbInfraError> {
    let object = format!("table {table}");
    let sql = match dialect {
        Dialect::Postgres => {
            "SELECT COUNT(*)::bigint AS n FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = $1"
        }
        Dialect::Sqlite => {
            "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = ?"
        }
    };
    let rows = query_all(conn, dialect, &object, sql, vec![table.into()]).await?;
    let count = match rows.first() {
        Some(row) => get::<i64>(row, &object, "n")?,
        None => 0,
    };
    Ok(count > 0)
}

pub async fn table_columns<C: ConnectionTrait>(
    conn: &C,
    dialect: Dialect,
    table: &str,
) -> Result<Vec<ColumnInfo>, DbInfraError> {
    let object = format!("columns of {table}");
    match dialect {
        Dialect::Postgres => {
            let sql = "SELECT c.column_name::text AS name, \
                        c.data_type::text AS data_type, \
                        (c.is_nullable = 'YES') AS nullable, \
                        c.column_default::text AS column_default, \
                        COALESCE(( \
                            SELECT bool_or(tc.constraint_type = 'PRIMARY KEY') \
                            FROM information_schema.key_column_usage k \
                            JOIN information_schema.table_constraints tc \
                              ON tc.constraint_name = k.constraint_name \
                             AND tc.table_schema = k.table_schema \
                            WHERE k.table_schema = c.table_schema \
                              AND k.table_name = c.table_name \
                              AND k.column_name = c.column_name \
                        ), false) AS primary_key \
                       FROM information_schema.columns c \
                       WHERE c.table_schema = current_schema() AND c.table_name = $1 \
                       ORDER BY c.ordinal_position";
            let rows = query_all(conn, dialect, &object, sql, vec![table.into()]).await?;
            rows.iter()
                .map(|row| {
                    let data_type: String = get(row, &object, "data_type")?;
                    Ok(ColumnInfo {
                        name: get(row, &object, "name")?,
                        is_enum: data_type == "USER-DEFINED",
                        data_type,
                        nullable: get(row, &object, "nullable")?,
                        default: get(row, &object, "column_default")?,
                        primary_key: get(row, &object, "primary_key")?,
                    })
                })
                .collect()
        }
        Dialect::Sqlite => {
            let sql = "SELECT name, type, \"notnull\" AS not_null, dflt_value, pk \
                       FROM pragma_table_info(?) ORDER BY cid";
            let rows = query_all(conn, dialect, &object, sql, vec![table.into()]).await?;
            rows.iter()
                .map(|row| {
                    let not_null: i64 = get(row, &object, "not_null")?;
                    let pk: i64 = get(row, &object, "pk")?;
                    Ok(ColumnInfo {
                        name: get(row, &object, "name")?,
                        data_type: get(row, &object, "type")?,
                        nullable: not_null == 0,
                        default: get(row, &object, "dflt_value")?,
                        primary_key: pk > 0,
                        is_enum: false,
                    })
                })
                .collect()
        }
    }
}

pub async fn column_info<C: ConnectionTrait>(
    conn: &C,
    dialect: Dialect,
    table: &str,
    column: &str,
) -> Result<Option<ColumnInfo>, DbInfraError> {
    let columns = table_columns(conn, dialect, table).await?;
    Ok(columns.into_iter().find(|c| c.name.eq_ignore_ascii_case(column)))
}

/// Stored `CREATE TABLE` text of a SQLite table.
pub async fn sqlite_table_ddl<C: ConnectionTrait>(
    conn: &C,
    table: &str,
) -> Result<Option<String>, DbInfraError> {
    let object = format!("ddl of {table}");
    let rows = query_all(
        conn,
        Dialect::Sqlite,
        &object,
        "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?",
        vec![table.into()],
    )
    .await?;
    match rows.first() {
        Some(row) => get::<Option<String>>(row, &object, "sql"),
        None => Ok(None),
    }
}

/// Stored text of the indexes and triggers attached to a SQLite table.
/// Automatic indexes (UNIQUE, PRIMARY KEY) have no text and are skipped.
pub async fn sqlite_dependent_ddl<C: ConnectionTrait>(
    conn: &C,
    table: &str,
) -> Result<Vec<String>, DbInfraError> {
    let object = format!("indexes and triggers of {table}");
    let rows = query_all(
        conn,
        Dialect::Sqlite,
        &object,
        "SELECT sql FROM sqlite_master \
         WHERE type IN ('index', 'trigger') AND tbl_name = ? AND sql IS NOT NULL \
         ORDER BY type, name",
        vec![table.into()],
    )
    .await?;
    rows.iter().map(|row| get::<String>(row, &object, "sql")).collect()
}

/// CHECK constraints on `table` whose expression involves `column`.
pub async fn column_checks<C: ConnectionTrait>(
    conn: &C,
    dialect: Dialect,
    table: &str,
    column: &str,
) -> Result<Vec<CheckConstraint>, DbInfraError> {
    match dialect {
        Dialect::Postgres => {
            let object = format!("check constraints on {table}.{column}");
            let sql = "SELECT DISTINCT con.conname::text AS name, \
                        pg_get_constraintdef(con.oid) AS definition \
                       FROM pg_constraint con \
                       JOIN pg_class rel ON rel.oid = con.conrelid \
                       JOIN pg_namespace nsp ON nsp.oid = rel.relnamespace \
                       JOIN pg_attribute att \
                         ON att.attrelid = rel.oid AND att.attnum = ANY(con.conkey) \
                       WHERE con.contype = 'c' \
                         AND nsp.nspname = current_schema() \
                         AND rel.relname = $1 \
                         AND att.attname = $2";
            let rows = query_all(
                conn,
                dialect,
                &object,
                sql,
                vec![table.into(), column.into()],
            )
            .await?;
            rows.iter()
                .map(|row| {
                    Ok(CheckConstraint {
                        name: Some(get(row, &object, "name")?),
                        definition: get(row, &object, "definition")?,
                    })
                })
                .collect()
        }
        Dialect::Sqlite => {
            let ddl = sqlite_table_ddl(conn, table).await?.unwrap_or_default();
            Ok(check_clauses(&ddl)
                .into_iter()
                .filter(|body| references_column(body, column))
                .map(|body| CheckConstraint {
                    name: None,
                    definition: body.to_string(),
                })
                .collect())
        }
    }
}
