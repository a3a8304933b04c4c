use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};
use tracing::{debug, info, warn};

use super::catalog::{self, CheckConstraint, ColumnInfo};
use super::check_clause::{rename_create_table, strip_column_checks};
use super::dialect::{quote_ident, Dialect};
use super::expectation::{ColumnSpec, IndexSpec, RepairSpec, SchemaExpectation, TableSpec};
use crate::error::DbInfraError;

/// Error fragments produced when another instance made the same change first.
const BENIGN_ERRORS: [&str; 6] = [
    "already exists",
    "duplicate column",
    "duplicate key name",
    "database exists",
    // Postgres catalog collisions when two CREATE TABLE statements overlap.
    "pg_type_typname_nsp_index",
    "pg_class_relname_nsp_index",
];

const REBUILD_SUFFIX: &str = "__rebuild";

/// Whether `err` is an idempotency race rather than a real failure.
pub fn is_benign_race(err: &DbErr) -> bool {
    let msg = err.to_string().to_ascii_lowercase();
    BENIGN_ERRORS.iter().any(|needle| msg.contains(needle))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// Catalog already had it; only the metadata query ran.
    AlreadyPresent,
    Applied,
    /// The statement failed with a benign "already exists" class error.
    Raced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriftKind {
    Nullability { expected_nullable: bool },
    MissingDefault,
}

/// A live column that exists but differs from the expectation in a way the
/// reconciler does not alter on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDrift {
    pub table: String,
    pub column: String,
    pub kind: DriftKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairSummary {
    pub attempted: usize,
    pub failed: usize,
    pub rows_affected: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub tables_created: Vec<String>,
    /// `table.column` entries.
    pub columns_added: Vec<String>,
    pub columns_loosened: Vec<String>,
    pub indexes_ensured: usize,
    pub races: usize,
    pub drift: Vec<ColumnDrift>,
    pub repairs: RepairSummary,
}

impl ReconcileReport {
    pub fn changed_structure(&self) -> bool {
        !self.tables_created.is_empty()
            || !self.columns_added.is_empty()
            || !self.columns_loosened.is_empty()
    }
}

/// Brings a live database up to a [`SchemaExpectation`].
pub struct Reconciler<'a> {
    conn: &'a DatabaseConnection,
    dialect: Dialect,
}

impl<'a> Reconciler<'a> {
    pub fn new(conn: &'a DatabaseConnection) -> Result<Self, DbInfraError> {
        let dialect = Dialect::from_backend(conn.get_database_backend())?;
        Ok(Self { conn, dialect })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn execute_tolerant(&self, what: &str, sql: &str) -> Result<EnsureOutcome, DbInfraError> {
        match self.conn.execute_unprepared(sql).await {
            Ok(_) => Ok(EnsureOutcome::Applied),
            Err(e) if is_benign_race(&e) => {
                warn!(what, error = %e, "schema_race=swallowed");
                Ok(EnsureOutcome::Raced)
            }
            Err(e) => Err(DbInfraError::statement(what, e)),
        }
    }

    /// Create `name` with `create_sql` unless the catalog already lists it.
    pub async fn ensure_table(
        &self,
        name: &str,
        create_sql: &str,
    ) -> Result<EnsureOutcome, DbInfraError> {
        if catalog::table_exists(self.conn, self.dialect, name).await? {
            debug!(table = name, "schema_table=present");
            return Ok(EnsureOutcome::AlreadyPresent);
        }
        info!(table = name, "schema_table=create");
        self.execute_tolerant(&format!("create table {name}"), create_sql)
            .await
    }

    /// Run `alter_sql` unless `table.column` already exists.
    pub async fn ensure_column(
        &self,
        table: &str,
        column: &str,
        alter_sql: &str,
    ) -> Result<EnsureOutcome, DbInfraError> {
        if catalog::column_info(self.conn, self.dialect, table, column)
            .await?
            .is_some()
        {
            return Ok(EnsureOutcome::AlreadyPresent);
        }
        info!(table, column, "schema_column=add");
        self.execute_tolerant(&format!("add column {table}.{column}"), alter_sql)
            .await
    }

    pub async fn ensure_index(
        &self,
        table: &str,
        index: &IndexSpec,
    ) -> Result<EnsureOutcome, DbInfraError> {
        let sql = self.dialect.create_index(table, index);
        self.execute_tolerant(&format!("create index {}", index.name), &sql)
            .await
    }

    /// Loosen a rigidly constrained enum-like column to a plain VARCHAR with
    /// its expected default. Row values are kept as they are.
    ///
    /// Returns `true` when the column was rewritten.
    pub async fn reconcile_enum_like_column(
        &self,
        table: &TableSpec,
        column: &ColumnSpec,
    ) -> Result<bool, DbInfraError> {
        let Some(info) = catalog::column_info(self.conn, self.dialect, table.name, column.name).await?
        else {
            return Ok(false);
        };
        let checks = catalog::column_checks(self.conn, self.dialect, table.name, column.name).await?;
        if !info.is_enum && checks.is_empty() {
            return Ok(false);
        }

        let definitions: Vec<&str> = checks.iter().map(|c| c.definition.as_str()).collect();
        warn!(
            table = table.name,
            column = column.name,
            enum_type = info.is_enum,
            checks = ?definitions,
            "schema_enum_like=loosen"
        );

        match self.dialect {
            Dialect::Postgres => self.loosen_postgres(table.name, column, &checks).await?,
            Dialect::Sqlite => self.rebuild_sqlite(table.name, column.name).await?,
        }
        Ok(true)
    }

    async fn loosen_postgres(
        &self,
        table: &str,
        column: &ColumnSpec,
        checks: &[CheckConstraint],
    ) -> Result<(), DbInfraError> {
        let what = format!("loosen {table}.{}", column.name);
        let statements = postgres_loosen_statements(self.dialect, table, column, checks);
        self.run_in_txn(&what, &statements).await
    }

    /// SQLite cannot drop a constraint in place. The table is recreated from
    /// its own stored DDL minus the CHECK clauses on `column`, so every other
    /// column keeps exactly the constraints it had and no row is rewritten.
    async fn rebuild_sqlite(&self, table: &str, column: &str) -> Result<(), DbInfraError> {
        let what = format!("rebuild {table}");
        let ddl = catalog::sqlite_table_ddl(self.conn, table)
            .await?
            .ok_or_else(|| {
                DbInfraError::statement(what.as_str(), DbErr::Custom("no stored DDL".into()))
            })?;
        let live = catalog::table_columns(self.conn, self.dialect, table).await?;
        let dependents = catalog::sqlite_dependent_ddl(self.conn, table).await?;

        let temp_name = format!("{table}{REBUILD_SUFFIX}");
        let statements =
            sqlite_rebuild_statements(table, &temp_name, &ddl, column, &live, &dependents)
                .ok_or_else(|| {
                    DbInfraError::statement(
                        what.as_str(),
                        DbErr::Custom("stored DDL has no column list".into()),
                    )
                })?;

        self.conn
            .execute_unprepared("PRAGMA foreign_keys = OFF")
            .await
            .map_err(|e| DbInfraError::statement(what.as_str(), e))?;

        let result = self.run_in_txn(&what, &statements).await;

        if let Err(e) = self.conn.execute_unprepared("PRAGMA foreign_keys = ON").await {
            warn!(table, error = %e, "schema_rebuild=fk_restore_failed");
        }
        if result.is_ok() {
            info!(table, columns = live.len(), "schema_rebuild=done");
        }
        result
    }

    async fn run_in_txn(&self, what: &str, statements: &[String]) -> Result<(), DbInfraError> {
        let txn = self
            .conn
            .begin()
            .await
            .map_err(|e| DbInfraError::statement(what, e))?;
        for sql in statements {
            debug!(sql = %sql, "schema_enum_like=statement");
            txn.execute_unprepared(sql)
                .await
                .map_err(|e| DbInfraError::statement(what, e))?;
        }
        txn.commit()
            .await
            .map_err(|e| DbInfraError::statement(what, e))
    }

    /// Apply advisory data fixes. Failures are logged and counted, never returned.
    pub async fn repair_known_data_defects(&self, repairs: &[RepairSpec]) -> RepairSummary {
        let mut summary = RepairSummary::default();
        for repair in repairs {
            summary.attempted += 1;
            match self.conn.execute_unprepared(repair.sql).await {
                Ok(res) => {
                    let rows = res.rows_affected();
                    summary.rows_affected += rows;
                    if rows > 0 {
                        info!(repair = repair.description, rows, "schema_repair=applied");
                    }
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(repair = repair.description, error = %e, "schema_repair=failed");
                }
            }
        }
        summary
    }

    /// Single startup entry point.
    ///
    /// Tables are processed in declaration order: create, add missing columns,
    /// loosen enum-like columns, ensure indexes, report drift. Repairs run last.
    pub async fn reconcile(
        &self,
        expectation: &SchemaExpectation,
    ) -> Result<ReconcileReport, DbInfraError> {
        info!(
            "schema_reconcile=start version={} dialect={:?} tables={}",
            expectation.version,
            self.dialect,
            expectation.tables.len()
        );
        let mut report = ReconcileReport::default();

        for table in expectation.tables {
            let create_sql = self.dialect.create_table(table);
            match self.ensure_table(table.name, &create_sql).await? {
                EnsureOutcome::Applied => report.tables_created.push(table.name.to_string()),
                EnsureOutcome::Raced => report.races += 1,
                EnsureOutcome::AlreadyPresent => {}
            }

            for column in table.columns {
                let alter_sql = self.dialect.add_column(table.name, column);
                match self.ensure_column(table.name, column.name, &alter_sql).await? {
                    EnsureOutcome::Applied => report
                        .columns_added
                        .push(format!("{}.{}", table.name, column.name)),
                    EnsureOutcome::Raced => report.races += 1,
                    EnsureOutcome::AlreadyPresent => {}
                }
            }

            for column in table.columns.iter().filter(|c| c.enum_like) {
                if self.reconcile_enum_like_column(table, column).await? {
                    report
                        .columns_loosened
                        .push(format!("{}.{}", table.name, column.name));
                }
            }

            for index in table.indexes {
                if self.ensure_index(table.name, index).await? == EnsureOutcome::Raced {
                    report.races += 1;
                }
                report.indexes_ensured += 1;
            }

            let live = catalog::table_columns(self.conn, self.dialect, table.name).await?;
            for drift in detect_drift(table, &live) {
                warn!(
                    table = %drift.table,
                    column = %drift.column,
                    kind = ?drift.kind,
                    "schema_drift=detected"
                );
                report.drift.push(drift);
            }
        }

        report.repairs = self.repair_known_data_defects(expectation.repairs).await;

        info!(
            "schema_reconcile=done tables_created={} columns_added={} columns_loosened={} races={} drift={} repairs_failed={}",
            report.tables_created.len(),
            report.columns_added.len(),
            report.columns_loosened.len(),
            report.races,
            report.drift.len(),
            report.repairs.failed
        );
        Ok(report)
    }
}

/// Reconcile `conn` against `expectation` in one call.
pub async fn reconcile(
    conn: &DatabaseConnection,
    expectation: &SchemaExpectation,
) -> Result<ReconcileReport, DbInfraError> {
    Reconciler::new(conn)?.reconcile(expectation).await
}

/// Drop the named CHECKs on `column`, turn it into a plain string column and
/// restore its default and NOT NULL. Anonymous checks cannot exist on
/// Postgres, so unnamed entries are skipped.
fn postgres_loosen_statements(
    dialect: Dialect,
    table: &str,
    column: &ColumnSpec,
    checks: &[CheckConstraint],
) -> Vec<String> {
    let t = quote_ident(table);
    let c = quote_ident(column.name);

    let mut statements: Vec<String> = checks
        .iter()
        .filter_map(|check| check.name.as_deref())
        .map(|name| format!("ALTER TABLE {t} DROP CONSTRAINT IF EXISTS {}", quote_ident(name)))
        .collect();
    // An enum-typed default would block the type change.
    statements.push(format!("ALTER TABLE {t} ALTER COLUMN {c} DROP DEFAULT"));
    statements.push(format!(
        "ALTER TABLE {t} ALTER COLUMN {c} TYPE {} USING {c}::text",
        dialect.type_sql(column.sql_type)
    ));
    if let Some(default) = column.default {
        let default_sql = dialect.default_sql(default);
        statements.push(format!("ALTER TABLE {t} ALTER COLUMN {c} SET DEFAULT {default_sql}"));
        if !column.nullable {
            statements.push(format!("UPDATE {t} SET {c} = {default_sql} WHERE {c} IS NULL"));
            statements.push(format!("ALTER TABLE {t} ALTER COLUMN {c} SET NOT NULL"));
        }
    }
    statements
}

/// Copy-and-swap of a SQLite table whose stored DDL loses its CHECKs on
/// `column`. Indexes and triggers go down with the old table and are
/// recreated from their stored text.
fn sqlite_rebuild_statements(
    table: &str,
    temp_name: &str,
    ddl: &str,
    column: &str,
    live: &[ColumnInfo],
    dependents: &[String],
) -> Option<Vec<String>> {
    let create = rename_create_table(&strip_column_checks(ddl, column), temp_name)?;
    let columns = live
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect::<Vec<_>>()
        .join(", ");

    let t = quote_ident(table);
    let tmp = quote_ident(temp_name);
    let mut statements = vec![
        format!("DROP TABLE IF EXISTS {tmp}"),
        create,
        format!("INSERT INTO {tmp} ({columns}) SELECT {columns} FROM {t}"),
        format!("DROP TABLE {t}"),
        format!("ALTER TABLE {tmp} RENAME TO {t}"),
    ];
    statements.extend(dependents.iter().cloned());
    Some(statements)
}

fn detect_drift(table: &TableSpec, live: &[ColumnInfo]) -> Vec<ColumnDrift> {
    let mut drift = Vec::new();
    for spec in table.columns.iter().filter(|c| !c.primary_key) {
        let Some(info) = live
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(spec.name))
        else {
            continue;
        };
        if info.primary_key {
            continue;
        }
        if info.nullable != spec.nullable {
            drift.push(ColumnDrift {
                table: table.name.to_string(),
                column: spec.name.to_string(),
                kind: DriftKind::Nullability {
                    expected_nullable: spec.nullable,
                },
            });
        }
        if spec.default.is_some() && info.default.is_none() {
            drift.push(ColumnDrift {
                table: table.name.to_string(),
                column: spec.name.to_string(),
                kind: DriftKind::MissingDefault,
            });
        }
    }
    drift
}
