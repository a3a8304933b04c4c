//! DDL rendering per engine.

use sea_orm::DbBackend;

use super::expectation::{ColumnSpec, DefaultValue, IndexSpec, SqlType, TableSpec};
use crate::error::DbInfraError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    pub fn from_backend(backend: DbBackend) -> Result<Self, DbInfraError> {
        match backend {
            DbBackend::Postgres => Ok(Dialect::Postgres),
            DbBackend::Sqlite => Ok(Dialect::Sqlite),
            other => Err(DbInfraError::config(format!(
                "schema reconciliation is not supported for {other:?}"
            ))),
        }
    }

    pub fn backend(self) -> DbBackend {
        match self {
            Dialect::Postgres => DbBackend::Postgres,
            Dialect::Sqlite => DbBackend::Sqlite,
        }
    }

    pub fn type_sql(self, ty: SqlType) -> String {
        match (self, ty) {
            (Dialect::Postgres, SqlType::BigSerial) => "BIGSERIAL".to_string(),
            (Dialect::Sqlite, SqlType::BigSerial) => "INTEGER".to_string(),
            (Dialect::Postgres, SqlType::BigInt) => "BIGINT".to_string(),
            (Dialect::Sqlite, SqlType::BigInt) => "INTEGER".to_string(),
            (_, SqlType::Integer) => "INTEGER".to_string(),
            (_, SqlType::Varchar(n)) => format!("VARCHAR({n})"),
            (_, SqlType::Text) => "TEXT".to_string(),
            (Dialect::Postgres, SqlType::Double) => "DOUBLE PRECISION".to_string(),
            (Dialect::Sqlite, SqlType::Double) => "REAL".to_string(),
            (_, SqlType::Date) => "DATE".to_string(),
            (Dialect::Postgres, SqlType::Timestamp) => "TIMESTAMPTZ".to_string(),
            (Dialect::Sqlite, SqlType::Timestamp) => "TIMESTAMP".to_string(),
        }
    }

    pub fn default_sql(self, value: DefaultValue) -> String {
        match value {
            DefaultValue::Int(n) => n.to_string(),
            DefaultValue::Real(x) => {
                let s = x.to_string();
                if s.contains('.') || s.contains('e') {
                    s
                } else {
                    format!("{s}.0")
                }
            }
            DefaultValue::Text(s) => quote_literal(s),
            DefaultValue::CurrentDate => "CURRENT_DATE".to_string(),
            DefaultValue::CurrentTimestamp => "CURRENT_TIMESTAMP".to_string(),
        }
    }

    /// Column definition as it appears inside `CREATE TABLE`.
    pub fn column_definition(self, col: &ColumnSpec) -> String {
        if col.sql_type == SqlType::BigSerial {
            return match self {
                Dialect::Postgres => format!("{} BIGSERIAL PRIMARY KEY", quote_ident(col.name)),
                Dialect::Sqlite => {
                    format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", quote_ident(col.name))
                }
            };
        }

        let mut def = format!("{} {}", quote_ident(col.name), self.type_sql(col.sql_type));
        if col.primary_key {
            def.push_str(" PRIMARY KEY");
        }
        if !col.nullable {
            def.push_str(" NOT NULL");
        }
        if let Some(value) = col.default {
            def.push_str(" DEFAULT ");
            def.push_str(&self.default_sql(value));
        }
        if col.unique {
            def.push_str(" UNIQUE");
        }
        if let Some(expr) = col.check {
            def.push_str(&format!(" CHECK ({expr})"));
        }
        if let Some(fk) = col.references {
            def.push_str(&format!(
                " REFERENCES {}({})",
                quote_ident(fk.table),
                quote_ident(fk.column)
            ));
            if fk.on_delete_cascade {
                def.push_str(" ON DELETE CASCADE");
            }
        }
        def
    }

    /// Column definition for `ALTER TABLE ... ADD COLUMN` on a possibly populated table.
    ///
    /// Primary key and uniqueness are never added after the fact. NOT NULL is
    /// kept only when a default can fill existing rows; SQLite additionally
    /// refuses non-constant defaults and foreign keys with a non-NULL default,
    /// so those columns come in nullable and the repair step backfills them.
    pub fn add_column_definition(self, col: &ColumnSpec) -> String {
        let usable_default = col.default.filter(|d| match self {
            Dialect::Postgres => true,
            Dialect::Sqlite => d.is_constant(),
        });

        let mut def = format!("{} {}", quote_ident(col.name), self.type_sql(col.sql_type));
        if !col.nullable && usable_default.is_some() {
            def.push_str(" NOT NULL");
        }
        if let Some(value) = usable_default {
            def.push_str(" DEFAULT ");
            def.push_str(&self.default_sql(value));
        }
        if let Some(expr) = col.check {
            def.push_str(&format!(" CHECK ({expr})"));
        }
        if let Some(fk) = col.references {
            if self == Dialect::Postgres || usable_default.is_none() {
                def.push_str(&format!(
                    " REFERENCES {}({})",
                    quote_ident(fk.table),
                    quote_ident(fk.column)
                ));
                if fk.on_delete_cascade {
                    def.push_str(" ON DELETE CASCADE");
                }
            }
        }
        def
    }

    pub fn create_table(self, table: &TableSpec) -> String {
        let defs: Vec<String> = table
            .columns
            .iter()
            .map(|c| self.column_definition(c))
            .collect();
        format!(
            "CREATE TABLE {} (\n    {}\n)",
            quote_ident(table.name),
            defs.join(",\n    ")
        )
    }

    pub fn add_column(self, table: &str, col: &ColumnSpec) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {}",
            quote_ident(table),
            self.add_column_definition(col)
        )
    }

    pub fn create_index(self, table: &str, index: &IndexSpec) -> String {
        let columns: Vec<String> = index.columns.iter().map(|c| quote_ident(c)).collect();
        format!(
            "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
            if index.unique { "UNIQUE " } else { "" },
            quote_ident(index.name),
            quote_ident(table),
            columns.join(", ")
        )
    }
}

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
