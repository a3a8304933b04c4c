//! Static description of the schema the application expects to find.
//!
//! Everything here is `'static` and built with `const fn`s so the backend
//! can declare its expectation as a plain `static` item.

/// Column types the reconciler knows how to render for every dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    /// Auto-incrementing 64-bit primary key.
    BigSerial,
    BigInt,
    Integer,
    Varchar(u32),
    Text,
    Double,
    Date,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Int(i64),
    Real(f64),
    Text(&'static str),
    CurrentDate,
    CurrentTimestamp,
}

impl DefaultValue {
    /// Whether the engine evaluates this default per row rather than storing a literal.
    pub fn is_constant(&self) -> bool {
        !matches!(self, DefaultValue::CurrentDate | DefaultValue::CurrentTimestamp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
    pub on_delete_cascade: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub default: Option<DefaultValue>,
    pub primary_key: bool,
    pub unique: bool,
    pub references: Option<ForeignKey>,
    /// Raw SQL boolean expression, rendered as `CHECK (...)`.
    pub check: Option<&'static str>,
    /// Value set is open-ended; any CHECK or enum type found live is loosened.
    pub enum_like: bool,
}

impl ColumnSpec {
    /// A nullable column with no default and no constraints.
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            nullable: true,
            default: None,
            primary_key: false,
            unique: false,
            references: None,
            check: None,
            enum_like: false,
        }
    }

    pub const fn id(name: &'static str) -> Self {
        let mut col = Self::new(name, SqlType::BigSerial);
        col.nullable = false;
        col.primary_key = true;
        col
    }

    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub const fn default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn check(mut self, expr: &'static str) -> Self {
        self.check = Some(expr);
        self
    }

    pub const fn references_cascade(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some(ForeignKey {
            table,
            column,
            on_delete_cascade: true,
        });
        self
    }

    pub const fn enum_like(mut self) -> Self {
        self.enum_like = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub unique: bool,
}

impl IndexSpec {
    pub const fn new(name: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            name,
            columns,
            unique: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
    pub indexes: &'static [IndexSpec],
}

impl TableSpec {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Best-effort data fix applied after structure is in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairSpec {
    pub description: &'static str,
    /// Must be valid on every supported dialect.
    pub sql: &'static str,
}

/// Versioned, compiled-in description of required tables, columns and repairs.
///
/// Tables are reconciled in declaration order, so tables referenced by a
/// foreign key must be listed before the tables that reference them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaExpectation {
    pub version: &'static str,
    pub tables: &'static [TableSpec],
    pub repairs: &'static [RepairSpec],
}

impl SchemaExpectation {
    pub fn table(&self, name: &str) -> Option<&TableSpec> {
        self.tables.iter().find(|t| t.name == name)
    }
}
