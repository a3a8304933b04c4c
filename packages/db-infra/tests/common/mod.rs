#![allow(dead_code)]

use db_infra::{
    connect_pool, ColumnSpec, DbKind, DefaultValue, IndexSpec, RepairSpec, SchemaExpectation,
    SqlType, TableSpec,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, QueryResult, Statement};

#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

const USERS_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::id("id"),
    ColumnSpec::new("name", SqlType::Varchar(100)).not_null(),
    ColumnSpec::new("email", SqlType::Varchar(100))
        .not_null()
        .unique(),
    ColumnSpec::new("password", SqlType::Varchar(255))
        .not_null()
        .default(DefaultValue::Text("")),
    ColumnSpec::new("goal", SqlType::Varchar(50))
        .not_null()
        .check("goal IN ('lose_weight', 'hypertrophy')"),
    ColumnSpec::new("role", SqlType::Varchar(20))
        .not_null()
        .default(DefaultValue::Text("user"))
        .enum_like(),
    ColumnSpec::new("height", SqlType::Double),
    ColumnSpec::new("created_at", SqlType::Timestamp)
        .not_null()
        .default(DefaultValue::CurrentTimestamp),
];

const WORKOUTS_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::id("id"),
    ColumnSpec::new("user_id", SqlType::BigInt)
        .not_null()
        .references_cascade("users", "id"),
    ColumnSpec::new("name", SqlType::Varchar(255)).not_null(),
    ColumnSpec::new("duration", SqlType::Integer)
        .not_null()
        .check("duration > 0"),
    ColumnSpec::new("calories_burned", SqlType::Double)
        .not_null()
        .default(DefaultValue::Real(0.0)),
    ColumnSpec::new("workout_date", SqlType::Date)
        .not_null()
        .default(DefaultValue::CurrentDate),
];

pub const REPAIRS: &[RepairSpec] = &[
    RepairSpec {
        description: "blank password hashes",
        sql: "UPDATE users SET password = '' WHERE password IS NULL",
    },
    RepairSpec {
        description: "missing roles",
        sql: "UPDATE users SET role = 'user' WHERE role IS NULL OR role = ''",
    },
    RepairSpec {
        description: "undated workouts",
        sql: "UPDATE workouts SET workout_date = CURRENT_DATE WHERE workout_date IS NULL",
    },
];

pub const TEST_TABLES: &[TableSpec] = &[
    TableSpec {
        name: "users",
        columns: USERS_COLUMNS,
        indexes: &[IndexSpec::new("idx_users_role", &["role"])],
    },
    TableSpec {
        name: "workouts",
        columns: WORKOUTS_COLUMNS,
        indexes: &[IndexSpec::new("idx_workouts_user_id", &["user_id"])],
    },
];

pub static TEST_SCHEMA: SchemaExpectation = SchemaExpectation {
    version: "test-1",
    tables: TEST_TABLES,
    repairs: REPAIRS,
};

pub async fn memory_db() -> DatabaseConnection {
    connect_pool(DbKind::SqliteMemory, "sqlite::memory:")
        .await
        .expect("open in-memory sqlite")
}

pub async fn exec(conn: &DatabaseConnection, sql: &str) {
    conn.execute_unprepared(sql)
        .await
        .unwrap_or_else(|e| panic!("statement failed: {sql}: {e}"));
}

pub async fn rows(conn: &DatabaseConnection, sql: &str) -> Vec<QueryResult> {
    conn.query_all(Statement::from_string(DbBackend::Sqlite, sql.to_string()))
        .await
        .unwrap_or_else(|e| panic!("query failed: {sql}: {e}"))
}

/// `(name, notnull, dflt_value)` for every column of `table`, in order.
pub async fn column_shape(
    conn: &DatabaseConnection,
    table: &str,
) -> Vec<(String, bool, Option<String>)> {
    let sql = format!(
        "SELECT name, \"notnull\" AS not_null, dflt_value FROM pragma_table_info('{table}') ORDER BY cid"
    );
    rows(conn, &sql)
        .await
        .iter()
        .map(|r| {
            let name: String = r.try_get("", "name").unwrap();
            let not_null: i64 = r.try_get("", "not_null").unwrap();
            let default: Option<String> = r.try_get("", "dflt_value").unwrap();
            (name, not_null == 1, default)
        })
        .collect()
}

pub async fn table_names(conn: &DatabaseConnection) -> Vec<String> {
    rows(
        conn,
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .await
    .iter()
    .map(|r| r.try_get::<String>("", "name").unwrap())
    .collect()
}

pub async fn roles_by_name(conn: &DatabaseConnection) -> Vec<(String, String)> {
    rows(conn, "SELECT name, role FROM users ORDER BY name")
        .await
        .iter()
        .map(|r| {
            (
                r.try_get::<String>("", "name").unwrap(),
                r.try_get::<String>("", "role").unwrap(),
            )
        })
        .collect()
}
