//! The schema this build of the service expects. Reconciled at startup by
//! `db_infra::reconcile`; bump `SCHEMA_VERSION` whenever a table changes.

use db_infra::{
    ColumnSpec, DefaultValue, IndexSpec, RepairSpec, SchemaExpectation, SqlType, TableSpec,
};

pub const SCHEMA_VERSION: &str = "fittrack-3";

pub const GOALS: [&str; 2] = ["lose_weight", "hypertrophy"];
pub const DEFAULT_ROLE: &str = "user";

const USERS: &[ColumnSpec] = &[
    ColumnSpec::id("id"),
    ColumnSpec::new("name", SqlType::Varchar(100)).not_null(),
    ColumnSpec::new("email", SqlType::Varchar(100))
        .not_null()
        .unique(),
    // Argon2 PHC string; the column name predates hashing.
    ColumnSpec::new("password", SqlType::Varchar(255))
        .not_null()
        .default(DefaultValue::Text("")),
    ColumnSpec::new("goal", SqlType::Varchar(50))
        .not_null()
        .check("goal IN ('lose_weight', 'hypertrophy')"),
    // Older deployments pinned this to ('admin', 'user', 'premium').
    ColumnSpec::new("role", SqlType::Varchar(20))
        .not_null()
        .default(DefaultValue::Text(DEFAULT_ROLE))
        .enum_like(),
    ColumnSpec::new("height", SqlType::Double),
    ColumnSpec::new("weight", SqlType::Double),
    ColumnSpec::new("created_at", SqlType::Timestamp)
        .not_null()
        .default(DefaultValue::CurrentTimestamp),
    ColumnSpec::new("updated_at", SqlType::Timestamp)
        .not_null()
        .default(DefaultValue::CurrentTimestamp),
];

const WORKOUTS: &[ColumnSpec] = &[
    ColumnSpec::id("id"),
    ColumnSpec::new("user_id", SqlType::BigInt)
        .not_null()
        .references_cascade("users", "id"),
    ColumnSpec::new("name", SqlType::Varchar(255)).not_null(),
    ColumnSpec::new("description", SqlType::Text),
    ColumnSpec::new("duration", SqlType::Integer)
        .not_null()
        .check("duration > 0"),
    ColumnSpec::new("calories_burned", SqlType::Double)
        .not_null()
        .default(DefaultValue::Real(0.0))
        .check("calories_burned >= 0"),
    ColumnSpec::new("workout_date", SqlType::Date)
        .not_null()
        .default(DefaultValue::CurrentDate),
    ColumnSpec::new("created_at", SqlType::Timestamp)
        .not_null()
        .default(DefaultValue::CurrentTimestamp),
    ColumnSpec::new("updated_at", SqlType::Timestamp)
        .not_null()
        .default(DefaultValue::CurrentTimestamp),
];

const PROGRESS: &[ColumnSpec] = &[
    ColumnSpec::id("id"),
    ColumnSpec::new("user_id", SqlType::BigInt)
        .not_null()
        .references_cascade("users", "id"),
    ColumnSpec::new("weight", SqlType::Double)
        .not_null()
        .check("weight > 0"),
    ColumnSpec::new("body_fat", SqlType::Double)
        .not_null()
        .default(DefaultValue::Real(0.0))
        .check("body_fat >= 0 AND body_fat <= 100"),
    ColumnSpec::new("muscle_mass", SqlType::Double)
        .not_null()
        .default(DefaultValue::Real(0.0))
        .check("muscle_mass >= 0"),
    ColumnSpec::new("notes", SqlType::Text),
    ColumnSpec::new("progress_date", SqlType::Date)
        .not_null()
        .default(DefaultValue::CurrentDate),
    ColumnSpec::new("created_at", SqlType::Timestamp)
        .not_null()
        .default(DefaultValue::CurrentTimestamp),
    ColumnSpec::new("updated_at", SqlType::Timestamp)
        .not_null()
        .default(DefaultValue::CurrentTimestamp),
];

/// Base tables first; later tables reference them.
pub const TABLES: &[TableSpec] = &[
    TableSpec {
        name: "users",
        columns: USERS,
        indexes: &[IndexSpec::new("idx_users_role", &["role"])],
    },
    TableSpec {
        name: "workouts",
        columns: WORKOUTS,
        indexes: &[
            IndexSpec::new("idx_workouts_user_id", &["user_id"]),
            IndexSpec::new("idx_workouts_workout_date", &["workout_date"]),
        ],
    },
    TableSpec {
        name: "progress",
        columns: PROGRESS,
        indexes: &[
            IndexSpec::new("idx_progress_user_id", &["user_id"]),
            IndexSpec::new("idx_progress_progress_date", &["progress_date"]),
        ],
    },
];

pub const REPAIRS: &[RepairSpec] = &[
    RepairSpec {
        description: "null password hashes",
        sql: "UPDATE users SET password = '' WHERE password IS NULL",
    },
    RepairSpec {
        description: "missing roles",
        sql: "UPDATE users SET role = 'user' WHERE role IS NULL OR role = ''",
    },
    RepairSpec {
        description: "null workout calories",
        sql: "UPDATE workouts SET calories_burned = 0 WHERE calories_burned IS NULL",
    },
    RepairSpec {
        description: "undated workouts",
        sql: "UPDATE workouts SET workout_date = CURRENT_DATE WHERE workout_date IS NULL",
    },
    RepairSpec {
        description: "null body metrics",
        sql: "UPDATE progress SET body_fat = COALESCE(body_fat, 0), muscle_mass = COALESCE(muscle_mass, 0) \
              WHERE body_fat IS NULL OR muscle_mass IS NULL",
    },
    RepairSpec {
        description: "undated progress entries",
        sql: "UPDATE progress SET progress_date = CURRENT_DATE WHERE progress_date IS NULL",
    },
];

pub static SCHEMA: SchemaExpectation = SchemaExpectation {
    version: SCHEMA_VERSION,
    tables: TABLES,
    repairs: REPAIRS,
};
