//! Database connection settings and startup schema reconciliation.
//! Used by the backend before it starts accepting traffic.

pub mod config;
pub mod error;
pub mod infra;
pub mod schema;

pub use config::db::{db_url, DbKind};
pub use error::DbInfraError;
pub use infra::db::pool::connect_pool;
pub use schema::expectation::{
    ColumnSpec, DefaultValue, ForeignKey, IndexSpec, RepairSpec, SchemaExpectation, SqlType,
    TableSpec,
};
pub use schema::reconciler::{reconcile, EnsureOutcome, ReconcileReport, Reconciler};

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}
