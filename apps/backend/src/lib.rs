//! FitTrack HTTP backend: accounts, workout and progress logs, and
//! nutrition lookups, behind a bearer-token gate.

pub mod auth;
pub mod config;
pub mod entities;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod infra;
pub mod logging;
pub mod middleware;
pub mod repos;
pub mod routes;
pub mod services;
pub mod state;
pub mod trace_ctx;

pub use auth::jwt::{mint_access_token, verify_access_token, verify_access_token_at, AuthError, Claims};
pub use auth::AuthenticatedUser;
pub use config::AppConfig;
pub use error::AppError;
pub use errors::ErrorCode;
pub use extractors::{CurrentUser, RecordId, ValidatedJson};
pub use infra::db::connect_db;
pub use infra::state::{build_state, StateBuilder};
pub use middleware::{cors_middleware, AuthGate, RequestTrace, StructuredLogger, TraceSpan};
pub use state::{AppState, SecurityConfig};

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}
