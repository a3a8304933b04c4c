use std::sync::Arc;

use db_infra::DbKind;
use fittrack::infra::state::build_state;
use fittrack::services::nutrition::NutritionClient;
use fittrack::state::{AppState, SecurityConfig};

pub const TEST_SECRET: &[u8] = b"integration-test-secret-0123456789";

pub fn security() -> SecurityConfig {
    SecurityConfig::new(TEST_SECRET)
}

/// Fresh in-memory SQLite, reconciled, with the given nutrition client.
pub async fn sqlite_state(nutrition: Arc<dyn NutritionClient>) -> AppState {
    build_state()
        .with_db(DbKind::SqliteMemory)
        .with_security(security())
        .with_nutrition(nutrition)
        .build()
        .await
        .expect("build sqlite state")
}

/// No database; for routes that never touch persistence.
pub fn stateless(nutrition: Arc<dyn NutritionClient>) -> AppState {
    AppState::without_db(security(), nutrition)
}
