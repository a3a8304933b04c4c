use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::security_config::SecurityConfig;
use crate::services::nutrition::NutritionClient;

/// Shared resources handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    /// `None` only in tests that never touch persistence.
    pub db: Option<DatabaseConnection>,
    pub security: SecurityConfig,
    pub nutrition: Arc<dyn NutritionClient>,
    /// Version of the schema expectation the database was reconciled to.
    pub schema_version: Option<&'static str>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        security: SecurityConfig,
        nutrition: Arc<dyn NutritionClient>,
    ) -> Self {
        Self {
            db: Some(db),
            security,
            nutrition,
            schema_version: None,
        }
    }

    pub fn without_db(security: SecurityConfig, nutrition: Arc<dyn NutritionClient>) -> Self {
        Self {
            db: None,
            security,
            nutrition,
            schema_version: None,
        }
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db.is_some())
            .field("security", &self.security)
            .field("schema_version", &self.schema_version)
            .finish_non_exhaustive()
    }
}
