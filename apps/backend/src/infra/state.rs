use std::sync::Arc;

use db_infra::DbKind;
use tracing::info;

use crate::config::NutritionConfig;
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::infra::schema::SCHEMA_VERSION;
use crate::services::nutrition::{NutritionClient, OpenFoodFactsClient};
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

/// Builder for `AppState`, shared by `main` and the integration tests.
pub struct StateBuilder {
    security_config: SecurityConfig,
    db_kind: Option<DbKind>,
    nutrition_config: NutritionConfig,
    nutrition: Option<Arc<dyn NutritionClient>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            security_config: SecurityConfig::default(),
            db_kind: None,
            nutrition_config: NutritionConfig::default(),
            nutrition: None,
        }
    }

    pub fn with_db(mut self, kind: DbKind) -> Self {
        self.db_kind = Some(kind);
        self
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = security_config;
        self
    }

    pub fn with_nutrition_config(mut self, config: NutritionConfig) -> Self {
        self.nutrition_config = config;
        self
    }

    /// Replaces the Open Food Facts client entirely.
    pub fn with_nutrition(mut self, client: Arc<dyn NutritionClient>) -> Self {
        self.nutrition = Some(client);
        self
    }

    /// Connects and reconciles the schema when a database was requested.
    pub async fn build(self) -> Result<AppState, AppError> {
        let nutrition: Arc<dyn NutritionClient> = match self.nutrition {
            Some(client) => client,
            None => Arc::new(OpenFoodFactsClient::new(&self.nutrition_config)?),
        };

        let Some(kind) = self.db_kind else {
            return Ok(AppState::without_db(self.security_config, nutrition));
        };

        let (conn, report) = bootstrap_db(kind).await?;
        info!(
            db_kind = %kind,
            schema_version = SCHEMA_VERSION,
            tables_created = report.tables_created.len(),
            columns_added = report.columns_added.len(),
            columns_loosened = report.columns_loosened.len(),
            drift = report.drift.len(),
            "schema_reconciled"
        );

        let mut state = AppState::new(conn, self.security_config, nutrition);
        state.schema_version = Some(SCHEMA_VERSION);
        Ok(state)
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_without_db() {
        let state = build_state().build().await.unwrap();
        assert!(state.db().is_none());
        assert_eq!(state.schema_version, None);
    }

    #[tokio::test]
    async fn sqlite_memory_is_reconciled() {
        let state = build_state().with_db(DbKind::SqliteMemory).build().await.unwrap();
        assert!(state.db().is_some());
        assert_eq!(state.schema_version, Some(SCHEMA_VERSION));
    }
}
