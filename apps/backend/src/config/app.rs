//! Process configuration, read once from the environment at startup.

use std::env;
use std::time::Duration;

use db_infra::DbKind;

use crate::error::AppError;
use crate::middleware::cors::parse_origins;

pub const DEFAULT_NUTRITION_BASE_URL: &str = "https://world.openfoodfacts.org";
const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_NUTRITION_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct NutritionConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NUTRITION_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_NUTRITION_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: Vec<u8>,
    pub token_ttl: Duration,
    pub db_kind: DbKind,
    pub nutrition: NutritionConfig,
    /// Empty means the localhost development origins.
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let host = optional_var("BACKEND_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_var("BACKEND_PORT", 3001u16)?;

        let jwt_secret = optional_var("BACKEND_JWT_SECRET")
            .ok_or_else(|| AppError::config("BACKEND_JWT_SECRET must be set"))?
            .into_bytes();
        let token_ttl =
            Duration::from_secs(parse_var("BACKEND_JWT_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?);
        if token_ttl.is_zero() {
            return Err(AppError::config("BACKEND_JWT_TTL_SECS must be positive"));
        }

        let db_kind = match optional_var("DB_KIND") {
            Some(raw) => raw.parse::<DbKind>()?,
            None => DbKind::Postgres,
        };

        let nutrition = NutritionConfig {
            base_url: optional_var("NUTRITION_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_NUTRITION_BASE_URL.to_string()),
            timeout: Duration::from_secs(parse_var(
                "NUTRITION_TIMEOUT_SECS",
                DEFAULT_NUTRITION_TIMEOUT_SECS,
            )?),
        };

        let cors_origins = optional_var("CORS_ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            jwt_secret,
            token_ttl,
            db_kind,
            nutrition,
            cors_origins,
        })
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match optional_var(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("{key} has an invalid value: '{raw}'"))),
    }
}
