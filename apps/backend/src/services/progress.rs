//! Body progress log operations, scoped to the calling user.

use sea_orm::ConnectionTrait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos::progress::{self, ProgressEntry, ProgressFields};
use crate::services::validation::{finite, optional_text, parse_date, today_utc};

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub weight: f64,
    #[serde(default)]
    pub body_fat: f64,
    #[serde(default)]
    pub muscle_mass: f64,
    #[serde(default)]
    pub notes: Option<String>,
    /// Today (UTC) when absent.
    #[serde(default)]
    pub progress_date: Option<String>,
}

impl ProgressRequest {
    pub fn validate(self) -> Result<ProgressFields, AppError> {
        let weight = finite("weight", self.weight)?;
        if weight <= 0.0 {
            return Err(AppError::invalid("weight must be positive"));
        }
        let body_fat = finite("body_fat", self.body_fat)?;
        if !(0.0..=100.0).contains(&body_fat) {
            return Err(AppError::invalid("body_fat must be between 0 and 100"));
        }
        let muscle_mass = finite("muscle_mass", self.muscle_mass)?;
        if muscle_mass < 0.0 {
            return Err(AppError::invalid("muscle_mass must not be negative"));
        }
        let progress_date = match self.progress_date.as_deref().map(str::trim) {
            None | Some("") => today_utc(),
            Some(raw) => parse_date("progress_date", raw)?,
        };
        Ok(ProgressFields {
            weight,
            body_fat,
            muscle_mass,
            notes: optional_text(self.notes),
            progress_date,
        })
    }
}

fn not_found(id: i64) -> AppError {
    AppError::not_found(
        ErrorCode::ProgressNotFound,
        format!("Progress entry {id} not found"),
    )
}

async fn owned<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    id: i64,
) -> Result<ProgressEntry, AppError> {
    let entry = progress::find_by_id(conn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if entry.user_id != user_id {
        warn!(user_id, progress_id = id, owner = entry.user_id, "progress_access_denied");
        return Err(AppError::forbidden());
    }
    Ok(entry)
}

pub async fn list<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Vec<ProgressEntry>, AppError> {
    progress::list_for_user(conn, user_id).await
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    req: ProgressRequest,
) -> Result<ProgressEntry, AppError> {
    let entry = progress::create(conn, user_id, req.validate()?).await?;
    info!(user_id, progress_id = entry.id, "progress_created");
    Ok(entry)
}

pub async fn update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    id: i64,
    req: ProgressRequest,
) -> Result<ProgressEntry, AppError> {
    let fields = req.validate()?;
    owned(conn, user_id, id).await?;
    progress::update(conn, id, fields)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn delete<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    id: i64,
) -> Result<(), AppError> {
    owned(conn, user_id, id).await?;
    if !progress::delete(conn, id).await? {
        return Err(not_found(id));
    }
    info!(user_id, progress_id = id, "progress_deleted");
    Ok(())
}
