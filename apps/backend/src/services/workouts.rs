//! Workout log operations, scoped to the calling user.

use sea_orm::ConnectionTrait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos::workouts::{self, Workout, WorkoutFields};
use crate::services::validation::{finite, non_empty, optional_text, parse_date};

#[derive(Debug, Deserialize)]
pub struct WorkoutRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub duration: i64,
    #[serde(default)]
    pub calories_burned: f64,
    pub workout_date: String,
}

impl WorkoutRequest {
    pub fn validate(self) -> Result<WorkoutFields, AppError> {
        let name = non_empty("name", &self.name)?;
        if name.chars().count() > 255 {
            return Err(AppError::invalid("name must be at most 255 characters"));
        }
        let duration = i32::try_from(self.duration)
            .ok()
            .filter(|d| *d >= 1)
            .ok_or_else(|| AppError::invalid("duration must be a positive number of minutes"))?;
        let calories_burned = finite("calories_burned", self.calories_burned)?;
        if calories_burned < 0.0 {
            return Err(AppError::invalid("calories_burned must not be negative"));
        }
        Ok(WorkoutFields {
            name,
            description: optional_text(self.description),
            duration,
            calories_burned,
            workout_date: parse_date("workout_date", &self.workout_date)?,
        })
    }
}

fn not_found(id: i64) -> AppError {
    AppError::not_found(ErrorCode::WorkoutNotFound, format!("Workout {id} not found"))
}

/// Loads the row and checks it belongs to `user_id`.
async fn owned<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    id: i64,
) -> Result<Workout, AppError> {
    let workout = workouts::find_by_id(conn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if workout.user_id != user_id {
        warn!(user_id, workout_id = id, owner = workout.user_id, "workout_access_denied");
        return Err(AppError::forbidden());
    }
    Ok(workout)
}

pub async fn list<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Vec<Workout>, AppError> {
    workouts::list_for_user(conn, user_id).await
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    req: WorkoutRequest,
) -> Result<Workout, AppError> {
    let fields = req.validate()?;
    let workout = workouts::create(conn, user_id, fields).await?;
    info!(user_id, workout_id = workout.id, "workout_created");
    Ok(workout)
}

pub async fn update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    id: i64,
    req: WorkoutRequest,
) -> Result<Workout, AppError> {
    let fields = req.validate()?;
    owned(conn, user_id, id).await?;
    workouts::update(conn, id, fields)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn delete<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    id: i64,
) -> Result<(), AppError> {
    owned(conn, user_id, id).await?;
    if !workouts::delete(conn, id).await? {
        return Err(not_found(id));
    }
    info!(user_id, workout_id = id, "workout_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn request() -> WorkoutRequest {
        WorkoutRequest {
            name: "Leg day".into(),
            description: Some("  ".into()),
            duration: 45,
            calories_burned: 320.5,
            workout_date: "2024-05-01".into(),
        }
    }

    #[test]
    fn valid_request() {
        let fields = request().validate().unwrap();
        assert_eq!(fields.duration, 45);
        assert_eq!(fields.description, None);
        assert_eq!(fields.workout_date, date!(2024 - 05 - 01));
    }

    #[test]
    fn calories_default_to_zero() {
        let req: WorkoutRequest = serde_json::from_value(serde_json::json!({
            "name": "Walk",
            "duration": 20,
            "workout_date": "2024-05-02"
        }))
        .unwrap();
        assert_eq!(req.validate().unwrap().calories_burned, 0.0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        for duration in [0, -5, i64::from(i32::MAX) + 1] {
            let mut req = request();
            req.duration = duration;
            assert_eq!(req.validate().unwrap_err().code(), ErrorCode::ValidationError);
        }

        let mut req = request();
        req.calories_burned = -1.0;
        assert!(req.validate().is_err());

        let mut req = request();
        req.workout_date = "01/05/2024".into();
        assert!(req.validate().is_err());

        let mut req = request();
        req.name = " ".into();
        assert!(req.validate().is_err());
    }
}
