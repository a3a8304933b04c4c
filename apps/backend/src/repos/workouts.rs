use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::entities::workouts;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workout {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub duration: i32,
    pub calories_burned: f64,
    pub workout_date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields a client may set on create and update.
#[derive(Debug, Clone)]
pub struct WorkoutFields {
    pub name: String,
    pub description: Option<String>,
    pub duration: i32,
    pub calories_burned: f64,
    pub workout_date: Date,
}

/// Newest `workout_date` first; ties broken by newest id.
pub async fn list_for_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Vec<Workout>, AppError> {
    let rows = workouts::Entity::find()
        .filter(workouts::Column::UserId.eq(user_id))
        .order_by_desc(workouts::Column::WorkoutDate)
        .order_by_desc(workouts::Column::Id)
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(Workout::from).collect())
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<Workout>, AppError> {
    Ok(workouts::Entity::find_by_id(id).one(conn).await?.map(Workout::from))
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    fields: WorkoutFields,
) -> Result<Workout, AppError> {
    let now = OffsetDateTime::now_utc();
    let active = workouts::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        name: Set(fields.name),
        description: Set(fields.description),
        duration: Set(fields.duration),
        calories_burned: Set(fields.calories_burned),
        workout_date: Set(fields.workout_date),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(Workout::from(active.insert(conn).await?))
}

/// Overwrites the client fields of an existing row. `None` when the row is gone.
pub async fn update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    fields: WorkoutFields,
) -> Result<Option<Workout>, AppError> {
    let Some(model) = workouts::Entity::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };
    let mut active: workouts::ActiveModel = model.into();
    active.name = Set(fields.name);
    active.description = Set(fields.description);
    active.duration = Set(fields.duration);
    active.calories_burned = Set(fields.calories_burned);
    active.workout_date = Set(fields.workout_date);
    active.updated_at = Set(OffsetDateTime::now_utc());
    Ok(Some(Workout::from(active.update(conn).await?)))
}

/// Returns whether a row was removed.
pub async fn delete<C: ConnectionTrait + Send + Sync>(conn: &C, id: i64) -> Result<bool, AppError> {
    let Some(model) = workouts::Entity::find_by_id(id).one(conn).await? else {
        return Ok(false);
    };
    let res = model.delete(conn).await?;
    Ok(res.rows_affected == 1)
}

impl From<workouts::Model> for Workout {
    fn from(model: workouts::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            description: model.description,
            duration: model.duration,
            calories_burned: model.calories_burned,
            workout_date: model.workout_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
