use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::entities::progress;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEntry {
    pub id: i64,
    pub user_id: i64,
    pub weight: f64,
    pub body_fat: f64,
    pub muscle_mass: f64,
    pub notes: Option<String>,
    pub progress_date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct ProgressFields {
    pub weight: f64,
    pub body_fat: f64,
    pub muscle_mass: f64,
    pub notes: Option<String>,
    pub progress_date: Date,
}

pub async fn list_for_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Vec<ProgressEntry>, AppError> {
    let rows = progress::Entity::find()
        .filter(progress::Column::UserId.eq(user_id))
        .order_by_desc(progress::Column::ProgressDate)
        .order_by_desc(progress::Column::Id)
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(ProgressEntry::from).collect())
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<ProgressEntry>, AppError> {
    Ok(progress::Entity::find_by_id(id)
        .one(conn)
        .await?
        .map(ProgressEntry::from))
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    fields: ProgressFields,
) -> Result<ProgressEntry, AppError> {
    let now = OffsetDateTime::now_utc();
    let active = progress::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        weight: Set(fields.weight),
        body_fat: Set(fields.body_fat),
        muscle_mass: Set(fields.muscle_mass),
        notes: Set(fields.notes),
        progress_date: Set(fields.progress_date),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(ProgressEntry::from(active.insert(conn).await?))
}

pub async fn update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    fields: ProgressFields,
) -> Result<Option<ProgressEntry>, AppError> {
    let Some(model) = progress::Entity::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };
    let mut active: progress::ActiveModel = model.into();
    active.weight = Set(fields.weight);
    active.body_fat = Set(fields.body_fat);
    active.muscle_mass = Set(fields.muscle_mass);
    active.notes = Set(fields.notes);
    active.progress_date = Set(fields.progress_date);
    active.updated_at = Set(OffsetDateTime::now_utc());
    Ok(Some(ProgressEntry::from(active.update(conn).await?)))
}

pub async fn delete<C: ConnectionTrait + Send + Sync>(conn: &C, id: i64) -> Result<bool, AppError> {
    let Some(model) = progress::Entity::find_by_id(id).one(conn).await? else {
        return Ok(false);
    };
    Ok(model.delete(conn).await?.rows_affected == 1)
}

impl From<progress::Model> for ProgressEntry {
    fn from(model: progress::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            weight: model.weight,
            body_fat: model.body_fat,
            muscle_mass: model.muscle_mass,
            notes: model.notes,
            progress_date: model.progress_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
