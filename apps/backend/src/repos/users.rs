use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, Set};
use serde::Serialize;
use time::OffsetDateTime;

use crate::entities::users;
use crate::error::AppError;

/// Account as exposed over HTTP. The password hash never leaves this module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub goal: String,
    pub role: String,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Account plus its stored hash, for login only.
#[derive(Debug, Clone)]
pub struct UserWithSecret {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub goal: String,
    pub role: String,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

pub async fn create_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    new: NewUser,
) -> Result<User, AppError> {
    let now = OffsetDateTime::now_utc();
    let active = users::ActiveModel {
        id: NotSet,
        name: Set(new.name),
        email: Set(new.email),
        password_hash: Set(new.password_hash),
        goal: Set(new.goal),
        role: Set(new.role),
        height: Set(new.height),
        weight: Set(new.weight),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(User::from(active.insert(conn).await?))
}

pub async fn find_by_email<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    email: &str,
) -> Result<Option<UserWithSecret>, AppError> {
    let found = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(conn)
        .await?;
    Ok(found.map(|model| UserWithSecret {
        password_hash: model.password_hash.clone(),
        user: User::from(model),
    }))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Option<User>, AppError> {
    let found = users::Entity::find_by_id(user_id).one(conn).await?;
    Ok(found.map(User::from))
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            goal: model.goal,
            role: model.role,
            height: model.height,
            weight: model.weight,
            created_at: model.created_at,
        }
    }
}
