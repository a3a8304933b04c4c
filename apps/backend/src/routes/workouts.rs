use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::AppError;
use crate::extractors::{CurrentUser, RecordId, ValidatedJson};
use crate::infra::db::require_db;
use crate::middleware::AuthGate;
use crate::services::workouts::{self, WorkoutRequest};
use crate::state::AppState;

async fn list(user: CurrentUser, app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    Ok(HttpResponse::Ok().json(workouts::list(db, user.user_id).await?))
}

async fn create(
    user: CurrentUser,
    body: ValidatedJson<WorkoutRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let workout = workouts::create(db, user.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(workout))
}

async fn update(
    user: CurrentUser,
    id: RecordId,
    body: ValidatedJson<WorkoutRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let workout = workouts::update(db, user.user_id, id.0, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(workout))
}

async fn delete(
    user: CurrentUser,
    id: RecordId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    workouts::delete(db, user.user_id, id.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Workout deleted" })))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/workouts")
            .wrap(AuthGate)
            .route("", web::get().to(list))
            .route("/create", web::post().to(create))
            .route("/update", web::put().to(update))
            .route("/delete", web::delete().to(delete)),
    );
}
