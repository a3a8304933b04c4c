use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::AppError;
use crate::extractors::{CurrentUser, RecordId, ValidatedJson};
use crate::infra::db::require_db;
use crate::middleware::AuthGate;
use crate::services::progress::{self, ProgressRequest};
use crate::state::AppState;

async fn list(user: CurrentUser, app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    Ok(HttpResponse::Ok().json(progress::list(db, user.user_id).await?))
}

async fn create(
    user: CurrentUser,
    body: ValidatedJson<ProgressRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let entry = progress::create(db, user.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(entry))
}

async fn update(
    user: CurrentUser,
    id: RecordId,
    body: ValidatedJson<ProgressRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let entry = progress::update(db, user.user_id, id.0, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(entry))
}

async fn delete(
    user: CurrentUser,
    id: RecordId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    progress::delete(db, user.user_id, id.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Progress entry deleted" })))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/progress")
            .wrap(AuthGate)
            .route("", web::get().to(list))
            .route("/create", web::post().to(create))
            .route("/update", web::put().to(update))
            .route("/delete", web::delete().to(delete)),
    );
}
