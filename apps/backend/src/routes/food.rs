use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::infra::db::require_db;
use crate::middleware::AuthGate;
use crate::services::{accounts, nutrition};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct FoodSearchRequest {
    barcode: String,
}

async fn search(
    _user: CurrentUser,
    body: ValidatedJson<FoodSearchRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let barcode = body.barcode.trim();
    if !nutrition::is_valid_barcode(barcode) {
        return Err(AppError::invalid("barcode must be 4 to 32 digits"));
    }
    let item = app_state.nutrition.lookup(barcode).await?;
    Ok(HttpResponse::Ok().json(item))
}

async fn meal_plan(
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    // A token that outlived its account is treated as an authentication failure.
    let owner = accounts::profile(db, user.user_id).await.map_err(|e| match e.code() {
        ErrorCode::UserNotFound => AppError::unauthorized(ErrorCode::UserNotFound, "User not found"),
        _ => e,
    })?;

    let plan = nutrition::build_meal_plan(app_state.nutrition.as_ref(), owner.id, owner.goal).await;
    Ok(HttpResponse::Ok().json(plan))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/food/search")
            .wrap(AuthGate)
            .route(web::post().to(search)),
    )
    .service(
        web::resource("/meal-plan")
            .wrap(AuthGate)
            .route(web::get().to(meal_plan)),
    );
}
