use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::info;

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::infra::db::require_db;
use crate::middleware::AuthGate;
use crate::services::accounts;
use crate::state::AppState;

/// Tokens are stateless; the client discards its copy.
async fn logout(user: CurrentUser) -> HttpResponse {
    info!(user_id = user.user_id, "logout");
    HttpResponse::Ok().json(json!({ "message": "Logged out" }))
}

async fn profile(
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let profile = accounts::profile(db, user.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/logout")
            .wrap(AuthGate)
            .route(web::post().to(logout)),
    )
    .service(
        web::resource("/profile")
            .wrap(AuthGate)
            .route(web::get().to(profile)),
    );
}
