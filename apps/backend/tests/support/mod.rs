#![allow(dead_code)]

pub mod app_builder;
pub mod auth;
pub mod nutrition_stub;
pub mod test_state;

pub use app_builder::create_test_app;
pub use auth::{bearer_header, expired_bearer_header};
pub use nutrition_stub::StubNutrition;
pub use test_state::{security, sqlite_state, stateless, TEST_SECRET};

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, Error};
use serde_json::{json, Value};

/// Register a fresh account through the API; returns `(user_id, auth header)`.
pub async fn register_user<S>(app: &S, prefix: &str, goal: &str) -> (i64, String)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({
            "name": prefix,
            "email": backend_test_support::unique_helpers::unique_email(prefix),
            "password": "hunter22",
            "goal": goal,
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(app, req).await;
    let id = body["user"]["id"].as_i64().expect("user id");
    let token = body["token"].as_str().expect("token");
    (id, format!("Bearer {token}"))
}
