mod common;
mod support;

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem;
use serde_json::json;
use support::{create_test_app, stateless, StubNutrition};

#[actix_web::test]
async fn missing_database_is_retryable() {
    let app = create_test_app(stateless(Arc::new(StubNutrition::default())))
        .build()
        .await;
    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({
            "name": "Ana",
            "email": "ana@example.test",
            "password": "secret1",
            "goal": "hypertrophy",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let retry_after = resp
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let problem = assert_problem(resp, "DB_UNAVAILABLE", StatusCode::SERVICE_UNAVAILABLE).await;
    assert_eq!(retry_after.as_deref(), Some("1"));
    assert_eq!(problem.title, "Db Unavailable");
}

#[actix_web::test]
async fn every_request_gets_a_distinct_trace_id() {
    let app = create_test_app(stateless(Arc::new(StubNutrition::default())))
        .build()
        .await;

    let mut seen = Vec::new();
    for _ in 0..3 {
        let req = test::TestRequest::get().uri("/api/workouts").to_request();
        let problem = assert_problem(
            test::call_service(&app, req).await,
            "UNAUTHORIZED_MISSING_BEARER",
            StatusCode::UNAUTHORIZED,
        )
        .await;
        assert!(!problem.trace_id.is_empty());
        seen.push(problem.trace_id);
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 3);
}

#[actix_web::test]
async fn bodies_never_echo_submitted_values() {
    let app = create_test_app(stateless(Arc::new(StubNutrition::default())))
        .build()
        .await;
    let req = test::TestRequest::post()
        .uri("/api/login")
        .insert_header(("content-type", "application/json"))
        .set_payload(r#"{"email": "leak@example.test", "password": 12345}"#)
        .to_request();
    let problem = assert_problem(test::call_service(&app, req).await, "VALIDATION_ERROR", StatusCode::BAD_REQUEST).await;
    assert!(!problem.detail.contains("leak@example.test"));
    assert!(!problem.detail.contains("12345"));
}

#[actix_web::test]
async fn unknown_routes_are_plain_404s() {
    let app = create_test_app(stateless(Arc::new(StubNutrition::default())))
        .build()
        .await;
    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/nope").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.headers().contains_key("x-trace-id"));
}
