mod common;
mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, HttpResponse};
use backend_test_support::problem_details::assert_problem;
use fittrack::extractors::CurrentUser;
use fittrack::middleware::AuthGate;
use fittrack::state::SecurityConfig;
use support::{bearer_header, create_test_app, expired_bearer_header, security, stateless, StubNutrition};

/// A protected route whose handler counts how often it ran.
fn counting_routes(hits: Arc<AtomicUsize>) -> impl Fn(&mut web::ServiceConfig) + Send + Sync + 'static {
    move |cfg| {
        let hits = hits.clone();
        cfg.service(
            web::scope("/guarded").wrap(AuthGate).route(
                "/whoami",
                web::post().to(move |user: CurrentUser| {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        HttpResponse::Ok().json(serde_json::json!({
                            "user_id": user.user_id,
                            "email": user.email,
                        }))
                    }
                }),
            ),
        );
    }
}

async fn call_guarded(authorization: Option<String>) -> (actix_web::dev::ServiceResponse, usize) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = create_test_app(stateless(Arc::new(StubNutrition::default())))
        .with_routes(counting_routes(hits.clone()))
        .build()
        .await;

    let mut req = test::TestRequest::post().uri("/guarded/whoami");
    if let Some(value) = authorization {
        req = req.insert_header(("Authorization", value));
    }
    let resp = test::call_service(&app, req.to_request()).await;
    (resp, hits.load(Ordering::SeqCst))
}

#[actix_web::test]
async fn missing_header_is_rejected_before_the_handler() {
    let (resp, hits) = call_guarded(None).await;
    assert_problem(resp, "UNAUTHORIZED_MISSING_BEARER", StatusCode::UNAUTHORIZED).await;
    assert_eq!(hits, 0);
}

#[actix_web::test]
async fn wrong_scheme_is_missing_bearer() {
    let (resp, hits) = call_guarded(Some("Basic dXNlcjpwYXNz".into())).await;
    assert_problem(resp, "UNAUTHORIZED_MISSING_BEARER", StatusCode::UNAUTHORIZED).await;
    assert_eq!(hits, 0);
}

#[actix_web::test]
async fn invalid_and_expired_tokens_look_the_same() {
    let other = SecurityConfig::new(b"someone-elses-secret".to_vec());
    let cases = [
        Some("Bearer not.a.jwt".to_string()),
        Some(bearer_header(42, "ana@example.test", &other)),
        Some(expired_bearer_header(42, "ana@example.test", &security())),
    ];

    let mut details = Vec::new();
    for case in cases {
        let (resp, hits) = call_guarded(case).await;
        let problem =
            assert_problem(resp, "UNAUTHORIZED_INVALID_TOKEN", StatusCode::UNAUTHORIZED).await;
        assert_eq!(hits, 0);
        details.push(problem.detail);
    }
    details.dedup();
    assert_eq!(details.len(), 1, "detail leaks the failure reason: {details:?}");
}

#[actix_web::test]
async fn valid_token_reaches_handler_with_identity() {
    let (resp, hits) = call_guarded(Some(bearer_header(42, "ana@example.test", &security()))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["user_id"], 42);
    assert_eq!(body["email"], "ana@example.test");
    assert_eq!(hits, 1);
}

#[actix_web::test]
async fn production_routes_are_gated() {
    let app = create_test_app(stateless(Arc::new(StubNutrition::with_sample_products())))
        .build()
        .await;

    for (method, uri) in [
        ("GET", "/api/profile"),
        ("POST", "/api/logout"),
        ("GET", "/api/meal-plan"),
        ("POST", "/api/food/search"),
        ("GET", "/api/workouts"),
        ("POST", "/api/workouts/create"),
        ("PUT", "/api/workouts/update?id=1"),
        ("DELETE", "/api/workouts/delete?id=1"),
        ("GET", "/api/progress"),
        ("DELETE", "/api/progress/delete?id=1"),
    ] {
        let req = test::TestRequest::default()
            .method(method.parse().unwrap())
            .uri(uri)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}
