mod common;
mod support;

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem;
use serde_json::{json, Value};
use support::{create_test_app, register_user, sqlite_state, StubNutrition};
use time::OffsetDateTime;

#[actix_web::test]
async fn entries_default_to_today_and_list_newest_first() {
    let app = create_test_app(sqlite_state(Arc::new(StubNutrition::default())).await)
        .build()
        .await;
    let (user_id, auth) = register_user(&app, "tracker", "lose_weight").await;

    let req = test::TestRequest::post()
        .uri("/api/progress/create")
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({ "weight": 80.2, "body_fat": 21.5, "progress_date": "2024-01-10" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let dated: Value = test::read_body_json(resp).await;
    assert_eq!(dated["user_id"], user_id);
    assert_eq!(dated["muscle_mass"], 0.0);

    let req = test::TestRequest::post()
        .uri("/api/progress/create")
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({ "weight": 79.6, "notes": "after holidays" }))
        .to_request();
    let undated: Value = test::call_and_read_body_json(&app, req).await;
    let today = OffsetDateTime::now_utc().date().to_string();
    assert_eq!(undated["progress_date"], today.as_str());

    let req = test::TestRequest::get()
        .uri("/api/progress")
        .insert_header(("Authorization", auth))
        .to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], undated["id"]);
    assert_eq!(listed[1]["id"], dated["id"]);
}

#[actix_web::test]
async fn update_and_delete_respect_ownership() {
    let app = create_test_app(sqlite_state(Arc::new(StubNutrition::default())).await)
        .build()
        .await;
    let (_, owner) = register_user(&app, "owner", "hypertrophy").await;
    let (_, other) = register_user(&app, "other", "hypertrophy").await;

    let req = test::TestRequest::post()
        .uri("/api/progress/create")
        .insert_header(("Authorization", owner.clone()))
        .set_json(json!({ "weight": 70.0, "progress_date": "2024-02-01" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_i64().unwrap();

    let revised = json!({ "weight": 69.1, "body_fat": 15, "muscle_mass": 31.2, "progress_date": "2024-02-01" });

    let req = test::TestRequest::put()
        .uri(&format!("/api/progress/update?id={id}"))
        .insert_header(("Authorization", other.clone()))
        .set_json(&revised)
        .to_request();
    assert_problem(test::call_service(&app, req).await, "FORBIDDEN", StatusCode::FORBIDDEN).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/progress/update?id={id}"))
        .insert_header(("Authorization", owner.clone()))
        .set_json(&revised)
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["weight"], 69.1);
    assert_eq!(updated["muscle_mass"], 31.2);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/progress/delete?id={id}"))
        .insert_header(("Authorization", other))
        .to_request();
    assert_problem(test::call_service(&app, req).await, "FORBIDDEN", StatusCode::FORBIDDEN).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/progress/delete?id={id}"))
        .insert_header(("Authorization", owner.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Progress entry deleted");

    let req = test::TestRequest::put()
        .uri(&format!("/api/progress/update?id={id}"))
        .insert_header(("Authorization", owner))
        .set_json(&revised)
        .to_request();
    assert_problem(test::call_service(&app, req).await, "PROGRESS_NOT_FOUND", StatusCode::NOT_FOUND).await;
}

#[actix_web::test]
async fn out_of_range_metrics_are_rejected() {
    let app = create_test_app(sqlite_state(Arc::new(StubNutrition::default())).await)
        .build()
        .await;
    let (_, auth) = register_user(&app, "picky", "lose_weight").await;

    for body in [
        json!({ "weight": 0 }),
        json!({ "weight": 70, "body_fat": 101 }),
        json!({ "weight": 70, "muscle_mass": -1 }),
        json!({ "weight": 70, "progress_date": "2024/01/01" }),
        json!({ "body_fat": 10 }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/progress/create")
            .insert_header(("Authorization", auth.clone()))
            .set_json(&body)
            .to_request();
        assert_problem(test::call_service(&app, req).await, "VALIDATION_ERROR", StatusCode::BAD_REQUEST).await;
    }
}
