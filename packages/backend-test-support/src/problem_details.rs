//! Assertions for the `application/problem+json` error contract.
//!
//! Deliberately independent of the backend crate so db-level and
//! http-level suites can share them.

use actix_web::http::header::HeaderMap;
use actix_web::http::StatusCode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ProblemBody {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

/// Check status, code, content type, trace-id parity and the 401 challenge
/// header. Returns the parsed body for further assertions.
pub fn assert_problem_parts(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
    expected_code: &str,
    expected_status: StatusCode,
) -> ProblemBody {
    assert_eq!(status, expected_status, "unexpected HTTP status");

    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("application/problem+json"),
        "content-type was {content_type:?}"
    );

    let problem: ProblemBody = serde_json::from_slice(body).unwrap_or_else(|e| {
        panic!(
            "body is not a problem document ({e}): {}",
            String::from_utf8_lossy(body)
        )
    });

    let header_trace = headers
        .get("x-trace-id")
        .expect("x-trace-id header missing")
        .to_str()
        .expect("x-trace-id is not ascii");
    assert_eq!(problem.trace_id, header_trace, "trace id mismatch");

    assert_eq!(problem.code, expected_code);
    assert_eq!(problem.status, expected_status.as_u16());
    assert!(
        problem.type_.ends_with(&format!("/errors/{expected_code}")),
        "type {} does not name code {expected_code}",
        problem.type_
    );

    if expected_status == StatusCode::UNAUTHORIZED {
        let challenge = headers
            .get("www-authenticate")
            .and_then(|v| v.to_str().ok());
        assert_eq!(challenge, Some("Bearer"));
    }

    problem
}

/// [`assert_problem_parts`] for a test `ServiceResponse`.
pub async fn assert_problem<B>(
    resp: actix_web::dev::ServiceResponse<B>,
    expected_code: &str,
    expected_status: StatusCode,
) -> ProblemBody
where
    B: actix_web::body::MessageBody,
{
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = actix_web::test::read_body(resp).await;
    assert_problem_parts(status, &headers, &body, expected_code, expected_status)
}
