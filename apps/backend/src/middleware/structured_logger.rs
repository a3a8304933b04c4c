use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use super::request_trace::TraceId;
use crate::auth::AuthenticatedUser;

/// Emits one `request_completed` event per request. 5xx log at error, 4xx at
/// warn, everything else at info.
pub struct StructuredLogger;

/// What gets logged once the response is known.
struct Completed {
    method: String,
    route: String,
    trace_id: String,
    started: Instant,
}

impl Completed {
    fn from_request(req: &ServiceRequest) -> Self {
        Self {
            method: req.method().to_string(),
            // The route pattern keeps record ids out of the path field.
            route: req.match_pattern().unwrap_or_else(|| req.path().to_string()),
            trace_id: req
                .extensions()
                .get::<TraceId>()
                .map(|t| t.0.clone())
                .unwrap_or_default(),
            started: Instant::now(),
        }
    }

    fn emit(self, status: StatusCode, user_id: Option<i64>) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let code = status.as_u16();
        let (method, route, trace_id) = (&self.method, &self.route, &self.trace_id);
        if status.is_server_error() {
            error!(%method, %route, status = code, elapsed_ms, user_id, %trace_id, "request_completed");
        } else if status.is_client_error() {
            warn!(%method, %route, status = code, elapsed_ms, user_id, %trace_id, "request_completed");
        } else {
            info!(%method, %route, status = code, elapsed_ms, user_id, %trace_id, "request_completed");
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let completed = Completed::from_request(&req);
        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;
            match &result {
                Ok(res) => {
                    // Set by AuthGate on protected routes only.
                    let user_id = res
                        .request()
                        .extensions()
                        .get::<AuthenticatedUser>()
                        .map(|u| u.user_id);
                    completed.emit(res.status(), user_id);
                }
                Err(err) => completed.emit(err.as_response_error().status_code(), None),
            }
            result
        })
    }
}
