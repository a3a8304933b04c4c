//! Bearer-token gate for protected scopes.
//!
//! A request either leaves here authenticated, with an [`AuthenticatedUser`]
//! in its extensions, or is answered with a 401 Problem Details response
//! and never reaches the wrapped service.

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderValue};
use actix_web::{web, Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::{debug, Span};

use crate::auth::jwt::{verify_access_token, AuthError};
use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::state::AppState;

pub struct AuthGate;

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateMiddleware { service }))
    }
}

pub struct AuthGateMiddleware<S> {
    service: S,
}

/// The token from `Authorization: Bearer <token>`. The scheme is matched
/// case-insensitively; anything else counts as a missing bearer.
pub fn bearer_token(value: Option<&HeaderValue>) -> Result<&str, AppError> {
    let raw = value
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::unauthorized_missing_bearer)?;
    let (scheme, token) = raw
        .trim()
        .split_once(' ')
        .ok_or_else(AppError::unauthorized_missing_bearer)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return Err(AppError::unauthorized_missing_bearer());
    }
    Ok(token)
}

fn authenticate(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::internal("AppState not registered"))?;
    let token = bearer_token(req.headers().get(header::AUTHORIZATION))?;

    verify_access_token(token, &state.security).map_err(|e| {
        match e {
            AuthError::ExpiredToken => debug!("auth_gate=expired_token"),
            _ => debug!(reason = %e, "auth_gate=invalid_token"),
        }
        AppError::from(e)
    })
}

impl<S, B> Service<ServiceRequest> for AuthGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(user) => {
                Span::current().record("user_id", user.user_id);
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            // Rendered inside the future so the trace scope is active.
            Err(err) => Box::pin(async move { Ok(req.error_response(err).map_into_right_body()) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn header(v: &'static str) -> HeaderValue {
        HeaderValue::from_static(v)
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(Some(&header("Bearer abc.def.ghi"))).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(Some(&header("bearer  abc"))).unwrap(), "abc");
    }

    #[test]
    fn malformed_headers_are_missing_bearer() {
        let cases = [None, Some(header("")), Some(header("Bearer")), Some(header("Bearer ")),
            Some(header("Basic dXNlcjpwYXNz")), Some(header("Token abc")), Some(header("Bearer a b"))];
        for case in cases {
            let err = bearer_token(case.as_ref()).unwrap_err();
            assert_eq!(err.code(), ErrorCode::UnauthorizedMissingBearer, "{case:?}");
        }
    }
}
