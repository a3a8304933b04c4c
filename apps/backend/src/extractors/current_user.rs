use std::future::{ready, Ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};

use crate::auth::AuthenticatedUser;
use crate::error::AppError;

/// The identity `AuthGate` placed in the request extensions.
///
/// Only meaningful behind the gate; on an unguarded route the extension is
/// absent and extraction fails with `UNAUTHORIZED_MISSING_BEARER`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

impl Deref for CurrentUser {
    type Target = AuthenticatedUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .map(CurrentUser)
                .ok_or_else(AppError::unauthorized_missing_bearer),
        )
    }
}
