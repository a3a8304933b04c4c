use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AuthenticatedUser;
use crate::state::security_config::SecurityConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("token signing failed: {0}")]
    Signing(String),
    /// Malformed, bad signature, wrong secret, wrong algorithm or bad subject.
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
}

/// Claims carried by access tokens.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// `users.id` as a decimal string
    pub sub: String,
    pub email: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

fn epoch_secs(now: SystemTime) -> i64 {
    now.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Mint an HS256 access token for `user_id`, valid for `security.token_ttl`.
pub fn mint_access_token(
    user_id: i64,
    email: &str,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::Signing("signing secret is empty".to_string()));
    }

    let iat = epoch_secs(now);
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat,
        exp: iat + security.token_ttl.as_secs() as i64,
    };

    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Verify `token` against the wall clock.
pub fn verify_access_token(
    token: &str,
    security: &SecurityConfig,
) -> Result<AuthenticatedUser, AuthError> {
    verify_access_token_at(token, SystemTime::now(), security)
}

/// Verify `token` as of `now`. Expiry is checked here rather than by the
/// decoder so tests can drive the clock.
pub fn verify_access_token_at(
    token: &str,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<AuthenticatedUser, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidToken);
    }

    let mut validation = Validation::new(security.algorithm);
    validation.validate_exp = false;
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)?;

    if epoch_secs(now) >= claims.exp {
        return Err(AuthError::ExpiredToken);
    }

    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| AuthError::InvalidToken)?;

    Ok(AuthenticatedUser {
        user_id,
        email: claims.email,
    })
}
