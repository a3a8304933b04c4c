//! Token issuance/verification and password hashing.

pub mod jwt;
pub mod password;

/// Identity established by the auth gate for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub email: String,
}

pub use jwt::{mint_access_token, verify_access_token, verify_access_token_at, AuthError, Claims};
