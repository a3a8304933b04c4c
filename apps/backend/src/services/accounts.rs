//! Registration, login and profile lookup.

use std::time::SystemTime;

use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::jwt::mint_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::infra::schema::{DEFAULT_ROLE, GOALS};
use crate::logging::pii::Redacted;
use crate::repos::users::{self, NewUser, User};
use crate::services::validation::{finite, non_empty};
use crate::state::SecurityConfig;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Unknown fields, `role` included, are ignored.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub goal: String,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn validate_body_metric(field: &str, value: Option<f64>) -> Result<Option<f64>, AppError> {
    let Some(v) = value else {
        return Ok(None);
    };
    if finite(field, v)? <= 0.0 {
        return Err(AppError::invalid(format!("{field} must be positive")));
    }
    Ok(Some(v))
}

fn validate_registration(req: RegisterRequest) -> Result<(NewUser, String), AppError> {
    let name = non_empty("name", &req.name)?;
    let email = normalize_email(&req.email);
    if !email.contains('@') {
        return Err(AppError::invalid("email must be a valid email address"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::invalid(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let goal = req.goal.trim().to_string();
    if !GOALS.contains(&goal.as_str()) {
        return Err(AppError::invalid(format!(
            "goal must be one of: {}",
            GOALS.join(", ")
        )));
    }

    let new = NewUser {
        name,
        email,
        password_hash: String::new(),
        goal,
        role: DEFAULT_ROLE.to_string(),
        height: validate_body_metric("height", req.height)?,
        weight: validate_body_metric("weight", req.weight)?,
    };
    Ok((new, req.password))
}

fn issue_for(user: &User, security: &SecurityConfig) -> Result<String, AppError> {
    Ok(mint_access_token(
        user.id,
        &user.email,
        SystemTime::now(),
        security,
    )?)
}

/// Create an account and sign its first token. A taken email surfaces as
/// `EMAIL_TAKEN` from the unique index.
pub async fn register<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    security: &SecurityConfig,
    req: RegisterRequest,
) -> Result<AuthResponse, AppError> {
    let (mut new, password) = validate_registration(req)?;
    new.password_hash = hash_password(&password)?;

    let user = users::create_user(conn, new).await?;
    info!(user_id = user.id, email = %Redacted(&user.email), "account_registered");

    let token = issue_for(&user, security)?;
    Ok(AuthResponse { user, token })
}

/// Every failure mode answers with the same `INVALID_CREDENTIALS`.
pub async fn login<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    security: &SecurityConfig,
    req: LoginRequest,
) -> Result<AuthResponse, AppError> {
    let email = normalize_email(&req.email);
    let Some(found) = users::find_by_email(conn, &email).await? else {
        debug!(email = %Redacted(&email), "login_rejected=unknown_email");
        return Err(AppError::invalid_credentials());
    };

    if !verify_password(&req.password, &found.password_hash) {
        debug!(user_id = found.user.id, "login_rejected=bad_password");
        return Err(AppError::invalid_credentials());
    }

    let token = issue_for(&found.user, security)?;
    info!(user_id = found.user.id, "login_succeeded");
    Ok(AuthResponse {
        user: found.user,
        token,
    })
}

pub async fn profile<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<User, AppError> {
    users::find_by_id(conn, user_id)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::UserNotFound, "User not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            name: " Ana ".into(),
            email: " Ana@Example.TEST ".into(),
            password: "secret1".into(),
            goal: "hypertrophy".into(),
            height: Some(170.0),
            weight: None,
        }
    }

    #[test]
    fn registration_normalizes_and_pins_role() {
        let (new, password) = validate_registration(request()).unwrap();
        assert_eq!(new.name, "Ana");
        assert_eq!(new.email, "ana@example.test");
        assert_eq!(new.role, "user");
        assert_eq!(new.height, Some(170.0));
        assert_eq!(password, "secret1");
    }

    #[test]
    fn role_in_body_is_ignored() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "name": "Bo",
            "email": "bo@example.test",
            "password": "secret1",
            "goal": "lose_weight",
            "role": "admin"
        }))
        .unwrap();
        let (new, _) = validate_registration(req).unwrap();
        assert_eq!(new.role, DEFAULT_ROLE);
    }

    #[test]
    fn registration_rejections() {
        let cases: Vec<(&str, fn(&mut RegisterRequest))> = vec![
            ("blank name", |r| r.name = "  ".into()),
            ("no at sign", |r| r.email = "ana.example.test".into()),
            ("short password", |r| r.password = "12345".into()),
            ("unknown goal", |r| r.goal = "bulk".into()),
            ("negative height", |r| r.height = Some(-1.0)),
        ];
        for (label, mutate) in cases {
            let mut req = request();
            mutate(&mut req);
            let err = validate_registration(req).unwrap_err();
            assert_eq!(err.code(), ErrorCode::ValidationError, "{label}");
        }
    }
}
