use std::time::{Duration, SystemTime};

use fittrack::auth::jwt::mint_access_token;
use fittrack::state::SecurityConfig;

pub fn bearer_header(user_id: i64, email: &str, sec: &SecurityConfig) -> String {
    let token = mint_access_token(user_id, email, SystemTime::now(), sec).expect("mint token");
    format!("Bearer {token}")
}

/// Signed correctly, but issued long enough ago to be past its expiry.
pub fn expired_bearer_header(user_id: i64, email: &str, sec: &SecurityConfig) -> String {
    let issued = SystemTime::now() - sec.token_ttl - Duration::from_secs(60);
    let token = mint_access_token(user_id, email, issued, sec).expect("mint token");
    format!("Bearer {token}")
}
