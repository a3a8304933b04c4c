//! Collision-free fixture values, so suites sharing one database never
//! trip over each other's unique constraints.

use ulid::Ulid;

/// `{prefix}-{ulid}`.
pub fn unique_str(prefix: &str) -> String {
    format!("{prefix}-{}", Ulid::new())
}

/// An address under `example.test` that no other call will return.
///
/// ```
/// use backend_test_support::unique_helpers::unique_email;
///
/// let a = unique_email("runner");
/// assert_ne!(a, unique_email("runner"));
/// assert!(a.ends_with("@example.test"));
/// ```
pub fn unique_email(prefix: &str) -> String {
    format!("{}@example.test", unique_str(prefix).to_ascii_lowercase())
}
