//! Error codes for the FitTrack API.
//!
//! Every `code` field in a problem response comes from this enum. Add new
//! codes here; never pass ad-hoc strings.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & Authorization
    /// No usable `Authorization: Bearer` header
    UnauthorizedMissingBearer,
    /// Bad signature, malformed, wrong secret or expired token
    UnauthorizedInvalidToken,
    /// Unknown email or wrong password at login
    InvalidCredentials,
    /// Row belongs to another user
    Forbidden,

    // Request Validation
    /// Missing or non-numeric `id` query parameter
    InvalidId,
    ValidationError,
    BadRequest,

    // Resource Not Found
    UserNotFound,
    WorkoutNotFound,
    ProgressNotFound,
    /// Nutrition database has no product for the barcode
    ProductNotFound,
    NotFound,

    // Conflicts
    EmailTaken,
    UniqueViolation,

    // Database Constraint Violations
    FkViolation,
    CheckViolation,

    // Upstream & System Errors
    /// Nutrition database unreachable or returned garbage
    NutritionUpstream,
    DbError,
    DbUnavailable,
    Internal,
    ConfigError,
}

impl ErrorCode {
    /// The exact string that appears in HTTP responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            Self::UnauthorizedInvalidToken => "UNAUTHORIZED_INVALID_TOKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Forbidden => "FORBIDDEN",

            Self::InvalidId => "INVALID_ID",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            Self::UserNotFound => "USER_NOT_FOUND",
            Self::WorkoutNotFound => "WORKOUT_NOT_FOUND",
            Self::ProgressNotFound => "PROGRESS_NOT_FOUND",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::EmailTaken => "EMAIL_TAKEN",
            Self::UniqueViolation => "UNIQUE_VIOLATION",

            Self::FkViolation => "FK_VIOLATION",
            Self::CheckViolation => "CHECK_VIOLATION",

            Self::NutritionUpstream => "NUTRITION_UPSTREAM",
            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
