//! Field checks shared by the request-handling services.

use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::AppError;

/// `YYYY-MM-DD`, the only date format the API accepts.
pub fn parse_date(field: &str, raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid(format!("{field} must be a date in YYYY-MM-DD format")))
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Trimmed value, or an error naming the field when it is blank.
pub fn non_empty(field: &str, raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Blank optional text is stored as NULL.
pub fn optional_text(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn finite(field: &str, value: f64) -> Result<f64, AppError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AppError::invalid(format!("{field} must be a number")))
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn dates() {
        assert_eq!(parse_date("workout_date", "2024-02-29").unwrap(), date!(2024 - 02 - 29));
        assert_eq!(parse_date("workout_date", " 2024-01-05 ").unwrap(), date!(2024 - 01 - 05));
        for bad in ["2023-02-29", "05/01/2024", "", "2024-1-5x"] {
            let err = parse_date("workout_date", bad).unwrap_err();
            assert_eq!(err.code(), ErrorCode::ValidationError, "{bad}");
        }
    }

    #[test]
    fn blanks() {
        assert_eq!(non_empty("name", "  Leg day ").unwrap(), "Leg day");
        assert!(non_empty("name", "   ").is_err());
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(Some(" x ".into())), Some("x".into()));
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn non_finite_numbers_rejected() {
        assert!(finite("weight", f64::NAN).is_err());
        assert!(finite("weight", f64::INFINITY).is_err());
        assert_eq!(finite("weight", 71.5).unwrap(), 71.5);
    }
}
