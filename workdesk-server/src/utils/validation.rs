//! Input validation helpers
//!
//! Length caps applied before anything reaches the database. The `validator`
//! derive handles per-field rules on request DTOs; these helpers cover the
//! checks that derive attributes cannot express.

use crate::utils::{AppError, AppResult};

pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_TEXT_LENGTH: usize = 2000;
pub const MAX_COMMENT_LENGTH: usize = 500;

/// Validate a required text field: non-empty after trim, within `max` chars
pub fn validate_required_text(value: &str, field: &str, max: usize) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    if trimmed.chars().count() > max {
        return Err(AppError::validation(format!(
            "{} exceeds maximum length of {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Validate an optional text field when present
pub fn validate_optional_text(value: Option<&str>, field: &str, max: usize) -> AppResult<()> {
    match value {
        Some(v) => validate_required_text(v, field, max),
        None => Ok(()),
    }
}

/// Progress must stay within 0..=100
pub fn validate_progress(progress: u8) -> AppResult<()> {
    if progress > 100 {
        return Err(AppError::validation("Progress must be between 0 and 100"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_required_text() {
        assert!(validate_required_text("   ", "title", MAX_NAME_LENGTH).is_err());
        assert!(validate_required_text("ok", "title", MAX_NAME_LENGTH).is_ok());
    }

    #[test]
    fn rejects_overlong_text() {
        let long = "x".repeat(MAX_COMMENT_LENGTH + 1);
        assert!(validate_required_text(&long, "comment", MAX_COMMENT_LENGTH).is_err());
    }

    #[test]
    fn progress_bounds() {
        assert!(validate_progress(0).is_ok());
        assert!(validate_progress(100).is_ok());
        assert!(validate_progress(101).is_err());
    }
}
