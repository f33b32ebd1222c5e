//! Client-side validation for form input.
//!
//! Everything here runs before a request is built; a failure never reaches
//! the server.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DeskError, Result};

/// Maximum length for issue titles (in characters).
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for issue descriptions (in characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex should be valid")
});

/// Validates an issue title.
///
/// Rules:
/// - Must not be empty or whitespace-only after trimming
/// - Must not exceed MAX_TITLE_LENGTH characters
/// - Must not contain control characters (including newlines)
pub fn validate_title(title: &str) -> Result<()> {
    let trimmed = title.trim();

    if trimmed.is_empty() {
        return Err(DeskError::Validation("Title is required".to_string()));
    }

    let length = trimmed.chars().count();
    if length > MAX_TITLE_LENGTH {
        return Err(DeskError::Validation(format!(
            "Title too long: {length} characters (max: {MAX_TITLE_LENGTH})"
        )));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(DeskError::Validation(
            "Title cannot contain control characters or newlines".to_string(),
        ));
    }

    Ok(())
}

/// Validates an issue description. Newlines are allowed.
pub fn validate_description(text: &str) -> Result<()> {
    let length = text.chars().count();
    if length > MAX_DESCRIPTION_LENGTH {
        return Err(DeskError::Validation(format!(
            "Description too long: {length} characters (max: {MAX_DESCRIPTION_LENGTH})"
        )));
    }

    if text
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t')
    {
        return Err(DeskError::Validation(
            "Description contains invalid control characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates the address of a user being invited.
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(DeskError::Validation("Email is required".to_string()));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(DeskError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

/// Parses a `YYYY-MM-DD` date given on the command line.
pub fn parse_date(value: &str) -> Result<jiff::civil::Date> {
    value
        .trim()
        .parse::<jiff::civil::Date>()
        .map_err(|_| DeskError::InvalidValue {
            kind: "date (expected YYYY-MM-DD)",
            value: value.to_string(),
        })
}
