use std::sync::LazyLock;

use regex::Regex;

use shared_models::error::AppError;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

static EMAIL_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).ok());

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_REGEX.as_ref().is_some_and(|re| re.is_match(email))
}

/// Trimmed value of a required text field.
pub fn require_text(value: Option<&str>, field: &str) -> Result<String, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::BadRequest(format!("{} is required", field)))
}

pub fn require_email(value: Option<&str>) -> Result<String, AppError> {
    let email = require_text(value, "Email")?.to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest(format!("Invalid email: {}", email)));
    }
    Ok(email)
}
