//! Input limits.
//!
//! Every check trims its input and returns the trimmed value, which is what
//! gets stored.

use crate::{StoreError, StoreResult};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 32;
pub const PHONE_MIN_DIGITS: usize = 7;
pub const PHONE_MAX_DIGITS: usize = 15;
pub const TITLE_MAX: usize = 120;
pub const POST_CONTENT_MAX: usize = 5000;
pub const COMMENT_MAX: usize = 2000;
pub const MESSAGE_MAX: usize = 2000;

pub fn username(value: &str) -> StoreResult<String> {
    let value = value.trim();
    let len = value.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(StoreError::Validation(format!(
            "username must be {USERNAME_MIN} to {USERNAME_MAX} characters"
        )));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::Validation(
            "username may only contain letters, digits and underscores".to_string(),
        ));
    }
    Ok(value.to_string())
}

pub fn phone(value: &str) -> StoreResult<String> {
    let value = value.trim();
    let digits = value.strip_prefix('+').unwrap_or(value);
    let len = digits.len();
    if !digits.chars().all(|c| c.is_ascii_digit())
        || !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&len)
    {
        return Err(StoreError::Validation(format!(
            "phone must be {PHONE_MIN_DIGITS} to {PHONE_MAX_DIGITS} digits"
        )));
    }
    Ok(value.to_string())
}

pub fn title(value: &str) -> StoreResult<String> {
    bounded("title", value, TITLE_MAX)
}

pub fn post_content(value: &str) -> StoreResult<String> {
    bounded("content", value, POST_CONTENT_MAX)
}

pub fn comment(value: &str) -> StoreResult<String> {
    bounded("comment", value, COMMENT_MAX)
}

pub fn message(value: &str) -> StoreResult<String> {
    bounded("message", value, MESSAGE_MAX)
}

/// Empty locations normalize to `None`.
pub fn location(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn bounded(field: &str, value: &str, max: usize) -> StoreResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoreError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max {
        return Err(StoreError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}
