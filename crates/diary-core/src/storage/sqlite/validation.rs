//! Field validation and normalization applied before rows are written.

use crate::crypto::sealed_len;
use crate::error::{DiaryError, Result};
use crate::storage::types::MAX_DIARY_BYTES;

/// Maximum bytes for a stored diary body: the blob of the largest accepted plaintext.
pub const MAX_CONTENT_BYTES: usize = sealed_len(MAX_DIARY_BYTES);

/// Maximum bytes for titles.
pub const MAX_TITLE_BYTES: usize = 256;

/// Maximum bytes for a daily rating label.
pub const MAX_RATING_BYTES: usize = 32;

/// Username length bounds, in characters.
const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 64;

/// Trim and validate a login name.
///
/// Allowed characters: ASCII letters, digits, dash, underscore, dot.
pub fn normalize_username(username: &str) -> Result<String> {
    let trimmed = username.trim();
    let length = trimmed.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
        return Err(DiaryError::Validation(format!(
            "Username must be {}-{} characters",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(DiaryError::Validation(
            "Username contains invalid characters".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Trim, lowercase and sanity-check an email address. Blank means none.
pub fn normalize_email(email: Option<&str>) -> Result<Option<String>> {
    let Some(value) = email.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let normalized = value.to_ascii_lowercase();
    let valid = match normalized.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid || normalized.chars().any(char::is_whitespace) {
        return Err(DiaryError::Validation(format!(
            "Invalid email address: {}",
            value
        )));
    }
    Ok(Some(normalized))
}

/// Trim a title; blank titles are stored as NULL.
pub fn normalize_title(title: Option<&str>) -> Result<Option<String>> {
    let Some(value) = title.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.len() > MAX_TITLE_BYTES {
        return Err(DiaryError::Validation(format!(
            "Title too long (max {} bytes)",
            MAX_TITLE_BYTES
        )));
    }
    Ok(Some(value.to_string()))
}

/// Trim a rating label; blank ratings are stored as NULL.
pub fn normalize_rating(rating: Option<&str>) -> Result<Option<String>> {
    let Some(value) = rating.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.len() > MAX_RATING_BYTES {
        return Err(DiaryError::Validation(format!(
            "Rating too long (max {} bytes)",
            MAX_RATING_BYTES
        )));
    }
    Ok(Some(value.to_string()))
}

/// Enforce the size ceiling on diary content.
pub fn validate_content(content: &str) -> Result<()> {
    if content.len() > MAX_CONTENT_BYTES {
        return Err(DiaryError::Validation(format!(
            "Diary content too large (max {} bytes)",
            MAX_CONTENT_BYTES
        )));
    }
    Ok(())
}

/// Task titles are required.
pub fn normalize_task_title(title: &str) -> Result<String> {
    normalize_title(Some(title))?
        .ok_or_else(|| DiaryError::Validation("Task title cannot be empty".to_string()))
}
