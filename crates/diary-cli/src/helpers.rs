//! Input and parsing helper functions for the CLI.

use std::io::{self, IsTerminal, Read};

use chrono::{DateTime, NaiveDate, Utc};
use dialoguer::Password;
use diary_core::storage::Importance;
use uuid::Uuid;

use crate::constants::PASSWORD_ENV;

fn env_password() -> Option<String> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Prompt for the account password, or read it from DIARY_PASSWORD.
pub fn prompt_password() -> anyhow::Result<String> {
    if let Some(value) = env_password() {
        return Ok(value);
    }
    if !io::stdin().is_terminal() {
        return Err(anyhow::anyhow!(
            "No password provided and no TTY available. Set {}.",
            PASSWORD_ENV
        ));
    }
    Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Prompt for a new password with confirmation, or read it from DIARY_PASSWORD.
pub fn prompt_new_password() -> anyhow::Result<String> {
    if let Some(value) = env_password() {
        return Ok(value);
    }
    if !io::stdin().is_terminal() {
        return Err(anyhow::anyhow!(
            "No password provided and no TTY available. Set {}.",
            PASSWORD_ENV
        ));
    }
    Password::new()
        .with_prompt("Choose a password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Parse a datetime string (ISO-8601 or YYYY-MM-DD).
pub fn parse_datetime(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid date value: {}", value))?;
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }

    Err(anyhow::anyhow!(
        "Invalid date/time (expected ISO-8601 or YYYY-MM-DD): {}",
        value
    ))
}

/// Parse an end-of-range date. A bare YYYY-MM-DD covers the whole day.
pub fn parse_range_end(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = date
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .ok_or_else(|| anyhow::anyhow!("Invalid date value: {}", value))?;
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }
    parse_datetime(value)
}

pub fn parse_optional_datetime(value: Option<&str>) -> anyhow::Result<Option<DateTime<Utc>>> {
    value.map(parse_datetime).transpose()
}

pub fn parse_id(value: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| anyhow::anyhow!("Invalid ID: {}", value))
}

pub fn parse_importance(value: &str) -> anyhow::Result<Importance> {
    Ok(value.parse::<Importance>()?)
}

/// Body from `--body`, or stdin when piped.
pub fn read_body(body: Option<String>) -> anyhow::Result<String> {
    if let Some(value) = body {
        return Ok(value);
    }
    if io::stdin().is_terminal() {
        return Err(anyhow::anyhow!(
            "No body provided. Use --body or pipe content on stdin."
        ));
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
    let trimmed = buffer.trim_end_matches(&['\n', '\r'][..]).to_string();
    if trimmed.trim().is_empty() {
        return Err(anyhow::anyhow!("Diary body is empty"));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_accepts_both_forms() {
        let a = parse_datetime("2024-03-01").unwrap();
        let b = parse_datetime("2024-03-01T00:00:00Z").unwrap();
        assert_eq!(a, b);
        assert!(parse_datetime("March 1st").is_err());
    }

    #[test]
    fn test_range_end_covers_whole_day() {
        let end = parse_range_end("2024-03-01").unwrap();
        assert!(end > parse_datetime("2024-03-01T23:59:59Z").unwrap());
        assert!(end < parse_datetime("2024-03-02").unwrap());
    }

    #[test]
    fn test_parse_id_and_importance() {
        assert!(parse_id("not-a-uuid").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&format!(" {} ", id)).unwrap(), id);
        assert_eq!(parse_importance("High").unwrap(), Importance::High);
        assert!(parse_importance("soon").is_err());
    }
}
