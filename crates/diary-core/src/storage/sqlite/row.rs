//! Row types for database queries.
//!
//! Each row is read as raw column values first, then parsed into the
//! domain type via `TryFrom`, so a corrupt column surfaces as a
//! `DiaryError::Storage` rather than a panic.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::error::{DiaryError, Result};
use crate::storage::types::{Diary, Importance, NotificationSettings, Task, User};

pub(super) const USER_COLUMNS: &str =
    "id, username, email, hashed_password, diary_encryption_salt, created_at, updated_at";

pub(super) const DIARY_COLUMNS: &str =
    "id, owner_id, title, content, is_encrypted, entry_date, daily_rating, created_at, updated_at";

pub(super) const TASK_COLUMNS: &str = "id, owner_id, title, description, importance, completed, \
     due_date, reminder_time, created_at, updated_at";

pub(super) const NOTIFICATION_COLUMNS: &str = "owner_id, email_enabled, email_address, \
     wecom_enabled, wecom_webhook_url, dingtalk_enabled, dingtalk_webhook_url, \
     telegram_enabled, telegram_bot_token, telegram_chat_id";

fn parse_uuid(value: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| DiaryError::Storage(format!("Invalid {} UUID: {}", what, e)))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| DiaryError::Storage(format!("Invalid timestamp: {}", e)))
}

fn parse_optional_timestamp(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value.map(parse_timestamp).transpose()
}

/// Raw row data from the users table.
#[derive(Debug)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub hashed_password: String,
    pub diary_encryption_salt: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl UserRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            hashed_password: row.get(3)?,
            diary_encryption_salt: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = DiaryError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: parse_uuid(&row.id, "user")?,
            username: row.username,
            email: row.email,
            hashed_password: row.hashed_password,
            diary_encryption_salt: row.diary_encryption_salt,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_optional_timestamp(row.updated_at.as_deref())?,
        })
    }
}

/// Raw row data from the diaries table.
#[derive(Debug)]
pub struct DiaryRow {
    pub id: String,
    pub owner_id: String,
    pub title: Option<String>,
    pub content: String,
    pub is_encrypted: bool,
    pub entry_date: String,
    pub daily_rating: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl DiaryRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            is_encrypted: row.get(4)?,
            entry_date: row.get(5)?,
            daily_rating: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

impl TryFrom<DiaryRow> for Diary {
    type Error = DiaryError;

    fn try_from(row: DiaryRow) -> Result<Self> {
        Ok(Diary {
            id: parse_uuid(&row.id, "diary")?,
            owner_id: parse_uuid(&row.owner_id, "owner")?,
            title: row.title,
            content: row.content,
            is_encrypted: row.is_encrypted,
            entry_date: parse_timestamp(&row.entry_date)?,
            daily_rating: row.daily_rating,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_optional_timestamp(row.updated_at.as_deref())?,
        })
    }
}

/// Raw row data from the tasks table.
#[derive(Debug)]
pub struct TaskRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub importance: String,
    pub completed: bool,
    pub due_date: Option<String>,
    pub reminder_time: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl TaskRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            importance: row.get(4)?,
            completed: row.get(5)?,
            due_date: row.get(6)?,
            reminder_time: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

impl TryFrom<TaskRow> for Task {
    type Error = DiaryError;

    fn try_from(row: TaskRow) -> Result<Self> {
        let importance: Importance = row
            .importance
            .parse()
            .map_err(|e| DiaryError::Storage(format!("Invalid importance column: {}", e)))?;
        Ok(Task {
            id: parse_uuid(&row.id, "task")?,
            owner_id: parse_uuid(&row.owner_id, "owner")?,
            title: row.title,
            description: row.description,
            importance,
            completed: row.completed,
            due_date: parse_optional_timestamp(row.due_date.as_deref())?,
            reminder_time: parse_optional_timestamp(row.reminder_time.as_deref())?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_optional_timestamp(row.updated_at.as_deref())?,
        })
    }
}

/// Raw row data from the notification_settings table.
#[derive(Debug)]
pub struct NotificationRow {
    pub owner_id: String,
    pub email_enabled: bool,
    pub email_address: Option<String>,
    pub wecom_enabled: bool,
    pub wecom_webhook_url: Option<String>,
    pub dingtalk_enabled: bool,
    pub dingtalk_webhook_url: Option<String>,
    pub telegram_enabled: bool,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl NotificationRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            owner_id: row.get(0)?,
            email_enabled: row.get(1)?,
            email_address: row.get(2)?,
            wecom_enabled: row.get(3)?,
            wecom_webhook_url: row.get(4)?,
            dingtalk_enabled: row.get(5)?,
            dingtalk_webhook_url: row.get(6)?,
            telegram_enabled: row.get(7)?,
            telegram_bot_token: row.get(8)?,
            telegram_chat_id: row.get(9)?,
        })
    }
}

impl TryFrom<NotificationRow> for NotificationSettings {
    type Error = DiaryError;

    fn try_from(row: NotificationRow) -> Result<Self> {
        Ok(NotificationSettings {
            owner_id: parse_uuid(&row.owner_id, "owner")?,
            email_enabled: row.email_enabled,
            email_address: row.email_address,
            wecom_enabled: row.wecom_enabled,
            wecom_webhook_url: row.wecom_webhook_url,
            dingtalk_enabled: row.dingtalk_enabled,
            dingtalk_webhook_url: row.dingtalk_webhook_url,
            telegram_enabled: row.telegram_enabled,
            telegram_bot_token: row.telegram_bot_token,
            telegram_chat_id: row.telegram_chat_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diary_row_parses() {
        let id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let row = DiaryRow {
            id: id.to_string(),
            owner_id: owner.to_string(),
            title: None,
            content: "text".to_string(),
            is_encrypted: false,
            entry_date: "2024-03-01T08:00:00+00:00".to_string(),
            daily_rating: Some("4".to_string()),
            created_at: "2024-03-01T08:00:00+00:00".to_string(),
            updated_at: None,
        };
        let diary: Diary = row.try_into().unwrap();
        assert_eq!(diary.id, id);
        assert_eq!(diary.owner_id, owner);
        assert_eq!(diary.daily_rating.as_deref(), Some("4"));
    }

    #[test]
    fn test_bad_uuid_is_storage_error() {
        let row = UserRow {
            id: "not-a-uuid".to_string(),
            username: "alice".to_string(),
            email: None,
            hashed_password: "h".to_string(),
            diary_encryption_salt: "s".to_string(),
            created_at: "2024-03-01T08:00:00+00:00".to_string(),
            updated_at: None,
        };
        let err = User::try_from(row).unwrap_err();
        assert!(matches!(err, DiaryError::Storage(_)));
    }

    #[test]
    fn test_bad_importance_is_storage_error() {
        let row = TaskRow {
            id: Uuid::new_v4().to_string(),
            owner_id: Uuid::new_v4().to_string(),
            title: "t".to_string(),
            description: None,
            importance: "whenever".to_string(),
            completed: false,
            due_date: None,
            reminder_time: None,
            created_at: "2024-03-01T08:00:00+00:00".to_string(),
            updated_at: None,
        };
        assert!(Task::try_from(row).is_err());
    }
}
