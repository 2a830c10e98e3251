//! Core data types for the storage layer.
//!
//! These are plain value records: the crypto policy takes them in and hands
//! new values back, and persistence is always a separate explicit call.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DiaryError;

/// Default page size for list queries.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Largest diary body accepted from a caller, in bytes of plaintext.
pub const MAX_DIARY_BYTES: usize = 1024 * 1024;

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for this user
    pub id: Uuid,

    /// Login name (unique)
    pub username: String,

    /// Optional contact address (unique when present)
    pub email: Option<String>,

    /// Opaque password hash; also the diary key input
    #[serde(skip_serializing)]
    pub hashed_password: String,

    /// URL-safe base64 salt for the diary key, fixed for the account's lifetime
    #[serde(skip_serializing)]
    pub diary_encryption_salt: String,

    /// When this account was created
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// The credential pair the diary key is derived from.
    pub fn credentials(&self) -> UserCredentials {
        UserCredentials {
            hashed_password: self.hashed_password.clone(),
            diary_encryption_salt: self.diary_encryption_salt.clone(),
        }
    }
}

/// Builder for creating new users.
///
/// Callers supply already-hashed credentials; see `DiaryService::register`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub hashed_password: String,
    pub diary_encryption_salt: String,
}

/// Credential material for key derivation.
#[derive(Clone)]
pub struct UserCredentials {
    pub hashed_password: String,
    pub diary_encryption_salt: String,
}

impl fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredentials")
            .field("hashed_password", &"[REDACTED]")
            .field("diary_encryption_salt", &"[REDACTED]")
            .finish()
    }
}

/// A diary entry as persisted.
///
/// `is_encrypted` must always describe the current encoding of `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diary {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: Option<String>,

    /// Plaintext, or an opaque cipher blob when `is_encrypted` is set
    pub content: String,
    pub is_encrypted: bool,

    /// The day this entry is about (used for check-in statistics)
    pub entry_date: DateTime<Utc>,

    /// Free-form rating, e.g. "5" or "great"
    pub daily_rating: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Builder for creating new diary entries.
///
/// `content` is always plaintext; `is_encrypted` asks for it to be sealed.
#[derive(Debug, Clone)]
pub struct NewDiary {
    pub title: Option<String>,
    pub content: String,
    pub is_encrypted: bool,
    pub entry_date: DateTime<Utc>,
    pub daily_rating: Option<String>,
}

impl NewDiary {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: content.into(),
            is_encrypted: false,
            entry_date: Utc::now(),
            daily_rating: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn encrypted(mut self, is_encrypted: bool) -> Self {
        self.is_encrypted = is_encrypted;
        self
    }

    pub fn with_entry_date(mut self, entry_date: DateTime<Utc>) -> Self {
        self.entry_date = entry_date;
        self
    }

    pub fn with_rating(mut self, rating: impl Into<String>) -> Self {
        self.daily_rating = Some(rating.into());
        self
    }
}

/// Partial update for a diary entry. Absent fields are left alone.
///
/// Any `content` supplied here is plaintext.
#[derive(Debug, Clone, Default)]
pub struct DiaryUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_encrypted: Option<bool>,
    pub entry_date: Option<DateTime<Utc>>,
    pub daily_rating: Option<String>,
}

impl DiaryUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn encrypted(mut self, is_encrypted: bool) -> Self {
        self.is_encrypted = Some(is_encrypted);
        self
    }

    pub fn entry_date(mut self, entry_date: DateTime<Utc>) -> Self {
        self.entry_date = Some(entry_date);
        self
    }

    pub fn rating(mut self, rating: impl Into<String>) -> Self {
        self.daily_rating = Some(rating.into());
        self
    }

    /// Whether the update touches the content/flag pair.
    pub fn touches_content(&self) -> bool {
        self.content.is_some() || self.is_encrypted.is_some()
    }

    /// Overwrite the scalar fields that are not part of the content envelope.
    pub fn apply_scalars(&self, diary: &mut Diary) {
        if let Some(ref title) = self.title {
            diary.title = Some(title.clone());
        }
        if let Some(entry_date) = self.entry_date {
            diary.entry_date = entry_date;
        }
        if let Some(ref rating) = self.daily_rating {
            diary.daily_rating = Some(rating.clone());
        }
    }
}

/// Filter for querying diary entries.
#[derive(Debug, Clone)]
pub struct DiaryFilter {
    /// Number of matching rows to skip
    pub skip: usize,

    /// Maximum number of results
    pub limit: usize,

    /// Earliest entry date (inclusive)
    pub start_date: Option<DateTime<Utc>>,

    /// Latest entry date (inclusive)
    pub end_date: Option<DateTime<Utc>>,
}

impl Default for DiaryFilter {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
            start_date: None,
            end_date: None,
        }
    }
}

impl DiaryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn since(mut self, date: DateTime<Utc>) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn until(mut self, date: DateTime<Utc>) -> Self {
        self.end_date = Some(date);
        self
    }
}

/// Aggregate numbers over one user's diary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiaryStats {
    pub total_entries: u64,
    pub total_words: u64,
    pub average_words_per_entry: f64,
    pub check_in_frequency_percentage: f64,
    pub daily_ratings_distribution: BTreeMap<String, u64>,
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Low => "low",
            Importance::Medium => "medium",
            Importance::High => "high",
            Importance::Critical => "critical",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Importance {
    type Err = DiaryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Importance::Low),
            "medium" => Ok(Importance::Medium),
            "high" => Ok(Importance::High),
            "critical" => Ok(Importance::Critical),
            other => Err(DiaryError::InvalidInput(format!(
                "Unknown importance \"{}\" (expected low, medium, high, critical)",
                other
            ))),
        }
    }
}

/// A to-do item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub importance: Importance,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub reminder_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Builder for creating new tasks.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub importance: Importance,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub reminder_time: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            importance: Importance::default(),
            completed: false,
            due_date: None,
            reminder_time: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_reminder(mut self, reminder_time: DateTime<Utc>) -> Self {
        self.reminder_time = Some(reminder_time);
        self
    }
}

/// Partial update for a task.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub importance: Option<Importance>,
    pub completed: Option<bool>,
    pub due_date: Option<DateTime<Utc>>,
    pub reminder_time: Option<DateTime<Utc>>,
}

impl TaskUpdate {
    pub fn apply(&self, task: &mut Task) {
        if let Some(ref title) = self.title {
            task.title = title.clone();
        }
        if let Some(ref description) = self.description {
            task.description = Some(description.clone());
        }
        if let Some(importance) = self.importance {
            task.importance = importance;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(reminder_time) = self.reminder_time {
            task.reminder_time = Some(reminder_time);
        }
    }
}

/// Filter for querying tasks.
#[derive(Debug, Clone)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub importance: Option<Importance>,
    pub skip: usize,
    pub limit: usize,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            completed: None,
            importance: None,
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn importance(mut self, importance: Importance) -> Self {
        self.importance = Some(importance);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Per-user notification channel configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub owner_id: Uuid,
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

impl NotificationSettings {
    /// Everything disabled, nothing configured.
    pub fn disabled(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            ..Self::default()
        }
    }
}
