//! SQLite storage backend.
//!
//! One file-backed (or in-memory) database holds users, diaries, tasks and
//! notification settings. Timestamps are stored as fixed-width RFC 3339 text
//! in UTC so lexical order matches chronological order; ids are UUID text.

mod row;
pub mod validation;

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DiaryError, Result};
use crate::storage::traits::{
    DiaryRecordStore, NotificationSettingsStore, StorageEngine, TaskStore, UserCredentialStore,
};
use crate::storage::types::{
    Diary, DiaryFilter, NewTask, NewUser, NotificationSettings, Task, TaskFilter, User,
    UserCredentials,
};

use row::{
    DiaryRow, NotificationRow, TaskRow, UserRow, DIARY_COLUMNS, NOTIFICATION_COLUMNS,
    TASK_COLUMNS, USER_COLUMNS,
};
use validation::{
    normalize_email, normalize_rating, normalize_task_title, normalize_title, normalize_username,
    validate_content,
};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT UNIQUE,
        hashed_password TEXT NOT NULL,
        diary_encryption_salt TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT
    );

    CREATE TABLE IF NOT EXISTS diaries (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        title TEXT,
        content TEXT NOT NULL,
        is_encrypted INTEGER NOT NULL DEFAULT 0,
        entry_date TEXT NOT NULL,
        daily_rating TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT,

        FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS diaries_owner_date ON diaries (owner_id, entry_date);

    CREATE TABLE IF NOT EXISTS tasks (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        importance TEXT NOT NULL DEFAULT 'medium',
        completed INTEGER NOT NULL DEFAULT 0,
        due_date TEXT,
        reminder_time TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT,

        FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS tasks_owner ON tasks (owner_id);

    CREATE TABLE IF NOT EXISTS notification_settings (
        owner_id TEXT PRIMARY KEY,
        email_enabled INTEGER NOT NULL DEFAULT 0,
        email_address TEXT,
        wecom_enabled INTEGER NOT NULL DEFAULT 0,
        wecom_webhook_url TEXT,
        dingtalk_enabled INTEGER NOT NULL DEFAULT 0,
        dingtalk_webhook_url TEXT,
        telegram_enabled INTEGER NOT NULL DEFAULT 0,
        telegram_bot_token TEXT,
        telegram_chat_id TEXT,

        FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
    );
"#;

/// Format a timestamp for storage.
fn ts(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn opt_ts(value: Option<&DateTime<Utc>>) -> Option<String> {
    value.map(ts)
}

/// SQLite-backed storage engine.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DiaryError::Storage("SQLite connection poisoned".to_string()))
    }

    fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, column);
        let row = conn
            .query_row(&sql, [value], UserRow::from_row)
            .optional()?;
        row.map(User::try_from).transpose()
    }
}

impl UserCredentialStore for SqliteStorage {
    fn create_user(&self, user: &NewUser) -> Result<User> {
        let username = normalize_username(&user.username)?;
        let email = normalize_email(user.email.as_deref())?;
        if user.hashed_password.is_empty() || user.diary_encryption_salt.is_empty() {
            return Err(DiaryError::Validation(
                "User credentials cannot be empty".to_string(),
            ));
        }

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let taken: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)",
            [&username],
            |row| row.get(0),
        )?;
        if taken {
            return Err(DiaryError::Conflict(format!(
                "Username already registered: {}",
                username
            )));
        }

        if let Some(ref email) = email {
            let taken: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)",
                [email],
                |row| row.get(0),
            )?;
            if taken {
                return Err(DiaryError::Conflict(format!(
                    "Email already registered: {}",
                    email
                )));
            }
        }

        let created = User {
            id: Uuid::new_v4(),
            username,
            email,
            hashed_password: user.hashed_password.clone(),
            diary_encryption_salt: user.diary_encryption_salt.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };

        tx.execute(
            "INSERT INTO users (id, username, email, hashed_password, diary_encryption_salt, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                created.id.to_string(),
                created.username,
                created.email,
                created.hashed_password,
                created.diary_encryption_salt,
                ts(&created.created_at),
            ],
        )?;
        tx.commit()?;

        debug!(user_id = %created.id, "user row inserted");
        Ok(created)
    }

    fn get_user(&self, id: &Uuid) -> Result<Option<User>> {
        let conn = self.lock_conn()?;
        Self::query_user(&conn, "id", &id.to_string())
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.lock_conn()?;
        Self::query_user(&conn, "username", username.trim())
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.lock_conn()?;
        Self::query_user(&conn, "email", &email.trim().to_ascii_lowercase())
    }

    fn get_user_credentials(&self, user_id: &Uuid) -> Result<UserCredentials> {
        let conn = self.lock_conn()?;
        let result = conn.query_row(
            "SELECT hashed_password, diary_encryption_salt FROM users WHERE id = ?",
            [user_id.to_string()],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        );

        match result {
            Ok((hashed_password, diary_encryption_salt)) => Ok(UserCredentials {
                hashed_password,
                diary_encryption_salt,
            }),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(DiaryError::UserNotFound(user_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl DiaryRecordStore for SqliteStorage {
    fn insert_diary(&self, diary: &Diary) -> Result<()> {
        validate_content(&diary.content)?;
        let title = normalize_title(diary.title.as_deref())?;
        let rating = normalize_rating(diary.daily_rating.as_deref())?;

        let conn = self.lock_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO diaries ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                DIARY_COLUMNS
            ),
            params![
                diary.id.to_string(),
                diary.owner_id.to_string(),
                title,
                diary.content,
                diary.is_encrypted,
                ts(&diary.entry_date),
                rating,
                ts(&diary.created_at),
                opt_ts(diary.updated_at.as_ref()),
            ],
        )?;

        debug!(diary_id = %diary.id, encrypted = diary.is_encrypted, "diary row inserted");
        Ok(())
    }

    fn get_diary(&self, id: &Uuid, owner_id: &Uuid) -> Result<Option<Diary>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM diaries WHERE id = ? AND owner_id = ?",
                    DIARY_COLUMNS
                ),
                [id.to_string(), owner_id.to_string()],
                DiaryRow::from_row,
            )
            .optional()?;

        row.map(Diary::try_from).transpose()
    }

    fn list_diaries(&self, owner_id: &Uuid, filter: &DiaryFilter) -> Result<Vec<Diary>> {
        let conn = self.lock_conn()?;

        let mut conditions = vec!["owner_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(owner_id.to_string())];

        if let Some(start) = filter.start_date {
            conditions.push("entry_date >= ?".to_string());
            params.push(Box::new(ts(&start)));
        }

        if let Some(end) = filter.end_date {
            conditions.push("entry_date <= ?".to_string());
            params.push(Box::new(ts(&end)));
        }

        let query = format!(
            "SELECT {} FROM diaries WHERE {} ORDER BY entry_date ASC, created_at ASC LIMIT ? OFFSET ?",
            DIARY_COLUMNS,
            conditions.join(" AND ")
        );
        params.push(Box::new(i64::try_from(filter.limit).unwrap_or(i64::MAX)));
        params.push(Box::new(i64::try_from(filter.skip).unwrap_or(i64::MAX)));

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params.iter()),
            DiaryRow::from_row,
        )?;

        let mut diaries = Vec::new();
        for row in rows {
            diaries.push(row?.try_into()?);
        }
        Ok(diaries)
    }

    fn all_diaries(&self, owner_id: &Uuid) -> Result<Vec<Diary>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM diaries WHERE owner_id = ? ORDER BY entry_date ASC, created_at ASC",
            DIARY_COLUMNS
        ))?;
        let rows = stmt.query_map([owner_id.to_string()], DiaryRow::from_row)?;

        let mut diaries = Vec::new();
        for row in rows {
            diaries.push(row?.try_into()?);
        }
        Ok(diaries)
    }

    fn save_diary(&self, diary: &Diary) -> Result<()> {
        validate_content(&diary.content)?;
        let title = normalize_title(diary.title.as_deref())?;
        let rating = normalize_rating(diary.daily_rating.as_deref())?;

        let conn = self.lock_conn()?;
        let changed = conn.execute(
            "UPDATE diaries SET title = ?, content = ?, is_encrypted = ?, entry_date = ?, \
             daily_rating = ?, updated_at = ? WHERE id = ? AND owner_id = ?",
            params![
                title,
                diary.content,
                diary.is_encrypted,
                ts(&diary.entry_date),
                rating,
                opt_ts(diary.updated_at.as_ref()),
                diary.id.to_string(),
                diary.owner_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(DiaryError::RecordNotFound(diary.id.to_string()));
        }

        debug!(diary_id = %diary.id, encrypted = diary.is_encrypted, "diary row saved");
        Ok(())
    }

    fn delete_diary(&self, id: &Uuid, owner_id: &Uuid) -> Result<bool> {
        let conn = self.lock_conn()?;
        let deleted = conn.execute(
            "DELETE FROM diaries WHERE id = ? AND owner_id = ?",
            [id.to_string(), owner_id.to_string()],
        )?;
        Ok(deleted > 0)
    }
}

impl TaskStore for SqliteStorage {
    fn insert_task(&self, owner_id: &Uuid, task: &NewTask) -> Result<Task> {
        let title = normalize_task_title(&task.title)?;

        let created = Task {
            id: Uuid::new_v4(),
            owner_id: *owner_id,
            title,
            description: task.description.clone(),
            importance: task.importance,
            completed: task.completed,
            due_date: task.due_date,
            reminder_time: task.reminder_time,
            created_at: Utc::now(),
            updated_at: None,
        };

        let conn = self.lock_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO tasks ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                TASK_COLUMNS
            ),
            params![
                created.id.to_string(),
                created.owner_id.to_string(),
                created.title,
                created.description,
                created.importance.as_str(),
                created.completed,
                opt_ts(created.due_date.as_ref()),
                opt_ts(created.reminder_time.as_ref()),
                ts(&created.created_at),
                Option::<String>::None,
            ],
        )?;

        Ok(created)
    }

    fn get_task(&self, id: &Uuid, owner_id: &Uuid) -> Result<Option<Task>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM tasks WHERE id = ? AND owner_id = ?",
                    TASK_COLUMNS
                ),
                [id.to_string(), owner_id.to_string()],
                TaskRow::from_row,
            )
            .optional()?;

        row.map(Task::try_from).transpose()
    }

    fn list_tasks(&self, owner_id: &Uuid, filter: &TaskFilter) -> Result<Vec<Task>> {
        let conn = self.lock_conn()?;

        let mut conditions = vec!["owner_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(owner_id.to_string())];

        if let Some(completed) = filter.completed {
            conditions.push("completed = ?".to_string());
            params.push(Box::new(completed));
        }

        if let Some(importance) = filter.importance {
            conditions.push("importance = ?".to_string());
            params.push(Box::new(importance.as_str()));
        }

        let query = format!(
            "SELECT {} FROM tasks WHERE {} \
             ORDER BY due_date IS NULL, due_date ASC, created_at ASC LIMIT ? OFFSET ?",
            TASK_COLUMNS,
            conditions.join(" AND ")
        );
        params.push(Box::new(i64::try_from(filter.limit).unwrap_or(i64::MAX)));
        params.push(Box::new(i64::try_from(filter.skip).unwrap_or(i64::MAX)));

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params.iter()),
            TaskRow::from_row,
        )?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?.try_into()?);
        }
        Ok(tasks)
    }

    fn save_task(&self, task: &Task) -> Result<()> {
        let title = normalize_task_title(&task.title)?;

        let conn = self.lock_conn()?;
        let changed = conn.execute(
            "UPDATE tasks SET title = ?, description = ?, importance = ?, completed = ?, \
             due_date = ?, reminder_time = ?, updated_at = ? WHERE id = ? AND owner_id = ?",
            params![
                title,
                task.description,
                task.importance.as_str(),
                task.completed,
                opt_ts(task.due_date.as_ref()),
                opt_ts(task.reminder_time.as_ref()),
                opt_ts(task.updated_at.as_ref()),
                task.id.to_string(),
                task.owner_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(DiaryError::RecordNotFound(task.id.to_string()));
        }
        Ok(())
    }

    fn delete_task(&self, id: &Uuid, owner_id: &Uuid) -> Result<bool> {
        let conn = self.lock_conn()?;
        let deleted = conn.execute(
            "DELETE FROM tasks WHERE id = ? AND owner_id = ?",
            [id.to_string(), owner_id.to_string()],
        )?;
        Ok(deleted > 0)
    }
}

impl NotificationSettingsStore for SqliteStorage {
    fn get_notification_settings(&self, owner_id: &Uuid) -> Result<Option<NotificationSettings>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM notification_settings WHERE owner_id = ?",
                    NOTIFICATION_COLUMNS
                ),
                [owner_id.to_string()],
                NotificationRow::from_row,
            )
            .optional()?;

        row.map(NotificationSettings::try_from).transpose()
    }

    fn upsert_notification_settings(&self, settings: &NotificationSettings) -> Result<()> {
        let email_address = normalize_email(settings.email_address.as_deref())?;
        if settings.email_enabled && email_address.is_none() {
            return Err(DiaryError::Validation(
                "Email notifications need an email address".to_string(),
            ));
        }

        let conn = self.lock_conn()?;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO notification_settings ({}) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                NOTIFICATION_COLUMNS
            ),
            params![
                settings.owner_id.to_string(),
                settings.email_enabled,
                email_address,
                settings.wecom_enabled,
                settings.wecom_webhook_url,
                settings.dingtalk_enabled,
                settings.dingtalk_webhook_url,
                settings.telegram_enabled,
                settings.telegram_bot_token,
                settings.telegram_chat_id,
            ],
        )?;
        Ok(())
    }
}

impl StorageEngine for SqliteStorage {
    fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "opening sqlite database");
        Self::from_connection(Connection::open(path)?)
    }

    fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn check_integrity(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        let status: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if status != "ok" {
            return Err(DiaryError::Storage(format!(
                "SQLite integrity check failed: {}",
                status
            )));
        }

        let mut stmt = conn.prepare("PRAGMA foreign_key_check")?;
        let mut rows = stmt.query([])?;
        if rows.next()?.is_some() {
            return Err(DiaryError::Storage(
                "Foreign key integrity check failed".to_string(),
            ));
        }

        let empty_blobs: i64 = conn.query_row(
            "SELECT COUNT(*) FROM diaries WHERE is_encrypted = 1 AND content = ''",
            [],
            |row| row.get(0),
        )?;
        if empty_blobs > 0 {
            return Err(DiaryError::Storage(format!(
                "{} encrypted diaries have empty content",
                empty_blobs
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format_is_fixed_width() {
        let a = "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let b = "2024-01-01T00:00:00.5Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(ts(&a).len(), ts(&b).len());
        assert!(ts(&a) < ts(&b));
    }

    #[test]
    fn test_open_in_memory_creates_schema() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.check_integrity().unwrap();
    }
}
