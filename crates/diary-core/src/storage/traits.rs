//! Storage collaborator traits.
//!
//! The crypto core only needs a narrow view of storage: credentials for key
//! derivation and owner-scoped diary rows. Those are split out as
//! [`UserCredentialStore`] and [`DiaryRecordStore`]; the task and
//! notification stores are thin CRUD on top. [`StorageEngine`] ties them
//! together for a concrete backend.
//!
//! All methods take `&self`. Backends serialise access internally, so a
//! single engine can be shared across request-handling threads.

use std::path::Path;

use uuid::Uuid;

use super::types::{
    Diary, DiaryFilter, NewTask, NewUser, NotificationSettings, Task, TaskFilter, User,
    UserCredentials,
};
use crate::error::Result;

/// Account rows and the credential pair the diary key comes from.
pub trait UserCredentialStore: Send + Sync {
    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `DiaryError::Conflict` if the username or email is taken.
    fn create_user(&self, user: &NewUser) -> Result<User>;

    /// Get a user by ID. `Ok(None)` if not found.
    fn get_user(&self, id: &Uuid) -> Result<Option<User>>;

    /// Get a user by login name. `Ok(None)` if not found.
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get a user by email. `Ok(None)` if not found.
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// The `(hashed_password, diary_encryption_salt)` pair for a user.
    ///
    /// # Errors
    ///
    /// Returns `DiaryError::UserNotFound` if the user does not exist.
    fn get_user_credentials(&self, user_id: &Uuid) -> Result<UserCredentials>;
}

/// Owner-scoped diary persistence.
pub trait DiaryRecordStore: Send + Sync {
    /// Persist a fully-formed diary row (content already in its final encoding).
    fn insert_diary(&self, diary: &Diary) -> Result<()>;

    /// Fetch a diary that belongs to `owner_id`.
    ///
    /// Returns `Ok(None)` both when the diary does not exist and when it
    /// belongs to someone else.
    fn get_diary(&self, id: &Uuid, owner_id: &Uuid) -> Result<Option<Diary>>;

    /// List an owner's diaries ordered by entry date (oldest first).
    fn list_diaries(&self, owner_id: &Uuid, filter: &DiaryFilter) -> Result<Vec<Diary>>;

    /// Every diary the owner has, for aggregation.
    fn all_diaries(&self, owner_id: &Uuid) -> Result<Vec<Diary>>;

    /// Overwrite an existing diary row, content and flag together.
    ///
    /// # Errors
    ///
    /// Returns `DiaryError::RecordNotFound` if no row with that id and owner exists.
    fn save_diary(&self, diary: &Diary) -> Result<()>;

    /// Delete a diary. Returns `false` if nothing owned by `owner_id` matched.
    fn delete_diary(&self, id: &Uuid, owner_id: &Uuid) -> Result<bool>;
}

/// Owner-scoped task persistence.
pub trait TaskStore: Send + Sync {
    fn insert_task(&self, owner_id: &Uuid, task: &NewTask) -> Result<Task>;

    /// `Ok(None)` if missing or owned by someone else.
    fn get_task(&self, id: &Uuid, owner_id: &Uuid) -> Result<Option<Task>>;

    /// Tasks ordered by due date (undated last), then creation time.
    fn list_tasks(&self, owner_id: &Uuid, filter: &TaskFilter) -> Result<Vec<Task>>;

    fn save_task(&self, task: &Task) -> Result<()>;

    fn delete_task(&self, id: &Uuid, owner_id: &Uuid) -> Result<bool>;
}

/// One notification-settings row per user.
pub trait NotificationSettingsStore: Send + Sync {
    /// `Ok(None)` if the user never saved settings.
    fn get_notification_settings(&self, owner_id: &Uuid) -> Result<Option<NotificationSettings>>;

    /// Insert or replace the user's settings.
    fn upsert_notification_settings(&self, settings: &NotificationSettings) -> Result<()>;
}

/// A complete storage backend.
pub trait StorageEngine:
    UserCredentialStore + DiaryRecordStore + TaskStore + NotificationSettingsStore
{
    /// Open (creating if needed) a database at `path` and ensure the schema exists.
    fn open(path: &Path) -> Result<Self>
    where
        Self: Sized;

    /// Open a private in-memory database, mainly for tests.
    fn open_in_memory() -> Result<Self>
    where
        Self: Sized;

    /// Check database integrity.
    ///
    /// Returns `Ok(())` if the store is consistent, or an error describing the problem.
    fn check_integrity(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_definition_compiles() {
        fn _accepts_storage_engine<T: StorageEngine>(_engine: T) {}
        fn _accepts_dyn_diary_store(_store: &dyn DiaryRecordStore) {}
        fn _accepts_dyn_credentials(_store: &dyn UserCredentialStore) {}
    }
}
