//! Storage abstraction for diary data.
//!
//! This module defines the collaborator traits the core depends on and a
//! SQLite backend implementing them.
//!
//! ## Architecture
//!
//! The storage layer is backend-agnostic. Storage never decides how
//! diary content is encoded: rows arrive with `content` and `is_encrypted`
//! already resolved by [`crate::DiaryCryptoPolicy`], and are written as a
//! pair.

pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export public types
pub use sqlite::SqliteStorage;
pub use traits::{
    DiaryRecordStore, NotificationSettingsStore, StorageEngine, TaskStore, UserCredentialStore,
};
pub use types::{
    Diary, DiaryFilter, DiaryStats, DiaryUpdate, Importance, NewDiary, NewTask, NewUser,
    NotificationSettings, Task, TaskFilter, TaskUpdate, User, UserCredentials,
    DEFAULT_LIST_LIMIT, MAX_DIARY_BYTES,
};
