//! Request-level operations over a storage backend.
//!
//! [`DiaryService`] sequences each operation: ownership check first, then
//! the crypto policy, then one explicit persistence call. It holds no
//! mutable state of its own and can be shared across threads when the
//! backend can.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CryptoConfig;
use crate::crypto::{generate_salt, hash_password, validate_password, verify_password};
use crate::error::{DiaryError, Result};
use crate::policy::{DiaryCryptoPolicy, DiaryView};
use crate::stats::compute_stats;
use crate::storage::traits::StorageEngine;
use crate::storage::types::{
    Diary, DiaryFilter, DiaryStats, DiaryUpdate, NewDiary, NewTask, NewUser, NotificationSettings,
    Task, TaskFilter, TaskUpdate, User,
};

/// Diary, task and settings operations for authenticated users.
pub struct DiaryService<S: StorageEngine> {
    storage: S,
    policy: DiaryCryptoPolicy,
    config: CryptoConfig,
}

impl<S: StorageEngine> DiaryService<S> {
    /// Wrap a storage engine.
    ///
    /// # Errors
    ///
    /// Returns `DiaryError::InvalidInput` if the crypto settings are unusable.
    pub fn new(storage: S, config: CryptoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            storage,
            policy: DiaryCryptoPolicy::new(&config),
            config,
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn policy(&self) -> &DiaryCryptoPolicy {
        &self.policy
    }

    // --- Accounts ---

    /// Create an account with a fresh diary salt.
    pub fn register(&self, username: &str, password: &str, email: Option<&str>) -> Result<User> {
        validate_password(password)?;

        let new_user = NewUser {
            username: username.to_string(),
            email: email.map(str::to_string),
            hashed_password: hash_password(password)?,
            diary_encryption_salt: generate_salt(self.config.salt_len),
        };
        let user = self.storage.create_user(&new_user)?;

        info!(user_id = %user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Check a username/password pair.
    ///
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let Some(user) = self.storage.get_user_by_username(username)? else {
            debug!(username = %username, "Unknown user");
            return Err(DiaryError::AuthenticationFailed);
        };

        if !verify_password(password, &user.hashed_password) {
            debug!(user_id = %user.id, "Password mismatch");
            return Err(DiaryError::AuthenticationFailed);
        }
        Ok(user)
    }

    fn require_user(&self, owner_id: &Uuid) -> Result<User> {
        self.storage
            .get_user(owner_id)?
            .ok_or_else(|| DiaryError::UserNotFound(owner_id.to_string()))
    }

    fn owned_diary(&self, owner_id: &Uuid, id: &Uuid) -> Result<Diary> {
        self.storage
            .get_diary(id, owner_id)?
            .ok_or_else(|| DiaryError::RecordNotFound(format!("diary {}", id)))
    }

    // --- Diaries ---

    /// Create a diary and return the row as persisted.
    pub fn create_diary(&self, owner_id: &Uuid, input: &NewDiary) -> Result<Diary> {
        self.require_user(owner_id)?;

        let mut key = self.policy.key_for(&self.storage, *owner_id);
        let diary = self.policy.seal_new(*owner_id, input, &mut key)?;
        self.storage.insert_diary(&diary)?;

        info!(diary_id = %diary.id, encrypted = diary.is_encrypted, "Created diary");
        self.owned_diary(owner_id, &diary.id)
    }

    /// Fetch one diary. With `decrypt`, encrypted content is opened in the result only.
    ///
    /// # Errors
    ///
    /// `RecordNotFound` if missing or not owned; `Decryption` if the blob will not open.
    pub fn get_diary(&self, owner_id: &Uuid, id: &Uuid, decrypt: bool) -> Result<DiaryView> {
        let stored = self.owned_diary(owner_id, id)?;
        let mut key = self.policy.key_for(&self.storage, *owner_id);
        self.policy.present(&stored, decrypt, &mut key)
    }

    /// List diaries. An entry that fails to decrypt is returned as stored,
    /// with `decrypted` left false.
    pub fn list_diaries(
        &self,
        owner_id: &Uuid,
        filter: &DiaryFilter,
        decrypt: bool,
    ) -> Result<Vec<DiaryView>> {
        let stored = self.storage.list_diaries(owner_id, filter)?;
        if !decrypt {
            return Ok(stored.into_iter().map(DiaryView::stored).collect());
        }

        let mut key = self.policy.key_for(&self.storage, *owner_id);
        if stored.iter().any(|d| d.is_encrypted) {
            key.get()?;
        }

        let mut diaries = Vec::with_capacity(stored.len());
        for diary in stored {
            match self.policy.present(&diary, true, &mut key) {
                Ok(view) => diaries.push(view),
                Err(e) => {
                    warn!(diary_id = %diary.id, error = %e, "Returning diary undecrypted");
                    diaries.push(DiaryView::stored(diary));
                }
            }
        }
        Ok(diaries)
    }

    /// Apply an update and return the row as persisted.
    pub fn update_diary(&self, owner_id: &Uuid, id: &Uuid, update: &DiaryUpdate) -> Result<Diary> {
        let stored = self.owned_diary(owner_id, id)?;

        let mut key = self.policy.key_for(&self.storage, *owner_id);
        let updated = self.policy.apply_update(&stored, update, &mut key)?;
        self.storage.save_diary(&updated)?;

        info!(
            diary_id = %updated.id,
            encrypted = updated.is_encrypted,
            "Updated diary"
        );
        self.owned_diary(owner_id, id)
    }

    pub fn delete_diary(&self, owner_id: &Uuid, id: &Uuid) -> Result<()> {
        if !self.storage.delete_diary(id, owner_id)? {
            return Err(DiaryError::RecordNotFound(format!("diary {}", id)));
        }
        info!(diary_id = %id, "Deleted diary");
        Ok(())
    }

    pub fn diary_stats(&self, owner_id: &Uuid) -> Result<DiaryStats> {
        self.require_user(owner_id)?;
        let diaries = self.storage.all_diaries(owner_id)?;
        let mut key = self.policy.key_for(&self.storage, *owner_id);
        compute_stats(&diaries, &mut key)
    }

    // --- Tasks ---

    pub fn create_task(&self, owner_id: &Uuid, input: &NewTask) -> Result<Task> {
        self.require_user(owner_id)?;
        let task = self.storage.insert_task(owner_id, input)?;
        info!(task_id = %task.id, "Created task");
        Ok(task)
    }

    pub fn get_task(&self, owner_id: &Uuid, id: &Uuid) -> Result<Task> {
        self.storage
            .get_task(id, owner_id)?
            .ok_or_else(|| DiaryError::RecordNotFound(format!("task {}", id)))
    }

    pub fn list_tasks(&self, owner_id: &Uuid, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.storage.list_tasks(owner_id, filter)
    }

    pub fn update_task(&self, owner_id: &Uuid, id: &Uuid, update: &TaskUpdate) -> Result<Task> {
        let mut task = self.get_task(owner_id, id)?;
        update.apply(&mut task);
        task.updated_at = Some(Utc::now());
        self.storage.save_task(&task)?;
        info!(task_id = %task.id, "Updated task");
        self.get_task(owner_id, id)
    }

    pub fn delete_task(&self, owner_id: &Uuid, id: &Uuid) -> Result<()> {
        if !self.storage.delete_task(id, owner_id)? {
            return Err(DiaryError::RecordNotFound(format!("task {}", id)));
        }
        info!(task_id = %id, "Deleted task");
        Ok(())
    }

    // --- Notification settings ---

    /// Saved settings, or everything disabled if none were saved.
    pub fn notification_settings(&self, owner_id: &Uuid) -> Result<NotificationSettings> {
        Ok(self
            .storage
            .get_notification_settings(owner_id)?
            .unwrap_or_else(|| NotificationSettings::disabled(*owner_id)))
    }

    pub fn save_notification_settings(&self, settings: &NotificationSettings) -> Result<()> {
        self.require_user(&settings.owner_id)?;
        self.storage.upsert_notification_settings(settings)?;
        info!(user_id = %settings.owner_id, "Saved notification settings");
        Ok(())
    }

    pub fn check_integrity(&self) -> Result<()> {
        self.storage.check_integrity()
    }
}
