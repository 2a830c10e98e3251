//! Encrypt/decrypt decisions for diary content.
//!
//! [`DiaryCryptoPolicy`] turns create, read and update requests into new
//! diary values whose `content` and `is_encrypted` agree. It never touches
//! storage for diary rows: callers hand it a value and persist what comes
//! back. Key material is pulled through an [`OperationKey`], which asks the
//! credential store and runs PBKDF2 at most once, and only if a branch
//! actually needs the key.

use std::ops::Deref;

use chrono::Utc;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::CryptoConfig;
use crate::crypto::{decrypt, derive_key, encrypt, DerivedKey, KdfParams};
use crate::error::{DiaryError, Result};
use crate::storage::traits::UserCredentialStore;
use crate::storage::types::{Diary, DiaryUpdate, NewDiary, MAX_DIARY_BYTES};

/// The diary key for a single operation, derived on first use.
pub struct OperationKey<'a> {
    credentials: &'a dyn UserCredentialStore,
    owner_id: Uuid,
    params: KdfParams,
    key: Option<DerivedKey>,
}

impl<'a> OperationKey<'a> {
    pub fn new(credentials: &'a dyn UserCredentialStore, owner_id: Uuid, params: KdfParams) -> Self {
        Self {
            credentials,
            owner_id,
            params,
            key: None,
        }
    }

    /// Whether the key has been derived yet.
    pub fn is_derived(&self) -> bool {
        self.key.is_some()
    }

    /// Derive (or return the already-derived) key.
    pub fn get(&mut self) -> Result<&DerivedKey> {
        let key = match self.key.take() {
            Some(key) => key,
            None => {
                let creds = self.credentials.get_user_credentials(&self.owner_id)?;
                derive_key(
                    &creds.hashed_password,
                    &creds.diary_encryption_salt,
                    &self.params,
                )?
            }
        };
        Ok(self.key.insert(key))
    }
}

/// A diary as handed to a reader.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiaryView {
    #[serde(flatten)]
    pub diary: Diary,
    /// `content` holds the opened plaintext of an encrypted row.
    pub decrypted: bool,
}

impl DiaryView {
    /// The row exactly as stored.
    pub fn stored(diary: Diary) -> Self {
        Self {
            diary,
            decrypted: false,
        }
    }
}

impl Deref for DiaryView {
    type Target = Diary;

    fn deref(&self) -> &Diary {
        &self.diary
    }
}

fn check_plaintext_size(content: &str) -> Result<()> {
    if content.len() > MAX_DIARY_BYTES {
        return Err(DiaryError::Validation(format!(
            "Diary content too large ({} bytes, max {})",
            content.len(),
            MAX_DIARY_BYTES
        )));
    }
    Ok(())
}

/// Where an update leaves the content envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentChange {
    /// Content and flag stay as stored.
    Unchanged,
    /// Store this value with this flag.
    Replace { content: String, is_encrypted: bool },
}

/// Decides, per operation, whether diary content is sealed, opened or passed through.
#[derive(Debug, Clone)]
pub struct DiaryCryptoPolicy {
    kdf: KdfParams,
}

impl Default for DiaryCryptoPolicy {
    fn default() -> Self {
        Self::new(&CryptoConfig::default())
    }
}

impl DiaryCryptoPolicy {
    pub fn new(config: &CryptoConfig) -> Self {
        Self { kdf: config.kdf }
    }

    pub fn kdf(&self) -> &KdfParams {
        &self.kdf
    }

    /// Start a new operation for `owner_id`. Nothing is derived yet.
    pub fn key_for<'a>(
        &self,
        credentials: &'a dyn UserCredentialStore,
        owner_id: Uuid,
    ) -> OperationKey<'a> {
        OperationKey::new(credentials, owner_id, self.kdf)
    }

    /// Build the row for a new diary, sealing the content if asked.
    pub fn seal_new(
        &self,
        owner_id: Uuid,
        input: &NewDiary,
        key: &mut OperationKey<'_>,
    ) -> Result<Diary> {
        check_plaintext_size(&input.content)?;
        let content = if input.is_encrypted {
            encrypt(&input.content, key.get()?)?
        } else {
            input.content.clone()
        };

        Ok(Diary {
            id: Uuid::new_v4(),
            owner_id,
            title: input.title.clone(),
            content,
            is_encrypted: input.is_encrypted,
            entry_date: input.entry_date,
            daily_rating: input.daily_rating.clone(),
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// The view of a stored diary handed back to a reader.
    ///
    /// Content is opened only when the row is encrypted and `decrypt` is
    /// set. The flag is left as stored, so it keeps describing the row.
    pub fn present(
        &self,
        stored: &Diary,
        decrypt_requested: bool,
        key: &mut OperationKey<'_>,
    ) -> Result<DiaryView> {
        let mut view = DiaryView::stored(stored.clone());
        if stored.is_encrypted && decrypt_requested {
            view.diary.content = decrypt(&stored.content, key.get()?)?;
            view.decrypted = true;
        }
        Ok(view)
    }

    /// Resolve the content envelope for an update.
    ///
    /// Update content is always plaintext. A row that is already encrypted,
    /// stays encrypted and receives no new content keeps its ciphertext.
    pub fn resolve_update(
        &self,
        stored: &Diary,
        update: &DiaryUpdate,
        key: &mut OperationKey<'_>,
    ) -> Result<ContentChange> {
        if !update.touches_content() {
            return Ok(ContentChange::Unchanged);
        }
        if let Some(plaintext) = update.content.as_deref() {
            check_plaintext_size(plaintext)?;
        }

        let effective = update.is_encrypted.unwrap_or(stored.is_encrypted);
        let change = match (effective, update.content.as_deref(), stored.is_encrypted) {
            (true, Some(plaintext), _) => ContentChange::Replace {
                content: encrypt(plaintext, key.get()?)?,
                is_encrypted: true,
            },
            (true, None, false) => ContentChange::Replace {
                content: encrypt(&stored.content, key.get()?)?,
                is_encrypted: true,
            },
            (true, None, true) => ContentChange::Unchanged,
            (false, Some(plaintext), _) => ContentChange::Replace {
                content: plaintext.to_string(),
                is_encrypted: false,
            },
            (false, None, true) => ContentChange::Replace {
                content: decrypt(&stored.content, key.get()?)?,
                is_encrypted: false,
            },
            (false, None, false) => ContentChange::Unchanged,
        };

        debug!(
            diary_id = %stored.id,
            from = stored.is_encrypted,
            to = effective,
            "resolved diary content update"
        );
        Ok(change)
    }

    /// Apply an update to a stored diary and return the new row.
    ///
    /// Content and flag are resolved first, then scalar fields are
    /// overwritten. The stored value is not modified.
    pub fn apply_update(
        &self,
        stored: &Diary,
        update: &DiaryUpdate,
        key: &mut OperationKey<'_>,
    ) -> Result<Diary> {
        let mut next = stored.clone();
        if let ContentChange::Replace {
            content,
            is_encrypted,
        } = self.resolve_update(stored, update, key)?
        {
            next.content = content;
            next.is_encrypted = is_encrypted;
        }
        update.apply_scalars(&mut next);
        next.updated_at = Some(Utc::now());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_salt;
    use crate::storage::types::{NewUser, User, UserCredentials};

    struct FixedCredentials {
        owner_id: Uuid,
        credentials: UserCredentials,
    }

    impl FixedCredentials {
        fn new() -> Self {
            Self {
                owner_id: Uuid::new_v4(),
                credentials: UserCredentials {
                    hashed_password: "$argon2id$v=19$fixture".to_string(),
                    diary_encryption_salt: generate_salt(16),
                },
            }
        }
    }

    impl UserCredentialStore for FixedCredentials {
        fn create_user(&self, _user: &NewUser) -> Result<User> {
            Err(DiaryError::Storage("read-only fixture".to_string()))
        }

        fn get_user(&self, _id: &Uuid) -> Result<Option<User>> {
            Ok(None)
        }

        fn get_user_by_username(&self, _username: &str) -> Result<Option<User>> {
            Ok(None)
        }

        fn get_user_by_email(&self, _email: &str) -> Result<Option<User>> {
            Ok(None)
        }

        fn get_user_credentials(&self, user_id: &Uuid) -> Result<UserCredentials> {
            if *user_id == self.owner_id {
                Ok(self.credentials.clone())
            } else {
                Err(DiaryError::UserNotFound(user_id.to_string()))
            }
        }
    }

    fn policy() -> DiaryCryptoPolicy {
        DiaryCryptoPolicy::new(&CryptoConfig::new(KdfParams::new(1_000), 16))
    }

    fn open(policy: &DiaryCryptoPolicy, store: &FixedCredentials, blob: &str) -> String {
        let mut key = policy.key_for(store, store.owner_id);
        decrypt(blob, key.get().unwrap()).unwrap()
    }

    #[test]
    fn test_create_plaintext_passes_through() {
        let store = FixedCredentials::new();
        let policy = policy();
        let mut key = policy.key_for(&store, store.owner_id);

        let diary = policy
            .seal_new(store.owner_id, &NewDiary::new("hello"), &mut key)
            .unwrap();

        assert_eq!(diary.content, "hello");
        assert!(!diary.is_encrypted);
        assert!(!key.is_derived());
    }

    #[test]
    fn test_create_encrypted_seals_content() {
        let store = FixedCredentials::new();
        let policy = policy();
        let mut key = policy.key_for(&store, store.owner_id);

        let diary = policy
            .seal_new(
                store.owner_id,
                &NewDiary::new("secret").encrypted(true),
                &mut key,
            )
            .unwrap();

        assert!(diary.is_encrypted);
        assert_ne!(diary.content, "secret");
        assert_eq!(open(&policy, &store, &diary.content), "secret");
    }

    #[test]
    fn test_enable_encryption_without_content_seals_stored_plaintext() {
        let store = FixedCredentials::new();
        let policy = policy();
        let mut key = policy.key_for(&store, store.owner_id);
        let stored = policy
            .seal_new(store.owner_id, &NewDiary::new("prior text"), &mut key)
            .unwrap();

        let updated = policy
            .apply_update(&stored, &DiaryUpdate::new().encrypted(true), &mut key)
            .unwrap();

        assert!(updated.is_encrypted);
        assert_eq!(open(&policy, &store, &updated.content), "prior text");
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn test_disable_encryption_without_content_opens_stored_blob() {
        let store = FixedCredentials::new();
        let policy = policy();
        let mut key = policy.key_for(&store, store.owner_id);
        let stored = policy
            .seal_new(
                store.owner_id,
                &NewDiary::new("was sealed").encrypted(true),
                &mut key,
            )
            .unwrap();

        let updated = policy
            .apply_update(&stored, &DiaryUpdate::new().encrypted(false), &mut key)
            .unwrap();

        assert!(!updated.is_encrypted);
        assert_eq!(updated.content, "was sealed");
    }

    #[test]
    fn test_new_content_on_encrypted_row_is_sealed() {
        let store = FixedCredentials::new();
        let policy = policy();
        let mut key = policy.key_for(&store, store.owner_id);
        let stored = policy
            .seal_new(
                store.owner_id,
                &NewDiary::new("old").encrypted(true),
                &mut key,
            )
            .unwrap();

        let updated = policy
            .apply_update(&stored, &DiaryUpdate::new().content("new"), &mut key)
            .unwrap();

        assert!(updated.is_encrypted);
        assert_eq!(open(&policy, &store, &updated.content), "new");
    }

    #[test]
    fn test_new_plaintext_with_flag_off_is_stored_verbatim() {
        let store = FixedCredentials::new();
        let policy = policy();
        let mut key = policy.key_for(&store, store.owner_id);
        let stored = policy
            .seal_new(
                store.owner_id,
                &NewDiary::new("old").encrypted(true),
                &mut key,
            )
            .unwrap();

        let mut fresh = policy.key_for(&store, store.owner_id);
        let updated = policy
            .apply_update(
                &stored,
                &DiaryUpdate::new().content("plain now").encrypted(false),
                &mut fresh,
            )
            .unwrap();

        assert!(!updated.is_encrypted);
        assert_eq!(updated.content, "plain now");
        assert!(!fresh.is_derived());
    }

    #[test]
    fn test_keeping_encryption_does_not_double_encrypt() {
        let store = FixedCredentials::new();
        let policy = policy();
        let mut key = policy.key_for(&store, store.owner_id);
        let stored = policy
            .seal_new(
                store.owner_id,
                &NewDiary::new("once").encrypted(true),
                &mut key,
            )
            .unwrap();

        let change = policy
            .resolve_update(&stored, &DiaryUpdate::new().encrypted(true), &mut key)
            .unwrap();
        assert_eq!(change, ContentChange::Unchanged);
    }

    #[test]
    fn test_scalar_only_update_skips_crypto() {
        let store = FixedCredentials::new();
        let policy = policy();
        let mut key = policy.key_for(&store, store.owner_id);
        let stored = Diary {
            content: "not a real blob".to_string(),
            is_encrypted: true,
            ..policy
                .seal_new(store.owner_id, &NewDiary::new("x"), &mut key)
                .unwrap()
        };

        let mut fresh = policy.key_for(&store, store.owner_id);
        let updated = policy
            .apply_update(&stored, &DiaryUpdate::new().title("renamed"), &mut fresh)
            .unwrap();

        assert_eq!(updated.title.as_deref(), Some("renamed"));
        assert_eq!(updated.content, "not a real blob");
        assert!(!fresh.is_derived());
    }

    #[test]
    fn test_present_respects_decrypt_flag() {
        let store = FixedCredentials::new();
        let policy = policy();
        let mut key = policy.key_for(&store, store.owner_id);
        let stored = policy
            .seal_new(
                store.owner_id,
                &NewDiary::new("hidden").encrypted(true),
                &mut key,
            )
            .unwrap();

        let opaque = policy.present(&stored, false, &mut key).unwrap();
        assert_eq!(opaque.content, stored.content);
        assert!(!opaque.decrypted);

        let opened = policy.present(&stored, true, &mut key).unwrap();
        assert_eq!(opened.content, "hidden");
        assert!(opened.is_encrypted);
        assert!(opened.decrypted);

        let plain = policy
            .seal_new(store.owner_id, &NewDiary::new("open"), &mut key)
            .unwrap();
        assert!(!policy.present(&plain, true, &mut key).unwrap().decrypted);
        assert_ne!(stored.content, "hidden");
    }

    #[test]
    fn test_plaintext_over_limit_is_rejected_before_sealing() {
        let store = FixedCredentials::new();
        let policy = policy();
        let mut key = policy.key_for(&store, store.owner_id);
        let oversized = "x".repeat(MAX_DIARY_BYTES + 1);

        let err = policy
            .seal_new(
                store.owner_id,
                &NewDiary::new(oversized.as_str()).encrypted(true),
                &mut key,
            )
            .unwrap_err();
        assert!(matches!(err, DiaryError::Validation(_)));
        assert!(!key.is_derived());

        let stored = policy
            .seal_new(store.owner_id, &NewDiary::new("small"), &mut key)
            .unwrap();
        let err = policy
            .resolve_update(&stored, &DiaryUpdate::new().content(oversized), &mut key)
            .unwrap_err();
        assert!(matches!(err, DiaryError::Validation(_)));
    }

    #[test]
    fn test_failed_decrypt_on_update_aborts() {
        let store = FixedCredentials::new();
        let policy = policy();
        let mut key = policy.key_for(&store, store.owner_id);
        let stored = Diary {
            content: "garbage".to_string(),
            is_encrypted: true,
            ..policy
                .seal_new(store.owner_id, &NewDiary::new("x"), &mut key)
                .unwrap()
        };

        let err = policy
            .apply_update(&stored, &DiaryUpdate::new().encrypted(false), &mut key)
            .unwrap_err();
        assert!(matches!(err, DiaryError::Decryption(_)));
    }

    #[test]
    fn test_bad_salt_surfaces_key_derivation_error() {
        let mut store = FixedCredentials::new();
        store.credentials.diary_encryption_salt = "***".to_string();
        let policy = policy();
        let mut key = policy.key_for(&store, store.owner_id);

        let err = policy
            .seal_new(
                store.owner_id,
                &NewDiary::new("secret").encrypted(true),
                &mut key,
            )
            .unwrap_err();
        assert!(matches!(err, DiaryError::KeyDerivation(_)));
    }
}
