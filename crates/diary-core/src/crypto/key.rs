//! Diary key derivation using PBKDF2-HMAC-SHA256.
//!
//! The key is recomputed on demand from a user's hashed password and their
//! per-account salt; it is never persisted and is zeroized on drop.

use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use super::URL_SAFE_TEXT;
use crate::error::{DiaryError, Result};

/// PBKDF2 iteration count that existing stored data was keyed with.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 480_000;

/// Length of the derived key in bytes (AES-256).
pub const KEY_LENGTH: usize = 32;

/// Smallest raw salt accepted for new accounts.
pub const MIN_SALT_LENGTH: usize = 16;

/// Key derivation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// PBKDF2 iteration count
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl KdfParams {
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }
}

/// A 256-bit diary key.
///
/// Key bytes are wiped from memory when the value is dropped, and the
/// `Debug` impl never prints them.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    /// Wrap raw key bytes.
    ///
    /// # Security
    ///
    /// The caller is responsible for ensuring the bytes come from a secure source.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate cipher calls.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive the diary key for an account.
///
/// # Arguments
///
/// * `hashed_password` - The stored password hash (its UTF-8 bytes are the PBKDF2 input)
/// * `salt` - The stored `diary_encryption_salt`, URL-safe base64
/// * `params` - Iteration count
///
/// # Errors
///
/// Returns `DiaryError::KeyDerivation` if the salt is not valid URL-safe
/// base64 or the iteration count is zero. Never falls back to a default key.
///
/// # Examples
///
/// ```
/// use diary_core::crypto::{derive_key, generate_salt, KdfParams};
///
/// let salt = generate_salt(16);
/// let key = derive_key("$argon2id$v=19$...", &salt, &KdfParams::new(1_000)).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_key(hashed_password: &str, salt: &str, params: &KdfParams) -> Result<DerivedKey> {
    if params.iterations == 0 {
        return Err(DiaryError::KeyDerivation(
            "Iteration count must be greater than zero".to_string(),
        ));
    }

    let salt_bytes = URL_SAFE_TEXT
        .decode(salt.trim().as_bytes())
        .map_err(|e| DiaryError::KeyDerivation(format!("Invalid salt encoding: {}", e)))?;

    tracing::debug!(iterations = params.iterations, "Deriving diary key");

    let mut key_bytes = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(
        hashed_password.as_bytes(),
        &salt_bytes,
        params.iterations,
        &mut key_bytes,
    );

    Ok(DerivedKey::from_bytes(key_bytes))
}

/// Generate a fresh account salt: `length` bytes from the OS CSPRNG, URL-safe base64.
///
/// Lengths below 16 bytes are raised to 16.
pub fn generate_salt(length: usize) -> String {
    let mut bytes = vec![0u8; length.max(MIN_SALT_LENGTH)];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_TEXT.encode(&bytes)
}
