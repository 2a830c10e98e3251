//! Authenticated encryption of diary text with AES-256-GCM.
//!
//! A blob is `base64url(nonce[12] || ciphertext || tag[16])` with empty
//! associated data. Blobs are opaque outside this module.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use super::key::DerivedKey;
use super::URL_SAFE_TEXT;
use crate::error::{DiaryError, Result};

/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Length of the text blob [`encrypt`] produces for `plaintext_len` bytes.
pub const fn sealed_len(plaintext_len: usize) -> usize {
    4 * (NONCE_SIZE + plaintext_len + TAG_SIZE).div_ceil(3)
}

/// Encrypt `plaintext` under `key`, returning a self-contained text blob.
///
/// A fresh random nonce is drawn from the OS CSPRNG on every call, so
/// encrypting the same text twice yields different blobs.
///
/// # Errors
///
/// Returns `DiaryError::Encryption` if the AEAD call fails.
pub fn encrypt(plaintext: &str, key: &DerivedKey) -> Result<String> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    // aes-gcm appends the tag, giving ciphertext || tag
    let sealed = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| DiaryError::Encryption(e.to_string()))?;

    let mut combined = Vec::with_capacity(NONCE_SIZE + sealed.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&sealed);

    tracing::debug!(blob_bytes = combined.len(), "Encrypted diary content");
    Ok(URL_SAFE_TEXT.encode(&combined))
}

/// Decrypt a blob produced by [`encrypt`].
///
/// # Errors
///
/// Returns `DiaryError::Decryption` if:
/// - The text is not valid URL-safe base64
/// - The decoded blob is shorter than nonce + tag (28 bytes)
/// - The tag does not verify (wrong key or tampered data)
/// - The plaintext is not valid UTF-8
///
/// No partial plaintext is ever returned.
pub fn decrypt(blob: &str, key: &DerivedKey) -> Result<String> {
    let combined = URL_SAFE_TEXT
        .decode(blob.trim().as_bytes())
        .map_err(|e| DiaryError::Decryption(format!("Invalid blob encoding: {}", e)))?;

    if combined.len() < NONCE_SIZE + TAG_SIZE {
        return Err(DiaryError::Decryption(format!(
            "Blob too short ({} bytes, need at least {})",
            combined.len(),
            NONCE_SIZE + TAG_SIZE
        )));
    }

    let (nonce_bytes, sealed) = combined.split_at(NONCE_SIZE);
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), sealed)
        .map_err(|_| {
            DiaryError::Decryption("Authentication failed (wrong key or tampered data)".to_string())
        })?;

    String::from_utf8(plaintext)
        .map_err(|_| DiaryError::Decryption("Plaintext is not valid UTF-8".to_string()))
}
