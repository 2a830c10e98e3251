//! Cryptographic operations for diary content.
//!
//! - **key**: PBKDF2-HMAC-SHA256 key derivation and salt generation
//! - **cipher**: AES-256-GCM blobs encoded as base64url
//! - **password**: the opaque credential verifier (Argon2id PHC strings)
//!
//! ## Wire formats
//!
//! Salts and blobs are stored as URL-safe base64 with padding. A blob is
//! `nonce[12] || ciphertext || tag[16]`, encrypted with empty associated
//! data. Both formats must stay bit-exact so existing rows keep decrypting.
//!
//! ## Known weakness
//!
//! The diary key is derived from the stored password hash, not the raw
//! password. Anyone who can read a user row can derive that user's key.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;

pub mod cipher;
pub mod key;
pub mod password;

pub use cipher::{decrypt, encrypt, sealed_len, NONCE_SIZE, TAG_SIZE};
pub use key::{derive_key, generate_salt, DerivedKey, KdfParams, KEY_LENGTH};
pub use password::{hash_password, validate_password, verify_password};

/// URL-safe base64 that always pads on encode and accepts either form on decode.
pub(crate) const URL_SAFE_TEXT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);
