//! Error types for diary core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages and exit codes.

use thiserror::Error;

/// Result type alias for diary operations.
pub type Result<T> = std::result::Result<T, DiaryError>;

/// Core error type for diary operations.
#[derive(Debug, Error)]
pub enum DiaryError {
    /// The stored salt could not be decoded, or KDF parameters are unusable
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// The authenticated encryption call itself failed
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Malformed blob, failed authentication tag, or non-UTF-8 plaintext
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Record missing or owned by someone else
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// User account missing
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Username/password pair did not verify
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Unique constraint violated (duplicate username or email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl DiaryError {
    /// Whether this error came out of key derivation or the cipher.
    pub fn is_crypto(&self) -> bool {
        matches!(
            self,
            DiaryError::KeyDerivation(_) | DiaryError::Encryption(_) | DiaryError::Decryption(_)
        )
    }

    /// Whether this error means "the thing you asked for is not there".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DiaryError::RecordNotFound(_) | DiaryError::UserNotFound(_)
        )
    }
}
