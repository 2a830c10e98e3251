//! Explicit configuration for the crypto components.
//!
//! Everything the key derivation and salt generation need is carried in
//! [`CryptoConfig`] and handed to [`crate::DiaryCryptoPolicy`] and
//! [`crate::DiaryService`] at construction time.

use serde::{Deserialize, Serialize};

use crate::crypto::key::{KdfParams, MIN_SALT_LENGTH};
use crate::error::{DiaryError, Result};

/// Crypto settings shared by every diary operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// PBKDF2 parameters used for the diary key
    pub kdf: KdfParams,

    /// Raw salt length in bytes, applied when new accounts are created
    pub salt_len: usize,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            salt_len: MIN_SALT_LENGTH,
        }
    }
}

impl CryptoConfig {
    pub fn new(kdf: KdfParams, salt_len: usize) -> Self {
        Self { kdf, salt_len }
    }

    /// Reject settings that would weaken or break key material.
    pub fn validate(&self) -> Result<()> {
        if self.kdf.iterations == 0 {
            return Err(DiaryError::InvalidInput(
                "PBKDF2 iterations must be greater than zero".to_string(),
            ));
        }
        if self.salt_len < MIN_SALT_LENGTH {
            return Err(DiaryError::InvalidInput(format!(
                "Salt length must be at least {} bytes (got {})",
                MIN_SALT_LENGTH, self.salt_len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key::DEFAULT_PBKDF2_ITERATIONS;

    #[test]
    fn test_default_config_is_valid() {
        let config = CryptoConfig::default();
        assert_eq!(config.kdf.iterations, DEFAULT_PBKDF2_ITERATIONS);
        assert_eq!(config.salt_len, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let config = CryptoConfig::new(KdfParams::new(0), 16);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_short_salt_rejected() {
        let config = CryptoConfig::new(KdfParams::default(), 8);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least 16 bytes"));
    }
}
