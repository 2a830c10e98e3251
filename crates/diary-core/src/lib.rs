//! # Diary Core
//!
//! Core library for the personal diary and task backend.
//!
//! The interesting part is diary content encryption: a per-user key is
//! derived from the stored credential pair, diary bodies are sealed with
//! AES-256-GCM, and [`DiaryCryptoPolicy`] keeps `content` and
//! `is_encrypted` in agreement across create, read and update.
//!
//! ## Architecture
//!
//! - **crypto**: key derivation, the authenticated cipher, password hashing
//! - **policy**: encrypt/decrypt/pass-through decisions per operation
//! - **stats**: read-only aggregation over a user's diaries
//! - **storage**: collaborator traits and the SQLite backend
//! - **service**: ownership checks, policy and persistence in sequence

pub mod config;
pub mod crypto;
pub mod error;
pub mod policy;
pub mod service;
pub mod stats;
pub mod storage;

pub use config::CryptoConfig;
pub use error::{DiaryError, Result};
pub use policy::{ContentChange, DiaryCryptoPolicy, DiaryView, OperationKey};
pub use service::DiaryService;
pub use storage::{SqliteStorage, StorageEngine};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
