//! Application context for the diary CLI.
//!
//! Bundles the parsed arguments with the loaded config so handlers do not
//! resolve paths or credentials themselves.

use std::path::PathBuf;

use diary_core::crypto::key::DEFAULT_PBKDF2_ITERATIONS;
use diary_core::storage::User;
use diary_core::{DiaryService, SqliteStorage, StorageEngine};
use tracing::{debug, warn};

use crate::cli::Cli;
use crate::config::{default_config_path, default_database_path, read_config, DiaryConfig};
use crate::helpers::prompt_password;

pub type Service = DiaryService<SqliteStorage>;

pub struct AppContext<'a> {
    cli: &'a Cli,
    config_path: PathBuf,
    config: DiaryConfig,
}

impl<'a> AppContext<'a> {
    /// Resolve the config path (`--config`, DIARY_CONFIG, XDG default) and load it.
    pub fn load(cli: &'a Cli) -> anyhow::Result<Self> {
        let config_path = match cli.config.as_deref().filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_config_path()?,
        };
        let config = read_config(&config_path)?;
        Ok(Self {
            cli,
            config_path,
            config,
        })
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    pub fn config(&self) -> &DiaryConfig {
        &self.config
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// `--db` / DIARY_DB, then the config file, then the XDG data dir.
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.cli.db.as_deref().filter(|v| !v.trim().is_empty()) {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = self.config.database.path.as_deref() {
            return Ok(PathBuf::from(path));
        }
        default_database_path()
    }

    /// Open the database and wrap it in a service.
    pub fn open_service(&self) -> anyhow::Result<Service> {
        let crypto = self.config.crypto_config();
        if crypto.kdf.iterations < DEFAULT_PBKDF2_ITERATIONS {
            warn!(
                iterations = crypto.kdf.iterations,
                "PBKDF2 iteration count below {}; keys will not match data written with the default",
                DEFAULT_PBKDF2_ITERATIONS
            );
        }

        let path = self.database_path()?;
        debug!(path = %path.display(), "Opening database");
        let storage = SqliteStorage::open(&path)?;
        Ok(DiaryService::new(storage, crypto)?)
    }

    /// The account name from `--user` / DIARY_USER.
    pub fn username(&self) -> anyhow::Result<&str> {
        self.cli
            .user
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("No user given. Use --user or set DIARY_USER."))
    }

    /// Authenticate the configured user.
    pub fn login(&self, service: &Service) -> anyhow::Result<User> {
        let username = self.username()?;
        let password = prompt_password()?;
        Ok(service.authenticate(username, &password)?)
    }
}
