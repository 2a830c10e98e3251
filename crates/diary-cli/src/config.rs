use std::path::{Path, PathBuf};

use diary_core::crypto::key::{DEFAULT_PBKDF2_ITERATIONS, MIN_SALT_LENGTH};
use diary_core::crypto::KdfParams;
use diary_core::CryptoConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DiaryConfig {
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub crypto: CryptoSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoSection {
    pub pbkdf2_iterations: u32,
    pub salt_len: usize,
}

impl Default for CryptoSection {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: DEFAULT_PBKDF2_ITERATIONS,
            salt_len: MIN_SALT_LENGTH,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl DiaryConfig {
    pub fn with_database(path: PathBuf) -> Self {
        Self {
            database: DatabaseSection {
                path: Some(path.to_string_lossy().to_string()),
            },
            ..Self::default()
        }
    }

    pub fn crypto_config(&self) -> CryptoConfig {
        CryptoConfig::new(
            KdfParams::new(self.crypto.pbkdf2_iterations),
            self.crypto.salt_len,
        )
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_database_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("diary.db"))
}

/// Read a config file. A missing file yields the defaults.
pub fn read_config(path: &Path) -> anyhow::Result<DiaryConfig> {
    if !path.exists() {
        return Ok(DiaryConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &DiaryConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("diary"));
        }
    }
    Ok(home_dir()?.join(".config").join("diary"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("diary"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("diary"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: DiaryConfig = toml::from_str("[crypto]\npbkdf2_iterations = 1000\n").unwrap();
        assert_eq!(config.crypto.pbkdf2_iterations, 1000);
        assert_eq!(config.crypto.salt_len, MIN_SALT_LENGTH);
        assert_eq!(config.log.level, "warn");
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        write_config(&path, &DiaryConfig::with_database(dir.path().join("d.db"))).unwrap();

        let loaded = read_config(&path).unwrap();
        assert!(loaded.database.path.as_deref().unwrap().ends_with("d.db"));
        assert_eq!(loaded.crypto_config(), CryptoConfig::default());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = read_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.crypto.pbkdf2_iterations, DEFAULT_PBKDF2_ITERATIONS);
    }
}
