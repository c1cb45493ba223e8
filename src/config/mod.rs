//! Configuration and state locations for recym-cache
//!
//! | Item | Default location |
//! |------|------------------|
//! | config file | `<config dir>/recym/config.toml`, or `--config` / `RECYM_CONFIG` |
//! | partition store | `<state dir>/recym/partitions`, or `cache.store_dir` |
//! | journal | `<state dir>/recym/journal.log` |
//!
//! A missing config file means defaults. A file that exists but does not
//! parse is an error; the store is never opened with a half-read config.

pub mod schema;

pub use schema::Config;

use crate::error::{RecymError, RecymResult};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, info};

/// Locates, reads and writes the config file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for the default config file
    pub fn new() -> Self {
        Self::resolve(None)
    }

    /// Manager for an explicit config file
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Manager for `explicit` if given, the default file otherwise
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        let config_path = explicit.unwrap_or_else(Self::default_config_path);
        Self { config_path }
    }

    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recym")
            .join("config.toml")
    }

    /// Root of mutable state: partitions and journal
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recym")
    }

    pub fn partitions_dir() -> PathBuf {
        Self::state_dir().join("partitions")
    }

    pub fn journal_path() -> PathBuf {
        Self::state_dir().join("journal.log")
    }

    /// Partition store for `config`: `cache.store_dir` wins over the default
    pub fn store_dir(config: &Config) -> PathBuf {
        config
            .cache
            .store_dir
            .clone()
            .unwrap_or_else(Self::partitions_dir)
    }

    /// Read the config file, or defaults when there is none
    pub async fn load(&self) -> RecymResult<Config> {
        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(
                    "No config at {}, using defaults",
                    self.config_path.display()
                );
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(RecymError::io(
                    format!("reading config from {}", self.config_path.display()),
                    e,
                ));
            }
        };

        toml::from_str(&content).map_err(|e| RecymError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write `config`, replacing the file in one rename
    pub async fn save(&self, config: &Config) -> RecymResult<()> {
        let parent = self
            .config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        fs::create_dir_all(&parent)
            .await
            .map_err(|e| RecymError::ConfigDirCreate {
                path: parent.clone(),
                source: e,
            })?;

        let content = toml::to_string_pretty(config)?;
        let target = self.config_path.clone();
        tokio::task::spawn_blocking(move || -> io::Result<()> {
            let mut tmp = NamedTempFile::new_in(&parent)?;
            tmp.write_all(content.as_bytes())?;
            tmp.persist(&target).map(|_| ()).map_err(|e| e.error)
        })
        .await
        .map_err(|e| RecymError::Internal(format!("config write task failed: {}", e)))?
        .map_err(|e| {
            RecymError::io(format!("writing config to {}", self.config_path.display()), e)
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Write the default config unless a file exists and `force` is off.
    /// Returns whether anything was written.
    pub async fn init(&self, force: bool) -> RecymResult<bool> {
        if self.config_path.exists() && !force {
            return Ok(false);
        }
        self.save(&Config::default()).await?;
        Ok(true)
    }

    /// Create the state directory and the partition store for `config`
    pub async fn ensure_state_dirs(config: &Config) -> RecymResult<()> {
        for dir in [Self::state_dir(), Self::store_dir(config)] {
            fs::create_dir_all(&dir).await.map_err(|e| {
                RecymError::io(format!("creating directory {}", dir.display()), e)
            })?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
