//! Where Pathway keeps its files

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::constants::{CONFIG_DIR_NAME, LOG_FILE_NAME};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Holds the workspace file and the log
    pub config_dir: PathBuf,
    pub log_file_name: String,
}

impl Config {
    /// `~/.pathway`, or `./.pathway` when there is no home directory
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME);
        Self::with_dir(config_dir)
    }

    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        Config {
            config_dir: config_dir.into(),
            log_file_name: LOG_FILE_NAME.to_string(),
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.config_dir.join(&self.log_file_name)
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<&Path> {
        fs::create_dir_all(&self.config_dir).with_context(|| {
            format!("Cannot create config directory {}", self.config_dir.display())
        })?;
        Ok(&self.config_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
