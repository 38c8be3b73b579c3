//! CaskDB - Engine Configuration
//! Defines the tunable parameters for opening a storage engine.

use std::path::PathBuf;

use crate::error::{CaskError, Result};

/// How recovery treats a log whose last record is incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Refuse to open the engine.
    #[default]
    Strict,
    /// Cut the file back to the end of the last complete record.
    TruncateTail,
}

/// Configuration for the CaskDB storage engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the append-only data file.
    pub data_file: PathBuf,

    /// Policy for a torn record at the end of the log.
    pub recovery_mode: RecoveryMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("./data/cask.db"),
            recovery_mode: RecoveryMode::Strict,
        }
    }
}

impl Config {
    /// Create a new Config with a custom data file path.
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            ..Default::default()
        }
    }

    /// Set the recovery policy for torn tail records.
    pub fn with_recovery_mode(mut self, mode: RecoveryMode) -> Self {
        self.recovery_mode = mode;
        self
    }

    /// Check that the data file path names a file.
    pub fn validate(&self) -> Result<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(CaskError::Config("data file path is empty".into()));
        }
        if self.data_file.file_name().is_none() {
            return Err(CaskError::Config(format!(
                "data file path {:?} has no file name",
                self.data_file
            )));
        }
        Ok(())
    }

    /// Ensure the directory holding the data file exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        match self.data_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
            _ => Ok(()),
        }
    }
}
