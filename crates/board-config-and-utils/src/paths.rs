//! File system paths for the server.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Directory name under the home directory.
const BASE_DIR_NAME: &str = ".roomboard";

/// Manages file system paths for the server.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for runtime files and data (~/.roomboard)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.roomboard`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(BASE_DIR_NAME),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.roomboard).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.roomboard/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the database file path (~/.roomboard/roomboard.sqlite).
    pub fn database_file(&self) -> PathBuf {
        self.base_dir.join("roomboard.sqlite")
    }

    /// Get the IPC socket path (~/.roomboard/roomboard.sock).
    pub fn socket_file(&self) -> PathBuf {
        self.base_dir.join("roomboard.sock")
    }

    /// Get the PID file path (~/.roomboard/roomboard.pid).
    pub fn pid_file(&self) -> PathBuf {
        self.base_dir.join("roomboard.pid")
    }

    /// Get the logs directory (~/.roomboard/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the structured log file path (~/.roomboard/logs/roomboard.jsonl).
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("roomboard.jsonl")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
