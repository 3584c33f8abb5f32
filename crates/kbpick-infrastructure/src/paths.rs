//! Unified path management for kbpick files.
//!
//! ```text
//! ~/.config/kbpick/            # Config directory
//! ├── config.toml              # Application configuration
//! └── auth-storage.json        # Persisted session entry
//!
//! ~/.local/share/kbpick/       # Data directory
//! └── logs/                    # Rolling log files
//!     └── kbpick.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

use kbpick_core::session::SESSION_STORAGE_KEY;

const APP_DIR: &str = "kbpick";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves kbpick's directories.
///
/// With a base directory every path lives below it (used by tests and the
/// CLI's `--config-dir`); otherwise the platform config/data directories are
/// used.
#[derive(Debug, Clone, Default)]
pub struct KbPickPaths {
    base: Option<PathBuf>,
}

impl KbPickPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.join("data")),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// The single storage entry the session is persisted under.
    pub fn session_file(&self) -> Result<PathBuf, PathError> {
        Ok(self
            .config_dir()?
            .join(format!("{}.json", SESSION_STORAGE_KEY)))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("logs"))
    }
}
