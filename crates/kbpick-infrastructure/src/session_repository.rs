//! File-backed session persistence.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kbpick_core::error::{KbPickError, Result};
use kbpick_core::session::{PersistedSession, SessionRepository};

use crate::paths::KbPickPaths;
use crate::storage::AtomicJsonFile;

/// Persists the session entry as `auth-storage.json`.
pub struct FileSessionRepository {
    file: AtomicJsonFile<PersistedSession>,
}

impl FileSessionRepository {
    pub fn new(paths: &KbPickPaths) -> Result<Self> {
        let path = paths
            .session_file()
            .map_err(|e| KbPickError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[async_trait]
impl SessionRepository for FileSessionRepository {
    async fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self.file.load()?)
    }

    async fn save(&self, session: &PersistedSession) -> Result<()> {
        self.file.save(session)?;
        tracing::debug!("[SessionRepository] Saved session to {}", self.path().display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.file.remove()?;
        tracing::debug!("[SessionRepository] Removed {}", self.path().display());
        Ok(())
    }
}
