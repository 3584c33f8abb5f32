//! Session persistence trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::session::model::PersistedSession;

/// Storage for the persisted session entry.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Loads the persisted entry. `Ok(None)` when nothing has been stored.
    async fn load(&self) -> Result<Option<PersistedSession>>;

    async fn save(&self, session: &PersistedSession) -> Result<()>;

    /// Erases the persisted entry. Erasing a missing entry is not an error.
    async fn clear(&self) -> Result<()>;
}

/// Volatile repository; nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    entry: std::sync::Mutex<Option<PersistedSession>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(entry: PersistedSession) -> Self {
        Self {
            entry: std::sync::Mutex::new(Some(entry)),
        }
    }

    /// Current stored entry, for inspection.
    pub fn stored(&self) -> Option<PersistedSession> {
        self.entry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self.stored())
    }

    async fn save(&self, session: &PersistedSession) -> Result<()> {
        *self
            .entry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self
            .entry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}
