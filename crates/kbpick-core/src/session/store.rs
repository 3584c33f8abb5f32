//! Session state container.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::Mutex;

use crate::error::Result;
use crate::session::model::{AuthStatus, Session};
use crate::session::repository::SessionRepository;

/// Holds the session and writes it through to a [`SessionRepository`].
///
/// Every mutation goes through `persist_lock`, so the order in which state
/// changes are persisted is the order in which they were applied. The state
/// lock itself is never held across an await.
pub struct SessionStore {
    state: RwLock<Session>,
    repository: Arc<dyn SessionRepository>,
    persist_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self {
            state: RwLock::new(Session::new()),
            repository,
            persist_lock: Mutex::new(()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Restores the persisted entry. Runs once; later calls return the
    /// current snapshot unchanged.
    ///
    /// A failed load is logged and treated as an empty session.
    pub async fn hydrate(&self) -> Session {
        let _guard = self.persist_lock.lock().await;
        if self.read().hydrated() {
            return self.snapshot();
        }

        let persisted = match self.repository.load().await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("[Session] Failed to load persisted session: {}", e);
                None
            }
        };

        let mut state = self.write();
        if let Some(entry) = persisted {
            state.set_token(entry.token);
        }
        state.mark_hydrated();
        tracing::debug!(
            "[Session] Hydrated (authenticated: {})",
            state.is_authenticated()
        );
        state.clone()
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token().map(str::to_string)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    pub fn is_hydrated(&self) -> bool {
        self.read().hydrated()
    }

    pub fn auth_status(&self) -> AuthStatus {
        self.read().status()
    }

    /// Sets the token (and the derived flag) and persists the result.
    ///
    /// The in-memory state is updated even when persisting fails.
    pub async fn set_token(&self, token: Option<String>) -> Result<()> {
        let _guard = self.persist_lock.lock().await;
        let persisted = {
            let mut state = self.write();
            state.set_token(token);
            state.to_persisted()
        };
        self.repository.save(&persisted).await
    }

    /// Clears the token and erases the persisted entry.
    pub async fn logout(&self) -> Result<()> {
        let _guard = self.persist_lock.lock().await;
        {
            let mut state = self.write();
            if state.is_authenticated() {
                tracing::info!("[Session] Logging out");
            }
            state.set_token(None);
        }
        self.repository.clear().await
    }
}
