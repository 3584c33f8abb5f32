//! Authentication session: token, derived flag, hydration and persistence.

pub mod model;
pub mod repository;
pub mod store;

pub use model::{AuthStatus, PersistedSession, Session, SESSION_STORAGE_KEY};
pub use repository::{InMemorySessionRepository, SessionRepository};
pub use store::SessionStore;
