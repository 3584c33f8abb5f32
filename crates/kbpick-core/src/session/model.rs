use serde::{Deserialize, Serialize};

/// Name of the single storage entry the session is persisted under.
pub const SESSION_STORAGE_KEY: &str = "auth-storage";

/// In-memory session state.
///
/// `is_authenticated` is always exactly `token.is_some()`; it is never set on
/// its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    token: Option<String>,
    is_authenticated: bool,
    hydrated: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn hydrated(&self) -> bool {
        self.hydrated
    }

    pub(crate) fn set_token(&mut self, token: Option<String>) {
        self.is_authenticated = token.is_some();
        self.token = token;
    }

    pub(crate) fn mark_hydrated(&mut self) {
        self.hydrated = true;
    }

    pub fn status(&self) -> AuthStatus {
        if !self.hydrated {
            AuthStatus::Unknown
        } else if self.is_authenticated {
            AuthStatus::LoggedIn
        } else {
            AuthStatus::LoggedOut
        }
    }

    pub fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            token: self.token.clone(),
            is_authenticated: self.is_authenticated,
        }
    }
}

/// Authentication decision available to consumers.
///
/// `Unknown` until persisted state has been loaded; it must not be read as
/// logged-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Unknown,
    LoggedOut,
    LoggedIn,
}

/// The persisted subset of [`Session`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub token: Option<String>,
    #[serde(default)]
    pub is_authenticated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_unknown() {
        let session = Session::new();
        assert!(session.token().is_none());
        assert!(!session.is_authenticated());
        assert_eq!(session.status(), AuthStatus::Unknown);
    }

    #[test]
    fn test_flag_follows_token() {
        let mut session = Session::new();
        session.mark_hydrated();
        session.set_token(Some("t".to_string()));
        assert!(session.is_authenticated());
        assert_eq!(session.status(), AuthStatus::LoggedIn);

        session.set_token(None);
        assert!(!session.is_authenticated());
        assert_eq!(session.status(), AuthStatus::LoggedOut);
    }

    #[test]
    fn test_persisted_layout() {
        let persisted = PersistedSession {
            token: Some("abc".to_string()),
            is_authenticated: true,
        };
        let json = serde_json::to_string(&persisted).unwrap();
        assert_eq!(json, r#"{"token":"abc","isAuthenticated":true}"#);
    }
}
