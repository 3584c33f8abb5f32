//! Session use case: hydration, login with an attempt cap, logout.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use kbpick_core::api::{AuthApi, Credentials};
use kbpick_core::error::{KbPickError, Result};
use kbpick_core::session::{AuthStatus, SessionStore};

/// Coordinates [`SessionStore`] with the token endpoint.
///
/// Failed logins are counted. Once `max_attempts` failures have accumulated,
/// [`login`](Self::login) refuses without contacting the service until
/// [`reset_login_attempts`](Self::reset_login_attempts) is called.
pub struct SessionUseCase {
    session: Arc<SessionStore>,
    auth: Arc<dyn AuthApi>,
    max_attempts: u32,
    failed_attempts: AtomicU32,
}

impl SessionUseCase {
    pub fn new(session: Arc<SessionStore>, auth: Arc<dyn AuthApi>, max_attempts: u32) -> Self {
        Self {
            session,
            auth,
            max_attempts,
            failed_attempts: AtomicU32::new(0),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub async fn hydrate(&self) -> AuthStatus {
        self.session.hydrate().await.status()
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts.load(Ordering::SeqCst)
    }

    pub fn attempts_exhausted(&self) -> bool {
        self.failed_attempts() >= self.max_attempts
    }

    /// Exchanges credentials for a token and stores it.
    ///
    /// A failed login leaves the session untouched.
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        if self.attempts_exhausted() {
            return Err(KbPickError::LoginAttemptsExhausted {
                attempts: self.max_attempts,
            });
        }

        tracing::info!("[SessionUseCase] Attempting login for {}", credentials.email);
        match self.auth.login(credentials).await {
            Ok(token) => {
                self.failed_attempts.store(0, Ordering::SeqCst);
                self.session.set_token(Some(token)).await?;
                tracing::info!("[SessionUseCase] Login succeeded");
                Ok(())
            }
            Err(e) => {
                let failed = self.failed_attempts.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::warn!(
                    "[SessionUseCase] Login failed ({}/{}): {}",
                    failed,
                    self.max_attempts,
                    e
                );
                Err(e)
            }
        }
    }

    /// Logs in only when the hydrated session carries no token.
    pub async fn ensure_authenticated(&self, credentials: &Credentials) -> Result<()> {
        if self.hydrate().await == AuthStatus::LoggedIn {
            return Ok(());
        }
        self.login(credentials).await
    }

    pub fn reset_login_attempts(&self) {
        self.failed_attempts.store(0, Ordering::SeqCst);
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.logout().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeAuth;
    use kbpick_core::session::InMemorySessionRepository;

    async fn build(auth: Arc<FakeAuth>, max: u32) -> SessionUseCase {
        let session = Arc::new(SessionStore::new(Arc::new(InMemorySessionRepository::new())));
        let usecase = SessionUseCase::new(session, auth, max);
        usecase.hydrate().await;
        usecase
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let auth = Arc::new(FakeAuth::accepting("tok"));
        let usecase = build(auth.clone(), 3).await;
        usecase
            .login(&Credentials::new("me@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(usecase.session().token().as_deref(), Some("tok"));
        assert_eq!(auth.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_login_leaves_session_untouched() {
        let auth = Arc::new(FakeAuth::rejecting());
        let usecase = build(auth, 3).await;
        usecase.session().set_token(Some("old".to_string())).await.unwrap();

        let err = usecase
            .login(&Credentials::new("me@example.com", "bad"))
            .await
            .unwrap_err();
        assert_eq!(err, KbPickError::InvalidCredentials);
        assert_eq!(usecase.session().token().as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_attempt_cap_requires_reset() {
        let auth = Arc::new(FakeAuth::rejecting());
        let usecase = build(auth.clone(), 3).await;
        let creds = Credentials::new("me@example.com", "bad");

        for _ in 0..3 {
            assert_eq!(
                usecase.login(&creds).await.unwrap_err(),
                KbPickError::InvalidCredentials
            );
        }
        assert!(usecase.attempts_exhausted());
        assert_eq!(
            usecase.login(&creds).await.unwrap_err(),
            KbPickError::LoginAttemptsExhausted { attempts: 3 }
        );
        assert_eq!(auth.calls(), 3);

        usecase.reset_login_attempts();
        assert_eq!(
            usecase.login(&creds).await.unwrap_err(),
            KbPickError::InvalidCredentials
        );
        assert_eq!(auth.calls(), 4);
    }

    #[tokio::test]
    async fn test_ensure_authenticated_skips_login_when_logged_in() {
        let auth = Arc::new(FakeAuth::accepting("new"));
        let usecase = build(auth.clone(), 3).await;
        usecase.session().set_token(Some("existing".to_string())).await.unwrap();

        usecase
            .ensure_authenticated(&Credentials::new("me@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(auth.calls(), 0);
        assert_eq!(usecase.session().token().as_deref(), Some("existing"));
    }

    #[tokio::test]
    async fn test_logout_clears_token() {
        let auth = Arc::new(FakeAuth::accepting("tok"));
        let usecase = build(auth, 3).await;
        usecase
            .login(&Credentials::new("me@example.com", "pw"))
            .await
            .unwrap();
        usecase.logout().await.unwrap();
        assert_eq!(usecase.session().auth_status(), AuthStatus::LoggedOut);
    }
}
