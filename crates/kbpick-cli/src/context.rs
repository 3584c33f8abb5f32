//! Wiring of configuration, session and service client for one run.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use kbpick_application::SessionUseCase;
use kbpick_core::api::Credentials;
use kbpick_core::config::AppConfig;
use kbpick_core::session::{AuthStatus, SessionStore};
use kbpick_infrastructure::{ConfigService, FileSessionRepository, KbPickPaths};
use kbpick_interaction::StackApiClient;

pub struct AppContext {
    pub paths: KbPickPaths,
    pub config: AppConfig,
    pub session: Arc<SessionStore>,
    pub client: Arc<StackApiClient>,
    pub session_usecase: SessionUseCase,
}

impl AppContext {
    pub async fn load(config_dir: Option<PathBuf>) -> Result<Self> {
        let paths = KbPickPaths::new(config_dir.as_deref());
        let config = ConfigService::new(&paths)?
            .get_config()
            .context("Failed to load configuration")?;

        let repository = Arc::new(FileSessionRepository::new(&paths)?);
        let session = Arc::new(SessionStore::new(repository));
        session.hydrate().await;

        let client = Arc::new(StackApiClient::new(&config, Arc::clone(&session))?);
        let session_usecase = SessionUseCase::new(
            Arc::clone(&session),
            client.clone(),
            config.max_login_attempts,
        );

        Ok(Self {
            paths,
            config,
            session,
            client,
            session_usecase,
        })
    }

    /// Credentials from config or environment, when both parts are set.
    pub fn configured_credentials(&self) -> Option<Credentials> {
        match (&self.config.email, &self.config.password) {
            (Some(email), Some(password)) => Some(Credentials::new(email, password)),
            _ => None,
        }
    }

    /// Makes sure a token is present, logging in with configured credentials
    /// if needed.
    pub async fn require_session(&self) -> Result<()> {
        if self.session.auth_status() == AuthStatus::LoggedIn {
            return Ok(());
        }
        let Some(credentials) = self.configured_credentials() else {
            bail!("Not logged in. Run `kbpick login` or set KBPICK_EMAIL and KBPICK_PASSWORD.");
        };
        self.session_usecase.login(&credentials).await?;
        Ok(())
    }

    pub fn knowledge_base_id(&self, explicit: Option<String>) -> Result<String> {
        explicit
            .or_else(|| self.config.knowledge_base_id.clone())
            .context("No knowledge base given. Pass --kb or set KBPICK_KB_ID.")
    }
}
