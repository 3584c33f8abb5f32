//! Application configuration model.

use serde::{Deserialize, Serialize};

use crate::error::{KbPickError, Result};
use crate::indexing::KnowledgeBaseIdPolicy;

pub const DEFAULT_API_URL: &str = "https://api.stack-ai.com";
pub const DEFAULT_AUTH_URL: &str = "https://sb.stack-ai.com/auth/v1";
pub const DEFAULT_MAX_LOGIN_ATTEMPTS: u32 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Root of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the knowledge-base service.
    pub api_url: String,
    /// Base URL of the identity provider (token endpoint lives below it).
    pub auth_url: String,
    /// Identity-provider public key, sent as `Apikey` on login.
    pub anon_key: String,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Knowledge base to open on start-up.
    pub knowledge_base_id: Option<String>,
    pub knowledge_base_name: String,
    pub knowledge_base_description: String,
    pub knowledge_base_id_policy: KnowledgeBaseIdPolicy,
    pub max_login_attempts: u32,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            anon_key: String::new(),
            email: None,
            password: None,
            knowledge_base_id: None,
            knowledge_base_name: "New Knowledge Base".to_string(),
            knowledge_base_description: "Created from file picker".to_string(),
            knowledge_base_id_policy: KnowledgeBaseIdPolicy::default(),
            max_login_attempts: DEFAULT_MAX_LOGIN_ATTEMPTS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Fails when a value the client cannot work without is missing.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(KbPickError::config("api_url is not set"));
        }
        if self.auth_url.trim().is_empty() {
            return Err(KbPickError::config("auth_url is not set"));
        }
        if self.anon_key.trim().is_empty() {
            return Err(KbPickError::config(
                "anon_key is not set (config.toml or KBPICK_ANON_KEY)",
            ));
        }
        if self.max_login_attempts == 0 {
            return Err(KbPickError::config("max_login_attempts must be at least 1"));
        }
        Ok(())
    }

    pub fn api_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn auth_url(&self) -> &str {
        self.auth_url.trim_end_matches('/')
    }
}
