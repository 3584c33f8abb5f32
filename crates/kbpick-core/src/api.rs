//! Remote service seams.
//!
//! `kbpick-interaction` provides the HTTP implementation; use cases and tests
//! depend only on these traits.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::model::{Connection, KnowledgeBase, KnowledgeBaseRequest, Organization, Page, Resource};

/// Login credentials.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Token issuance.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges credentials for an access token.
    ///
    /// Never touches the session; storing the token is the caller's job.
    async fn login(&self, credentials: &Credentials) -> Result<String>;
}

/// Authenticated calls against the knowledge-base service.
///
/// Implementations must treat a 401 uniformly: clear the session, then
/// return `KbPickError::AuthExpired`.
#[async_trait]
pub trait KnowledgeBaseApi: Send + Sync {
    async fn list_connections(&self) -> Result<Vec<Connection>>;

    async fn current_organization(&self) -> Result<Organization>;

    /// Children of `path` (a resource id, or `/` for the root).
    async fn list_children(&self, connection_id: &str, path: &str) -> Result<Page<Resource>>;

    async fn list_knowledge_base_children(
        &self,
        knowledge_base_id: &str,
        path: &str,
    ) -> Result<Page<Resource>>;

    async fn create_knowledge_base(&self, request: &KnowledgeBaseRequest) -> Result<KnowledgeBase>;

    async fn sync_knowledge_base(&self, knowledge_base_id: &str, org_id: &str) -> Result<()>;

    async fn unindex_resource(&self, knowledge_base_id: &str, resource_path: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("me@example.com", "hunter2");
        let out = format!("{:?}", creds);
        assert!(out.contains("me@example.com"));
        assert!(!out.contains("hunter2"));
    }
}
