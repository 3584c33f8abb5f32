//! StackApiClient - REST implementation of [`AuthApi`] and [`KnowledgeBaseApi`].
//!
//! Every authenticated call reads the token from the shared [`SessionStore`].
//! A 401 from any endpoint logs the session out before the error is returned.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kbpick_core::api::{AuthApi, Credentials, KnowledgeBaseApi};
use kbpick_core::config::AppConfig;
use kbpick_core::error::{KbPickError, Result};
use kbpick_core::model::{
    Connection, KnowledgeBase, KnowledgeBaseRequest, Organization, Page, Resource,
};
use kbpick_core::picker::ROOT_PATH;
use kbpick_core::session::SessionStore;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Client for the knowledge-base service and its identity provider.
#[derive(Clone)]
pub struct StackApiClient {
    client: Client,
    api_url: String,
    auth_url: String,
    anon_key: String,
    session: Arc<SessionStore>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    gotrue_meta_security: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Serialize)]
struct UnindexRequest<'a> {
    resource_path: &'a str,
}

/// The knowledge-base listing comes back either paged or as a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListingBody {
    Paged(Page<Resource>),
    Bare(Vec<Resource>),
}

impl From<ListingBody> for Page<Resource> {
    fn from(body: ListingBody) -> Self {
        match body {
            ListingBody::Paged(page) => page,
            ListingBody::Bare(data) => Page {
                data,
                ..Page::default()
            },
        }
    }
}

impl StackApiClient {
    /// Builds a client from validated configuration.
    pub fn new(config: &AppConfig, session: Arc<SessionStore>) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| KbPickError::network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url().to_string(),
            auth_url: config.auth_url().to_string(),
            anon_key: config.anon_key.clone(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Attaches the bearer token, or fails without touching the network.
    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.session.token().ok_or(KbPickError::AuthRequired)?;
        Ok(request.bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .authorized(request)?
            .send()
            .await
            .map_err(|e| KbPickError::network(format!("Request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("[StackApi] 401 from {}, clearing session", response.url().path());
            if let Err(e) = self.session.logout().await {
                tracing::warn!("[StackApi] Failed to erase persisted session: {}", e);
            }
            return Err(KbPickError::AuthExpired);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("[StackApi] HTTP {}: {}", status.as_u16(), body);
            return Err(KbPickError::http(status.as_u16(), body));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        parse_json(response).await
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| KbPickError::Serialization {
            format: "JSON".to_string(),
            message: e.to_string(),
        })
}

#[async_trait]
impl AuthApi for StackApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<String> {
        let body = LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
            gotrue_meta_security: serde_json::Map::new(),
        };

        let response = self
            .client
            .post(format!("{}/token", self.auth_url))
            .query(&[("grant_type", "password")])
            .header("Apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| KbPickError::network(format!("Login request failed: {e}")))?;

        if !response.status().is_success() {
            tracing::info!(
                "[StackApi] Login rejected with status {}",
                response.status().as_u16()
            );
            return Err(KbPickError::InvalidCredentials);
        }

        let parsed: LoginResponse = parse_json(response).await?;
        Ok(parsed.access_token)
    }
}

#[async_trait]
impl KnowledgeBaseApi for StackApiClient {
    async fn list_connections(&self) -> Result<Vec<Connection>> {
        self.get_json(self.client.get(self.url("/connections")))
            .await
    }

    async fn current_organization(&self) -> Result<Organization> {
        self.get_json(self.client.get(self.url("/organizations/me/current")))
            .await
    }

    async fn list_children(&self, connection_id: &str, path: &str) -> Result<Page<Resource>> {
        let mut request = self.client.get(self.url(&format!(
            "/connections/{}/resources/children",
            connection_id
        )));
        if path != ROOT_PATH {
            request = request.query(&[("resource_id", path)]);
        }
        self.get_json(request).await
    }

    async fn list_knowledge_base_children(
        &self,
        knowledge_base_id: &str,
        path: &str,
    ) -> Result<Page<Resource>> {
        let request = self
            .client
            .get(self.url(&format!(
                "/knowledge_bases/{}/resources/children",
                knowledge_base_id
            )))
            .query(&[("resource_path", path)]);
        let body: ListingBody = self.get_json(request).await?;
        Ok(body.into())
    }

    async fn create_knowledge_base(&self, request: &KnowledgeBaseRequest) -> Result<KnowledgeBase> {
        tracing::info!(
            "[StackApi] Creating knowledge base with {} source(s)",
            request.source.connection_source_ids.len()
        );
        self.get_json(self.client.post(self.url("/knowledge_bases")).json(request))
            .await
    }

    async fn sync_knowledge_base(&self, knowledge_base_id: &str, org_id: &str) -> Result<()> {
        self.send(self.client.get(self.url(&format!(
            "/knowledge_bases/sync/trigger/{}/{}",
            knowledge_base_id, org_id
        ))))
        .await?;
        Ok(())
    }

    async fn unindex_resource(&self, knowledge_base_id: &str, resource_path: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.url(&format!("/knowledge_bases/{}/resources", knowledge_base_id)))
            .query(&[("resource_path", resource_path)])
            .json(&UnindexRequest { resource_path });
        self.send(request).await?;
        Ok(())
    }
}
