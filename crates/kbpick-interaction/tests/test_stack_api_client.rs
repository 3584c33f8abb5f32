use std::sync::Arc;

use kbpick_core::api::{AuthApi, Credentials, KnowledgeBaseApi};
use kbpick_core::config::AppConfig;
use kbpick_core::error::KbPickError;
use kbpick_core::model::{CreateKnowledgeBase, KnowledgeBaseRequest};
use kbpick_core::session::{AuthStatus, InMemorySessionRepository, SessionStore};
use kbpick_interaction::StackApiClient;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        api_url: server.uri(),
        auth_url: format!("{}/auth/v1", server.uri()),
        anon_key: "anon-key".to_string(),
        ..AppConfig::default()
    }
}

async fn client_with_token(server: &MockServer, token: Option<&str>) -> StackApiClient {
    let session = Arc::new(SessionStore::new(Arc::new(InMemorySessionRepository::new())));
    session.hydrate().await;
    if let Some(token) = token {
        session.set_token(Some(token.to_string())).await.unwrap();
    }
    StackApiClient::new(&config_for(server), session).unwrap()
}

fn resource(id: &str, kind: &str, path: &str) -> serde_json::Value {
    json!({
        "resource_id": id,
        "inode_type": kind,
        "inode_path": {"path": path},
    })
}

#[tokio::test]
async fn test_login_posts_credentials_and_returns_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("Apikey", "anon-key"))
        .and(body_json(json!({
            "email": "me@example.com",
            "password": "pw",
            "gotrue_meta_security": {}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_token(&server, None).await;
    let token = client
        .login(&Credentials::new("me@example.com", "pw"))
        .await
        .unwrap();
    assert_eq!(token, "tok-1");
    // Storing the token is the caller's job.
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_login_rejection_is_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    let client = client_with_token(&server, None).await;
    let err = client
        .login(&Credentials::new("me@example.com", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err, KbPickError::InvalidCredentials);
}

#[tokio::test]
async fn test_missing_token_makes_no_request() {
    let server = MockServer::start().await;
    let client = client_with_token(&server, None).await;

    let err = client.list_connections().await.unwrap_err();
    assert_eq!(err, KbPickError::AuthRequired);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_connections_sends_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connections"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "connection_id": "c1",
            "name": "Drive",
            "connection_provider": "gdrive",
            "connection_provider_data": {"access_token": "secret"},
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }])))
        .mount(&server)
        .await;

    let client = client_with_token(&server, Some("tok")).await;
    let connections = client.list_connections().await.unwrap();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].connection_id, "c1");
}

#[tokio::test]
async fn test_root_listing_omits_resource_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connections/c1/resources/children"))
        .and(query_param_is_missing("resource_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [resource("d1", "directory", "Docs")],
            "next_cursor": null,
            "current_cursor": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/connections/c1/resources/children"))
        .and(query_param("resource_id", "d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [resource("f1", "file", "Docs/a.pdf")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_token(&server, Some("tok")).await;
    let root = client.list_children("c1", "/").await.unwrap();
    assert_eq!(root.data[0].resource_id, "d1");
    let docs = client.list_children("c1", "d1").await.unwrap();
    assert_eq!(docs.data[0].name(), "a.pdf");
}

#[tokio::test]
async fn test_knowledge_base_listing_accepts_bare_array() {
    let server = MockServer::start().await;
    let mut indexed = resource("f1", "file", "a.pdf");
    indexed["status"] = json!("indexed");
    Mock::given(method("GET"))
        .and(path("/knowledge_bases/kb1/resources/children"))
        .and(query_param("resource_path", "/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([indexed])))
        .mount(&server)
        .await;

    let client = client_with_token(&server, Some("tok")).await;
    let page = client.list_knowledge_base_children("kb1", "/").await.unwrap();
    assert_eq!(page.data.len(), 1);
    assert!(page.data[0].status.is_some());
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/organizations/me/current"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_with_token(&server, Some("stale")).await;
    assert_eq!(client.session().auth_status(), AuthStatus::LoggedIn);

    let err = client.current_organization().await.unwrap_err();
    assert_eq!(err, KbPickError::AuthExpired);
    assert_eq!(err.to_string(), "Authentication expired");
    assert!(client.session().token().is_none());
    assert_eq!(client.session().auth_status(), AuthStatus::LoggedOut);

    // Subsequent calls fail locally.
    let err = client.list_connections().await.unwrap_err();
    assert_eq!(err, KbPickError::AuthRequired);
}

#[tokio::test]
async fn test_login_then_expiry_sequence() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/connections"))
        .and(header("Authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_with_token(&server, None).await;
    let token = client
        .login(&Credentials::new("me@example.com", "pw"))
        .await
        .unwrap();
    client.session().set_token(Some(token)).await.unwrap();
    assert!(client.session().is_authenticated());

    let err = client.list_connections().await.unwrap_err();
    assert!(err.is_auth_expired());
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_other_status_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/connections"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let client = client_with_token(&server, Some("tok")).await;
    let err = client.list_connections().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.to_string(), "HTTP error! status: 503");
    // Only a 401 touches the session.
    assert!(client.session().is_authenticated());
}

#[tokio::test]
async fn test_create_sync_and_unindex() {
    let server = MockServer::start().await;
    let request = KnowledgeBaseRequest::from(CreateKnowledgeBase {
        connection_id: "c1".to_string(),
        connection_source_ids: vec!["r1".to_string(), "r2".to_string()],
        name: "KB".to_string(),
        description: "desc".to_string(),
    });
    Mock::given(method("POST"))
        .and(path("/knowledge_bases"))
        .and(body_json(serde_json::to_value(&request).unwrap()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "knowledge_base_id": "kb9",
            "name": "KB",
            "description": "desc"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/knowledge_bases/sync/trigger/kb9/org1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/knowledge_bases/kb9/resources"))
        .and(query_param("resource_path", "Docs/a.pdf"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_token(&server, Some("tok")).await;
    let kb = client.create_knowledge_base(&request).await.unwrap();
    assert_eq!(kb.knowledge_base_id, "kb9");
    client.sync_knowledge_base("kb9", "org1").await.unwrap();
    client.unindex_resource("kb9", "Docs/a.pdf").await.unwrap();
}

#[tokio::test]
async fn test_config_without_anon_key_is_rejected() {
    let server = MockServer::start().await;
    let session = Arc::new(SessionStore::new(Arc::new(InMemorySessionRepository::new())));
    let config = AppConfig {
        anon_key: String::new(),
        ..config_for(&server)
    };
    assert!(matches!(
        StackApiClient::new(&config, session),
        Err(KbPickError::Config(_))
    ));
}
