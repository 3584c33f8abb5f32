//! In-memory fakes of the remote service for use-case tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kbpick_core::api::{AuthApi, Credentials, KnowledgeBaseApi};
use kbpick_core::error::{KbPickError, Result};
use kbpick_core::model::{
    Connection, InodePath, InodeType, KnowledgeBase, KnowledgeBaseRequest, Organization, Page,
    Resource, ResourceStatus,
};
use tokio::sync::Notify;

pub struct FakeAuth {
    token: Option<String>,
    calls: AtomicUsize,
}

impl FakeAuth {
    pub fn accepting(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            token: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for FakeAuth {
    async fn login(&self, _credentials: &Credentials) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.token.clone().ok_or(KbPickError::InvalidCredentials)
    }
}

pub fn connection(id: &str, name: &str) -> Connection {
    Connection {
        connection_id: id.to_string(),
        name: name.to_string(),
        connection_provider: "gdrive".to_string(),
        connection_provider_data: serde_json::Value::Null,
        created_at: String::new(),
        updated_at: String::new(),
    }
}

pub fn file(id: &str, path: &str) -> Resource {
    Resource {
        resource_id: id.to_string(),
        inode_type: InodeType::File,
        inode_path: InodePath {
            path: path.to_string(),
        },
        created_at: None,
        modified_at: None,
        indexed_at: None,
        knowledge_base_id: None,
        dataloader_metadata: None,
        content_mime: None,
        size: None,
        status: None,
    }
}

pub fn dir(id: &str, path: &str) -> Resource {
    Resource {
        inode_type: InodeType::Directory,
        ..file(id, path)
    }
}

pub fn with_status(resource: Resource, status: ResourceStatus) -> Resource {
    Resource {
        status: Some(status),
        ..resource
    }
}

/// Scriptable [`KnowledgeBaseApi`]. Unknown listings return empty pages.
#[derive(Default)]
pub struct FakeApi {
    pub connections: Mutex<Vec<Connection>>,
    pub org_id: Mutex<Option<String>>,
    pub children: Mutex<HashMap<(String, String), Vec<Resource>>>,
    pub kb_children: Mutex<HashMap<(String, String), Vec<Resource>>>,
    pub created_id: Mutex<Option<String>>,
    pub fail_children: Mutex<Option<KbPickError>>,
    pub fail_create: Mutex<Option<KbPickError>>,
    pub fail_sync: Mutex<Option<KbPickError>>,
    pub fail_unindex: Mutex<HashSet<String>>,
    /// Listings of these paths wait on `gate` before answering.
    pub gated_paths: Mutex<HashSet<String>>,
    pub gate: Arc<Notify>,
    /// Knowledge-base creation waits on `gate` before answering.
    pub gated_create: AtomicBool,
    pub log: Mutex<Vec<String>>,
    pub created: Mutex<Vec<KnowledgeBaseRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            org_id: Mutex::new(Some("org1".to_string())),
            created_id: Mutex::new(Some("kb-new".to_string())),
            ..Self::default()
        }
    }

    pub fn with_connections(self, connections: Vec<Connection>) -> Self {
        *self.connections.lock().unwrap() = connections;
        self
    }

    pub fn with_children(self, connection_id: &str, path: &str, items: Vec<Resource>) -> Self {
        self.children
            .lock()
            .unwrap()
            .insert((connection_id.to_string(), path.to_string()), items);
        self
    }

    pub fn with_kb_children(self, kb_id: &str, path: &str, items: Vec<Resource>) -> Self {
        self.kb_children
            .lock()
            .unwrap()
            .insert((kb_id.to_string(), path.to_string()), items);
        self
    }

    /// Replaces a knowledge-base listing after construction.
    pub fn set_kb_children(&self, kb_id: &str, path: &str, items: Vec<Resource>) {
        self.kb_children
            .lock()
            .unwrap()
            .insert((kb_id.to_string(), path.to_string()), items);
    }

    pub fn gate_create(&self) {
        self.gated_create.store(true, Ordering::SeqCst);
    }

    pub fn gate_path(&self, path: &str) {
        self.gated_paths.lock().unwrap().insert(path.to_string());
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.log().iter().filter(|l| l.starts_with(prefix)).count()
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl KnowledgeBaseApi for FakeApi {
    async fn list_connections(&self) -> Result<Vec<Connection>> {
        self.record("connections".to_string());
        Ok(self.connections.lock().unwrap().clone())
    }

    async fn current_organization(&self) -> Result<Organization> {
        self.record("organization".to_string());
        let org_id = self
            .org_id
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| KbPickError::http(404, "no organization"))?;
        Ok(Organization {
            org_id,
            org_name: None,
            org_plan: None,
            created_at: None,
            knowledge_base_max_files_to_sync: None,
        })
    }

    async fn list_children(&self, connection_id: &str, path: &str) -> Result<Page<Resource>> {
        self.record(format!("children {connection_id} {path}"));
        let gated = self.gated_paths.lock().unwrap().contains(path);
        if gated {
            self.gate.notified().await;
        }
        if let Some(err) = self.fail_children.lock().unwrap().clone() {
            return Err(err);
        }
        let data = self
            .children
            .lock()
            .unwrap()
            .get(&(connection_id.to_string(), path.to_string()))
            .cloned()
            .unwrap_or_default();
        Ok(Page {
            data,
            ..Page::default()
        })
    }

    async fn list_knowledge_base_children(
        &self,
        knowledge_base_id: &str,
        path: &str,
    ) -> Result<Page<Resource>> {
        self.record(format!("kb_children {knowledge_base_id} {path}"));
        let data = self
            .kb_children
            .lock()
            .unwrap()
            .get(&(knowledge_base_id.to_string(), path.to_string()))
            .cloned()
            .unwrap_or_default();
        Ok(Page {
            data,
            ..Page::default()
        })
    }

    async fn create_knowledge_base(&self, request: &KnowledgeBaseRequest) -> Result<KnowledgeBase> {
        self.record("create".to_string());
        self.created.lock().unwrap().push(request.clone());
        if self.gated_create.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }
        if let Some(err) = self.fail_create.lock().unwrap().clone() {
            return Err(err);
        }
        let knowledge_base_id = self
            .created_id
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| "kb".to_string());
        Ok(KnowledgeBase {
            knowledge_base_id,
            name: request.source.name.clone(),
            description: request.source.description.clone(),
            created_at: None,
            updated_at: None,
        })
    }

    async fn sync_knowledge_base(&self, knowledge_base_id: &str, org_id: &str) -> Result<()> {
        self.record(format!("sync {knowledge_base_id} {org_id}"));
        match self.fail_sync.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn unindex_resource(&self, knowledge_base_id: &str, resource_path: &str) -> Result<()> {
        self.record(format!("unindex {knowledge_base_id} {resource_path}"));
        if self.fail_unindex.lock().unwrap().contains(resource_path) {
            return Err(KbPickError::http(500, "unindex failed"));
        }
        Ok(())
    }
}
