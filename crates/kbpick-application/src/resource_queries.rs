//! Read-through query layer over [`KnowledgeBaseApi`].
//!
//! Each listing has its own [`QueryCache`]. A `use_*` call points the cache at
//! the key derived from its inputs and fetches whenever that key changed or
//! has nothing cached yet; a repeated call for the same key is served from
//! the cache. `revalidate_*` always fetches the current key. Responses that
//! come back after their key was abandoned are dropped by the cache.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use kbpick_core::api::KnowledgeBaseApi;
use kbpick_core::error::Result;
use kbpick_core::model::{Connection, Organization, Resource};
use kbpick_core::query::{CommitOutcome, QueryCache, QueryKey, QueryState};

pub struct ResourceQueries {
    api: Arc<dyn KnowledgeBaseApi>,
    connections: Mutex<QueryCache<Vec<Connection>>>,
    organization: Mutex<QueryCache<Organization>>,
    children: Mutex<QueryCache<Vec<Resource>>>,
    knowledge_base_children: Mutex<QueryCache<Vec<Resource>>>,
}

fn lock<T>(cache: &Mutex<QueryCache<T>>) -> MutexGuard<'_, QueryCache<T>> {
    cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Issues `fetch` for `key` and commits its outcome. The cache lock is not
/// held while the request is in flight.
async fn fetch_into<T, F>(cache: &Mutex<QueryCache<T>>, key: QueryKey, fetch: F) -> QueryState<T>
where
    T: Clone,
    F: Future<Output = Result<T>>,
{
    let ticket = lock(cache).begin(key);
    let result = fetch.await;
    if let Err(ref e) = result {
        tracing::debug!("[ResourceQueries] {} failed: {}", ticket.key(), e);
    }
    let mut cache = lock(cache);
    if cache.commit(ticket, result) == CommitOutcome::Discarded {
        tracing::debug!("[ResourceQueries] Response discarded");
    }
    cache.current()
}

/// Points `cache` at `key`. Fetches when the key changed or is unresolved.
///
/// While the fetch runs, the slot keeps whatever it held for that key, and a
/// failed fetch leaves earlier data in place.
async fn read_through<T, F>(
    cache: &Mutex<QueryCache<T>>,
    key: Option<QueryKey>,
    fetch: F,
) -> QueryState<T>
where
    T: Clone,
    F: Future<Output = Result<T>>,
{
    let key = {
        let mut guard = lock(cache);
        let changed = guard.set_current(key.clone());
        match key {
            Some(key) if changed || !guard.is_resolved(&key) => key,
            _ => return guard.current(),
        }
    };
    fetch_into(cache, key, fetch).await
}

impl ResourceQueries {
    pub fn new(api: Arc<dyn KnowledgeBaseApi>) -> Self {
        Self {
            api,
            connections: Mutex::new(QueryCache::new()),
            organization: Mutex::new(QueryCache::new()),
            children: Mutex::new(QueryCache::new()),
            knowledge_base_children: Mutex::new(QueryCache::new()),
        }
    }

    pub fn api(&self) -> &Arc<dyn KnowledgeBaseApi> {
        &self.api
    }

    // ============================================================================
    // Connections & organization
    // ============================================================================

    pub async fn use_connections(&self) -> QueryState<Vec<Connection>> {
        read_through(
            &self.connections,
            Some(QueryKey::connections()),
            self.api.list_connections(),
        )
        .await
    }

    pub async fn revalidate_connections(&self) -> QueryState<Vec<Connection>> {
        lock(&self.connections).set_current(Some(QueryKey::connections()));
        fetch_into(
            &self.connections,
            QueryKey::connections(),
            self.api.list_connections(),
        )
        .await
    }

    pub async fn use_organization(&self) -> QueryState<Organization> {
        read_through(
            &self.organization,
            Some(QueryKey::current_organization()),
            self.api.current_organization(),
        )
        .await
    }

    // ============================================================================
    // Resource listings
    // ============================================================================

    /// Children of `path` under the given connection. Idle without one.
    pub async fn use_children(
        &self,
        connection_id: Option<&str>,
        path: &str,
    ) -> QueryState<Vec<Resource>> {
        let key = QueryKey::children(connection_id, path);
        let fetch = async move {
            match connection_id {
                Some(id) => self.api.list_children(id, path).await.map(|page| page.data),
                None => Ok(Vec::new()),
            }
        };
        read_through(&self.children, key, fetch).await
    }

    pub async fn revalidate_children(&self) -> QueryState<Vec<Resource>> {
        let Some(key) = lock(&self.children).current_key().cloned() else {
            return QueryState::default();
        };
        let QueryKey::Children {
            ref connection_id,
            ref path,
        } = key
        else {
            return QueryState::default();
        };
        let fetch = self.api.list_children(connection_id, path);
        let fetch = async move { fetch.await.map(|page| page.data) };
        fetch_into(&self.children, key.clone(), fetch).await
    }

    /// Knowledge-base view of `path`, used for status badges. Idle without a
    /// knowledge base.
    pub async fn use_knowledge_base_children(
        &self,
        knowledge_base_id: Option<&str>,
        path: &str,
    ) -> QueryState<Vec<Resource>> {
        let key = QueryKey::knowledge_base_children(knowledge_base_id, path);
        let fetch = async move {
            match knowledge_base_id {
                Some(id) => self
                    .api
                    .list_knowledge_base_children(id, path)
                    .await
                    .map(|page| page.data),
                None => Ok(Vec::new()),
            }
        };
        read_through(&self.knowledge_base_children, key, fetch).await
    }

    pub async fn revalidate_knowledge_base_children(&self) -> QueryState<Vec<Resource>> {
        let Some(key) = lock(&self.knowledge_base_children).current_key().cloned() else {
            return QueryState::default();
        };
        let QueryKey::KnowledgeBaseChildren {
            ref knowledge_base_id,
            ref path,
        } = key
        else {
            return QueryState::default();
        };
        let fetch = self.api.list_knowledge_base_children(knowledge_base_id, path);
        let fetch = async move { fetch.await.map(|page| page.data) };
        fetch_into(&self.knowledge_base_children, key.clone(), fetch).await
    }

    // ============================================================================
    // Readers
    // ============================================================================

    pub fn connections(&self) -> QueryState<Vec<Connection>> {
        lock(&self.connections).current()
    }

    pub fn children(&self) -> QueryState<Vec<Resource>> {
        lock(&self.children).current()
    }

    pub fn knowledge_base_children(&self) -> QueryState<Vec<Resource>> {
        lock(&self.knowledge_base_children).current()
    }

    /// Drops every cached listing (used on logout).
    pub fn clear(&self) {
        lock(&self.connections).clear();
        lock(&self.organization).clear();
        lock(&self.children).clear();
        lock(&self.knowledge_base_children).clear();
    }
}
