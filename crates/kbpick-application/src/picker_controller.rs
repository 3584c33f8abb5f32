//! PickerController - owns the picker state and wires it to queries and
//! mutations.
//!
//! The controller is driven by a single event loop through `&mut self`; it is
//! the only writer of the [`PickerStore`].

use std::collections::HashSet;
use std::sync::Arc;

use kbpick_core::api::KnowledgeBaseApi;
use kbpick_core::config::AppConfig;
use kbpick_core::error::{KbPickError, PreconditionError, Result};
use kbpick_core::indexing::{IndexAction, IndexOutcome, check_index_preconditions};
use kbpick_core::listing::{ListDisplay, ResourceListView, SortConfig, StatusMap};
use kbpick_core::model::{Connection, Organization, Resource};
use kbpick_core::picker::{PickerStore, ROOT_PATH};
use kbpick_core::query::QueryState;

use crate::indexing_usecase::{IndexingUseCase, UnindexResult};
use crate::resource_queries::ResourceQueries;

/// What activating a row did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A directory was entered.
    Entered,
    /// A file with an external link.
    External(String),
    /// A file without a link.
    Nothing,
}

pub struct PickerController {
    store: PickerStore,
    queries: ResourceQueries,
    indexing: IndexingUseCase,
    index_action: IndexAction,
    sort: SortConfig,
    busy: HashSet<String>,
    /// Knowledge base opened at start-up; restored by [`Self::reset`].
    configured_knowledge_base_id: Option<String>,
}

impl PickerController {
    pub fn new(api: Arc<dyn KnowledgeBaseApi>, config: &AppConfig) -> Self {
        let mut store = PickerStore::new();
        store.set_current_knowledge_base_id(config.knowledge_base_id.clone());
        Self {
            store,
            queries: ResourceQueries::new(Arc::clone(&api)),
            indexing: IndexingUseCase::new(api, config),
            index_action: IndexAction::new(),
            sort: SortConfig::default(),
            busy: HashSet::new(),
            configured_knowledge_base_id: config.knowledge_base_id.clone(),
        }
    }

    pub fn store(&self) -> &PickerStore {
        &self.store
    }

    pub fn queries(&self) -> &ResourceQueries {
        &self.queries
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortConfig) {
        self.sort = sort;
    }

    pub fn is_busy(&self, resource_id: &str) -> bool {
        self.busy.contains(resource_id)
    }

    // ============================================================================
    // Connections & organization
    // ============================================================================

    /// Loads connections and selects the first one if nothing is selected.
    pub async fn load_connections(&mut self) -> QueryState<Vec<Connection>> {
        let state = self.queries.use_connections().await;
        if let Some(connections) = &state.data {
            self.auto_select_first(connections);
        }
        state
    }

    pub async fn refresh_connections(&mut self) -> QueryState<Vec<Connection>> {
        let state = self.queries.revalidate_connections().await;
        if let Some(connections) = &state.data {
            self.auto_select_first(connections);
        }
        state
    }

    fn auto_select_first(&mut self, connections: &[Connection]) {
        if self.store.selected_integration().is_some() {
            return;
        }
        if let Some(first) = connections.first() {
            tracing::debug!("[PickerController] Auto-selecting {}", first.connection_id);
            self.store
                .set_selected_integration(Some(first.connection_id.clone()));
        }
    }

    /// Resolves the organization id the sync call needs.
    pub async fn load_organization(&mut self) -> QueryState<Organization> {
        let state = self.queries.use_organization().await;
        if let Some(org) = &state.data {
            self.store.set_organization_id(Some(org.org_id.clone()));
        }
        state
    }

    pub fn select_connection(&mut self, connection_id: impl Into<String>) {
        self.busy.clear();
        self.store
            .set_selected_integration(Some(connection_id.into()));
    }

    // ============================================================================
    // Navigation & selection
    // ============================================================================

    /// Enters a directory, or reports a file's external link.
    pub fn open(&mut self, resource: &Resource) -> OpenOutcome {
        if resource.is_directory() {
            self.store
                .navigate_to_folder(resource.resource_id.clone(), resource.name());
            return OpenOutcome::Entered;
        }
        match resource.web_url() {
            Some(url) => OpenOutcome::External(url.to_string()),
            None => OpenOutcome::Nothing,
        }
    }

    pub fn navigate_back(&mut self) {
        self.store.navigate_back();
    }

    pub fn navigate_to_root(&mut self) {
        self.store.navigate_to_root();
    }

    pub fn navigate_to_breadcrumb(&mut self, index: usize) {
        self.store.navigate_to_breadcrumb(index);
    }

    /// Breadcrumb labels, root first.
    pub fn breadcrumbs(&self) -> Vec<String> {
        self.store
            .folder_stack()
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    pub fn toggle_selection(&mut self, resource_id: impl Into<String>) {
        self.store.toggle_resource_selection(resource_id);
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.store.set_search_query(query);
    }

    pub fn set_knowledge_base(&mut self, knowledge_base_id: Option<String>) {
        self.store.set_current_knowledge_base_id(knowledge_base_id);
    }

    /// Path used for the knowledge-base status listing of the open folder.
    fn knowledge_base_path(&self) -> String {
        self.store
            .current_folder()
            .map(|f| f.path.clone())
            .unwrap_or_else(|| ROOT_PATH.to_string())
    }

    // ============================================================================
    // Listing
    // ============================================================================

    /// Fetches what the open folder needs and builds the rows.
    ///
    /// A listing error is returned only when there is no earlier data to
    /// keep showing.
    pub async fn list_view(&self) -> Result<ListDisplay> {
        let connection_id = self.store.selected_integration();
        let children = self
            .queries
            .use_children(connection_id, self.store.current_path())
            .await;
        let kb_path = self.knowledge_base_path();
        let kb_children = self
            .queries
            .use_knowledge_base_children(self.store.current_knowledge_base_id(), &kb_path)
            .await;
        self.build_view(children, kb_children, connection_id.is_some())
    }

    /// Re-fetches the open folder and its statuses.
    pub async fn refresh(&self) -> Result<ListDisplay> {
        let children = self.queries.revalidate_children().await;
        let kb_children = self.queries.revalidate_knowledge_base_children().await;
        self.build_view(
            children,
            kb_children,
            self.store.selected_integration().is_some(),
        )
    }

    fn build_view(
        &self,
        children: QueryState<Vec<Resource>>,
        kb_children: QueryState<Vec<Resource>>,
        active: bool,
    ) -> Result<ListDisplay> {
        if let (None, Some(err)) = (&children.data, &children.error) {
            return Err(err.clone());
        }
        if let Some(err) = &kb_children.error {
            tracing::warn!("[PickerController] Status listing failed: {}", err);
        }

        let statuses = kb_children
            .data
            .as_deref()
            .map(StatusMap::from_resources)
            .unwrap_or_default();
        let resources = children.data.as_deref().unwrap_or_default();
        let selection = self.store.selected_resources();

        let view = ResourceListView {
            resources,
            is_loading: active && children.is_loading(),
            search_query: self.store.search_query(),
            sort: self.sort,
            statuses: &statuses,
            selection: &selection,
            busy: &self.busy,
        };
        Ok(view.build())
    }

    // ============================================================================
    // Index / unindex
    // ============================================================================

    pub fn index_precondition(&self) -> std::result::Result<(), PreconditionError> {
        check_index_preconditions(
            self.store.selected_integration(),
            self.store.organization_id(),
            self.store.selection_len(),
        )
    }

    /// The index action is offered only when this is true.
    pub fn can_index(&self) -> bool {
        self.index_precondition().is_ok() && !self.index_action.is_submitting()
    }

    pub async fn index_selected(&mut self) -> Result<IndexOutcome> {
        let outcome = self
            .indexing
            .index_selected(&mut self.index_action, &mut self.store)
            .await?;
        // Load statuses for the knowledge base just recorded, not the cache's
        // previous key.
        if let Some(id) = outcome.knowledge_base_id.as_deref() {
            if self.store.current_knowledge_base_id() == Some(id) {
                let path = self.knowledge_base_path();
                self.queries
                    .use_knowledge_base_children(Some(id), &path)
                    .await;
            }
        }
        Ok(outcome)
    }

    /// Unindexes one row. The row is marked busy while the call is in flight.
    pub async fn unindex(&mut self, resource: &Resource) -> Result<()> {
        let knowledge_base_id = self
            .store
            .current_knowledge_base_id()
            .ok_or(PreconditionError::NoKnowledgeBase)?
            .to_string();
        if !self.busy.insert(resource.resource_id.clone()) {
            return Err(KbPickError::AlreadySubmitting);
        }

        let result = self
            .indexing
            .unindex(&knowledge_base_id, resource.path())
            .await;
        self.busy.remove(&resource.resource_id);

        match &result {
            Ok(()) => {
                self.queries.revalidate_knowledge_base_children().await;
            }
            Err(e) => {
                tracing::error!("[PickerController] Unindex of {} failed: {}", resource.path(), e);
            }
        }
        result
    }

    /// Unindexes several rows concurrently.
    pub async fn unindex_many(&mut self, resources: &[Resource]) -> Result<Vec<UnindexResult>> {
        let knowledge_base_id = self
            .store
            .current_knowledge_base_id()
            .ok_or(PreconditionError::NoKnowledgeBase)?
            .to_string();
        let ids: Vec<String> = resources.iter().map(|r| r.resource_id.clone()).collect();
        let paths: Vec<String> = resources.iter().map(|r| r.path().to_string()).collect();
        self.busy.extend(ids.iter().cloned());

        let results = self.indexing.unindex_many(&knowledge_base_id, &paths).await;
        for id in &ids {
            self.busy.remove(id);
        }
        if results.iter().any(|r| r.result.is_ok()) {
            self.queries.revalidate_knowledge_base_children().await;
        }
        Ok(results)
    }

    /// Forgets all picker state and cached listings (after logout). The
    /// configured knowledge base stays open.
    pub fn reset(&mut self) {
        self.store.reset();
        self.store
            .set_current_knowledge_base_id(self.configured_knowledge_base_id.clone());
        self.queries.clear();
        self.busy.clear();
        self.index_action = IndexAction::new();
    }
}
