//! The single authority for what the picker is showing and what is selected.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::picker::model::{FolderEntry, ROOT_PATH};

/// Navigation & selection state.
///
/// All transitions are synchronous and take `&mut self`, so there is exactly
/// one writer at a time. The folder stack and the selection set are replaced
/// wholesale on every change: a clone handed out before a write keeps seeing
/// the old collection in full.
#[derive(Debug, Clone, Default)]
pub struct PickerStore {
    selected_integration: Option<String>,
    folder_stack: Arc<[FolderEntry]>,
    search_query: String,
    organization_id: Option<String>,
    selected_resources: Arc<BTreeSet<String>>,
    current_knowledge_base_id: Option<String>,
}

impl PickerStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ============================================================================
    // Readers
    // ============================================================================

    pub fn selected_integration(&self) -> Option<&str> {
        self.selected_integration.as_deref()
    }

    pub fn folder_stack(&self) -> Arc<[FolderEntry]> {
        Arc::clone(&self.folder_stack)
    }

    pub fn depth(&self) -> usize {
        self.folder_stack.len()
    }

    pub fn current_folder(&self) -> Option<&FolderEntry> {
        self.folder_stack.last()
    }

    /// Resource id the children query should list: the open folder, or `/`.
    pub fn current_path(&self) -> &str {
        self.current_folder()
            .map(|f| f.id.as_str())
            .unwrap_or(ROOT_PATH)
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn organization_id(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }

    pub fn selected_resources(&self) -> Arc<BTreeSet<String>> {
        Arc::clone(&self.selected_resources)
    }

    pub fn is_selected(&self, resource_id: &str) -> bool {
        self.selected_resources.contains(resource_id)
    }

    pub fn selection_len(&self) -> usize {
        self.selected_resources.len()
    }

    pub fn current_knowledge_base_id(&self) -> Option<&str> {
        self.current_knowledge_base_id.as_deref()
    }

    // ============================================================================
    // Transitions
    // ============================================================================

    /// Switches the active connection. Folder stack and selection belong to
    /// the previous connection and are reset together with it.
    pub fn set_selected_integration(&mut self, id: Option<String>) {
        self.selected_integration = id;
        self.folder_stack = Arc::from(Vec::new());
        self.selected_resources = Arc::new(BTreeSet::new());
    }

    pub fn navigate_to_folder(&mut self, id: impl Into<String>, name: impl Into<String>) {
        let entry = FolderEntry::child_of(self.folder_stack.last(), id, name);
        let mut stack = self.folder_stack.to_vec();
        stack.push(entry);
        self.folder_stack = Arc::from(stack);
    }

    /// Pops the tail entry. No-op at the root.
    pub fn navigate_back(&mut self) {
        if self.folder_stack.is_empty() {
            return;
        }
        let len = self.folder_stack.len() - 1;
        self.folder_stack = Arc::from(&self.folder_stack[..len]);
    }

    pub fn navigate_to_root(&mut self) {
        self.folder_stack = Arc::from(Vec::new());
    }

    /// Breadcrumb click: makes entry `index` the new tail.
    ///
    /// Clicking the current tail, or an index past it, changes nothing.
    pub fn navigate_to_breadcrumb(&mut self, index: usize) {
        let len = self.folder_stack.len();
        if index + 1 >= len {
            return;
        }
        for _ in 0..(len - 1 - index) {
            self.navigate_back();
        }
    }

    pub fn toggle_resource_selection(&mut self, id: impl Into<String>) {
        let id = id.into();
        let mut selection = (*self.selected_resources).clone();
        if !selection.remove(&id) {
            selection.insert(id);
        }
        self.selected_resources = Arc::new(selection);
    }

    pub fn clear_selected_resources(&mut self) {
        self.selected_resources = Arc::new(BTreeSet::new());
    }

    /// Stored verbatim; no trimming.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn set_current_knowledge_base_id(&mut self, id: Option<String>) {
        self.current_knowledge_base_id = id;
    }

    pub fn set_organization_id(&mut self, id: Option<String>) {
        self.organization_id = id;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
