//! Keyed read-through cache for remote listings.
//!
//! A query's identity is a [`QueryKey`] computed purely from its inputs. A
//! response is committed only if the key it was issued for is still the
//! current key and no newer request for that key has been issued since.
//! Superseding the key is the only cancellation there is: an abandoned
//! request may still finish, its result is just never rendered.

use std::collections::HashMap;
use std::fmt;

use crate::error::KbPickError;
use crate::picker::ROOT_PATH;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Connections,
    CurrentOrganization,
    Children {
        connection_id: String,
        path: String,
    },
    KnowledgeBaseChildren {
        knowledge_base_id: String,
        path: String,
    },
}

impl QueryKey {
    pub fn connections() -> Self {
        Self::Connections
    }

    pub fn current_organization() -> Self {
        Self::CurrentOrganization
    }

    /// `None` (idle) when no connection is active.
    pub fn children(connection_id: Option<&str>, path: &str) -> Option<Self> {
        connection_id.map(|id| Self::Children {
            connection_id: id.to_string(),
            path: normalize_path(path),
        })
    }

    /// `None` (idle) when no knowledge base is open.
    pub fn knowledge_base_children(knowledge_base_id: Option<&str>, path: &str) -> Option<Self> {
        knowledge_base_id.map(|id| Self::KnowledgeBaseChildren {
            knowledge_base_id: id.to_string(),
            path: normalize_path(path),
        })
    }
}

fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        ROOT_PATH.to_string()
    } else {
        path.to_string()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connections => write!(f, "/connections"),
            Self::CurrentOrganization => write!(f, "/organizations/me/current"),
            Self::Children {
                connection_id,
                path,
            } => write!(f, "/connections/{}/resources/children?{}", connection_id, path),
            Self::KnowledgeBaseChildren {
                knowledge_base_id,
                path,
            } => write!(
                f,
                "/knowledge_bases/{}/resources/children?{}",
                knowledge_base_id, path
            ),
        }
    }
}

/// Receipt for an issued request; pass it back to [`QueryCache::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: QueryKey,
    seq: u64,
}

impl Ticket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The key was superseded, or a newer request for it exists.
    Discarded,
}

/// What a consumer sees for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub error: Option<KbPickError>,
    /// A request for this slot is outstanding.
    pub is_validating: bool,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_validating: false,
        }
    }
}

impl<T> QueryState<T> {
    /// Neither data nor error is available yet.
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }
}

#[derive(Debug)]
struct Slot<T> {
    state: QueryState<T>,
    issued: u64,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            state: QueryState::default(),
            issued: 0,
        }
    }
}

/// One cache slot per key, plus the key currently being displayed.
#[derive(Debug)]
pub struct QueryCache<T> {
    current: Option<QueryKey>,
    slots: HashMap<QueryKey, Slot<T>>,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self {
            current: None,
            slots: HashMap::new(),
        }
    }
}

impl<T: Clone> QueryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_key(&self) -> Option<&QueryKey> {
        self.current.as_ref()
    }

    /// Points the cache at `key`. Returns true when the key changed.
    pub fn set_current(&mut self, key: Option<QueryKey>) -> bool {
        if self.current == key {
            return false;
        }
        self.current = key;
        true
    }

    /// Whether `key` already has data or an error cached.
    pub fn is_resolved(&self, key: &QueryKey) -> bool {
        self.slots
            .get(key)
            .map(|slot| !slot.state.is_loading())
            .unwrap_or(false)
    }

    /// Issues a request for `key`, superseding any earlier one for that key.
    pub fn begin(&mut self, key: QueryKey) -> Ticket {
        let slot = self.slots.entry(key.clone()).or_default();
        slot.issued += 1;
        slot.state.is_validating = true;
        Ticket {
            key,
            seq: slot.issued,
        }
    }

    /// Stores the outcome of a request if it is still wanted.
    ///
    /// An error keeps any previously cached data so the view does not blank
    /// out on a failed revalidation.
    pub fn commit(
        &mut self,
        ticket: Ticket,
        result: std::result::Result<T, KbPickError>,
    ) -> CommitOutcome {
        if self.current.as_ref() != Some(&ticket.key) {
            tracing::debug!("[Query] Discarding response for abandoned key {}", ticket.key);
            self.settle(&ticket);
            return CommitOutcome::Discarded;
        }

        let Some(slot) = self.slots.get_mut(&ticket.key) else {
            return CommitOutcome::Discarded;
        };
        if slot.issued != ticket.seq {
            tracing::debug!("[Query] Discarding superseded response for {}", ticket.key);
            return CommitOutcome::Discarded;
        }

        slot.state.is_validating = false;
        match result {
            Ok(data) => {
                slot.state.data = Some(data);
                slot.state.error = None;
            }
            Err(err) => {
                slot.state.error = Some(err);
            }
        }
        CommitOutcome::Committed
    }

    /// Clears the in-flight flag of an abandoned request's slot.
    fn settle(&mut self, ticket: &Ticket) {
        if let Some(slot) = self.slots.get_mut(&ticket.key) {
            if slot.issued == ticket.seq {
                slot.state.is_validating = false;
            }
        }
    }

    /// State of the current key. Idle (no key) reads as an empty default.
    pub fn current(&self) -> QueryState<T> {
        self.current
            .as_ref()
            .map(|key| self.get(key))
            .unwrap_or_default()
    }

    pub fn get(&self, key: &QueryKey) -> QueryState<T> {
        self.slots
            .get(key)
            .map(|slot| slot.state.clone())
            .unwrap_or_default()
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn children(path: &str) -> QueryKey {
        QueryKey::children(Some("c1"), path).unwrap()
    }

    #[test]
    fn test_key_is_none_without_input() {
        assert!(QueryKey::children(None, "/").is_none());
        assert!(QueryKey::knowledge_base_children(None, "/").is_none());
    }

    #[test]
    fn test_key_depends_on_all_inputs() {
        assert_eq!(children("/"), children(""));
        assert_ne!(children("/"), children("d1"));
        assert_ne!(
            QueryKey::children(Some("c1"), "/"),
            QueryKey::children(Some("c2"), "/")
        );
    }

    #[test]
    fn test_commit_for_current_key() {
        let mut cache = QueryCache::<Vec<u32>>::new();
        cache.set_current(Some(children("/")));
        let ticket = cache.begin(children("/"));
        assert!(cache.current().is_loading());
        assert!(cache.current().is_validating);

        assert_eq!(cache.commit(ticket, Ok(vec![1, 2])), CommitOutcome::Committed);
        let state = cache.current();
        assert_eq!(state.data, Some(vec![1, 2]));
        assert!(!state.is_loading());
        assert!(!state.is_validating);
    }

    #[test]
    fn test_stale_response_for_old_key_is_discarded() {
        let mut cache = QueryCache::<Vec<u32>>::new();
        cache.set_current(Some(children("old")));
        let stale = cache.begin(children("old"));

        cache.set_current(Some(children("new")));
        let fresh = cache.begin(children("new"));
        assert_eq!(cache.commit(fresh, Ok(vec![2])), CommitOutcome::Committed);

        // The old folder's request resolves late.
        assert_eq!(cache.commit(stale, Ok(vec![1])), CommitOutcome::Discarded);
        assert_eq!(cache.current().data, Some(vec![2]));
        assert!(cache.get(&children("old")).data.is_none());
    }

    #[test]
    fn test_older_request_for_same_key_cannot_overwrite() {
        let mut cache = QueryCache::<u32>::new();
        cache.set_current(Some(children("/")));
        let first = cache.begin(children("/"));
        let second = cache.begin(children("/"));

        assert_eq!(cache.commit(second, Ok(2)), CommitOutcome::Committed);
        assert_eq!(cache.commit(first, Ok(1)), CommitOutcome::Discarded);
        assert_eq!(cache.current().data, Some(2));
    }

    #[test]
    fn test_error_keeps_previous_data() {
        let mut cache = QueryCache::<u32>::new();
        cache.set_current(Some(children("/")));
        let t = cache.begin(children("/"));
        cache.commit(t, Ok(7));
        let t = cache.begin(children("/"));
        cache.commit(t, Err(KbPickError::http(500, "boom")));

        let state = cache.current();
        assert_eq!(state.data, Some(7));
        assert_eq!(state.error, Some(KbPickError::http(500, "boom")));
    }

    #[test]
    fn test_success_clears_error() {
        let mut cache = QueryCache::<u32>::new();
        cache.set_current(Some(children("/")));
        let t = cache.begin(children("/"));
        cache.commit(t, Err(KbPickError::AuthExpired));
        assert!(cache.is_resolved(&children("/")));

        let t = cache.begin(children("/"));
        cache.commit(t, Ok(1));
        assert!(cache.current().error.is_none());
    }

    #[test]
    fn test_idle_cache_reads_empty() {
        let mut cache = QueryCache::<u32>::new();
        assert!(cache.is_idle());
        assert!(cache.current().data.is_none());
        assert!(cache.set_current(Some(children("/"))));
        assert!(!cache.set_current(Some(children("/"))));
        assert!(cache.set_current(None));
        assert!(cache.is_idle());
    }

    #[test]
    fn test_returning_to_key_serves_cached_data() {
        let mut cache = QueryCache::<u32>::new();
        cache.set_current(Some(children("a")));
        let t = cache.begin(children("a"));
        cache.commit(t, Ok(1));

        cache.set_current(Some(children("b")));
        cache.set_current(Some(children("a")));
        assert_eq!(cache.current().data, Some(1));
        assert!(cache.is_resolved(&children("a")));
    }
}
