//! The "index selected resources" action.
//!
//! Per invocation: `Idle -> Submitting -> {Succeeded, Failed} -> Idle`.
//! Nothing here is persisted.

use serde::{Deserialize, Serialize};

use crate::error::{KbPickError, PreconditionError, Result};

/// When the freshly created knowledge-base id becomes the current one.
///
/// Create and sync are two calls and not atomic. `AfterCreate` records the id
/// as soon as creation succeeded, even if the sync then fails, so the user can
/// still see (and re-sync) the knowledge base. `AfterSync` records it only
/// when both calls succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeBaseIdPolicy {
    #[default]
    AfterCreate,
    AfterSync,
}

impl KnowledgeBaseIdPolicy {
    pub fn should_record(self, synced: bool) -> bool {
        match self {
            Self::AfterCreate => true,
            Self::AfterSync => synced,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexPhase {
    Idle,
    Submitting,
    Succeeded { knowledge_base_id: String },
    Failed { error: KbPickError },
}

/// Result reported once the action has returned to idle.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexOutcome {
    /// Set when creation succeeded.
    pub knowledge_base_id: Option<String>,
    pub synced: bool,
    pub error: Option<KbPickError>,
}

impl IndexOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Guards against double submission and tracks the current phase.
#[derive(Debug, Clone)]
pub struct IndexAction {
    phase: IndexPhase,
}

impl Default for IndexAction {
    fn default() -> Self {
        Self {
            phase: IndexPhase::Idle,
        }
    }
}

impl IndexAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &IndexPhase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, IndexPhase::Submitting)
    }

    /// `Idle -> Submitting`. Refuses re-entry while a submission is in flight.
    pub fn begin(&mut self) -> Result<()> {
        if self.is_submitting() {
            return Err(KbPickError::AlreadySubmitting);
        }
        self.phase = IndexPhase::Submitting;
        Ok(())
    }

    pub fn succeed(&mut self, knowledge_base_id: impl Into<String>) {
        self.phase = IndexPhase::Succeeded {
            knowledge_base_id: knowledge_base_id.into(),
        };
    }

    pub fn fail(&mut self, error: KbPickError) {
        self.phase = IndexPhase::Failed { error };
    }

    /// Returns to idle, yielding the terminal phase that was left.
    pub fn finish(&mut self) -> IndexPhase {
        std::mem::replace(&mut self.phase, IndexPhase::Idle)
    }
}

/// Checks what the index button requires before it can be enabled.
pub fn check_index_preconditions(
    connection_id: Option<&str>,
    org_id: Option<&str>,
    selection_len: usize,
) -> std::result::Result<(), PreconditionError> {
    if connection_id.is_none() {
        return Err(PreconditionError::NoConnection);
    }
    if org_id.is_none() {
        return Err(PreconditionError::NoOrganization);
    }
    if selection_len == 0 {
        return Err(PreconditionError::EmptySelection);
    }
    Ok(())
}
