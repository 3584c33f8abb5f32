//! Knowledge-base mutations and the "index selected" transaction.

use std::sync::Arc;

use futures::future::join_all;
use kbpick_core::api::KnowledgeBaseApi;
use kbpick_core::config::AppConfig;
use kbpick_core::error::{KbPickError, Result};
use kbpick_core::indexing::{
    IndexAction, IndexOutcome, IndexPhase, KnowledgeBaseIdPolicy, check_index_preconditions,
};
use kbpick_core::model::{CreateKnowledgeBase, KnowledgeBase, KnowledgeBaseRequest};
use kbpick_core::picker::PickerStore;

/// Outcome of one unindex call within a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct UnindexResult {
    pub resource_path: String,
    pub result: std::result::Result<(), KbPickError>,
}

pub struct IndexingUseCase {
    api: Arc<dyn KnowledgeBaseApi>,
    policy: KnowledgeBaseIdPolicy,
    name: String,
    description: String,
}

impl IndexingUseCase {
    pub fn new(api: Arc<dyn KnowledgeBaseApi>, config: &AppConfig) -> Self {
        Self {
            api,
            policy: config.knowledge_base_id_policy,
            name: config.knowledge_base_name.clone(),
            description: config.knowledge_base_description.clone(),
        }
    }

    pub fn policy(&self) -> KnowledgeBaseIdPolicy {
        self.policy
    }

    /// Creates a knowledge base with the fixed indexing configuration.
    pub async fn create_knowledge_base(&self, source: CreateKnowledgeBase) -> Result<KnowledgeBase> {
        let request = KnowledgeBaseRequest::from(source);
        let kb = self.api.create_knowledge_base(&request).await?;
        tracing::info!(
            "[IndexingUseCase] Created knowledge base {}",
            kb.knowledge_base_id
        );
        Ok(kb)
    }

    pub async fn sync_knowledge_base(&self, knowledge_base_id: &str, org_id: &str) -> Result<()> {
        self.api.sync_knowledge_base(knowledge_base_id, org_id).await?;
        tracing::info!("[IndexingUseCase] Sync triggered for {}", knowledge_base_id);
        Ok(())
    }

    pub async fn unindex(&self, knowledge_base_id: &str, resource_path: &str) -> Result<()> {
        self.api
            .unindex_resource(knowledge_base_id, resource_path)
            .await?;
        tracing::info!("[IndexingUseCase] Unindexed {}", resource_path);
        Ok(())
    }

    /// Runs several unindex calls concurrently. Results keep input order.
    pub async fn unindex_many(
        &self,
        knowledge_base_id: &str,
        resource_paths: &[String],
    ) -> Vec<UnindexResult> {
        let calls = resource_paths.iter().map(|path| async move {
            UnindexResult {
                resource_path: path.clone(),
                result: self.unindex(knowledge_base_id, path).await,
            }
        });
        join_all(calls).await
    }

    /// Creates a knowledge base from the current selection and triggers its
    /// sync.
    ///
    /// Returns `Err` only when the action could not start (unmet precondition
    /// or a submission already in flight). Once started, the selection is
    /// cleared whatever the remote calls do, the action is back to idle, and
    /// the returned [`IndexOutcome`] says how far it got. Whether the new id
    /// becomes the current knowledge base when sync fails is up to the
    /// configured [`KnowledgeBaseIdPolicy`].
    pub async fn index_selected(
        &self,
        action: &mut IndexAction,
        picker: &mut PickerStore,
    ) -> Result<IndexOutcome> {
        check_index_preconditions(
            picker.selected_integration(),
            picker.organization_id(),
            picker.selection_len(),
        )?;
        action.begin()?;
        let mut submission = Submission { action, picker };

        let connection_id = submission
            .picker
            .selected_integration()
            .unwrap_or_default()
            .to_string();
        let org_id = submission
            .picker
            .organization_id()
            .unwrap_or_default()
            .to_string();
        let source = CreateKnowledgeBase {
            connection_id,
            connection_source_ids: submission.picker.selected_resources().iter().cloned().collect(),
            name: self.name.clone(),
            description: self.description.clone(),
        };

        let outcome = match self.create_knowledge_base(source).await {
            Err(e) => {
                tracing::error!("[IndexingUseCase] Create failed: {}", e);
                submission.action.fail(e.clone());
                IndexOutcome {
                    knowledge_base_id: None,
                    synced: false,
                    error: Some(e),
                }
            }
            Ok(kb) => {
                let id = kb.knowledge_base_id;
                let sync = self.sync_knowledge_base(&id, &org_id).await;
                if self.policy.should_record(sync.is_ok()) {
                    submission
                        .picker
                        .set_current_knowledge_base_id(Some(id.clone()));
                }
                match sync {
                    Ok(()) => {
                        submission.action.succeed(id.clone());
                        IndexOutcome {
                            knowledge_base_id: Some(id),
                            synced: true,
                            error: None,
                        }
                    }
                    Err(e) => {
                        tracing::error!("[IndexingUseCase] Sync of {} failed: {}", id, e);
                        submission.action.fail(e.clone());
                        IndexOutcome {
                            knowledge_base_id: Some(id),
                            synced: false,
                            error: Some(e),
                        }
                    }
                }
            }
        };

        drop(submission);
        Ok(outcome)
    }
}

/// A started index submission. Dropping it clears the selection and returns
/// the action to idle, also when the future driving it is cancelled.
struct Submission<'a> {
    action: &'a mut IndexAction,
    picker: &'a mut PickerStore,
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        self.picker.clear_selected_resources();
        if let IndexPhase::Submitting = self.action.finish() {
            tracing::warn!("[IndexingUseCase] Submission abandoned before completing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;
    use kbpick_core::error::PreconditionError;
    use std::time::Duration;

    fn ready_picker() -> PickerStore {
        let mut picker = PickerStore::new();
        picker.set_selected_integration(Some("c1".to_string()));
        picker.set_organization_id(Some("org1".to_string()));
        picker.toggle_resource_selection("r1");
        picker.toggle_resource_selection("r2");
        picker
    }

    fn build(api: Arc<FakeApi>, policy: KnowledgeBaseIdPolicy) -> IndexingUseCase {
        let config = AppConfig {
            knowledge_base_id_policy: policy,
            ..AppConfig::default()
        };
        IndexingUseCase::new(api, &config)
    }

    #[tokio::test]
    async fn test_index_selected_success() {
        let api = Arc::new(FakeApi::new());
        let usecase = build(api.clone(), KnowledgeBaseIdPolicy::AfterCreate);
        let mut action = IndexAction::new();
        let mut picker = ready_picker();

        let outcome = usecase.index_selected(&mut action, &mut picker).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.knowledge_base_id.as_deref(), Some("kb-new"));
        assert_eq!(picker.current_knowledge_base_id(), Some("kb-new"));
        assert_eq!(picker.selection_len(), 0);
        assert_eq!(action.phase(), &IndexPhase::Idle);
        assert_eq!(api.log(), vec!["create", "sync kb-new org1"]);

        let created = api.created.lock().unwrap();
        assert_eq!(created[0].source.connection_id, "c1");
        assert_eq!(created[0].source.connection_source_ids, vec!["r1", "r2"]);
    }

    #[tokio::test]
    async fn test_create_failure_clears_selection_and_skips_sync() {
        let api = Arc::new(FakeApi::new());
        *api.fail_create.lock().unwrap() = Some(KbPickError::http(500, "boom"));
        let usecase = build(api.clone(), KnowledgeBaseIdPolicy::AfterCreate);
        let mut action = IndexAction::new();
        let mut picker = ready_picker();

        let outcome = usecase.index_selected(&mut action, &mut picker).await.unwrap();
        assert_eq!(outcome.error.unwrap().status(), Some(500));
        assert!(picker.current_knowledge_base_id().is_none());
        assert_eq!(picker.selection_len(), 0);
        assert!(!action.is_submitting());
        assert_eq!(api.count("sync"), 0);
    }

    #[tokio::test]
    async fn test_sync_failure_under_each_policy() {
        for (policy, expected) in [
            (KnowledgeBaseIdPolicy::AfterCreate, Some("kb-new")),
            (KnowledgeBaseIdPolicy::AfterSync, None),
        ] {
            let api = Arc::new(FakeApi::new());
            *api.fail_sync.lock().unwrap() = Some(KbPickError::http(502, "bad gateway"));
            let usecase = build(api, policy);
            let mut action = IndexAction::new();
            let mut picker = ready_picker();

            let outcome = usecase.index_selected(&mut action, &mut picker).await.unwrap();
            assert!(!outcome.synced);
            assert_eq!(outcome.knowledge_base_id.as_deref(), Some("kb-new"));
            assert_eq!(picker.current_knowledge_base_id(), expected);
            assert_eq!(picker.selection_len(), 0);
        }
    }

    #[tokio::test]
    async fn test_precondition_failures_change_nothing() {
        let api = Arc::new(FakeApi::new());
        let usecase = build(api.clone(), KnowledgeBaseIdPolicy::AfterCreate);
        let mut action = IndexAction::new();

        let mut picker = ready_picker();
        picker.set_organization_id(None);
        let err = usecase.index_selected(&mut action, &mut picker).await.unwrap_err();
        assert_eq!(err, KbPickError::Precondition(PreconditionError::NoOrganization));
        assert_eq!(picker.selection_len(), 2);

        let mut picker = ready_picker();
        picker.clear_selected_resources();
        let err = usecase.index_selected(&mut action, &mut picker).await.unwrap_err();
        assert_eq!(err, KbPickError::Precondition(PreconditionError::EmptySelection));
        assert!(api.log().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_submission_still_cleans_up() {
        let api = Arc::new(FakeApi::new());
        api.gate_create();
        let usecase = build(api.clone(), KnowledgeBaseIdPolicy::AfterCreate);
        let mut action = IndexAction::new();
        let mut picker = ready_picker();

        let pending = usecase.index_selected(&mut action, &mut picker);
        assert!(
            tokio::time::timeout(Duration::from_millis(20), pending)
                .await
                .is_err()
        );

        assert_eq!(action.phase(), &IndexPhase::Idle);
        assert_eq!(picker.selection_len(), 0);
        assert!(picker.current_knowledge_base_id().is_none());
        assert_eq!(api.log(), vec!["create"]);
    }

    #[tokio::test]
    async fn test_reentry_is_refused() {
        let api = Arc::new(FakeApi::new());
        let usecase = build(api.clone(), KnowledgeBaseIdPolicy::AfterCreate);
        let mut action = IndexAction::new();
        action.begin().unwrap();
        let mut picker = ready_picker();

        let err = usecase.index_selected(&mut action, &mut picker).await.unwrap_err();
        assert_eq!(err, KbPickError::AlreadySubmitting);
        assert!(api.log().is_empty());
    }

    #[tokio::test]
    async fn test_unindex_many_reports_each_row() {
        let api = Arc::new(FakeApi::new());
        api.fail_unindex.lock().unwrap().insert("b.txt".to_string());
        let usecase = build(api.clone(), KnowledgeBaseIdPolicy::AfterCreate);

        let results = usecase
            .unindex_many("kb1", &["a.txt".to_string(), "b.txt".to_string()])
            .await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].resource_path, "a.txt");
        assert!(results[0].result.is_ok());
        assert!(results[1].result.is_err());
        assert_eq!(api.count("unindex kb1"), 2);
    }
}
