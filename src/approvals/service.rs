//! Approval flow: validates submissions against the baseline and upserts them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::approvals::model::{Approval, ApprovalRequest, ApprovalState, Rejection};
use crate::config::DEFAULT_APPROVER;
use crate::error::{ApprovalError, StoreError};
use crate::export;
use crate::store::ApprovalStore;
use crate::store::json_file::write_atomic;
use crate::threads::{CatalogEntry, ThreadCatalog};

/// Server-side gate for approve submissions.
///
/// Each submit is a read-modify-write against the store: read the live record
/// to find the baseline, validate, then upsert. Same-thread submissions can
/// race and the last write wins.
pub struct ApprovalService {
    catalog: Arc<ThreadCatalog>,
    store: Arc<dyn ApprovalStore>,
    default_approver: String,
    /// Where the denormalized export is rewritten after each approval.
    export_path: Option<PathBuf>,
    export_lock: Mutex<()>,
}

impl ApprovalService {
    pub fn new(catalog: Arc<ThreadCatalog>, store: Arc<dyn ApprovalStore>) -> Self {
        Self {
            catalog,
            store,
            default_approver: DEFAULT_APPROVER.to_string(),
            export_path: None,
            export_lock: Mutex::new(()),
        }
    }

    /// Approver recorded for blank submissions.
    pub fn with_default_approver(mut self, approver: impl Into<String>) -> Self {
        self.default_approver = approver.into();
        self
    }

    /// Rewrite the JSON export at `path` after every accepted approval.
    pub fn with_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = Some(path.into());
        self
    }

    pub fn catalog(&self) -> &Arc<ThreadCatalog> {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<dyn ApprovalStore> {
        &self.store
    }

    fn entry(&self, thread_id: &str) -> Result<&CatalogEntry, ApprovalError> {
        self.catalog
            .get(thread_id)
            .ok_or_else(|| ApprovalError::ThreadNotFound {
                thread_id: thread_id.to_string(),
            })
    }

    /// Live approval for a known thread.
    pub async fn get(&self, thread_id: &str) -> Result<Option<Approval>, ApprovalError> {
        self.entry(thread_id)?;
        Ok(self.store.get(thread_id).await?)
    }

    pub async fn state(&self, thread_id: &str) -> Result<ApprovalState, ApprovalError> {
        Ok(ApprovalState::of(self.get(thread_id).await?.as_ref()))
    }

    /// Text the next submission is compared against.
    pub async fn baseline(&self, thread_id: &str) -> Result<String, ApprovalError> {
        let entry = self.entry(thread_id)?;
        Ok(match self.store.get(thread_id).await? {
            Some(current) => current.approved_summary,
            None => entry.ai_summary.summary_markdown.clone(),
        })
    }

    /// Validate and persist an approve action.
    pub async fn submit(&self, request: ApprovalRequest) -> Result<Approval, ApprovalError> {
        let ApprovalRequest {
            thread_id,
            approved_summary,
            approver,
        } = request;

        if thread_id.trim().is_empty() {
            warn!("Rejected approval without thread_id");
            return Err(ApprovalError::MissingThreadId);
        }

        if approved_summary.trim().is_empty() {
            warn!(thread_id = %thread_id, "Rejected approval with empty summary");
            return Err(ApprovalError::EmptySummary);
        }

        let entry = self.entry(&thread_id)?;
        let ai_draft = entry.ai_summary.summary_markdown.as_str();

        let current = self.store.get(&thread_id).await?;
        let state = ApprovalState::of(current.as_ref());
        let baseline = current
            .as_ref()
            .map(|a| a.approved_summary.as_str())
            .unwrap_or(ai_draft);

        let next = match state.submit(&approved_summary, baseline, ai_draft) {
            Ok(next) => next,
            Err(Rejection::Empty) => return Err(ApprovalError::EmptySummary),
            Err(Rejection::Unchanged) => {
                info!(thread_id = %thread_id, state = ?state, "Rejected no-op approval");
                return Err(ApprovalError::Unchanged { thread_id });
            }
        };

        let approver = approver
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| self.default_approver.clone());

        let rules = self.catalog.summarizer().rules();
        let approval = Approval {
            approved_intent: rules.infer_intent(&approved_summary),
            approved_status: rules.infer_status(&approved_summary),
            kind: next.kind().unwrap_or_default(),
            thread_id,
            approved_summary,
            approver,
            approved_at: Utc::now(),
        };

        self.store.upsert(approval.clone()).await?;

        info!(
            thread_id = %approval.thread_id,
            approver = %approval.approver,
            from = ?state,
            to = ?next,
            "Approval recorded"
        );

        if let Some(path) = &self.export_path {
            // The approval is already durable; a stale export is not fatal.
            if let Err(e) = self.write_export(path).await {
                warn!(path = %path.display(), error = %e, "Failed to refresh approved export");
            }
        }
        Ok(approval)
    }

    async fn write_export(&self, path: &Path) -> Result<(), StoreError> {
        let _guard = self.export_lock.lock().await;
        let approvals = self.store.snapshot().await?;
        let json = export::to_json(&export::export_records(&self.catalog, &approvals))?;
        write_atomic(path, &json).await?;
        debug!(path = %path.display(), "Approved export refreshed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;

    use super::*;
    use crate::approvals::model::ApprovalKind;
    use crate::error::StoreError;
    use crate::pipeline::Status;
    use crate::store::MemoryStore;
    use crate::threads::{CrmIndex, Message, SenderRole, Thread};

    fn catalog() -> Arc<ThreadCatalog> {
        let threads = vec![
            Thread::new("T-1")
                .with_topic("Where is my order #4821?")
                .with_message(Message::new(
                    SenderRole::Customer,
                    "I haven't received my package",
                    "2025-01-01T00:00:00Z",
                )),
            Thread::new("T-2").with_message(Message::new(SenderRole::Customer, "hello", "")),
        ];
        Arc::new(ThreadCatalog::new(threads, &CrmIndex::default()))
    }

    fn service() -> ApprovalService {
        ApprovalService::new(catalog(), Arc::new(MemoryStore::new()))
    }

    async fn draft(svc: &ApprovalService, id: &str) -> String {
        svc.catalog().get(id).unwrap().ai_summary.summary_markdown.clone()
    }

    #[tokio::test]
    async fn first_approval_of_unedited_draft_is_accepted() {
        let svc = service();
        let text = draft(&svc, "T-1").await;
        assert_eq!(svc.state("T-1").await.unwrap(), ApprovalState::NoApproval);

        let approval = svc.submit(ApprovalRequest::new("T-1", text.clone())).await.unwrap();
        assert_eq!(approval.kind, ApprovalKind::AsDraft);
        assert_eq!(approval.approved_summary, text);
        assert_eq!(svc.state("T-1").await.unwrap(), ApprovalState::ApprovedAsDraft);
    }

    #[tokio::test]
    async fn resubmitting_same_text_is_rejected_without_write() {
        let svc = service();
        let text = draft(&svc, "T-1").await;
        let first = svc.submit(ApprovalRequest::new("T-1", text.clone())).await.unwrap();

        let err = svc
            .submit(ApprovalRequest::new("T-1", format!("  {text}\n")).with_approver("someone else"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApprovalError::Unchanged { .. }));
        assert!(err.is_validation());

        let stored = svc.get("T-1").await.unwrap().unwrap();
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn edit_is_accepted_and_becomes_new_baseline() {
        let svc = service();
        let text = draft(&svc, "T-1").await;
        svc.submit(ApprovalRequest::new("T-1", text.clone())).await.unwrap();

        let edited = format!("{text}\n- Note: carrier escalation opened, resolved");
        let approval = svc
            .submit(ApprovalRequest::new("T-1", edited.clone()).with_approver("dana"))
            .await
            .unwrap();
        assert_eq!(approval.kind, ApprovalKind::WithEdits);
        assert_eq!(approval.approver, "dana");
        assert_eq!(approval.approved_status, Status::Resolved);
        assert_eq!(svc.baseline("T-1").await.unwrap(), edited);
        assert_eq!(svc.state("T-1").await.unwrap(), ApprovalState::ApprovedWithEdits);

        // The edited text is now the no-op baseline.
        let err = svc.submit(ApprovalRequest::new("T-1", edited)).await.unwrap_err();
        assert!(matches!(err, ApprovalError::Unchanged { .. }));

        // Reverting to the AI draft is a change relative to the baseline.
        let reverted = svc.submit(ApprovalRequest::new("T-1", text)).await.unwrap();
        assert_eq!(reverted.kind, ApprovalKind::WithEdits);
    }

    #[tokio::test]
    async fn first_approval_with_edits() {
        let svc = service();
        let approval = svc
            .submit(ApprovalRequest::new("T-2", "- Intent: refund request"))
            .await
            .unwrap();
        assert_eq!(approval.kind, ApprovalKind::WithEdits);
    }

    #[tokio::test]
    async fn empty_summary_is_validation_error() {
        let svc = service();
        let err = svc.submit(ApprovalRequest::new("T-1", "   \n")).await.unwrap_err();
        assert!(matches!(err, ApprovalError::EmptySummary));
        assert!(svc.get("T-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_thread_id_is_validation_error() {
        let svc = service();
        let err = svc.submit(ApprovalRequest::new("  ", "text")).await.unwrap_err();
        assert!(matches!(err, ApprovalError::MissingThreadId));
        assert!(err.is_validation());
        assert_eq!(svc.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_thread_is_not_found() {
        let svc = service();
        let err = svc.submit(ApprovalRequest::new("T-404", "text")).await.unwrap_err();
        assert!(matches!(err, ApprovalError::ThreadNotFound { .. }));
        assert!(!err.is_validation());
        assert!(matches!(
            svc.state("T-404").await.unwrap_err(),
            ApprovalError::ThreadNotFound { .. }
        ));
        assert_eq!(svc.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn blank_approver_gets_placeholder() {
        let svc = service();
        let approval = svc
            .submit(ApprovalRequest::new("T-2", "ok").with_approver("   "))
            .await
            .unwrap();
        assert_eq!(approval.approver, "ce_associate");

        let svc = service().with_default_approver("night_shift");
        let approval = svc.submit(ApprovalRequest::new("T-2", "ok")).await.unwrap();
        assert_eq!(approval.approver, "night_shift");
    }

    #[tokio::test]
    async fn approved_labels_are_inferred_from_text() {
        let svc = service();
        let approval = svc
            .submit(ApprovalRequest::new("T-2", "Item arrived broken; refund pending"))
            .await
            .unwrap();
        assert_eq!(approval.approved_intent, crate::pipeline::Intent::DamagedItem);
        assert_eq!(approval.approved_status, Status::Pending);
    }

    #[tokio::test]
    async fn approval_refreshes_export_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("approved_export.json");
        let svc = service().with_export_path(&path);

        svc.submit(ApprovalRequest::new("T-2", "Refund pending").with_approver("dana"))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let records: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(records.as_array().unwrap().len(), 2);
        assert_eq!(records[0]["thread_id"], "T-1");
        assert!(records[0]["approved_summary"].is_null());
        assert_eq!(records[1]["approved_summary"], "Refund pending");
        assert_eq!(records[1]["approver"], "dana");
        assert_eq!(records[1]["approved_status"], "Pending - Awaiting customer/company action");
    }

    #[tokio::test]
    async fn export_failure_does_not_fail_approval() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let svc = service().with_export_path(blocker.join("approved_export.json"));

        let approval = svc.submit(ApprovalRequest::new("T-2", "ok")).await.unwrap();
        assert_eq!(svc.get("T-2").await.unwrap(), Some(approval));
    }

    struct FailingStore;

    #[async_trait]
    impl ApprovalStore for FailingStore {
        async fn get(&self, _thread_id: &str) -> Result<Option<Approval>, StoreError> {
            Ok(None)
        }
        async fn upsert(&self, _approval: Approval) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
        async fn snapshot(&self) -> Result<BTreeMap<String, Approval>, StoreError> {
            Ok(BTreeMap::new())
        }
    }

    #[tokio::test]
    async fn store_failure_surfaces() {
        let svc = ApprovalService::new(catalog(), Arc::new(FailingStore));
        let err = svc.submit(ApprovalRequest::new("T-2", "ok")).await.unwrap_err();
        assert!(matches!(err, ApprovalError::Store(StoreError::Io(_))));
    }
}
