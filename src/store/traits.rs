//! `ApprovalStore` trait: single async interface for approval persistence.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::approvals::model::Approval;
use crate::error::StoreError;

/// Keyed record store holding at most one approval per thread.
///
/// Upserts are last-write-wins: there is no version check, so two writers
/// racing on the same `thread_id` silently overwrite each other. Writes to
/// different threads never interfere.
#[async_trait]
pub trait ApprovalStore: Send + Sync {
    /// The live approval for a thread, if any.
    async fn get(&self, thread_id: &str) -> Result<Option<Approval>, StoreError>;

    /// Insert or replace the approval keyed by `approval.thread_id`.
    async fn upsert(&self, approval: Approval) -> Result<(), StoreError>;

    /// All approvals keyed by thread ID.
    async fn snapshot(&self) -> Result<BTreeMap<String, Approval>, StoreError>;

    /// Number of live approvals.
    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.snapshot().await?.len())
    }
}
