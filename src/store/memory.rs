//! In-memory approval store for tests and ephemeral runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::approvals::model::Approval;
use crate::error::StoreError;
use crate::store::traits::ApprovalStore;

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, Approval>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApprovalStore for MemoryStore {
    async fn get(&self, thread_id: &str) -> Result<Option<Approval>, StoreError> {
        Ok(self.records.read().await.get(thread_id).cloned())
    }

    async fn upsert(&self, approval: Approval) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(approval.thread_id.clone(), approval);
        Ok(())
    }

    async fn snapshot(&self) -> Result<BTreeMap<String, Approval>, StoreError> {
        Ok(self.records.read().await.clone())
    }
}
