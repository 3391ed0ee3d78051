//! Flat JSON-file approval store.
//!
//! The whole file is a `thread_id → approval` map. Records are cached in memory
//! and every upsert rewrites the file under the write lock, via a temp file and
//! rename, so concurrent upserts for different threads cannot drop each other.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::approvals::model::Approval;
use crate::error::StoreError;
use crate::store::traits::ApprovalStore;

/// Approval store persisted as a single pretty-printed JSON file.
pub struct JsonFileStore {
    path: PathBuf,
    records: RwLock<BTreeMap<String, Approval>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is an empty store. A file that is not a valid approval
    /// map is reported rather than silently replaced.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => {
                let mut records: BTreeMap<String, Approval> = serde_json::from_str(&raw)?;
                for (thread_id, approval) in records.iter_mut() {
                    if approval.thread_id.is_empty() {
                        approval.thread_id = thread_id.clone();
                    }
                }
                records
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), count = records.len(), "Approval store opened");
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &BTreeMap<String, Approval>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)?;
        write_atomic(&self.path, &json).await
    }
}

/// Replace `path` with `contents` via a sibling temp file and rename,
/// creating parent directories as needed.
pub(crate) async fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl ApprovalStore for JsonFileStore {
    async fn get(&self, thread_id: &str) -> Result<Option<Approval>, StoreError> {
        Ok(self.records.read().await.get(thread_id).cloned())
    }

    async fn upsert(&self, approval: Approval) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let thread_id = approval.thread_id.clone();
        let previous = records.insert(thread_id.clone(), approval);

        if let Err(e) = self.persist(&records).await {
            // Keep memory consistent with disk.
            match previous {
                Some(prev) => records.insert(thread_id, prev),
                None => records.remove(&thread_id),
            };
            return Err(e);
        }

        debug!(thread_id = %thread_id, path = %self.path.display(), "Approval persisted");
        Ok(())
    }

    async fn snapshot(&self) -> Result<BTreeMap<String, Approval>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}
