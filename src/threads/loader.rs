//! Dataset and CRM file loading.
//!
//! Missing files load as empty; malformed JSON is a configuration error.

use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::threads::crm::{CrmFile, CrmIndex};
use crate::threads::model::Thread;

/// On-disk layout of the thread dataset.
#[derive(Debug, Default, Deserialize)]
struct DatasetFile {
    #[serde(default)]
    threads: Vec<Thread>,
}

/// Read and normalize every thread in the dataset file.
pub async fn load_dataset(path: &Path) -> Result<Vec<Thread>, ConfigError> {
    let Some(dataset) = read_json::<DatasetFile>(path).await? else {
        warn!(path = %path.display(), "Dataset file missing, starting with no threads");
        return Ok(Vec::new());
    };
    let threads: Vec<Thread> = dataset.threads.into_iter().map(Thread::normalize).collect();
    info!(path = %path.display(), count = threads.len(), "Dataset loaded");
    Ok(threads)
}

/// Read the CRM file into an order index.
pub async fn load_crm(path: &Path) -> Result<CrmIndex, ConfigError> {
    let Some(file) = read_json::<CrmFile>(path).await? else {
        info!(path = %path.display(), "CRM file missing, using standard tier for all threads");
        return Ok(CrmIndex::default());
    };
    info!(path = %path.display(), customers = file.customers.len(), "CRM loaded");
    Ok(CrmIndex::from_records(file.customers))
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}
