//! Configuration types.

use std::path::PathBuf;

use crate::metrics::DEFAULT_MINUTES_PER_APPROVAL;

/// Dataset file name inside the data directory.
pub const DATASET_FILE: &str = "ce_exercise_threads.json";
/// Approval records file name inside the data directory.
pub const APPROVALS_FILE: &str = "approvals.json";
/// Denormalized export rewritten after every approval.
pub const EXPORT_FILE: &str = "approved_export.json";
/// Mock CRM file name inside the data directory.
pub const CRM_FILE: &str = "crm.json";

/// Approver recorded when a submission leaves the field blank.
pub const DEFAULT_APPROVER: &str = "ce_associate";

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the dataset, CRM, and approvals files.
    pub data_dir: PathBuf,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// HTTP port.
    pub port: u16,
    /// Placeholder approver for blank submissions.
    pub default_approver: String,
    /// Minutes credited per approval in the time-saved estimate.
    pub minutes_per_approval: u64,
    /// Directory for rolling log files (stderr only when unset).
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            bind_addr: "0.0.0.0".to_string(),
            port: 8000,
            default_approver: DEFAULT_APPROVER.to_string(),
            minutes_per_approval: DEFAULT_MINUTES_PER_APPROVAL,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Build the config from `CE_ASSIST_*` environment variables.
    ///
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let data_dir = get("CE_ASSIST_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let bind_addr = get("CE_ASSIST_BIND").unwrap_or(defaults.bind_addr);

        let port: u16 = get("CE_ASSIST_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let default_approver = get("CE_ASSIST_DEFAULT_APPROVER")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.default_approver);

        let minutes_per_approval: u64 = get("CE_ASSIST_MINUTES_PER_APPROVAL")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.minutes_per_approval);

        let log_dir = get("CE_ASSIST_LOG_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Self {
            data_dir,
            bind_addr,
            port,
            default_approver,
            minutes_per_approval,
            log_dir,
        }
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir.join(DATASET_FILE)
    }

    pub fn approvals_path(&self) -> PathBuf {
        self.data_dir.join(APPROVALS_FILE)
    }

    pub fn crm_path(&self) -> PathBuf {
        self.data_dir.join(CRM_FILE)
    }

    pub fn export_path(&self) -> PathBuf {
        self.data_dir.join(EXPORT_FILE)
    }
}
