//! Error types for CE Assist.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Approval error: {0}")]
    Approval(#[from] ApprovalError),
}

/// Configuration and dataset-loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse {path}: {reason}")]
    ParseError { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Approval store persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reasons an approve submission is refused.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    #[error("thread_id is required")]
    MissingThreadId,

    #[error("approved_summary must not be empty")]
    EmptySummary,

    #[error("Thread {thread_id} not found")]
    ThreadNotFound { thread_id: String },

    #[error("Summary for thread {thread_id} is unchanged from the current baseline")]
    Unchanged { thread_id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApprovalError {
    /// True for rejections caused by the submitted content rather than the system.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingThreadId | Self::EmptySummary | Self::Unchanged { .. }
        )
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
