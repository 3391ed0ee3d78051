//! CE Assist: rules-based thread summaries with associate approval.

pub mod approvals;
pub mod config;
pub mod error;
pub mod export;
pub mod metrics;
pub mod pipeline;
pub mod routes;
pub mod store;
pub mod threads;
