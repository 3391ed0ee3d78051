//! Approval state machine and the service that persists accepted submissions.

pub mod model;
pub mod service;

pub use model::{Approval, ApprovalKind, ApprovalRequest, ApprovalState, Rejection};
pub use service::ApprovalService;
