//! Approval data model: records, states, and submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::types::{Intent, Status};

/// How an accepted submission related to the AI draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalKind {
    /// The approved text equals the AI draft.
    #[default]
    AsDraft,
    /// The associate changed the text.
    WithEdits,
}

/// The live approval for a thread. At most one exists per `thread_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    /// Key of the record. Older files only carry it as the map key.
    #[serde(default)]
    pub thread_id: String,
    pub approved_summary: String,
    pub approver: String,
    pub approved_at: DateTime<Utc>,
    /// Labels re-inferred from the approved text.
    #[serde(default)]
    pub approved_intent: Intent,
    #[serde(default)]
    pub approved_status: Status,
    #[serde(default)]
    pub kind: ApprovalKind,
}

impl Approval {
    /// State a thread is in while this record is live.
    pub fn state(&self) -> ApprovalState {
        match self.kind {
            ApprovalKind::AsDraft => ApprovalState::ApprovedAsDraft,
            ApprovalKind::WithEdits => ApprovalState::ApprovedWithEdits,
        }
    }
}

/// Approval lifecycle of a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    /// Only the AI draft exists.
    NoApproval,
    ApprovedAsDraft,
    ApprovedWithEdits,
}

/// Why a submission was refused by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Text is empty after trimming.
    Empty,
    /// Text matches the current baseline.
    Unchanged,
}

impl ApprovalState {
    pub fn of(approval: Option<&Approval>) -> Self {
        approval.map_or(Self::NoApproval, Approval::state)
    }

    /// Apply a submission of `text`.
    ///
    /// `baseline` is the latest approved text, or the AI draft when nothing has
    /// been approved yet. A first submission is always accepted when non-empty;
    /// later submissions must differ from the baseline.
    pub fn submit(self, text: &str, baseline: &str, ai_draft: &str) -> Result<Self, Rejection> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Rejection::Empty);
        }
        match self {
            Self::NoApproval if text == ai_draft.trim() => Ok(Self::ApprovedAsDraft),
            Self::NoApproval => Ok(Self::ApprovedWithEdits),
            Self::ApprovedAsDraft | Self::ApprovedWithEdits => {
                if text == baseline.trim() {
                    Err(Rejection::Unchanged)
                } else {
                    Ok(Self::ApprovedWithEdits)
                }
            }
        }
    }

    /// Record kind written for this state, if it is an approved state.
    pub fn kind(&self) -> Option<ApprovalKind> {
        match self {
            Self::NoApproval => None,
            Self::ApprovedAsDraft => Some(ApprovalKind::AsDraft),
            Self::ApprovedWithEdits => Some(ApprovalKind::WithEdits),
        }
    }
}

/// An associate's approve action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub approved_summary: String,
    #[serde(default)]
    pub approver: Option<String>,
}

impl ApprovalRequest {
    pub fn new(thread_id: impl Into<String>, approved_summary: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            approved_summary: approved_summary.into(),
            approver: None,
        }
    }

    pub fn with_approver(mut self, approver: impl Into<String>) -> Self {
        self.approver = Some(approver.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAFT: &str = "- Intent: General inquiry\n- Status: Open";

    #[test]
    fn first_submission_of_draft_is_as_draft() {
        let next = ApprovalState::NoApproval.submit(DRAFT, DRAFT, DRAFT).unwrap();
        assert_eq!(next, ApprovalState::ApprovedAsDraft);
    }

    #[test]
    fn first_submission_ignores_surrounding_whitespace() {
        let padded = format!("\n  {DRAFT}  \n");
        let next = ApprovalState::NoApproval.submit(&padded, DRAFT, DRAFT).unwrap();
        assert_eq!(next, ApprovalState::ApprovedAsDraft);
    }

    #[test]
    fn first_submission_with_changes_is_with_edits() {
        let next = ApprovalState::NoApproval
            .submit("- Intent: Refund", DRAFT, DRAFT)
            .unwrap();
        assert_eq!(next, ApprovalState::ApprovedWithEdits);
    }

    #[test]
    fn empty_submission_rejected_in_every_state() {
        for state in [
            ApprovalState::NoApproval,
            ApprovalState::ApprovedAsDraft,
            ApprovalState::ApprovedWithEdits,
        ] {
            assert_eq!(state.submit("  \n\t", DRAFT, DRAFT), Err(Rejection::Empty));
        }
    }

    #[test]
    fn resubmitting_baseline_is_rejected() {
        assert_eq!(
            ApprovalState::ApprovedAsDraft.submit(&format!("{DRAFT} "), DRAFT, DRAFT),
            Err(Rejection::Unchanged)
        );
        assert_eq!(
            ApprovalState::ApprovedWithEdits.submit("edited", "edited", DRAFT),
            Err(Rejection::Unchanged)
        );
    }

    #[test]
    fn edits_compare_against_latest_approval_not_draft() {
        // Reverting to the AI draft after an edit is a change relative to the baseline.
        let next = ApprovalState::ApprovedWithEdits
            .submit(DRAFT, "edited", DRAFT)
            .unwrap();
        assert_eq!(next, ApprovalState::ApprovedWithEdits);
    }

    #[test]
    fn state_of_record() {
        assert_eq!(ApprovalState::of(None), ApprovalState::NoApproval);
        assert_eq!(ApprovalState::ApprovedWithEdits.kind(), Some(ApprovalKind::WithEdits));
        assert_eq!(ApprovalState::NoApproval.kind(), None);
    }

    #[test]
    fn legacy_record_deserializes_with_defaults() {
        let json = r#"{
            "approved_summary": "ok",
            "approver": "ce_associate",
            "approved_at": "2025-03-01T12:00:00Z",
            "approved_status": "Resolved/Approved"
        }"#;
        let approval: Approval = serde_json::from_str(json).unwrap();
        assert!(approval.thread_id.is_empty());
        assert_eq!(approval.kind, ApprovalKind::AsDraft);
        assert_eq!(approval.approved_intent, Intent::General);
        assert_eq!(approval.approved_status, Status::Resolved);
        assert_eq!(approval.state(), ApprovalState::ApprovedAsDraft);
    }
}
