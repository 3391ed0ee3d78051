//! Read-side metrics over the thread catalog and an approval snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::approvals::Approval;
use crate::pipeline::Status;
use crate::threads::{CatalogEntry, ThreadCatalog};

/// Minutes credited per approval unless configured otherwise.
pub const DEFAULT_MINUTES_PER_APPROVAL: u64 = 4;

/// Dashboard counters. Rates are fractions in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_threads: usize,
    pub approved_count: usize,
    pub approval_rate: f64,
    pub resolved_rate: f64,
    pub deflection_rate: f64,
    pub estimated_time_saved_minutes: u64,
}

/// Status used for deflection: the approved label when an associate has
/// approved the thread, otherwise the AI draft's label.
fn effective_status(entry: &CatalogEntry, approval: Option<&Approval>) -> Status {
    approval.map_or(entry.ai_summary.status, |a| a.approved_status)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Compute metrics from a catalog and a store snapshot.
///
/// Approvals for thread IDs absent from the catalog are ignored.
pub fn compute(
    catalog: &ThreadCatalog,
    approvals: &BTreeMap<String, Approval>,
    minutes_per_approval: u64,
) -> Metrics {
    let total_threads = catalog.len();
    let mut approved_count = 0;
    let mut resolved_count = 0;
    let mut self_serve_count = 0;
    let mut deflected_count = 0;

    for entry in catalog.entries() {
        let approval = approvals.get(&entry.thread.thread_id);
        if approval.is_some() {
            approved_count += 1;
        }
        if entry.ai_summary.status.is_resolved() {
            resolved_count += 1;
        }
        if entry.ai_summary.intent.is_self_serve() {
            self_serve_count += 1;
            if effective_status(entry, approval).is_resolved() {
                deflected_count += 1;
            }
        }
    }

    Metrics {
        total_threads,
        approved_count,
        approval_rate: ratio(approved_count, total_threads),
        resolved_rate: ratio(resolved_count, total_threads),
        deflection_rate: ratio(deflected_count, self_serve_count),
        estimated_time_saved_minutes: (approved_count as u64)
            .saturating_mul(minutes_per_approval),
    }
}
