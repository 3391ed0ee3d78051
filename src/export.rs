//! Merged thread + summary + approval view for download.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::approvals::Approval;
use crate::pipeline::{Intent, Status};
use crate::threads::ThreadCatalog;

/// One row of the export, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub thread_id: String,
    pub order_id: Option<String>,
    pub product: Option<String>,
    pub intent: Intent,
    pub status: Status,
    pub approved_summary: Option<String>,
    pub approved_intent: Option<Intent>,
    pub approved_status: Option<Status>,
    pub approver: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub customer_id: Option<String>,
    pub customer_tier: String,
    pub entitlements: Vec<String>,
    pub shipping_constraints: Vec<String>,
}

const CSV_HEADER: &[&str] = &[
    "thread_id",
    "order_id",
    "product",
    "intent",
    "status",
    "approved_summary",
    "approved_intent",
    "approved_status",
    "approver",
    "approved_at",
    "customer_id",
    "customer_tier",
    "entitlements",
    "shipping_constraints",
];

/// Build one record per catalog thread, approved or not.
pub fn export_records(
    catalog: &ThreadCatalog,
    approvals: &BTreeMap<String, Approval>,
) -> Vec<ExportRecord> {
    catalog
        .entries()
        .iter()
        .map(|entry| {
            let ai = &entry.ai_summary;
            let approval = approvals.get(&entry.thread.thread_id);
            ExportRecord {
                thread_id: entry.thread.thread_id.clone(),
                order_id: entry.thread.order_id.clone(),
                product: entry.thread.product.clone(),
                intent: ai.intent,
                status: ai.status,
                approved_summary: approval.map(|a| a.approved_summary.clone()),
                approved_intent: approval.map(|a| a.approved_intent),
                approved_status: approval.map(|a| a.approved_status),
                approver: approval.map(|a| a.approver.clone()),
                approved_at: approval.map(|a| a.approved_at),
                customer_id: ai.crm_context.customer_id.clone(),
                customer_tier: ai.crm_context.customer_tier.clone(),
                entitlements: ai.crm_context.entitlements.clone(),
                shipping_constraints: ai.crm_context.shipping_constraints.clone(),
            }
        })
        .collect()
}

pub fn to_json(records: &[ExportRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// RFC 4180 CSV. Newlines inside the approved summary are flattened to spaces
/// and list columns are joined with `;`.
pub fn to_csv(records: &[ExportRecord]) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_HEADER.iter().map(|h| h.to_string()));

    for r in records {
        let flattened = r
            .approved_summary
            .as_deref()
            .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        push_row(
            &mut out,
            [
                r.thread_id.clone(),
                r.order_id.clone().unwrap_or_default(),
                r.product.clone().unwrap_or_default(),
                r.intent.label().to_string(),
                r.status.label().to_string(),
                flattened,
                r.approved_intent.map(|i| i.label().to_string()).unwrap_or_default(),
                r.approved_status.map(|s| s.label().to_string()).unwrap_or_default(),
                r.approver.clone().unwrap_or_default(),
                r.approved_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                r.customer_id.clone().unwrap_or_default(),
                r.customer_tier.clone(),
                r.entitlements.join(";"),
                r.shipping_constraints.join(";"),
            ],
        );
    }
    out
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let line = fields
        .into_iter()
        .map(|f| escape_field(&f))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push_str("\r\n");
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
