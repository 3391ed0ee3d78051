//! Rules-based thread summarizer.
//!
//! `Summarizer::summarize` is total and side-effect free. Threads without
//! customer or company messages produce a degraded summary with default
//! labels and "unknown" placeholders rather than an error.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::pipeline::playbook::select_playbook;
use crate::pipeline::rules::RulesEngine;
use crate::pipeline::types::{CrmContext, Intent, Summary};
use crate::threads::Thread;

/// SLA applied to intents missing from [`SLA_HOURS`].
pub const DEFAULT_SLA_HOURS: u32 = 24;

/// Mocked SLA targets by intent.
pub const SLA_HOURS: &[(Intent, u32)] = &[
    (Intent::DamagedItem, 24),
    (Intent::WrongVariant, 24),
    (Intent::DeliveryDelay, 12),
    (Intent::ReturnRefund, 24),
    (Intent::AddressConfirmation, 6),
    (Intent::General, 24),
];

/// Maximum characters of the customer's issue quoted in the bullets.
const ISSUE_MAX_CHARS: usize = 160;

/// Placeholder for absent fields.
const UNKNOWN: &str = "unknown";

pub fn sla_hours(intent: Intent) -> u32 {
    SLA_HOURS
        .iter()
        .find(|(i, _)| *i == intent)
        .map(|(_, h)| *h)
        .unwrap_or(DEFAULT_SLA_HOURS)
}

/// Thread → Summary using keyword tables.
#[derive(Debug, Clone)]
pub struct Summarizer {
    rules: RulesEngine,
    reference_regex: Regex,
}

impl Summarizer {
    pub fn new(rules: RulesEngine) -> Self {
        Self {
            rules,
            // "#4821" style ticket numbers and "ORD-1001" style order IDs.
            reference_regex: Regex::new(r"#\d{3,}\b|\b[A-Z]{2,5}-\d{3,}\b")
                .expect("reference pattern is a valid regex"),
        }
    }

    pub fn rules(&self) -> &RulesEngine {
        &self.rules
    }

    /// Build the draft summary for `thread`.
    pub fn summarize(&self, thread: &Thread) -> Summary {
        let customer_text = thread
            .first_customer_message()
            .map(|m| m.text.as_str())
            .unwrap_or("");
        let company_text = thread
            .last_company_message()
            .map(|m| m.text.as_str())
            .unwrap_or("");

        let intent_text = [
            thread.topic.as_deref().unwrap_or(""),
            thread.subject.as_deref().unwrap_or(""),
            customer_text,
        ]
        .join(" ");

        let intent = self.rules.infer_intent(&intent_text);
        let requested_action = self.rules.infer_requested_action(customer_text);
        let status = self.rules.infer_status(company_text);
        let playbook = select_playbook(intent, status);
        let crm_context = CrmContext::standard(sla_hours(intent));
        let references = self.extract_references(thread);

        let issue = clean_issue(customer_text);
        let mut bullets = vec![
            format!("Order: {}", thread.order_id.as_deref().unwrap_or(UNKNOWN)),
            format!("Product: {}", thread.product.as_deref().unwrap_or(UNKNOWN)),
            format!("Intent: {intent}"),
            format!(
                "Issue: {}",
                if issue.is_empty() { UNKNOWN } else { issue.as_str() }
            ),
            format!(
                "Customer requested: {}",
                requested_action.map(|a| a.label()).unwrap_or("Unclear")
            ),
            format!("Status: {status}"),
        ];
        if !references.is_empty() {
            bullets.push(format!("References: {}", references.join(", ")));
        }
        bullets.push(format!("SLA: {}h", crm_context.sla_hours));
        bullets.push(format!("Next steps: {}", playbook.join("; ")));

        let summary_markdown = bullets
            .iter()
            .map(|b| format!("- {b}"))
            .collect::<Vec<_>>()
            .join("\n");

        debug!(
            thread_id = %thread.thread_id,
            intent = %intent,
            status = %status,
            "Thread summarized"
        );

        Summary {
            order_id: thread.order_id.clone(),
            product: thread.product.clone(),
            intent,
            requested_action,
            status,
            references,
            playbook,
            crm_context,
            summary_markdown,
        }
    }

    /// Order-number-shaped tokens in topic, subject, then messages; deduplicated.
    fn extract_references(&self, thread: &Thread) -> Vec<String> {
        let sources = thread
            .topic
            .iter()
            .chain(thread.subject.iter())
            .map(String::as_str)
            .chain(thread.messages.iter().map(|m| m.text.as_str()));

        let mut refs: Vec<String> = Vec::new();
        for text in sources {
            for m in self.reference_regex.find_iter(text) {
                if !refs.iter().any(|r| r == m.as_str()) {
                    refs.push(m.as_str().to_string());
                }
            }
        }
        refs
    }
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new(RulesEngine::default_rules())
    }
}

static DEFAULT_SUMMARIZER: LazyLock<Summarizer> = LazyLock::new(Summarizer::default);

/// Summarize with the default rule tables.
pub fn summarize(thread: &Thread) -> Summary {
    DEFAULT_SUMMARIZER.summarize(thread)
}

/// Collapse whitespace and truncate to [`ISSUE_MAX_CHARS`].
fn clean_issue(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= ISSUE_MAX_CHARS {
        return collapsed;
    }
    let mut truncated: String = collapsed.chars().take(ISSUE_MAX_CHARS - 1).collect();
    truncated.push('…');
    truncated
}
