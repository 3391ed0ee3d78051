//! Loaded threads paired with their memoized draft summaries.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::pipeline::{Summarizer, Summary};
use crate::threads::crm::CrmIndex;
use crate::threads::model::Thread;

/// A thread and its AI draft summary.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub thread: Thread,
    pub ai_summary: Summary,
}

/// Read-only set of threads, summarized once at construction.
#[derive(Debug, Clone)]
pub struct ThreadCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
    summarizer: Summarizer,
}

impl ThreadCatalog {
    /// Normalize, summarize, and CRM-enrich `threads` with the default rule
    /// tables. Dataset order is preserved; duplicate thread IDs keep their
    /// first occurrence.
    pub fn new(threads: Vec<Thread>, crm: &CrmIndex) -> Self {
        let summarizer = Summarizer::default();
        let mut entries = Vec::with_capacity(threads.len());
        let mut index = HashMap::with_capacity(threads.len());

        for thread in threads {
            if index.contains_key(&thread.thread_id) {
                warn!(thread_id = %thread.thread_id, "Duplicate thread ID in dataset, skipping");
                continue;
            }
            let thread = thread.normalize();
            let mut ai_summary = summarizer.summarize(&thread);
            crm.enrich(thread.order_id.as_deref(), &mut ai_summary.crm_context);
            index.insert(thread.thread_id.clone(), entries.len());
            entries.push(CatalogEntry { thread, ai_summary });
        }

        Self {
            entries,
            index,
            summarizer,
        }
    }

    pub fn get(&self, thread_id: &str) -> Option<&CatalogEntry> {
        self.index.get(thread_id).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Intent;
    use crate::threads::crm::CrmRecord;
    use crate::threads::model::{Message, SenderRole};

    fn thread(id: &str, order: &str, text: &str) -> Thread {
        Thread::new(id)
            .with_order(order)
            .with_message(Message::new(SenderRole::Customer, text, ""))
    }

    #[test]
    fn summarizes_and_indexes_in_dataset_order() {
        let catalog = ThreadCatalog::new(
            vec![
                thread("T-2", "ORD-2", "where is my parcel"),
                thread("T-1", "ORD-1", "arrived broken"),
            ],
            &CrmIndex::default(),
        );
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[0].thread.thread_id, "T-2");
        assert_eq!(
            catalog.get("T-1").unwrap().ai_summary.intent,
            Intent::DamagedItem
        );
        assert!(catalog.get("T-3").is_none());
    }

    #[test]
    fn unsorted_messages_are_ordered_before_summarizing() {
        let thread = Thread::new("T-1")
            .with_message(Message::new(
                SenderRole::Customer,
                "where is my parcel",
                "2025-01-02T00:00:00Z",
            ))
            .with_message(Message::new(
                SenderRole::Customer,
                "arrived broken",
                "2025-01-01T00:00:00Z",
            ));
        let catalog = ThreadCatalog::new(vec![thread], &CrmIndex::default());
        let entry = catalog.get("T-1").unwrap();
        assert_eq!(entry.thread.messages[0].text, "arrived broken");
        assert_eq!(entry.ai_summary.intent, Intent::DamagedItem);
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let catalog = ThreadCatalog::new(
            vec![
                thread("T-1", "ORD-1", "arrived broken"),
                thread("T-1", "ORD-1", "where is it"),
            ],
            &CrmIndex::default(),
        );
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get("T-1").unwrap().ai_summary.intent,
            Intent::DamagedItem
        );
    }

    #[test]
    fn crm_join_enriches_context() {
        let crm = CrmIndex::from_records(vec![CrmRecord {
            customer_id: Some("C-1".into()),
            tier: Some("Platinum".into()),
            orders: vec!["ORD-1".into()],
            entitlements: vec![],
            shipping_constraints: vec![],
        }]);
        let catalog = ThreadCatalog::new(
            vec![thread("T-1", "ORD-1", "hi"), thread("T-2", "ORD-2", "hi")],
            &crm,
        );
        assert_eq!(
            catalog.get("T-1").unwrap().ai_summary.crm_context.customer_tier,
            "Platinum"
        );
        assert_eq!(
            catalog.get("T-2").unwrap().ai_summary.crm_context.customer_tier,
            "Standard"
        );
    }

    #[test]
    fn entry_serializes_flat_with_ai_summary() {
        let catalog = ThreadCatalog::new(vec![thread("T-1", "ORD-1", "hi")], &CrmIndex::default());
        let json = serde_json::to_value(&catalog.entries()[0]).unwrap();
        assert_eq!(json["thread_id"], "T-1");
        assert_eq!(json["ai_summary"]["intent"], "General inquiry");
    }
}
