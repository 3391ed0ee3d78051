//! Mock CRM records joined onto summaries by order ID.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::pipeline::types::CrmContext;

/// A customer row from `crm.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmRecord {
    pub customer_id: Option<String>,
    pub tier: Option<String>,
    #[serde(default)]
    pub orders: Vec<String>,
    #[serde(default)]
    pub entitlements: Vec<String>,
    #[serde(default)]
    pub shipping_constraints: Vec<String>,
}

/// On-disk layout of `crm.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrmFile {
    #[serde(default)]
    pub customers: Vec<CrmRecord>,
}

/// Order ID → customer lookup.
#[derive(Debug, Clone, Default)]
pub struct CrmIndex {
    by_order: HashMap<String, CrmRecord>,
}

impl CrmIndex {
    /// Index customers by each of their orders. Later rows win on duplicate orders.
    pub fn from_records(records: Vec<CrmRecord>) -> Self {
        let mut by_order = HashMap::new();
        for record in records {
            for order in &record.orders {
                by_order.insert(order.clone(), record.clone());
            }
        }
        Self { by_order }
    }

    pub fn lookup(&self, order_id: &str) -> Option<&CrmRecord> {
        self.by_order.get(order_id)
    }

    /// Number of indexed orders.
    pub fn len(&self) -> usize {
        self.by_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_order.is_empty()
    }

    /// Overlay the CRM row for `order_id` onto `ctx`. Returns whether a row matched.
    pub fn enrich(&self, order_id: Option<&str>, ctx: &mut CrmContext) -> bool {
        let Some(record) = order_id.and_then(|id| self.lookup(id)) else {
            return false;
        };
        if let Some(tier) = &record.tier {
            ctx.customer_tier = tier.clone();
        }
        ctx.customer_id = record.customer_id.clone();
        ctx.entitlements = record.entitlements.clone();
        ctx.shipping_constraints = record.shipping_constraints.clone();
        true
    }
}
