//! Shared types for the summarization pipeline.

use serde::{Deserialize, Serialize};

// ── Labels ──────────────────────────────────────────────────────────

/// Classified purpose of a customer's inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    #[serde(rename = "Damaged/Defective item")]
    DamagedItem,
    #[serde(rename = "Delivery delay / tracking")]
    DeliveryDelay,
    #[serde(rename = "Wrong variant received")]
    WrongVariant,
    #[serde(rename = "Return/Refund request")]
    ReturnRefund,
    #[serde(rename = "Address confirmation")]
    AddressConfirmation,
    #[serde(rename = "General inquiry")]
    General,
}

impl Intent {
    /// Human-readable label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DamagedItem => "Damaged/Defective item",
            Self::DeliveryDelay => "Delivery delay / tracking",
            Self::WrongVariant => "Wrong variant received",
            Self::ReturnRefund => "Return/Refund request",
            Self::AddressConfirmation => "Address confirmation",
            Self::General => "General inquiry",
        }
    }

    /// Intents usually handled without escalation.
    pub fn is_self_serve(&self) -> bool {
        matches!(self, Self::DeliveryDelay | Self::AddressConfirmation)
    }
}

impl Default for Intent {
    fn default() -> Self {
        Self::General
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolution state of a thread, inferred from the company side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Resolved/Approved")]
    Resolved,
    #[serde(rename = "Pending - Awaiting customer/company action")]
    Pending,
    #[serde(rename = "In progress")]
    InProgress,
    #[serde(rename = "Open")]
    Open,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Resolved => "Resolved/Approved",
            Self::Pending => "Pending - Awaiting customer/company action",
            Self::InProgress => "In progress",
            Self::Open => "Open",
        }
    }

    /// Whether this label counts toward the resolved rate.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Open
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What the customer explicitly asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestedAction {
    Refund,
    Replacement,
    Return,
    #[serde(rename = "Confirm address")]
    ConfirmAddress,
}

impl RequestedAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Refund => "Refund",
            Self::Replacement => "Replacement",
            Self::Return => "Return",
            Self::ConfirmAddress => "Confirm address",
        }
    }
}

impl std::fmt::Display for RequestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── CRM context ─────────────────────────────────────────────────────

/// Tier assigned to every customer absent a CRM record.
pub const DEFAULT_CUSTOMER_TIER: &str = "Standard";

/// Mocked CRM context attached to each summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmContext {
    pub customer_tier: String,
    pub sla_hours: u32,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub entitlements: Vec<String>,
    #[serde(default)]
    pub shipping_constraints: Vec<String>,
}

impl CrmContext {
    /// Base context before any CRM join.
    pub fn standard(sla_hours: u32) -> Self {
        Self {
            customer_tier: DEFAULT_CUSTOMER_TIER.to_string(),
            sla_hours,
            customer_id: None,
            entitlements: Vec::new(),
            shipping_constraints: Vec::new(),
        }
    }
}

// ── Summary ─────────────────────────────────────────────────────────

/// Rules-based draft summary of a thread.
///
/// Pure function of the thread content: identical threads produce
/// byte-identical summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub order_id: Option<String>,
    pub product: Option<String>,
    pub intent: Intent,
    pub requested_action: Option<RequestedAction>,
    pub status: Status,
    /// Order-number-shaped tokens found in the thread text.
    #[serde(default)]
    pub references: Vec<String>,
    /// Ordered next steps for the associate.
    #[serde(alias = "next_steps")]
    pub playbook: Vec<String>,
    pub crm_context: CrmContext,
    pub summary_markdown: String,
}
