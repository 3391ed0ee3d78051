//! Next-step playbooks keyed by (intent, status).

use crate::pipeline::types::{Intent, Status};

/// One catalog entry. `None` on either side matches any label.
#[derive(Debug, Clone, Copy)]
pub struct PlaybookRule {
    pub intent: Option<Intent>,
    pub status: Option<Status>,
    pub steps: &'static [&'static str],
}

impl PlaybookRule {
    fn matches(&self, intent: Intent, status: Status) -> bool {
        self.intent.is_none_or(|i| i == intent) && self.status.is_none_or(|s| s == status)
    }
}

/// Steps for (intent, status) pairs no rule covers.
pub const DEFAULT_PLAYBOOK: &[&str] = &[
    "Clarify the customer's issue",
    "Propose resolution options",
    "Follow up within the SLA window",
];

/// Ordered catalog; first match wins.
pub const PLAYBOOK_CATALOG: &[PlaybookRule] = &[
    PlaybookRule {
        intent: None,
        status: Some(Status::Resolved),
        steps: &[
            "Confirm the resolution with the customer",
            "Close the thread and record the outcome in CRM",
        ],
    },
    PlaybookRule {
        intent: Some(Intent::DamagedItem),
        status: None,
        steps: &[
            "Request photos if not provided",
            "Offer refund or replacement",
        ],
    },
    PlaybookRule {
        intent: Some(Intent::WrongVariant),
        status: None,
        steps: &[
            "Offer a prepaid return label",
            "Ship the correct replacement variant",
        ],
    },
    PlaybookRule {
        intent: Some(Intent::DeliveryDelay),
        status: None,
        steps: &[
            "Provide the current tracking status",
            "Escalate to the carrier if stalled more than 48h",
        ],
    },
    PlaybookRule {
        intent: Some(Intent::ReturnRefund),
        status: Some(Status::InProgress),
        steps: &[
            "Check RMA progress",
            "Confirm the refund timeline (3-5 business days)",
        ],
    },
    PlaybookRule {
        intent: Some(Intent::ReturnRefund),
        status: None,
        steps: &[
            "Initiate an RMA",
            "Inform the customer of the refund timeline (3-5 business days)",
        ],
    },
    PlaybookRule {
        intent: Some(Intent::AddressConfirmation),
        status: None,
        steps: &[
            "Confirm the full shipping address",
            "Hold the shipment until the address is verified",
        ],
    },
];

/// Ordered next steps for the pair.
pub fn select_playbook(intent: Intent, status: Status) -> Vec<String> {
    PLAYBOOK_CATALOG
        .iter()
        .find(|rule| rule.matches(intent, status))
        .map(|rule| rule.steps)
        .unwrap_or(DEFAULT_PLAYBOOK)
        .iter()
        .map(|s| s.to_string())
        .collect()
}
