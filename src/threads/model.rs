//! Thread data model: customer-service email threads as loaded from the dataset.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a message in a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    /// The customer.
    Customer,
    /// A company associate or system.
    Company,
    /// Any other sender value in the dataset.
    #[serde(other)]
    Unknown,
}

/// A single email in a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message ID from the dataset, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Sender role. Dataset files use `sender`.
    #[serde(alias = "sender")]
    pub sender_role: SenderRole,
    /// Message body. Dataset files use `body`.
    #[serde(alias = "body", default)]
    pub text: String,
    /// Raw timestamp string as provided.
    #[serde(default)]
    pub timestamp: String,
}

impl Message {
    pub fn new(sender_role: SenderRole, text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            id: None,
            sender_role,
            text: text.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Parsed timestamp, or `None` when the raw value is not a recognised format.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// A customer-service email exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub thread_id: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub initiated_by: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    /// Messages in chronological order once normalized.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Thread {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            topic: None,
            subject: None,
            initiated_by: None,
            order_id: None,
            product: None,
            messages: Vec::new(),
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_order(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Sort messages chronologically.
    ///
    /// Unparseable timestamps sort as the Unix epoch; the sort is stable so
    /// ties keep their dataset order.
    pub fn normalize(mut self) -> Self {
        self.messages
            .sort_by_key(|m| m.parsed_timestamp().unwrap_or(DateTime::<Utc>::UNIX_EPOCH));
        self
    }

    /// The earliest customer message.
    pub fn first_customer_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .find(|m| m.sender_role == SenderRole::Customer)
    }

    /// The latest company message.
    pub fn last_company_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.sender_role == SenderRole::Company)
    }
}

/// Parse an RFC 3339 or naive ISO-8601 timestamp into UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }
    None
}
