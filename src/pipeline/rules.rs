//! Keyword rules engine for intent, status, and requested-action labels.
//!
//! Each table is an ordered list of (matcher, label) pairs evaluated in
//! priority order; the first match wins. Matching is case-insensitive and
//! anchored at a word start, so "late" matches "lately" but not "relate".

use regex::Regex;
use tracing::debug;

use crate::pipeline::types::{Intent, RequestedAction, Status};

/// How a rule decides whether text matches.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Any keyword in the alternation matches.
    AnyOf(Regex),
    /// Every group must match somewhere in the text.
    AllOf(Vec<Regex>),
}

impl Matcher {
    /// Match when any of `keywords` appears.
    pub fn any_of(keywords: &[&str]) -> Self {
        Self::AnyOf(keyword_regex(keywords))
    }

    /// Match when each group contributes at least one keyword.
    pub fn all_of(groups: &[&[&str]]) -> Self {
        Self::AllOf(groups.iter().map(|g| keyword_regex(g)).collect())
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::AnyOf(regex) => regex.is_match(text),
            Self::AllOf(regexes) => regexes.iter().all(|r| r.is_match(text)),
        }
    }
}

/// Build `(?i)\b(?:kw1|kw2|...)` from literal keywords.
///
/// An ASCII apostrophe in a keyword also matches the typographic `’`.
fn keyword_regex(keywords: &[&str]) -> Regex {
    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k).replace('\'', "['\u{2019}]"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})"))
        .expect("escaped keyword alternation is a valid regex")
}

/// A single labelled rule.
#[derive(Debug, Clone)]
pub struct KeywordRule<L> {
    /// Human-readable description of what the rule looks for.
    pub pattern: String,
    pub matcher: Matcher,
    pub label: L,
}

/// Ordered first-match-wins rule table.
#[derive(Debug, Clone)]
pub struct RuleTable<L> {
    name: &'static str,
    rules: Vec<KeywordRule<L>>,
}

impl<L: Copy + std::fmt::Debug> RuleTable<L> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rules: Vec::new(),
        }
    }

    /// Append a keyword rule at the lowest priority.
    pub fn with_keywords(mut self, label: L, keywords: &[&str]) -> Self {
        self.rules.push(KeywordRule {
            pattern: keywords.join(" | "),
            matcher: Matcher::any_of(keywords),
            label,
        });
        self
    }

    /// Append a conjunctive rule at the lowest priority.
    pub fn with_all_of(mut self, label: L, groups: &[&[&str]]) -> Self {
        self.rules.push(KeywordRule {
            pattern: groups
                .iter()
                .map(|g| format!("({})", g.join(" | ")))
                .collect::<Vec<_>>()
                .join(" & "),
            matcher: Matcher::all_of(groups),
            label,
        });
        self
    }

    /// Label of the highest-priority matching rule.
    pub fn first_match(&self, text: &str) -> Option<L> {
        let rule = self.rules.iter().find(|r| r.matcher.is_match(text))?;
        debug!(
            table = self.name,
            rule = %rule.pattern,
            label = ?rule.label,
            "Text matched rule"
        );
        Some(rule.label)
    }

    /// Labels in priority order.
    pub fn labels(&self) -> Vec<L> {
        self.rules.iter().map(|r| r.label).collect()
    }
}

/// Label tables used by the summarizer.
#[derive(Debug, Clone)]
pub struct RulesEngine {
    pub intent: RuleTable<Intent>,
    pub status: RuleTable<Status>,
    pub action: RuleTable<RequestedAction>,
}

impl RulesEngine {
    /// The production keyword tables.
    pub fn default_rules() -> Self {
        let intent = RuleTable::new("intent")
            .with_keywords(Intent::DamagedItem, &["damaged", "broken", "defective"])
            .with_keywords(
                Intent::DeliveryDelay,
                &[
                    "late",
                    "delayed",
                    "where is",
                    "tracking",
                    "haven't received",
                    "not received",
                ],
            )
            .with_keywords(Intent::WrongVariant, &["wrong", "color", "size", "variant"])
            .with_keywords(Intent::ReturnRefund, &["return", "refund"])
            .with_keywords(Intent::AddressConfirmation, &["address", "confirm address"]);

        let status = RuleTable::new("status")
            .with_keywords(Status::Resolved, &["resolved", "approved", "approve"])
            .with_keywords(Status::Pending, &["pending", "awaiting", "need", "confirm"])
            .with_keywords(
                Status::InProgress,
                &["reroute", "replacement", "refund", "return"],
            );

        let action = RuleTable::new("requested_action")
            .with_keywords(RequestedAction::Refund, &["refund"])
            .with_keywords(RequestedAction::Replacement, &["replace", "replacement"])
            .with_keywords(RequestedAction::Return, &["return"])
            .with_all_of(
                RequestedAction::ConfirmAddress,
                &[&["address"], &["confirm", "confirmation"]],
            );

        Self {
            intent,
            status,
            action,
        }
    }

    /// Intent for `text`, or `General inquiry` when nothing matches.
    pub fn infer_intent(&self, text: &str) -> Intent {
        self.intent.first_match(text).unwrap_or_default()
    }

    /// Status for `text`, or `Open` when nothing matches.
    pub fn infer_status(&self, text: &str) -> Status {
        self.status.first_match(text).unwrap_or_default()
    }

    pub fn infer_requested_action(&self, text: &str) -> Option<RequestedAction> {
        self.action.first_match(text)
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::default_rules()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_each_intent() {
        let engine = RulesEngine::default_rules();
        assert_eq!(engine.infer_intent("Item arrived damaged"), Intent::DamagedItem);
        assert_eq!(
            engine.infer_intent("Shipment is delayed; where is tracking"),
            Intent::DeliveryDelay
        );
        assert_eq!(engine.infer_intent("Wrong color/size variant"), Intent::WrongVariant);
        assert_eq!(engine.infer_intent("I want a refund"), Intent::ReturnRefund);
        assert_eq!(engine.infer_intent("Please confirm address"), Intent::AddressConfirmation);
        assert_eq!(engine.infer_intent("Do you sell gift cards?"), Intent::General);
    }

    #[test]
    fn intent_matching_is_case_insensitive() {
        let engine = RulesEngine::default_rules();
        assert_eq!(engine.infer_intent("WHERE IS MY PARCEL"), Intent::DeliveryDelay);
        assert_eq!(engine.infer_intent("Broken Lid"), Intent::DamagedItem);
    }

    #[test]
    fn keywords_anchor_at_word_start() {
        let engine = RulesEngine::default_rules();
        // "relate" must not trigger the "late" keyword.
        assert_eq!(engine.infer_intent("How does this relate to my plan?"), Intent::General);
        assert_eq!(engine.infer_intent("It has been late lately"), Intent::DeliveryDelay);
    }

    #[test]
    fn intent_priority_first_match_wins() {
        let engine = RulesEngine::default_rules();
        // Damaged outranks refund even when both appear.
        assert_eq!(
            engine.infer_intent("Arrived damaged please refund"),
            Intent::DamagedItem
        );
        // Delivery outranks wrong-variant.
        assert_eq!(
            engine.infer_intent("Tracking shows the wrong city"),
            Intent::DeliveryDelay
        );
        assert_eq!(
            engine.intent.labels(),
            vec![
                Intent::DamagedItem,
                Intent::DeliveryDelay,
                Intent::WrongVariant,
                Intent::ReturnRefund,
                Intent::AddressConfirmation,
            ]
        );
    }

    #[test]
    fn infers_each_status() {
        let engine = RulesEngine::default_rules();
        assert_eq!(engine.infer_status("case resolved and approved"), Status::Resolved);
        assert_eq!(
            engine.infer_status("pending confirmation from customer"),
            Status::Pending
        );
        assert_eq!(engine.infer_status("processing replacement"), Status::InProgress);
        assert_eq!(engine.infer_status("no updates"), Status::Open);
        assert_eq!(engine.infer_status(""), Status::Open);
    }

    #[test]
    fn status_priority_resolved_over_pending() {
        let engine = RulesEngine::default_rules();
        assert_eq!(
            engine.infer_status("Refund approved, no further action needed"),
            Status::Resolved
        );
        assert_eq!(
            engine.infer_status("We need your photos before the replacement"),
            Status::Pending
        );
    }

    #[test]
    fn infers_requested_action() {
        let engine = RulesEngine::default_rules();
        assert_eq!(
            engine.infer_requested_action("please refund or replace"),
            Some(RequestedAction::Refund)
        );
        assert_eq!(
            engine.infer_requested_action("I'd like a replacement"),
            Some(RequestedAction::Replacement)
        );
        assert_eq!(
            engine.infer_requested_action("How do I return this?"),
            Some(RequestedAction::Return)
        );
        assert_eq!(
            engine.infer_requested_action("Can you confirm the address on file?"),
            Some(RequestedAction::ConfirmAddress)
        );
        assert_eq!(engine.infer_requested_action("My address changed"), None);
        assert_eq!(engine.infer_requested_action("hello"), None);
    }

    #[test]
    fn typographic_apostrophe_matches_keyword() {
        let engine = RulesEngine::default_rules();
        assert_eq!(
            engine.infer_intent("I haven\u{2019}t received my order"),
            Intent::DeliveryDelay
        );
        assert_eq!(engine.infer_intent("I haven't received it"), Intent::DeliveryDelay);
    }

    #[test]
    fn keywords_with_regex_metacharacters_are_literal() {
        let table = RuleTable::new("test").with_keywords(Status::Pending, &["a.b"]);
        assert_eq!(table.first_match("a.b"), Some(Status::Pending));
        assert_eq!(table.first_match("axb"), None);
    }
}
