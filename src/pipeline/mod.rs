//! Rules-based summarization pipeline.
//!
//! Every thread flows through:
//! 1. `RulesEngine`: ordered keyword tables for intent, status, requested action
//! 2. `playbook::select_playbook`: next steps keyed by (intent, status)
//! 3. `Summarizer::summarize`: bullets, SLA, and CRM context
//!
//! **No model is involved.** Output is a pure function of the thread.

pub mod playbook;
pub mod rules;
pub mod summarizer;
pub mod types;

pub use rules::RulesEngine;
pub use summarizer::{Summarizer, summarize};
pub use types::{CrmContext, Intent, RequestedAction, Status, Summary};
