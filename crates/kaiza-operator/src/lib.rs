//! # kaiza-operator
//!
//! The Operator Trust Boundary (C14): identity binding, structured risk
//! acknowledgement, two-step confirmation, manipulative-language
//! sanitization, and approval fatigue guards for every human decision that
//! gates a high-risk operation (plan approval, kill-switch recovery,
//! remediation proposal approval).

mod confirmation;
mod fatigue;
mod identity;
mod ledger;
mod risk;
mod sanitizer;

pub use confirmation::{confirm, initiate_confirmation, token, PendingConfirmation};
pub use fatigue::FatigueTracker;
pub use identity::{OperatorBinding, OperatorIdentity};
pub use ledger::{build_decision_entry, DecisionOutcome, HUMAN_FACTOR_DECISION_TOOL};
pub use risk::{RiskAcknowledgement, RiskLevel};
pub use sanitizer::sanitize_approval_text;
