//! # kaiza-remediation
//!
//! Evidence-bound remediation proposals and their approval lifecycle (C11).
//! A proposal never mutates code, plans, or configuration by itself — it is
//! a durable record that a human later acts on through a separate,
//! authorized plan.

mod evidence;
mod proposal;
mod registry;

pub use evidence::{validate_evidence_binding, validate_plan_freshness};
pub use proposal::{ExactChange, ProposalStatus, ProposalSummary, ProposalType, RemediationProposal};
pub use registry::{proposals_dir_path, Decision, ProposalRequest, ProposalStore};
