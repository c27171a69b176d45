//! # kaiza-session
//!
//! The session/identity gate (C5): binds role and workspace root, refuses
//! every tool but `initialize` until that binding exists, and runs the
//! fixed startup self-audit before any tool is accepted at all.

mod gate;
mod role;
mod self_audit;

pub use gate::SessionGate;
pub use role::Role;
pub use self_audit::{report_to_error, run_self_audit, SelfAuditCheck, SelfAuditInput, SelfAuditReport};
