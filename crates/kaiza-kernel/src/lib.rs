//! # kaiza-kernel
//!
//! The assembled policy-and-audit kernel: wires the component crates
//! (path, session, plan, intent, policy, audit, kill-switch, replay,
//! remediation, attestation, maturity, operator) behind one fail-closed
//! tool boundary and exposes the closed tool surface over MCP.
//!
//! Every mutating operation flows Transport → session gate → path resolve
//! → plan authority → policy → intent → audit → write → audit; nothing
//! returns to the transport without a ledger entry.

pub mod boundary;
pub mod config;
#[cfg(debug_assertions)]
pub mod drill;
pub mod handlers;
pub mod server;
pub mod state;
pub mod tools;

pub use boundary::{dispatch, DispatchOutcome, HandlerError, HandlerOutcome};
pub use config::KaizaConfig;
pub use server::KernelServer;
pub use state::{KernelState, OpenedWorkspace};
