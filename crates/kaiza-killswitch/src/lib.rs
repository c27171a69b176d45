//! # kaiza-killswitch
//!
//! Kill-switch engagement, the safe-halt routine, and two-step OWNER-only
//! recovery (C9). The switch gates mutating tools the moment a critical
//! invariant breaks; read-only tools stay available throughout.

mod failure;
mod halt;
mod recovery;
mod state;

pub use failure::{FailureId, Severity};
pub use halt::{run_safe_halt, HaltReport};
pub use recovery::{
    confirm_recovery, initiate_recovery_acknowledgement, unlock_kill_switch, Acknowledgements,
    PendingRecovery, RecoveryVerifications,
};
pub use state::{check_gate, engage, read_state, write_state, KillSwitchState};
