// state.rs — KernelState: the single mutable block every tool handler
// reaches through.
//
// Nothing here is cloned or copied out from under the kernel: the server
// wraps one `KernelState` in a `Mutex` and every `#[tool]` method locks it
// for the duration of one call.

use std::collections::HashMap;

use kaiza_audit::AuditLog;
use kaiza_killswitch::PendingRecovery;
use kaiza_operator::{FatigueTracker, OperatorBinding, PendingConfirmation};
use kaiza_plan::PlanRegistry;
use kaiza_remediation::ProposalStore;
use kaiza_session::SessionGate;

use crate::config::KaizaConfig;

/// Everything a tool call needs once a session has locked its workspace
/// root. `None` before `initialize` has run.
pub struct OpenedWorkspace {
    pub audit: AuditLog,
    pub plans: PlanRegistry,
    pub proposals: ProposalStore,
}

pub struct KernelState {
    pub config: KaizaConfig,
    pub gate: SessionGate,
    pub workspace: Option<OpenedWorkspace>,
    pub fatigue: FatigueTracker,
    pub operator: OperatorBinding,
    pub pending_recovery: Option<PendingRecovery>,
    /// Set by `confirm_recovery`; `unlock_kill_switch` refuses until then.
    pub recovery_confirmed: bool,
    /// Pending two-step confirmations (proposal approval), keyed by the
    /// token handed back from the initiating call.
    pub pending_confirmations: HashMap<String, PendingConfirmation>,
}

impl KernelState {
    pub fn new() -> Self {
        Self::with_config(KaizaConfig::default())
    }

    pub fn with_config(config: KaizaConfig) -> Self {
        Self {
            config,
            gate: SessionGate::new(),
            workspace: None,
            fatigue: FatigueTracker::new(),
            operator: OperatorBinding::new(),
            pending_recovery: None,
            recovery_confirmed: false,
            pending_confirmations: HashMap::new(),
        }
    }

    pub fn audit(&self) -> Result<&AuditLog, kaiza_errors::KaizaError> {
        self.workspace
            .as_ref()
            .map(|w| &w.audit)
            .ok_or(kaiza_errors::KaizaError::SessionNotInitialized)
    }

    pub fn plans(&self) -> Result<&PlanRegistry, kaiza_errors::KaizaError> {
        self.workspace
            .as_ref()
            .map(|w| &w.plans)
            .ok_or(kaiza_errors::KaizaError::SessionNotInitialized)
    }

    pub fn proposals(&self) -> Result<&ProposalStore, kaiza_errors::KaizaError> {
        self.workspace
            .as_ref()
            .map(|w| &w.proposals)
            .ok_or(kaiza_errors::KaizaError::SessionNotInitialized)
    }
}

impl Default for KernelState {
    fn default() -> Self {
        Self::new()
    }
}
