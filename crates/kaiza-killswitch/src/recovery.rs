// recovery.rs — two-step, OWNER-only recovery from an engaged kill switch
// (C9).

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use kaiza_errors::KaizaError;

use crate::state::{self, KillSwitchState};

const CONFIRMATION_WINDOW_SECS: i64 = 300;

#[derive(Debug, Clone)]
pub struct Acknowledgements {
    pub understood_reason: bool,
    pub understood_what_failed: bool,
    pub understood_forbidden_operations: bool,
    pub responsibility_acknowledged: bool,
}

impl Acknowledgements {
    pub fn all_true(&self) -> bool {
        self.understood_reason
            && self.understood_what_failed
            && self.understood_forbidden_operations
            && self.responsibility_acknowledged
    }
}

#[derive(Debug, Clone)]
pub struct PendingRecovery {
    code: String,
    halt_report_path: String,
    acks: Acknowledgements,
    issued_at: DateTime<Utc>,
}

impl PendingRecovery {
    /// The short confirmation code the OWNER must echo back in step 2.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn halt_report_path(&self) -> &str {
        &self.halt_report_path
    }
}

/// Step 1: OWNER states they understand the halt before being given a
/// confirmation code.
pub fn initiate_recovery_acknowledgement(
    halt_report_path: &str,
    acks: Acknowledgements,
) -> Result<PendingRecovery, KaizaError> {
    if !acks.all_true() {
        return Err(KaizaError::UnauthorizedAction(
            "all four recovery acknowledgements must be true".to_string(),
        ));
    }
    let code = confirmation_code(halt_report_path);
    Ok(PendingRecovery {
        code,
        halt_report_path: halt_report_path.to_string(),
        acks,
        issued_at: Utc::now(),
    })
}

fn confirmation_code(halt_report_path: &str) -> String {
    let digest = kaiza_audit::hash_str(&format!("{halt_report_path}:{}", Utc::now().timestamp_subsec_nanos()));
    digest[..8].to_string()
}

/// Step 2: OWNER re-states the four acknowledgements and supplies the
/// code from step 1, within the confirmation window.
pub fn confirm_recovery(
    pending: &PendingRecovery,
    code: &str,
    acks: &Acknowledgements,
) -> Result<(), KaizaError> {
    if Utc::now() - pending.issued_at > Duration::seconds(CONFIRMATION_WINDOW_SECS) {
        return Err(KaizaError::ConfirmationWindowExpired);
    }
    if code != pending.code {
        return Err(KaizaError::ConfirmationMismatch);
    }
    if acks.understood_reason != pending.acks.understood_reason
        || acks.understood_what_failed != pending.acks.understood_what_failed
        || acks.understood_forbidden_operations != pending.acks.understood_forbidden_operations
        || acks.responsibility_acknowledged != pending.acks.responsibility_acknowledged
        || !acks.all_true()
    {
        return Err(KaizaError::ConfirmationMismatch);
    }
    Ok(())
}

/// The three verifications that must each pass before `unlock_kill_switch`
/// succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryVerifications {
    pub audit_verify_passed: bool,
    pub plan_lint_passed: bool,
    pub maturity_recomputed: bool,
}

impl RecoveryVerifications {
    pub fn all_passed(&self) -> bool {
        self.audit_verify_passed && self.plan_lint_passed && self.maturity_recomputed
    }
}

/// Step 3: clear the kill switch once all three verifications are recorded
/// as passed. `pending`/`confirmed_code` must correspond to a completed
/// `confirm_recovery` call.
pub fn unlock_kill_switch(
    kill_switch_path: &Path,
    pending: &PendingRecovery,
    verifications: RecoveryVerifications,
) -> Result<KillSwitchState, KaizaError> {
    let _ = pending.halt_report_path();
    if !verifications.all_passed() {
        return Err(KaizaError::InvariantViolation(
            "kill switch recovery requires audit verify, plan lint, and maturity recompute to all pass".to_string(),
        ));
    }
    let cleared = KillSwitchState::clear();
    state::write_state(kill_switch_path, &cleared)?;
    Ok(cleared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn full_acks() -> Acknowledgements {
        Acknowledgements {
            understood_reason: true,
            understood_what_failed: true,
            understood_forbidden_operations: true,
            responsibility_acknowledged: true,
        }
    }

    #[test]
    fn initiate_rejects_incomplete_acknowledgement() {
        let mut acks = full_acks();
        acks.responsibility_acknowledged = false;
        let err = initiate_recovery_acknowledgement("docs/reports/HALT_REPORT_x.md", acks).unwrap_err();
        assert_eq!(err.code().as_str(), "UNAUTHORIZED_ACTION");
    }

    #[test]
    fn full_recovery_round_trip_clears_the_switch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kill_switch.json");
        state::engage(&path, crate::failure::FailureId::Audit, "chain broken").unwrap();

        let pending = initiate_recovery_acknowledgement("docs/reports/HALT_REPORT_x.md", full_acks()).unwrap();
        confirm_recovery(&pending, &pending.code.clone(), &full_acks()).unwrap();

        let verifications = RecoveryVerifications {
            audit_verify_passed: true,
            plan_lint_passed: true,
            maturity_recomputed: true,
        };
        let cleared = unlock_kill_switch(&path, &pending, verifications).unwrap();
        assert!(!cleared.engaged);
    }

    #[test]
    fn wrong_code_is_a_mismatch() {
        let pending = initiate_recovery_acknowledgement("docs/reports/HALT_REPORT_x.md", full_acks()).unwrap();
        let err = confirm_recovery(&pending, "wrongcod", &full_acks()).unwrap_err();
        assert_eq!(err.code().as_str(), "CONFIRMATION_MISMATCH");
    }

    #[test]
    fn unlock_refuses_when_a_verification_is_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kill_switch.json");
        state::engage(&path, crate::failure::FailureId::Audit, "chain broken").unwrap();
        let pending = initiate_recovery_acknowledgement("docs/reports/HALT_REPORT_x.md", full_acks()).unwrap();
        confirm_recovery(&pending, &pending.code.clone(), &full_acks()).unwrap();

        let verifications = RecoveryVerifications {
            audit_verify_passed: true,
            plan_lint_passed: false,
            maturity_recomputed: true,
        };
        let err = unlock_kill_switch(&path, &pending, verifications).unwrap_err();
        assert_eq!(err.code().as_str(), "INVARIANT_VIOLATION");
    }
}
