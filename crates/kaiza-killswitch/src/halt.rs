// halt.rs — the safe-halt routine: fsync, verify, report, audit (C9).

use std::fs;
use std::path::{Path, PathBuf};

use kaiza_audit::{AuditEntry, AuditLog, EntryResult, VerifyReport};
use kaiza_errors::KaizaError;
use uuid::Uuid;

use crate::failure::FailureId;
use crate::state::KillSwitchState;

pub struct HaltReport {
    pub path: PathBuf,
    pub markdown: String,
}

/// Run on kill-switch engagement: fsync the ledger, verify its chain,
/// write a HALT report under `docs/reports/`, and append an audit entry
/// describing the halt. The report write precedes the audit entry so a
/// reader recovering from disk always has the report even if the final
/// audit append fails.
pub fn run_safe_halt(
    log: &AuditLog,
    reports_dir: &Path,
    state: &KillSwitchState,
    session_id: Uuid,
    role: &str,
    workspace_root: &str,
    iso_timestamp: &str,
) -> Result<HaltReport, KaizaError> {
    log.fsync()?;
    let verify = log.verify_chain()?;

    let report_path = reports_dir.join(format!("HALT_REPORT_{iso_timestamp}.md"));
    let markdown = render_halt_report(state, &verify, iso_timestamp);
    fs::create_dir_all(reports_dir).map_err(|e| KaizaError::FileWriteFailed {
        path: reports_dir.display().to_string(),
        source: e,
    })?;
    fs::write(&report_path, &markdown).map_err(|e| KaizaError::FileWriteFailed {
        path: report_path.display().to_string(),
        source: e,
    })?;

    let entry = AuditEntry::new(session_id, role, workspace_root, "kill_switch_safe_halt", EntryResult::Error)
        .with_error("KILL_SWITCH_ENGAGED")
        .with_invariant("INV_FAIL_CLOSED")
        .with_notes(format!("halt report: {}", report_path.display()));
    log.append(entry)?;

    Ok(HaltReport {
        path: report_path,
        markdown,
    })
}

fn render_halt_report(state: &KillSwitchState, verify: &VerifyReport, iso_timestamp: &str) -> String {
    let failure_ids: Vec<&str> = state.triggers.iter().map(String::as_str).collect();
    let invariant_ids: Vec<&str> = failure_ids
        .iter()
        .map(|id| invariant_for_failure(id))
        .collect();

    format!(
        "# HALT Report {iso}\n\n\
## Failure IDs\n{failures}\n\n\
## Invariant IDs\n{invariants}\n\n\
## Root Cause\n{reason}\n\n\
## Ledger Verification\nstatus: {status}, entries: {entries}, failures: {fail_count}\n\n\
## Allowed Read-Only Operations\n- ledger read\n- plan list\n- verify\n- replay\n\n\
## Recovery Checklist\n1. Run `initiate_recovery_acknowledgement` with this report's path and all four acknowledgements.\n2. Run `confirm_recovery` with the returned code within the confirmation window.\n3. Re-run audit verify, plan lint on every registered plan, and maturity recompute.\n4. Run `unlock_kill_switch` once all three verifications are recorded as passed.\n",
        iso = iso_timestamp,
        failures = bullet_list(&failure_ids),
        invariants = bullet_list(&invariant_ids),
        reason = state.reason,
        status = verify.status,
        entries = verify.entries,
        fail_count = verify.failures.len(),
    )
}

fn bullet_list(items: &[&str]) -> String {
    if items.is_empty() {
        "- (none)".to_string()
    } else {
        items.iter().map(|i| format!("- {i}")).collect::<Vec<_>>().join("\n")
    }
}

fn invariant_for_failure(id: &str) -> &'static str {
    match id {
        "F-STARTUP" => "INV_FAIL_CLOSED",
        "F-POLICY" => "NO_PLACEHOLDERS_NO_FALLBACKS",
        "F-AUDIT" | "F-AUDIT-WRITE" => "INV_AUDIT_CHAIN",
        "F-DETERMINISM" => "DETERMINISM_REQUIRED",
        "F-AUTHORITY-ROLE" => "INV_REPO_ROOT_SINGLE",
        "F-AUTHORITY-PLAN" => "INV_PLAN_APPROVED",
        "F-INTENT" => "MANDATORY_INTENT",
        "F-PLAN-HASH" => "INV_PLAN_IMMUTABILITY",
        "F-SECURITY" => "INV_PATH_WITHIN_REPO",
        "F-HUMAN-ABUSE" => "INV_KILL_SWITCH_GATES_WRITES",
        _ => "INV_FAIL_CLOSED",
    }
}

impl FailureId {
    /// The failure id's name as it appears in a halt report (same as
    /// `as_str`; re-exported here so callers don't need two imports).
    pub fn report_label(&self) -> &'static str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn safe_halt_writes_report_and_audit_entry() {
        let dir = tempdir().unwrap();
        let log = AuditLog::open(dir.path().join(".kaiza/audit.log"), dir.path().join(".kaiza/audit.lock")).unwrap();
        let state = KillSwitchState::engaged_with(vec![FailureId::Audit.as_str().to_string()], "chain broken".to_string());

        let report = run_safe_halt(
            &log,
            &dir.path().join("docs/reports"),
            &state,
            Uuid::nil(),
            "EXECUTION",
            dir.path().to_str().unwrap(),
            "2026-01-01T00-00-00Z",
        )
        .unwrap();

        assert!(report.path.exists());
        assert!(report.markdown.contains("F-AUDIT"));
        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].tool, "kill_switch_safe_halt");
    }
}
