// ledger.rs — `read_audit_log` and `verify_workspace_integrity` (C4).

use kaiza_errors::KaizaError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::boundary::{HandlerError, HandlerOutcome};
use crate::state::KernelState;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadAuditLogParams {
    /// Return only the last N entries; everything when absent.
    #[serde(default)]
    pub limit: Option<usize>,
}

pub fn read_audit_log(state: &mut KernelState, params: &ReadAuditLogParams) -> Result<HandlerOutcome, HandlerError> {
    let entries = state.audit()?.read_all()?;
    let total = entries.len();
    let selected: Vec<_> = match params.limit {
        Some(limit) => entries.into_iter().skip(total.saturating_sub(limit)).collect(),
        None => entries,
    };
    let value = serde_json::to_value(&selected)
        .map_err(|e| KaizaError::InternalError(format!("serializing audit entries: {e}")))?;
    Ok(HandlerOutcome::new(json!({
        "entries": value,
        "returned": selected.len(),
        "total": total,
    })))
}

/// Walk the ledger, re-lint every registered plan, and report the current
/// kill-switch state in one verdict. FAIL on any chain failure or any plan
/// that no longer passes its own registry validation.
pub fn verify_workspace_integrity(state: &mut KernelState) -> Result<HandlerOutcome, HandlerError> {
    let chain = state.audit()?.verify_chain()?;

    let registry = state.plans()?;
    let mut plan_failures = Vec::new();
    for hash in registry.list_hashes()? {
        if let Err(e) = registry.load(&hash) {
            plan_failures.push(json!({
                "plan_hash": hash,
                "error_code": e.code().as_str(),
                "detail": e.to_string(),
            }));
        }
    }

    let kill_switch = kaiza_killswitch::read_state(&state.gate.resolver().kill_switch_path()?)?;

    let verdict = if chain.valid && plan_failures.is_empty() { "PASS" } else { "FAIL" };
    let chain_value = serde_json::to_value(&chain)
        .map_err(|e| KaizaError::InternalError(format!("serializing verify report: {e}")))?;
    let value = json!({
        "verdict": verdict,
        "ledger": chain_value,
        "plan_failures": plan_failures,
        "kill_switch_engaged": kill_switch.engaged,
    });
    let result_hash = kaiza_audit::hash_json(&value);
    Ok(HandlerOutcome::new(value).with_result_hash(result_hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::session::{initialize, InitializeParams};
    use kaiza_audit::{AuditEntry, EntryResult};
    use tempfile::tempdir;
    use uuid::Uuid;

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

    fn append_entries(state: &KernelState, count: usize) {
        let audit = state.audit().unwrap();
        for i in 0..count {
            audit
                .append(AuditEntry::new(Uuid::nil(), "EXECUTION", "/w", format!("tool_{i}"), EntryResult::Ok))
                .unwrap();
        }
    }

    #[test]
    fn read_audit_log_honors_the_limit() {
        let dir = tempdir().unwrap();
        let mut state = ready_state(dir.path());
        append_entries(&state, 5);
        let outcome = read_audit_log(&mut state, &ReadAuditLogParams { limit: Some(2) }).unwrap();
        assert_eq!(outcome.value["returned"], 2);
        assert_eq!(outcome.value["total"], 5);
    }

    #[test]
    fn untouched_workspace_verifies_pass() {
        let dir = tempdir().unwrap();
        let mut state = ready_state(dir.path());
        append_entries(&state, 3);
        let outcome = verify_workspace_integrity(&mut state).unwrap();
        assert_eq!(outcome.value["verdict"], "PASS");
    }

    #[test]
    fn tampered_ledger_line_fails_the_verdict() {
        let dir = tempdir().unwrap();
        let mut state = ready_state(dir.path());
        append_entries(&state, 4);

        let log_path = dir.path().join(".kaiza/audit.log");
        let content = std::fs::read_to_string(&log_path).unwrap();
        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        lines[2] = lines[2].replacen("tool_2", "tool_X", 1);
        std::fs::write(&log_path, lines.join("\n") + "\n").unwrap();

        let outcome = verify_workspace_integrity(&mut state).unwrap();
        assert_eq!(outcome.value["verdict"], "FAIL");
        let failures = outcome.value["ledger"]["failures"].as_array().unwrap();
        assert!(failures.iter().any(|f| f["line"] == 3));
        assert!(failures.iter().any(|f| f["line"] == 4 && f["kind"] == "broken_chain"));
    }
}
