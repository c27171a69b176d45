// boundary.rs — the fail-closed tool boundary. Every tool
// handler in `handlers/` is invoked through `dispatch`, which is the single
// chokepoint that:
//
//   1. runs the session gate, kill-switch gate, and role check for the
//      named tool,
//   2. runs the handler against the locked `KernelState`,
//   3. appends exactly one audit entry recording the outcome (buffering it
//      if no session has been initialized yet),
//   4. on failure, coerces the `KaizaError` into an `ErrorEnvelope`
//      carrying whatever role/session/workspace/tool/invariant context is
//      available, and
//   5. if the audit append itself fails, replaces the envelope with
//      `AUDIT_APPEND_FAILED` and engages the kill switch — the original
//      cause survives only in the envelope's `cause` field when
//      `DEBUG_STACK=true`.
//
// No tool result — success or failure — ever reaches the transport without
// a matching ledger entry.

use kaiza_audit::{hash_json, redact, AuditEntry, EntryResult};
use kaiza_errors::{ErrorEnvelope, KaizaError};
use kaiza_killswitch::FailureId;
use kaiza_session::Role;
use serde_json::Value;

use crate::state::KernelState;
use crate::tools::{MUTATION_TOOLS, PLANNING_ONLY_TOOLS, RECOVERY_TOOLS};

/// What a handler hands back on success: the JSON payload returned to the
/// caller, plus whatever audit metadata it wants recorded alongside it.
#[derive(Debug)]
pub struct HandlerOutcome {
    pub value: Value,
    pub intent: Option<String>,
    pub plan_hash: Option<String>,
    pub phase_id: Option<String>,
    pub result_hash: Option<String>,
    pub notes: Option<String>,
}

impl HandlerOutcome {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            intent: None,
            plan_hash: None,
            phase_id: None,
            result_hash: None,
            notes: None,
        }
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn with_plan(mut self, plan_hash: impl Into<String>, phase_id: impl Into<String>) -> Self {
        self.plan_hash = Some(plan_hash.into());
        self.phase_id = Some(phase_id.into());
        self
    }

    pub fn with_result_hash(mut self, result_hash: impl Into<String>) -> Self {
        self.result_hash = Some(result_hash.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// What a handler hands back on failure: the underlying error plus whatever
/// authority context it was able to establish before failing. Converts
/// directly from `KaizaError` so `?` keeps working in handler bodies.
#[derive(Debug)]
pub struct HandlerError {
    pub error: KaizaError,
    pub invariant_id: Option<String>,
    pub plan_hash: Option<String>,
    pub phase_id: Option<String>,
}

impl From<KaizaError> for HandlerError {
    fn from(error: KaizaError) -> Self {
        Self {
            error,
            invariant_id: None,
            plan_hash: None,
            phase_id: None,
        }
    }
}

impl HandlerError {
    pub fn with_invariant(mut self, invariant_id: impl Into<String>) -> Self {
        self.invariant_id = Some(invariant_id.into());
        self
    }

    pub fn with_plan(mut self, plan_hash: impl Into<String>, phase_id: impl Into<String>) -> Self {
        self.plan_hash = Some(plan_hash.into());
        self.phase_id = Some(phase_id.into());
        self
    }
}

/// The envelope-or-value a dispatched tool call resolves to. `server.rs`
/// turns this into the MCP `CallToolResult`.
pub enum DispatchOutcome {
    Ok(Value),
    Err(ErrorEnvelope),
}

/// The pipeline steps that run before every handler: session gate
/// (C5), kill-switch gate (C9), and the role manifest. The recovery tools
/// are exempt from the kill-switch gate — they are the only mutating path
/// that must stay callable while the switch is engaged.
fn guard(state: &KernelState, tool_name: &str) -> Result<(), HandlerError> {
    if tool_name != "initialize" {
        state.gate.ensure_initialized()?;
    }
    if state.gate.is_initialized() && tool_name != "initialize" {
        let gated = crate::tools::is_mutating_tool(tool_name) && !RECOVERY_TOOLS.contains(&tool_name);
        let path = state.gate.resolver().kill_switch_path()?;
        kaiza_killswitch::check_gate(&path, gated)
            .map_err(|e| HandlerError::from(e).with_invariant("INV_KILL_SWITCH_GATES_WRITES"))?;

        if MUTATION_TOOLS.contains(&tool_name) {
            state.gate.require_role(Role::Execution)?;
        }
        if PLANNING_ONLY_TOOLS.contains(&tool_name) {
            state.gate.require_role(Role::Planning)?;
        }
    }
    Ok(())
}

/// Run `handler` against `state` for `tool_name`, appending the matching
/// audit entry and translating any failure into a deterministic envelope.
/// `args` is redacted before hashing, so `args_hash` never commits to a
/// secret value.
pub fn dispatch<F>(state: &mut KernelState, tool_name: &str, args: &Value, handler: F) -> DispatchOutcome
where
    F: FnOnce(&mut KernelState) -> Result<HandlerOutcome, HandlerError>,
{
    let session_id = state.gate.session_id();
    let args_hash = hash_json(&redact(args));

    let result = guard(state, tool_name).and_then(|()| handler(state));

    // Role and root are read after the handler so the `initialize` entry
    // itself carries the role and workspace it just bound.
    let role_str = state
        .gate
        .role()
        .map(|r| r.as_str().to_string())
        .unwrap_or_else(|| "UNINITIALIZED".to_string());
    let root_str = state
        .gate
        .resolver()
        .root_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    match result {
        Ok(outcome) => {
            let mut entry = AuditEntry::new(session_id, &role_str, &root_str, tool_name, EntryResult::Ok)
                .with_args_hash(args_hash);
            if let Some(intent) = &outcome.intent {
                entry = entry.with_intent(intent.clone());
            }
            if let (Some(plan_hash), Some(phase_id)) = (&outcome.plan_hash, &outcome.phase_id) {
                entry = entry.with_plan(plan_hash.clone(), phase_id.clone());
            }
            if let Some(result_hash) = &outcome.result_hash {
                entry = entry.with_result_hash(result_hash.clone());
            }
            if let Some(notes) = &outcome.notes {
                entry = entry.with_notes(notes.clone());
            }

            match record(state, entry) {
                Ok(()) => {
                    tracing::debug!(tool = tool_name, %session_id, "tool call ok");
                    DispatchOutcome::Ok(outcome.value)
                }
                Err(envelope) => DispatchOutcome::Err(
                    envelope
                        .with_role(role_str)
                        .with_session_id(session_id)
                        .with_workspace_root(root_str)
                        .with_tool_name(tool_name.to_string()),
                ),
            }
        }
        Err(handler_err) => {
            let code = handler_err.error.code();
            let mut entry = AuditEntry::new(session_id, &role_str, &root_str, tool_name, EntryResult::Error)
                .with_args_hash(args_hash)
                .with_error(code.as_str());
            if let Some(invariant_id) = &handler_err.invariant_id {
                entry = entry.with_invariant(invariant_id.clone());
            }
            if let (Some(plan_hash), Some(phase_id)) = (&handler_err.plan_hash, &handler_err.phase_id) {
                entry = entry.with_plan(plan_hash.clone(), phase_id.clone());
            }

            let mut envelope = handler_err
                .error
                .into_envelope()
                .with_role(role_str.clone())
                .with_session_id(session_id)
                .with_workspace_root(root_str.clone())
                .with_tool_name(tool_name.to_string());
            if let Some(invariant_id) = handler_err.invariant_id {
                envelope = envelope.with_invariant_id(invariant_id);
            }
            if let Some(plan_hash) = handler_err.plan_hash {
                envelope = envelope.with_plan_hash(plan_hash);
            }
            if let Some(phase_id) = handler_err.phase_id {
                envelope = envelope.with_phase_id(phase_id);
            }

            match record(state, entry) {
                Ok(()) => {
                    tracing::debug!(tool = tool_name, %session_id, error_code = %envelope.error_code.as_str(), "tool call failed");
                    DispatchOutcome::Err(envelope)
                }
                Err(shadow) => DispatchOutcome::Err(
                    shadow
                        .with_role(role_str)
                        .with_session_id(session_id)
                        .with_workspace_root(root_str)
                        .with_tool_name(tool_name.to_string()),
                ),
            }
        }
    }
}

/// Append (or buffer, pre-session) one audit entry. On append failure,
/// engages the kill switch — best-effort, since the workspace root may not
/// even be locked yet — and returns the `AUDIT_APPEND_FAILED` envelope that
/// shadows whatever outcome the handler actually produced.
fn record(state: &mut KernelState, entry: AuditEntry) -> Result<(), ErrorEnvelope> {
    match &state.workspace {
        Some(workspace) => match workspace.audit.append(entry) {
            Ok(_) => Ok(()),
            Err(append_err) => {
                let reason = append_err.to_string();
                if let Ok(path) = state.gate.resolver().kill_switch_path() {
                    let _ = kaiza_killswitch::engage(&path, FailureId::AuditWrite, reason.clone());
                }
                Err(KaizaError::AuditAppendFailed(reason).into_envelope())
            }
        },
        None => match state.gate.buffer_event(entry) {
            Ok(()) => Ok(()),
            Err(buffer_err) => Err(KaizaError::AuditAppendFailed(buffer_err.to_string()).into_envelope()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn args_hash_changes_when_a_secret_is_redacted() {
        let raw = json!({"path": "a.txt", "api_key": "super-secret"});
        let redacted_hash = hash_json(&redact(&raw));
        let raw_hash = hash_json(&raw);
        assert_ne!(redacted_hash, raw_hash);
    }

    #[test]
    fn non_initialize_tool_is_refused_before_session() {
        let mut state = KernelState::new();
        let outcome = dispatch(&mut state, "read_file", &json!({}), |_| {
            Ok(HandlerOutcome::new(json!({})))
        });
        match outcome {
            DispatchOutcome::Err(envelope) => {
                assert_eq!(envelope.error_code.as_str(), "SESSION_NOT_INITIALIZED");
            }
            DispatchOutcome::Ok(_) => panic!("pre-session call must be refused"),
        }
    }

    #[test]
    fn refused_pre_session_call_is_buffered_for_the_ledger() {
        let mut state = KernelState::new();
        let _ = dispatch(&mut state, "read_file", &json!({}), |_| {
            Ok(HandlerOutcome::new(json!({})))
        });
        // The refusal above is held in the pre-session buffer until
        // `initialize` flushes it; the gate test in kaiza-session covers
        // the flush ordering.
        assert!(!state.gate.is_initialized());
    }
}
