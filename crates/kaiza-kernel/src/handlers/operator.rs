// operator.rs — `inspect_operator_actions` and
// `inspect_high_risk_approvals` (C14): read-only views over the
// HUMAN_FACTOR_DECISION entries in the ledger.

use kaiza_operator::HUMAN_FACTOR_DECISION_TOOL;
use serde_json::{json, Value};

use crate::boundary::{HandlerError, HandlerOutcome};
use crate::state::KernelState;

fn decision_entries(state: &KernelState) -> Result<Vec<Value>, kaiza_errors::KaizaError> {
    let entries = state.audit()?.read_all()?;
    Ok(entries
        .iter()
        .filter(|e| e.tool == HUMAN_FACTOR_DECISION_TOOL)
        .map(|e| {
            let detail: Value = e
                .notes
                .as_deref()
                .and_then(|n| serde_json::from_str(n).ok())
                .unwrap_or(Value::Null);
            json!({
                "seq": e.seq,
                "ts": e.ts.to_rfc3339(),
                "session_id": e.session_id,
                "decision": detail,
            })
        })
        .collect())
}

pub fn inspect_operator_actions(state: &mut KernelState) -> Result<HandlerOutcome, HandlerError> {
    let decisions = decision_entries(state)?;
    Ok(HandlerOutcome::new(json!({
        "decisions": decisions,
        "count": decisions.len(),
    })))
}

pub fn inspect_high_risk_approvals(state: &mut KernelState) -> Result<HandlerOutcome, HandlerError> {
    let decisions: Vec<Value> = decision_entries(state)?
        .into_iter()
        .filter(|d| {
            matches!(
                d["decision"]["risk_level"].as_str(),
                Some("HIGH") | Some("IRREVERSIBLE")
            )
        })
        .collect();
    Ok(HandlerOutcome::new(json!({
        "decisions": decisions,
        "count": decisions.len(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::session::{initialize, InitializeParams};
    use kaiza_operator::{build_decision_entry, DecisionOutcome, OperatorIdentity, RiskAcknowledgement, RiskLevel};
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

    fn record_decision(state: &KernelState, risk_level: RiskLevel) {
        let operator = OperatorIdentity {
            operator_id: "alice".to_string(),
            operator_role: "OWNER".to_string(),
            authentication_context: "test".to_string(),
        };
        let ack = RiskAcknowledgement {
            risk_level,
            blast_radius: vec!["docs/plans".to_string()],
            reversible: true,
            consequences: vec!["approves one proposal".to_string()],
        };
        let entry = build_decision_entry(
            state.gate.session_id(),
            "/w",
            &operator,
            &ack,
            DecisionOutcome::Approved,
            "test decision",
        );
        state.audit().unwrap().append(entry).unwrap();
    }

    #[test]
    fn operator_actions_surface_every_decision() {
        let dir = tempdir().unwrap();
        let mut state = ready_state(dir.path());
        record_decision(&state, RiskLevel::Medium);
        record_decision(&state, RiskLevel::High);

        let outcome = inspect_operator_actions(&mut state).unwrap();
        assert_eq!(outcome.value["count"], 2);
    }

    #[test]
    fn high_risk_view_filters_to_high_and_irreversible() {
        let dir = tempdir().unwrap();
        let mut state = ready_state(dir.path());
        record_decision(&state, RiskLevel::Low);
        record_decision(&state, RiskLevel::High);
        record_decision(&state, RiskLevel::Irreversible);

        let outcome = inspect_high_risk_approvals(&mut state).unwrap();
        assert_eq!(outcome.value["count"], 2);
    }
}
