// ledger.rs — builds the `HUMAN_FACTOR_DECISION` audit entry every operator
// decision must append (C14).

use kaiza_audit::{AuditEntry, EntryResult};
use serde_json::json;
use uuid::Uuid;

use crate::identity::OperatorIdentity;
use crate::risk::RiskAcknowledgement;

pub const HUMAN_FACTOR_DECISION_TOOL: &str = "HUMAN_FACTOR_DECISION";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    Approved,
    Rejected,
}

impl DecisionOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            DecisionOutcome::Approved => "approved",
            DecisionOutcome::Rejected => "rejected",
        }
    }
}

/// Builds (but does not append) the ledger entry for one operator decision.
/// Appending is the caller's responsibility, since only the caller holds
/// the open `AuditLog`.
pub fn build_decision_entry(
    session_id: Uuid,
    workspace_root: impl Into<String>,
    operator: &OperatorIdentity,
    ack: &RiskAcknowledgement,
    outcome: DecisionOutcome,
    subject: impl Into<String>,
) -> AuditEntry {
    let notes = json!({
        "operator_id": operator.operator_id,
        "operator_role": operator.operator_role,
        "outcome": outcome.as_str(),
        "risk_level": ack.risk_level.as_str(),
        "reversible": ack.reversible,
        "blast_radius": ack.blast_radius,
        "subject": subject.into(),
    })
    .to_string();

    AuditEntry::new(session_id, operator.operator_role.clone(), workspace_root, HUMAN_FACTOR_DECISION_TOOL, EntryResult::Ok)
        .with_notes(notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;

    #[test]
    fn builds_an_entry_tagged_with_the_human_factor_tool_name() {
        let operator = OperatorIdentity {
            operator_id: "alice".to_string(),
            operator_role: "OWNER".to_string(),
            authentication_context: "local-cli".to_string(),
        };
        let ack = RiskAcknowledgement {
            risk_level: RiskLevel::High,
            blast_radius: vec!["workspace:/tmp/demo".to_string()],
            reversible: false,
            consequences: vec!["deletes a file".to_string()],
        };
        let entry = build_decision_entry(
            Uuid::nil(),
            "/tmp/demo",
            &operator,
            &ack,
            DecisionOutcome::Approved,
            "plan approval for phase PHASE_ONE",
        );
        assert_eq!(entry.tool, HUMAN_FACTOR_DECISION_TOOL);
        assert!(entry.notes.unwrap().contains("\"outcome\":\"approved\""));
    }
}
