// remediation.rs — `generate_remediation_proposals`, `list_proposals`,
// `approve_proposal` (C11) with the operator trust boundary
// (C14) wrapped around the approval decision: identity bind,
// sanitized approval text, machine-generated risk acknowledgement, a
// two-step confirmation with a minimum wait, and the fatigue guards.

use chrono::Utc;
use kaiza_errors::KaizaError;
use kaiza_operator::{
    build_decision_entry, confirm, initiate_confirmation, sanitize_approval_text, token, DecisionOutcome,
    OperatorIdentity, RiskAcknowledgement, RiskLevel,
};
use kaiza_remediation::{Decision, ExactChange, ProposalRequest, ProposalType, RemediationProposal};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::boundary::{HandlerError, HandlerOutcome};
use crate::state::KernelState;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ProposalChangeInput {
    pub description: String,
    pub evidence_refs: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ProposalInput {
    /// One of PLAN_CORRECTION, POLICY_EXCEPTION_REQUEST, INTENT_CORRECTION,
    /// EXECUTION_RETRY, INVESTIGATION_REQUIRED.
    pub proposal_type: String,
    #[serde(default)]
    pub phase_id: Option<String>,
    pub violations_addressed: Vec<String>,
    pub exact_changes_requested: Vec<ProposalChangeInput>,
    /// Content hashes forming the evidence bundle.
    pub evidence_bundle: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GenerateProposalsParams {
    /// Hash of the plan these proposals remediate.
    pub plan_hash: String,
    pub proposals: Vec<ProposalInput>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApproveProposalParams {
    pub proposal_id: String,
    /// "APPROVE" or "REJECT".
    pub decision: String,
    #[serde(default)]
    pub reason: Option<String>,
    /// Free-text rationale; refused outright if it carries urgency or
    /// manipulation language.
    #[serde(default)]
    pub approval_text: Option<String>,
    pub operator_id: String,
    pub operator_role: String,
    #[serde(default)]
    pub authentication_context: Option<String>,
    /// Absent on the first call (which issues a token); present on the
    /// second call that lands the decision.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

fn parse_type(value: &str) -> Option<ProposalType> {
    match value {
        "PLAN_CORRECTION" => Some(ProposalType::PlanCorrection),
        "POLICY_EXCEPTION_REQUEST" => Some(ProposalType::PolicyExceptionRequest),
        "INTENT_CORRECTION" => Some(ProposalType::IntentCorrection),
        "EXECUTION_RETRY" => Some(ProposalType::ExecutionRetry),
        "INVESTIGATION_REQUIRED" => Some(ProposalType::InvestigationRequired),
        _ => None,
    }
}

pub fn generate_remediation_proposals(
    state: &mut KernelState,
    params: &GenerateProposalsParams,
) -> Result<HandlerOutcome, HandlerError> {
    // The referenced plan must exist, be approved, and be unmodified; a
    // proposal against a superseded plan is stale by definition.
    let plan = state
        .plans()?
        .load(&params.plan_hash)
        .map_err(|e| HandlerError::from(e).with_invariant("INV_PLAN_APPROVED"))?;

    let mut requests = Vec::with_capacity(params.proposals.len());
    for input in &params.proposals {
        let proposal_type = parse_type(&input.proposal_type).ok_or_else(|| {
            KaizaError::InvalidInputValue(format!("unknown proposal type: {}", input.proposal_type))
        })?;
        requests.push(ProposalRequest {
            proposal_type,
            plan_hash: params.plan_hash.clone(),
            phase_id: input.phase_id.clone(),
            violations_addressed: input.violations_addressed.clone(),
            exact_changes_requested: input
                .exact_changes_requested
                .iter()
                .map(|c| ExactChange {
                    description: c.description.clone(),
                    evidence_refs: c.evidence_refs.clone(),
                })
                .collect(),
            evidence_bundle: input.evidence_bundle.clone(),
        });
    }

    let created = state.proposals()?.generate(requests, &plan.hash)?;
    let ids: Vec<String> = created.iter().map(|p| p.proposal_id.to_string()).collect();
    Ok(HandlerOutcome::new(json!({
        "proposal_ids": ids,
        "count": created.len(),
    }))
    .with_plan(params.plan_hash.clone(), String::new())
    .with_notes(format!("{} proposal(s) written, all PENDING", created.len())))
}

pub fn list_proposals(state: &mut KernelState) -> Result<HandlerOutcome, HandlerError> {
    let summaries = state.proposals()?.list()?;
    let value = serde_json::to_value(&summaries)
        .map_err(|e| KaizaError::InternalError(format!("serializing proposal list: {e}")))?;
    Ok(HandlerOutcome::new(json!({
        "proposals": value,
        "count": summaries.len(),
    })))
}

/// The machine-generated consequences the operator must acknowledge, built
/// from the proposal itself rather than typed by a human.
fn risk_for(proposal: &RemediationProposal) -> RiskAcknowledgement {
    let risk_level = match proposal.proposal_type {
        ProposalType::PolicyExceptionRequest => RiskLevel::High,
        ProposalType::ExecutionRetry => RiskLevel::Medium,
        _ => RiskLevel::Medium,
    };
    RiskAcknowledgement {
        risk_level,
        blast_radius: proposal.violations_addressed.clone(),
        reversible: true,
        consequences: proposal
            .exact_changes_requested
            .iter()
            .map(|c| c.description.clone())
            .collect(),
    }
}

pub fn approve_proposal(state: &mut KernelState, params: &ApproveProposalParams) -> Result<HandlerOutcome, HandlerError> {
    let proposal_id = Uuid::parse_str(&params.proposal_id)
        .map_err(|e| KaizaError::InvalidInputValue(format!("proposal_id: {e}")))?;

    state.operator.bind(OperatorIdentity {
        operator_id: params.operator_id.clone(),
        operator_role: params.operator_role.clone(),
        authentication_context: params
            .authentication_context
            .clone()
            .unwrap_or_else(|| "unspecified".to_string()),
    })?;

    if let Some(text) = &params.approval_text {
        sanitize_approval_text(text)?;
    }

    let proposal = state.proposals()?.load(proposal_id)?;
    if proposal.status.is_decided() {
        return Err(KaizaError::InvariantViolation(format!(
            "proposal {proposal_id} is already {}",
            proposal.status.as_label()
        ))
        .into());
    }
    let ack = risk_for(&proposal);

    let Some(submitted) = &params.confirmation_token else {
        let pending = initiate_confirmation(&ack);
        let issued = token(&pending).to_string();
        state.pending_confirmations.insert(issued.clone(), pending);
        return Ok(HandlerOutcome::new(json!({
            "status": "CONFIRMATION_REQUIRED",
            "confirmation_token": issued,
            "consequences": ack.consequences,
            "risk_level": ack.risk_level.as_str(),
        }))
        .with_notes("approval confirmation issued; decision pending second step"));
    };

    let pending = state
        .pending_confirmations
        .get(submitted)
        .ok_or(KaizaError::ConfirmationMismatch)?;
    confirm(pending, submitted, &ack)?;
    state.pending_confirmations.remove(submitted);

    let now = Utc::now();
    state.fatigue.check(now)?;

    let decision = match params.decision.as_str() {
        "APPROVE" => Decision::Approve {
            approved_by: params.operator_id.clone(),
        },
        "REJECT" => Decision::Reject {
            rejected_by: params.operator_id.clone(),
            reason: params.reason.clone().unwrap_or_else(|| "no reason given".to_string()),
        },
        other => {
            return Err(KaizaError::InvalidInputValue(format!(
                "unknown decision '{other}', expected APPROVE or REJECT"
            ))
            .into())
        }
    };
    let outcome_kind = match &decision {
        Decision::Approve { .. } => DecisionOutcome::Approved,
        Decision::Reject { .. } => DecisionOutcome::Rejected,
    };

    let decided = state.proposals()?.decide(proposal_id, decision)?;
    state.fatigue.record(now);

    // Every operator decision lands a HUMAN_FACTOR_DECISION ledger entry
    // alongside the tool's own entry.
    let identity = state
        .operator
        .identity()
        .cloned()
        .ok_or_else(|| KaizaError::InternalError("operator identity vanished mid-decision".to_string()))?;
    let root = state.gate.resolver().root_path()?;
    let entry = build_decision_entry(
        state.gate.session_id(),
        root.display().to_string(),
        &identity,
        &ack,
        outcome_kind,
        format!("proposal {proposal_id}"),
    );
    state.audit()?.append(entry)?;

    Ok(HandlerOutcome::new(json!({
        "proposal_id": proposal_id.to_string(),
        "status": decided.status.as_label(),
    }))
    .with_notes(format!("proposal {} by {}", decided.status.as_label(), params.operator_id)))
}
