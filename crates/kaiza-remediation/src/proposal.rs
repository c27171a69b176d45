// proposal.rs — the Remediation Proposal entity (C11).
//
// A proposal never mutates code, plans, or configuration on its own; it is
// a request that a human later acts on through a separate authorized plan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalType {
    PlanCorrection,
    PolicyExceptionRequest,
    IntentCorrection,
    ExecutionRetry,
    InvestigationRequired,
}

impl ProposalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlanCorrection => "PLAN_CORRECTION",
            Self::PolicyExceptionRequest => "POLICY_EXCEPTION_REQUEST",
            Self::IntentCorrection => "INTENT_CORRECTION",
            Self::ExecutionRetry => "EXECUTION_RETRY",
            Self::InvestigationRequired => "INVESTIGATION_REQUIRED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum ProposalStatus {
    Pending,
    Approved {
        approved_by: String,
        decided_at: DateTime<Utc>,
    },
    Rejected {
        rejected_by: String,
        reason: String,
        decided_at: DateTime<Utc>,
    },
}

impl ProposalStatus {
    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved { .. } => "APPROVED",
            Self::Rejected { .. } => "REJECTED",
        }
    }
}

/// One requested change, citing the evidence that justifies it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExactChange {
    pub description: String,
    pub evidence_refs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationProposal {
    pub proposal_id: Uuid,
    pub proposal_type: ProposalType,
    pub plan_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_id: Option<String>,
    pub violations_addressed: Vec<String>,
    pub exact_changes_requested: Vec<ExactChange>,
    /// Content hashes forming the evidence bundle this proposal is bound to.
    pub evidence_bundle: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub status: ProposalStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalSummary {
    pub proposal_id: Uuid,
    pub proposal_type: String,
    pub plan_hash: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&RemediationProposal> for ProposalSummary {
    fn from(p: &RemediationProposal) -> Self {
        Self {
            proposal_id: p.proposal_id,
            proposal_type: p.proposal_type.as_str().to_string(),
            plan_hash: p.plan_hash.clone(),
            status: p.status.as_label().to_string(),
            created_at: p.created_at,
        }
    }
}
