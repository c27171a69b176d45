// registry.rs — proposal persistence (C11): one
// `PROPOSAL_<id>.md` document per proposal under `docs/proposals/`, an
// append-only JSONL index at `.kaiza/proposals-index.jsonl` (the latest
// line for a proposal id wins), and an append-only decision record at
// `.kaiza/proposal-approvals.jsonl`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use kaiza_errors::KaizaError;
use serde::Serialize;
use uuid::Uuid;

use crate::evidence::{validate_evidence_binding, validate_plan_freshness};
use crate::proposal::{ProposalStatus, ProposalSummary, RemediationProposal};

pub struct ProposalRequest {
    pub proposal_type: crate::proposal::ProposalType,
    pub plan_hash: String,
    pub phase_id: Option<String>,
    pub violations_addressed: Vec<String>,
    pub exact_changes_requested: Vec<crate::proposal::ExactChange>,
    pub evidence_bundle: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ApprovalRecord<'a> {
    proposal_id: Uuid,
    decision: &'a str,
    decided_by: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
    decided_at: chrono::DateTime<Utc>,
}

pub struct ProposalStore {
    proposals_dir: PathBuf,
    index_path: PathBuf,
    approvals_path: PathBuf,
}

impl ProposalStore {
    pub fn new(
        proposals_dir: impl Into<PathBuf>,
        index_path: impl Into<PathBuf>,
        approvals_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            proposals_dir: proposals_dir.into(),
            index_path: index_path.into(),
            approvals_path: approvals_path.into(),
        }
    }

    fn proposal_path(&self, id: Uuid) -> PathBuf {
        self.proposals_dir.join(format!("PROPOSAL_{id}.md"))
    }

    /// Validate, write, and index a batch of new proposals. Fails closed:
    /// the first invalid request in the batch aborts the whole call before
    /// anything is written, so the index never references a half-written
    /// proposal.
    pub fn generate(
        &self,
        requests: Vec<ProposalRequest>,
        current_plan_hash: &str,
    ) -> Result<Vec<RemediationProposal>, KaizaError> {
        let mut proposals = Vec::with_capacity(requests.len());
        for request in requests {
            let proposal = RemediationProposal {
                proposal_id: Uuid::new_v4(),
                proposal_type: request.proposal_type,
                plan_hash: request.plan_hash,
                phase_id: request.phase_id,
                violations_addressed: request.violations_addressed,
                exact_changes_requested: request.exact_changes_requested,
                evidence_bundle: request.evidence_bundle,
                created_at: Utc::now(),
                status: ProposalStatus::Pending,
            };
            validate_evidence_binding(&proposal)?;
            validate_plan_freshness(&proposal, current_plan_hash)?;
            proposals.push(proposal);
        }

        fs::create_dir_all(&self.proposals_dir).map_err(|source| KaizaError::FileWriteFailed {
            path: self.proposals_dir.display().to_string(),
            source,
        })?;
        for proposal in &proposals {
            self.write_proposal(proposal)?;
            self.append_index_line(&ProposalSummary::from(proposal))?;
        }
        tracing::info!(count = proposals.len(), "remediation proposals written");

        Ok(proposals)
    }

    /// Current view of the index: one summary per proposal, latest line
    /// winning, in first-seen order.
    pub fn list(&self) -> Result<Vec<ProposalSummary>, KaizaError> {
        if !self.index_path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.index_path).map_err(|source| KaizaError::FileReadFailed {
            path: self.index_path.display().to_string(),
            source,
        })?;
        let mut order: Vec<Uuid> = Vec::new();
        let mut latest: std::collections::HashMap<Uuid, ProposalSummary> = std::collections::HashMap::new();
        for line in raw.lines().filter(|l| !l.trim().is_empty()) {
            let summary: ProposalSummary = serde_json::from_str(line)
                .map_err(|e| KaizaError::InvalidInputFormat(format!("proposal index line: {e}")))?;
            if !latest.contains_key(&summary.proposal_id) {
                order.push(summary.proposal_id);
            }
            latest.insert(summary.proposal_id, summary);
        }
        Ok(order.into_iter().filter_map(|id| latest.remove(&id)).collect())
    }

    pub fn load(&self, id: Uuid) -> Result<RemediationProposal, KaizaError> {
        let path = self.proposal_path(id);
        let raw = fs::read_to_string(&path).map_err(|source| KaizaError::FileReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|e| KaizaError::InvalidInputFormat(format!("proposal {id}: {e}")))
    }

    /// Transition a pending proposal to APPROVED or REJECTED. Once decided,
    /// a proposal's status is immutable; re-deciding it is refused.
    pub fn decide(&self, id: Uuid, decision: Decision) -> Result<RemediationProposal, KaizaError> {
        let mut proposal = self.load(id)?;
        if proposal.status.is_decided() {
            return Err(KaizaError::InvariantViolation(format!(
                "proposal {id} is already {} and cannot be re-decided",
                proposal.status.as_label()
            )));
        }
        let decided_at = Utc::now();
        let record = match &decision {
            Decision::Approve { approved_by } => ApprovalRecord {
                proposal_id: id,
                decision: "APPROVED",
                decided_by: approved_by,
                reason: None,
                decided_at,
            },
            Decision::Reject { rejected_by, reason } => ApprovalRecord {
                proposal_id: id,
                decision: "REJECTED",
                decided_by: rejected_by,
                reason: Some(reason),
                decided_at,
            },
        };
        self.append_jsonl(&self.approvals_path, &record)?;

        proposal.status = match decision {
            Decision::Approve { approved_by } => ProposalStatus::Approved {
                approved_by,
                decided_at,
            },
            Decision::Reject { rejected_by, reason } => ProposalStatus::Rejected {
                rejected_by,
                reason,
                decided_at,
            },
        };
        self.write_proposal(&proposal)?;
        self.append_index_line(&ProposalSummary::from(&proposal))?;

        Ok(proposal)
    }

    fn write_proposal(&self, proposal: &RemediationProposal) -> Result<(), KaizaError> {
        let path = self.proposal_path(proposal.proposal_id);
        let raw = serde_json::to_string_pretty(proposal)
            .map_err(|e| KaizaError::InternalError(format!("serializing proposal: {e}")))?;
        fs::write(&path, raw).map_err(|source| KaizaError::FileWriteFailed {
            path: path.display().to_string(),
            source,
        })
    }

    fn append_index_line(&self, summary: &ProposalSummary) -> Result<(), KaizaError> {
        self.append_jsonl(&self.index_path, summary)
    }

    fn append_jsonl(&self, path: &Path, record: &impl Serialize) -> Result<(), KaizaError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| KaizaError::FileWriteFailed {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let line = serde_json::to_string(record)
            .map_err(|e| KaizaError::InternalError(format!("serializing index line: {e}")))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| KaizaError::FileWriteFailed {
                path: path.display().to_string(),
                source,
            })?;
        writeln!(file, "{line}").map_err(|source| KaizaError::FileWriteFailed {
            path: path.display().to_string(),
            source,
        })
    }
}

pub enum Decision {
    Approve { approved_by: String },
    Reject { rejected_by: String, reason: String },
}

pub fn proposals_dir_path(root: &Path) -> PathBuf {
    root.join("docs/proposals")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::{ExactChange, ProposalType};
    use tempfile::tempdir;

    fn store_in(root: &Path) -> ProposalStore {
        ProposalStore::new(
            root.join("docs/proposals"),
            root.join(".kaiza/proposals-index.jsonl"),
            root.join(".kaiza/proposal-approvals.jsonl"),
        )
    }

    fn request() -> ProposalRequest {
        ProposalRequest {
            proposal_type: ProposalType::PlanCorrection,
            plan_hash: "a".repeat(64),
            phase_id: Some("PHASE_ONE".to_string()),
            violations_addressed: vec!["hash-a".to_string()],
            exact_changes_requested: vec![ExactChange {
                description: "clarify phase objective".to_string(),
                evidence_refs: vec!["hash-a".to_string()],
            }],
            evidence_bundle: vec!["hash-a".to_string()],
        }
    }

    #[test]
    fn generate_then_list_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let created = store.generate(vec![request()], &"a".repeat(64)).unwrap();
        assert_eq!(created.len(), 1);
        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, "PENDING");

        let on_disk = dir
            .path()
            .join(format!("docs/proposals/PROPOSAL_{}.md", created[0].proposal_id));
        assert!(on_disk.exists());
    }

    #[test]
    fn generate_rejects_stale_plan_before_writing_anything() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let err = store.generate(vec![request()], &"b".repeat(64)).unwrap_err();
        assert_eq!(err.code().as_str(), "REMEDIATION_STALE_PLAN");
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn decide_appends_to_the_index_and_the_latest_line_wins() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let created = store.generate(vec![request()], &"a".repeat(64)).unwrap();
        let id = created[0].proposal_id;

        store
            .decide(id, Decision::Approve { approved_by: "owner@example".to_string() })
            .unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, "APPROVED");

        let index_raw = std::fs::read_to_string(dir.path().join(".kaiza/proposals-index.jsonl")).unwrap();
        assert_eq!(index_raw.lines().count(), 2);
        let approvals_raw =
            std::fs::read_to_string(dir.path().join(".kaiza/proposal-approvals.jsonl")).unwrap();
        assert!(approvals_raw.contains("\"decision\":\"APPROVED\""));
    }

    #[test]
    fn approve_then_reject_again_is_refused() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let created = store.generate(vec![request()], &"a".repeat(64)).unwrap();
        let id = created[0].proposal_id;

        let decided = store
            .decide(id, Decision::Approve { approved_by: "owner@example".to_string() })
            .unwrap();
        assert_eq!(decided.status.as_label(), "APPROVED");

        let err = store
            .decide(id, Decision::Reject { rejected_by: "owner@example".to_string(), reason: "changed mind".to_string() })
            .unwrap_err();
        assert_eq!(err.code().as_str(), "INVARIANT_VIOLATION");
    }
}
