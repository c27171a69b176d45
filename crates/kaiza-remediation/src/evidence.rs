// evidence.rs — evidence-binding validation.
//
// Every entry in `violations_addressed` must appear in the proposal's
// evidence bundle; every `exact_changes_requested` entry must cite at
// least one evidence_refs hash that is itself in the bundle.

use std::collections::HashSet;

use kaiza_errors::KaizaError;

use crate::proposal::RemediationProposal;

pub fn validate_evidence_binding(proposal: &RemediationProposal) -> Result<(), KaizaError> {
    let bundle: HashSet<&str> = proposal.evidence_bundle.iter().map(String::as_str).collect();

    for violation in &proposal.violations_addressed {
        if !bundle.contains(violation.as_str()) {
            return Err(KaizaError::RemediationNotEvidenceBound(format!(
                "violation '{violation}' does not appear in the evidence bundle"
            )));
        }
    }

    for change in &proposal.exact_changes_requested {
        if change.evidence_refs.is_empty() {
            return Err(KaizaError::RemediationNotEvidenceBound(format!(
                "change '{}' cites no evidence_refs",
                change.description
            )));
        }
        let cites_bundled_evidence = change.evidence_refs.iter().any(|r| bundle.contains(r.as_str()));
        if !cites_bundled_evidence {
            return Err(KaizaError::RemediationNotEvidenceBound(format!(
                "change '{}' cites no evidence_refs hash present in the evidence bundle",
                change.description
            )));
        }
    }

    Ok(())
}

/// A plan is stale when the proposal's `plan_hash` no longer matches the
/// plan currently registered under that phase (e.g. the plan was
/// superseded since the proposal was drafted).
pub fn validate_plan_freshness(proposal: &RemediationProposal, current_plan_hash: &str) -> Result<(), KaizaError> {
    if proposal.plan_hash != current_plan_hash {
        return Err(KaizaError::RemediationStalePlan(format!(
            "proposal references plan {} but the current plan is {}",
            proposal.plan_hash, current_plan_hash
        )));
    }
    Ok(())
}
