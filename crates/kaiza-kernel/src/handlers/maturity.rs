// maturity.rs — `compute_maturity_score`, `explain_maturity_gap`, and the
// evidence gatherer shared with attestation (C13).

use kaiza_audit::{AuditEntry, EntryResult};
use kaiza_errors::KaizaError;
use kaiza_maturity::{apply_kill_switch_cap, compute_maturity, explain_maturity_gap, DimensionName, MaturityEvidence};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::boundary::{HandlerError, HandlerOutcome};
use crate::state::KernelState;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ExplainMaturityGapParams {
    /// Dimension to explain: Reliability, Security, Documentation,
    /// Governance, Integration, or Performance.
    pub dimension: String,
}

/// Aggregate statistics derived from the ledger, shared between maturity
/// scoring and attestation bundle generation.
pub struct WorkspaceEvidence {
    pub evidence: MaturityEvidence,
    pub entries: Vec<AuditEntry>,
    pub chain_valid: bool,
    pub policy_refusals: u64,
    pub write_attempts: u64,
}

/// Tools whose own ledger entries are excluded when computing evidence:
/// attestation over "the same workspace state" must not observe the
/// entries attestation itself appends, or two back-to-back bundles could
/// never agree.
const EVIDENCE_EXEMPT_TOOLS: [&str; 3] = [
    "generate_attestation_bundle",
    "verify_attestation_bundle",
    "export_attestation_bundle",
];

pub fn gather_evidence(state: &KernelState) -> Result<WorkspaceEvidence, KaizaError> {
    let audit = state.audit()?;
    let chain = audit.verify_chain()?;
    let entries: Vec<AuditEntry> = audit
        .read_all()?
        .into_iter()
        .filter(|e| !EVIDENCE_EXEMPT_TOOLS.contains(&e.tool.as_str()))
        .collect();

    let failures = entries.iter().filter(|e| e.result == EntryResult::Error).count() as u64;

    let writes: Vec<&AuditEntry> = entries.iter().filter(|e| e.tool == "write_file").collect();
    let ok_writes: Vec<&&AuditEntry> = writes.iter().filter(|e| e.result == EntryResult::Ok).collect();
    let policy_refusals = writes
        .iter()
        .filter(|e| {
            matches!(
                e.error_code.as_deref(),
                Some("POLICY_VIOLATION") | Some("RUST_POLICY_VIOLATION")
            )
        })
        .count() as u64;
    let policy_pass_rate = if entries.is_empty() {
        None
    } else if ok_writes.is_empty() && policy_refusals == 0 {
        Some(1.0)
    } else {
        Some(ok_writes.len() as f64 / (ok_writes.len() as u64 + policy_refusals) as f64)
    };

    // An ok write with no intent recorded means the co-requirement was
    // bypassed somewhere; that is a hard security signal, not a coverage
    // shortfall.
    let writes_with_intent = ok_writes.iter().filter(|e| e.intent.is_some()).count();
    let intent_coverage = if ok_writes.is_empty() {
        Some(1.0)
    } else {
        Some(writes_with_intent as f64 / ok_writes.len() as f64)
    };
    let policy_bypass_detected = ok_writes.iter().any(|e| e.intent.is_none());

    let registry = state.plans()?;
    let hashes = registry.list_hashes()?;
    let failing_lint = hashes.iter().filter(|h| registry.load(h).is_err()).count() as u64;

    let executions_without_approval = ok_writes.iter().filter(|e| e.plan_hash.is_none()).count() as u64;

    let automated_integration_checks = entries
        .iter()
        .filter(|e| {
            e.result == EntryResult::Ok
                && matches!(e.tool.as_str(), "verify_workspace_integrity" | "replay_execution")
        })
        .count() as u64;

    let evidence = MaturityEvidence {
        audit_entries: if entries.is_empty() { None } else { Some(entries.len() as u64) },
        audit_failures: if entries.is_empty() { None } else { Some(failures) },
        chain_valid: Some(chain.valid),
        policy_pass_rate,
        policy_bypass_detected,
        intent_coverage,
        doc_coverage: intent_coverage,
        plans_total: Some(hashes.len() as u64),
        plans_failing_lint: Some(failing_lint),
        executions_without_approval,
        automated_integration_checks: Some(automated_integration_checks),
        manual_integration_steps: 0,
        // Not collected by this kernel; the scorer caps Performance at 3.0
        // rather than inventing latency numbers.
        performance_metrics: None,
    };

    let write_attempts = ok_writes.len() as u64 + policy_refusals;
    Ok(WorkspaceEvidence {
        evidence,
        entries,
        chain_valid: chain.valid,
        policy_refusals,
        write_attempts,
    })
}

pub fn compute_maturity_score(state: &mut KernelState) -> Result<HandlerOutcome, HandlerError> {
    let gathered = gather_evidence(state)?;
    let mut report = compute_maturity(&gathered.evidence);

    let kill_switch = kaiza_killswitch::read_state(&state.gate.resolver().kill_switch_path()?)?;
    if kill_switch.engaged {
        report = apply_kill_switch_cap(report);
    }

    let result_hash = report.result_hash.clone();
    let value = serde_json::to_value(&report)
        .map_err(|e| KaizaError::InternalError(format!("serializing maturity report: {e}")))?;
    Ok(HandlerOutcome::new(value).with_result_hash(result_hash))
}

pub fn explain_maturity_gap_tool(
    state: &mut KernelState,
    params: &ExplainMaturityGapParams,
) -> Result<HandlerOutcome, HandlerError> {
    let dimension = parse_dimension(&params.dimension)
        .ok_or_else(|| KaizaError::InvalidInputValue(format!("unknown dimension: {}", params.dimension)))?;
    let gathered = gather_evidence(state)?;
    let mut report = compute_maturity(&gathered.evidence);
    let kill_switch = kaiza_killswitch::read_state(&state.gate.resolver().kill_switch_path()?)?;
    if kill_switch.engaged {
        report = apply_kill_switch_cap(report);
    }
    let explanation = explain_maturity_gap(&report, dimension)?;
    Ok(HandlerOutcome::new(json!({
        "dimension": params.dimension,
        "explanation": explanation,
    })))
}

fn parse_dimension(name: &str) -> Option<DimensionName> {
    match name {
        "Reliability" => Some(DimensionName::Reliability),
        "Security" => Some(DimensionName::Security),
        "Documentation" => Some(DimensionName::Documentation),
        "Governance" => Some(DimensionName::Governance),
        "Integration" => Some(DimensionName::Integration),
        "Performance" => Some(DimensionName::Performance),
        _ => None,
    }
}
