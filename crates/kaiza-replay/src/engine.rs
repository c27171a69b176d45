// engine.rs — pure, side-effect-free ledger replay (C10).
//
// `run_replay` never touches the filesystem and never re-invokes a tool:
// it reads the entries and the chain-verification report the caller
// already has in hand and classifies what it sees.

use std::collections::HashMap;

use kaiza_audit::{AuditEntry, EntryResult, VerifyFailureKind, VerifyReport};

use crate::filter::ReplayFilter;
use crate::finding::{Finding, FindingCode, FindingFamily};

/// Tools every role may call without a plan or phase attached.
/// A mutating tool is anything outside this set.
pub const READ_ONLY_TOOLS: [&str; 15] = [
    "initialize",
    "read_file",
    "list_plans",
    "read_audit_log",
    "read_prompt",
    "verify_workspace_integrity",
    "replay_execution",
    "lint_plan",
    "list_proposals",
    "compute_maturity_score",
    "explain_maturity_gap",
    "verify_attestation_bundle",
    "export_attestation_bundle",
    "inspect_operator_actions",
    "inspect_high_risk_approvals",
];

pub fn is_mutating_tool(tool: &str) -> bool {
    !READ_ONLY_TOOLS.contains(&tool)
}

/// Tools that execute under a plan's authority and must carry a plan_hash
/// and phase_id. Recovery, attestation, and operator-decision entries are
/// mutating but system-scoped: they are authorized by the kill-switch and
/// operator contracts, not by a plan.
pub fn is_plan_scoped_tool(tool: &str) -> bool {
    tool == "write_file"
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

pub struct ReplayReport {
    pub timeline: Vec<AuditEntry>,
    pub findings: Vec<Finding>,
    pub verdict: Verdict,
}

/// Replay the ledger against `filter`. `all_entries` and `chain` are read
/// once by the caller (typically via `AuditLog::read_all`/`verify_chain`);
/// this function performs no I/O of its own.
pub fn run_replay(all_entries: &[AuditEntry], chain: &VerifyReport, filter: &ReplayFilter) -> ReplayReport {
    let timeline: Vec<AuditEntry> = all_entries.iter().filter(|e| filter.matches(e)).cloned().collect();

    let mut findings = Vec::new();
    findings.extend(tamper_findings(chain));
    findings.extend(divergence_findings(&timeline));
    findings.extend(authority_findings(&timeline));
    findings.extend(policy_findings(&timeline));
    findings.extend(evidence_gap_findings(&timeline, filter));

    if !findings.iter().any(|f| f.code.family() == FindingFamily::Divergence) {
        findings.push(Finding::new(FindingCode::DeterministicPass, "no divergent results in this window"));
    }
    if !findings.iter().any(|f| f.code.family() == FindingFamily::Policy) {
        findings.push(Finding::new(FindingCode::CompliancePass, "no policy refusals or gate blocks in this window"));
    }

    let verdict = if findings.iter().any(|f| {
        matches!(
            f.code.family(),
            FindingFamily::Tamper | FindingFamily::Authority | FindingFamily::Policy | FindingFamily::Divergence
        )
    }) {
        Verdict::Fail
    } else {
        Verdict::Pass
    };

    ReplayReport {
        timeline,
        findings,
        verdict,
    }
}

fn tamper_findings(chain: &VerifyReport) -> Vec<Finding> {
    chain
        .failures
        .iter()
        .map(|f| {
            let code = match f.kind {
                VerifyFailureKind::InvalidJson => FindingCode::InvalidJson,
                VerifyFailureKind::SequenceGap => FindingCode::SequenceGap,
                VerifyFailureKind::BrokenChain => FindingCode::BrokenChain,
                VerifyFailureKind::HashMismatch => FindingCode::RecomputedHashMismatch,
            };
            Finding::new(code, format!("ledger line {}: {}", f.line, f.detail))
        })
        .collect()
}

fn divergence_findings(timeline: &[AuditEntry]) -> Vec<Finding> {
    let mut findings = Vec::new();

    let mut by_args: HashMap<(&str, &str), Vec<&str>> = HashMap::new();
    for entry in timeline {
        if entry.result != EntryResult::Ok || !is_plan_scoped_tool(&entry.tool) {
            continue;
        }
        if let (Some(args_hash), Some(result_hash)) = (&entry.args_hash, &entry.result_hash) {
            by_args
                .entry((entry.tool.as_str(), args_hash.as_str()))
                .or_default()
                .push(result_hash.as_str());
        }
    }
    for ((tool, args_hash), result_hashes) in &by_args {
        let distinct: std::collections::HashSet<&str> = result_hashes.iter().copied().collect();
        if distinct.len() > 1 {
            findings.push(Finding::new(
                FindingCode::ResultHashDivergence,
                format!("tool {tool} with args_hash {args_hash} produced {} distinct results", distinct.len()),
            ));
        }
    }

    let mut by_phase_tool: HashMap<(&str, &str), Vec<EntryResult>> = HashMap::new();
    for entry in timeline {
        if let Some(phase) = &entry.phase_id {
            by_phase_tool
                .entry((phase.as_str(), entry.tool.as_str()))
                .or_default()
                .push(entry.result);
        }
    }
    for ((phase, tool), results) in &by_phase_tool {
        let has_ok = results.iter().any(|r| *r == EntryResult::Ok);
        let has_err = results.iter().any(|r| *r == EntryResult::Error);
        if has_ok && has_err {
            findings.push(Finding::new(
                FindingCode::PhaseToolInconsistency,
                format!("phase {phase}, tool {tool} has both ok and error outcomes"),
            ));
        }
    }

    for entry in timeline {
        if let Some(result_hash) = &entry.result_hash {
            if !is_well_formed_hash(result_hash) {
                findings.push(Finding::new(
                    FindingCode::EmbeddedHashMismatch,
                    format!("seq {}: result_hash '{}' is not a 64-character hex digest", entry.seq, result_hash),
                ));
            }
        }
    }

    findings
}

fn is_well_formed_hash(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}

fn authority_findings(timeline: &[AuditEntry]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for entry in timeline {
        if !is_plan_scoped_tool(&entry.tool) {
            continue;
        }
        if entry.plan_hash.is_none() {
            findings.push(Finding::new(
                FindingCode::ExecutionWithoutPlan,
                format!("seq {}: {} ran with no plan_hash attached", entry.seq, entry.tool),
            ));
        } else if entry.phase_id.is_none() {
            findings.push(Finding::new(
                FindingCode::ToolOutsidePhase,
                format!("seq {}: {} ran under a plan with no phase_id attached", entry.seq, entry.tool),
            ));
        }
        if entry.role.eq_ignore_ascii_case("PLANNING") {
            findings.push(Finding::new(
                FindingCode::RoleMismatch,
                format!("seq {}: planning-role session executed mutating tool {}", entry.seq, entry.tool),
            ));
        }
    }
    findings
}

fn policy_findings(timeline: &[AuditEntry]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for entry in timeline {
        if entry.result != EntryResult::Error {
            continue;
        }
        match entry.error_code.as_deref() {
            Some("POLICY_VIOLATION") | Some("RUST_POLICY_VIOLATION") => {
                findings.push(Finding::new(
                    FindingCode::WriteRefused,
                    format!("seq {}: write refused ({})", entry.seq, entry.error_code.as_deref().unwrap_or("")),
                ));
            }
            Some("KILL_SWITCH_ENGAGED") => {
                findings.push(Finding::new(
                    FindingCode::BlockedByGate,
                    format!("seq {}: blocked by kill switch", entry.seq),
                ));
            }
            _ => {
                if entry.invariant_id.is_some() {
                    findings.push(Finding::new(
                        FindingCode::InvariantViolated,
                        format!(
                            "seq {}: invariant {} violated",
                            entry.seq,
                            entry.invariant_id.as_deref().unwrap_or("unknown")
                        ),
                    ));
                }
            }
        }
    }
    findings
}

fn evidence_gap_findings(timeline: &[AuditEntry], filter: &ReplayFilter) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Some(phase) = &filter.phase_id {
        if timeline.is_empty() {
            findings.push(Finding::new(
                FindingCode::MissingEntries,
                format!("phase {phase} has no entries in this ledger"),
            ));
        }
    }

    let mut by_phase_tool: HashMap<(&str, &str), Vec<&AuditEntry>> = HashMap::new();
    for entry in timeline {
        if let Some(phase) = &entry.phase_id {
            by_phase_tool.entry((phase.as_str(), entry.tool.as_str())).or_default().push(entry);
        }
    }
    for ((phase, tool), entries) in &by_phase_tool {
        let last_is_error = entries.last().map(|e| e.result == EntryResult::Error).unwrap_or(false);
        if last_is_error {
            findings.push(Finding::new(
                FindingCode::IncompleteExecution,
                format!("phase {phase}, tool {tool} ended on a failure with no later success"),
            ));
        }
    }

    for entry in timeline {
        if entry.result == EntryResult::Ok && is_plan_scoped_tool(&entry.tool) && entry.result_hash.is_none() {
            findings.push(Finding::new(
                FindingCode::MissingResultHash,
                format!("seq {}: {} succeeded with no result_hash recorded", entry.seq, entry.tool),
            ));
        }
    }

    findings
}
