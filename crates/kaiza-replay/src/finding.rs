// finding.rs — the closed set of 18 finding codes the replay engine can
// emit, across six families.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingFamily {
    Success,
    Divergence,
    Authority,
    Policy,
    EvidenceGap,
    Tamper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FindingCode {
    // success
    DeterministicPass,
    CompliancePass,
    // divergence
    ResultHashDivergence,
    PhaseToolInconsistency,
    EmbeddedHashMismatch,
    // authority
    ToolOutsidePhase,
    RoleMismatch,
    ExecutionWithoutPlan,
    // policy
    WriteRefused,
    BlockedByGate,
    InvariantViolated,
    // evidence gaps
    MissingEntries,
    IncompleteExecution,
    MissingResultHash,
    // tamper
    BrokenChain,
    SequenceGap,
    InvalidJson,
    RecomputedHashMismatch,
}

impl FindingCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeterministicPass => "DETERMINISTIC_PASS",
            Self::CompliancePass => "COMPLIANCE_PASS",
            Self::ResultHashDivergence => "RESULT_HASH_DIVERGENCE",
            Self::PhaseToolInconsistency => "PHASE_TOOL_INCONSISTENCY",
            Self::EmbeddedHashMismatch => "EMBEDDED_HASH_MISMATCH",
            Self::ToolOutsidePhase => "TOOL_OUTSIDE_PHASE",
            Self::RoleMismatch => "ROLE_MISMATCH",
            Self::ExecutionWithoutPlan => "EXECUTION_WITHOUT_PLAN",
            Self::WriteRefused => "WRITE_REFUSED",
            Self::BlockedByGate => "BLOCKED_BY_GATE",
            Self::InvariantViolated => "INVARIANT_VIOLATED",
            Self::MissingEntries => "MISSING_ENTRIES",
            Self::IncompleteExecution => "INCOMPLETE_EXECUTION",
            Self::MissingResultHash => "MISSING_RESULT_HASH",
            Self::BrokenChain => "BROKEN_CHAIN",
            Self::SequenceGap => "SEQUENCE_GAP",
            Self::InvalidJson => "INVALID_JSON",
            Self::RecomputedHashMismatch => "RECOMPUTED_HASH_MISMATCH",
        }
    }

    pub fn family(&self) -> FindingFamily {
        match self {
            Self::DeterministicPass | Self::CompliancePass => FindingFamily::Success,
            Self::ResultHashDivergence | Self::PhaseToolInconsistency | Self::EmbeddedHashMismatch => {
                FindingFamily::Divergence
            }
            Self::ToolOutsidePhase | Self::RoleMismatch | Self::ExecutionWithoutPlan => {
                FindingFamily::Authority
            }
            Self::WriteRefused | Self::BlockedByGate | Self::InvariantViolated => FindingFamily::Policy,
            Self::MissingEntries | Self::IncompleteExecution | Self::MissingResultHash => {
                FindingFamily::EvidenceGap
            }
            Self::BrokenChain | Self::SequenceGap | Self::InvalidJson | Self::RecomputedHashMismatch => {
                FindingFamily::Tamper
            }
        }
    }

    /// One line of plain-English meaning, used in the Markdown report.
    pub fn what_this_means(&self) -> &'static str {
        match self {
            Self::DeterministicPass => "No divergent results were found for repeated operations.",
            Self::CompliancePass => "No policy refusals or gate blocks were found in this window.",
            Self::ResultHashDivergence => {
                "The same operation with the same arguments produced different results on different runs."
            }
            Self::PhaseToolInconsistency => {
                "The same tool in the same phase succeeded on one occasion and failed on another."
            }
            Self::EmbeddedHashMismatch => {
                "An entry's recorded result hash is not a well-formed hash, so it cannot be trusted as evidence."
            }
            Self::ToolOutsidePhase => "A mutating tool ran under a plan without a recorded phase.",
            Self::RoleMismatch => "A session in the planning role executed a mutating tool.",
            Self::ExecutionWithoutPlan => "A mutating tool ran without any plan hash attached.",
            Self::WriteRefused => "A write was refused by the policy engine.",
            Self::BlockedByGate => "A tool call was blocked by the kill switch.",
            Self::InvariantViolated => "An entry recorded an invariant violation.",
            Self::MissingEntries => "The requested phase has no entries at all in this ledger.",
            Self::IncompleteExecution => "A failed attempt in this phase/tool pair was never followed by a success.",
            Self::MissingResultHash => "A successful mutating call has no result hash recorded.",
            Self::BrokenChain => "The hash chain is broken: an entry's prev_hash does not match its predecessor.",
            Self::SequenceGap => "A sequence number is missing or out of order.",
            Self::InvalidJson => "A ledger line could not be parsed as JSON.",
            Self::RecomputedHashMismatch => "An entry's recomputed hash does not match its stored entry_hash.",
        }
    }

    pub fn recommended_action(&self) -> &'static str {
        match self {
            Self::DeterministicPass | Self::CompliancePass => "No action required.",
            Self::ResultHashDivergence | Self::PhaseToolInconsistency => {
                "Investigate the non-deterministic operation before trusting further runs."
            }
            Self::EmbeddedHashMismatch => "Re-run the operation that produced this entry and discard the bad hash.",
            Self::ToolOutsidePhase | Self::ExecutionWithoutPlan => {
                "File an INVESTIGATION_REQUIRED remediation proposal; this is an authority gap."
            }
            Self::RoleMismatch => "Treat as a critical authority breach; engage the kill switch if not already engaged.",
            Self::WriteRefused | Self::BlockedByGate | Self::InvariantViolated => {
                "Review the cited policy/invariant and correct the plan or intent before retrying."
            }
            Self::MissingEntries | Self::IncompleteExecution | Self::MissingResultHash => {
                "Re-run the missing step and confirm it is fully recorded before relying on this phase."
            }
            Self::BrokenChain | Self::SequenceGap | Self::InvalidJson | Self::RecomputedHashMismatch => {
                "Treat the ledger as compromised. Engage the kill switch and begin recovery."
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub code: FindingCode,
    pub context: String,
}

impl Finding {
    pub fn new(code: FindingCode, context: impl Into<String>) -> Self {
        Self {
            code,
            context: context.into(),
        }
    }
}
