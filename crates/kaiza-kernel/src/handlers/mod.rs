// handlers/ — one module per tool family. Every function here takes the
// locked `KernelState` and returns a `HandlerOutcome`/`HandlerError` pair;
// the boundary in `boundary.rs` owns gating, auditing, and envelopes, so
// no handler ever touches the transport or appends its own tool entry.

pub mod attestation;
pub mod ledger;
pub mod maturity;
pub mod operator;
pub mod plans;
pub mod recovery;
pub mod remediation;
pub mod replay;
pub mod session;
pub mod writes;

#[cfg(test)]
pub mod test_support {
    /// A minimal plan body that passes the linter: all seven sections in
    /// canonical order, one fully-specified phase, binary modal verbs only.
    pub const PLAN_BODY: &str = r#"
## Metadata
Title: Foundation

## Scope & Constraints
In scope: the src and docs trees

## Phase Definitions
### PHASE_1
- **Phase ID:** PHASE_1
- **Objective:** Create the initial project files
- **Allowed operations:** CREATE and MODIFY
- **Forbidden operations:** DELETE
- **Required intent artifacts:** one per written file
- **Verification commands:** cargo test
- **Expected outcomes:** files exist with recorded hashes
- **Failure stop conditions:** any policy refusal

## Path Allowlist
- src/**
- docs/**

## Verification Gates
- cargo test MUST pass

## Forbidden Actions
- MUST NOT touch the audit ledger directly

## Rollback Policy
- git revert is REQUIRED
"#;

    /// A nine-section intent artifact binding `target` to the given plan
    /// hash and phase.
    pub fn intent_for(target: &str, plan_hash: &str, phase_id: &str) -> String {
        format!(
            "# Intent: {target}\n\n\
## Purpose\nCreate the file.\n\n\
## Authority\nPlan Hash: {plan_hash}\nPhase ID: {phase_id}\n\n\
## Inputs\nNone.\n\n\
## Outputs\nThe written file.\n\n\
## Invariants\nThe file exists after the write.\n\n\
## Failure Modes\nDisk full.\n\n\
## Debug Signals\nExit code.\n\n\
## Out-of-Scope\nUnrelated files.\n"
        )
    }
}
