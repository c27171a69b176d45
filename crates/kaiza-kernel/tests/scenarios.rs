// scenarios.rs — end-to-end runs of the assembled kernel against a real
// temp workspace, driven through `dispatch` exactly as the MCP server
// drives it: session gate, kill-switch gate, role manifest, and audit
// append all active on every call.

use std::path::Path;

use kaiza_errors::ErrorEnvelope;
use kaiza_kernel::handlers;
use kaiza_kernel::handlers::session::InitializeParams;
use kaiza_kernel::handlers::writes::WriteFileParams;
use kaiza_kernel::{dispatch, DispatchOutcome, KernelState};
use kaiza_plan::PlanRegistry;
use serde_json::{json, Value};
use tempfile::tempdir;

const PLAN_BODY: &str = r#"
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

fn intent_for(target: &str, plan_hash: &str, phase_id: &str) -> String {
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

fn expect_ok(outcome: DispatchOutcome) -> Value {
    match outcome {
        DispatchOutcome::Ok(value) => value,
        DispatchOutcome::Err(envelope) => {
            panic!("expected ok, got {}: {}", envelope.error_code.as_str(), envelope.human_message)
        }
    }
}

fn expect_err(outcome: DispatchOutcome) -> ErrorEnvelope {
    match outcome {
        DispatchOutcome::Ok(value) => panic!("expected an envelope, got {value}"),
        DispatchOutcome::Err(envelope) => envelope,
    }
}

fn initialize(state: &mut KernelState, root: &Path, role: &str) -> Value {
    let params = InitializeParams {
        workspace_root: root.display().to_string(),
        role: role.to_string(),
        operator_id: None,
        operator_role: None,
        authentication_context: None,
    };
    let args = serde_json::to_value(&params).unwrap();
    expect_ok(dispatch(state, "initialize", &args, |s| {
        handlers::session::initialize(s, &params)
    }))
}

/// Approve the foundation plan the way a prior planning session would
/// have: directly through the registry, leaving the hash-addressed file
/// on disk for the execution session to load.
fn seed_plan(root: &Path) -> String {
    let registry = PlanRegistry::new(root.join("docs/plans"));
    registry.approve_new_plan(PLAN_BODY).unwrap().hash
}

fn place_intent(root: &Path, target: &str, plan_hash: &str) {
    let artifact = root.join(format!("{target}.intent.md"));
    std::fs::create_dir_all(artifact.parent().unwrap()).unwrap();
    std::fs::write(artifact, intent_for(target, plan_hash, "PHASE_1")).unwrap();
}

fn write_file(state: &mut KernelState, path: &str, content: &str, plan_hash: &str) -> DispatchOutcome {
    let params = WriteFileParams {
        path: path.to_string(),
        content: content.to_string(),
        plan_hash: plan_hash.to_string(),
        phase_id: "PHASE_1".to_string(),
    };
    let args = json!({
        "path": params.path,
        "content_hash": kaiza_audit::hash_str(&params.content),
        "content_length": params.content.len(),
        "plan_hash": params.plan_hash,
        "phase_id": params.phase_id,
    });
    dispatch(state, "write_file", &args, |s| handlers::writes::write_file(s, &params))
}

fn ledger_lines(root: &Path) -> Vec<Value> {
    std::fs::read_to_string(root.join(".kaiza/audit.log"))
        .unwrap()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn s1_first_write_succeeds_with_an_intact_chain() {
    let dir = tempdir().unwrap();
    let plan_hash = seed_plan(dir.path());

    let mut state = KernelState::new();
    initialize(&mut state, dir.path(), "EXECUTION");
    place_intent(dir.path(), "src/a.txt", &plan_hash);

    let value = expect_ok(write_file(&mut state, "src/a.txt", "hello\n", &plan_hash));
    assert_eq!(value["operation"], "CREATE");
    assert_eq!(std::fs::read_to_string(dir.path().join("src/a.txt")).unwrap(), "hello\n");

    let entries = ledger_lines(dir.path());
    assert!(entries.len() >= 2);
    assert_eq!(entries[0]["seq"], 1);
    assert_eq!(entries[0]["prev_hash"], "GENESIS");
    for (i, entry) in entries.iter().enumerate().skip(1) {
        assert_eq!(entry["seq"], (i + 1) as u64);
        assert_eq!(entry["prev_hash"], entries[i - 1]["entry_hash"]);
    }
    let last = entries.last().unwrap();
    assert_eq!(last["tool"], "write_file");
    assert_eq!(last["result"], "ok");
    assert_eq!(last["plan_hash"], plan_hash.as_str());
}

#[test]
fn s2_rust_policy_violation_refuses_the_write_and_lands_on_the_ledger() {
    let dir = tempdir().unwrap();
    let plan_hash = seed_plan(dir.path());

    let mut state = KernelState::new();
    initialize(&mut state, dir.path(), "EXECUTION");
    place_intent(dir.path(), "src/a.rs", &plan_hash);

    let envelope = expect_err(write_file(&mut state, "src/a.rs", "let x = todo!();\n", &plan_hash));
    assert_eq!(envelope.error_code.as_str(), "RUST_POLICY_VIOLATION");
    assert_eq!(envelope.invariant_id.as_deref(), Some("RUST_REALITY_LOCK"));
    assert!(!dir.path().join("src/a.rs").exists());

    let last = ledger_lines(dir.path()).pop().unwrap();
    assert_eq!(last["result"], "error");
    assert_eq!(last["error_code"], "RUST_POLICY_VIOLATION");
}

#[test]
fn s3_single_bit_tamper_is_detected_with_the_downstream_chain_break() {
    let dir = tempdir().unwrap();
    let plan_hash = seed_plan(dir.path());

    let mut state = KernelState::new();
    initialize(&mut state, dir.path(), "EXECUTION");
    place_intent(dir.path(), "src/a.txt", &plan_hash);
    expect_ok(write_file(&mut state, "src/a.txt", "hello\n", &plan_hash));
    for _ in 0..2 {
        let params = handlers::session::ReadFileParams { path: "src/a.txt".to_string() };
        let args = serde_json::to_value(&params).unwrap();
        expect_ok(dispatch(&mut state, "read_file", &args, |s| {
            handlers::session::read_file(s, &params)
        }));
    }

    let log_path = dir.path().join(".kaiza/audit.log");
    let content = std::fs::read_to_string(&log_path).unwrap();
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    lines[2] = lines[2].replacen("read_file", "read_fil3", 1);
    std::fs::write(&log_path, lines.join("\n") + "\n").unwrap();

    let value = expect_ok(dispatch(&mut state, "verify_workspace_integrity", &json!({}), |s| {
        handlers::ledger::verify_workspace_integrity(s)
    }));
    assert_eq!(value["verdict"], "FAIL");
    let failures = value["ledger"]["failures"].as_array().unwrap();
    assert!(failures.iter().any(|f| f["line"] == 3 && f["kind"] == "hash_mismatch"));
    assert!(failures.iter().any(|f| f["line"] == 4 && f["kind"] == "broken_chain"));
}

#[test]
fn s4_mutated_plan_refuses_execution_without_touching_the_tree() {
    let dir = tempdir().unwrap();
    let plan_hash = seed_plan(dir.path());

    let mut state = KernelState::new();
    initialize(&mut state, dir.path(), "EXECUTION");
    place_intent(dir.path(), "src/a.txt", &plan_hash);
    expect_ok(write_file(&mut state, "src/a.txt", "hello\n", &plan_hash));

    // Even appended whitespace — invisible to the canonical hash — breaks
    // the stored normal form and refuses execution.
    let plan_path = dir.path().join(format!("docs/plans/{plan_hash}.md"));
    let mut plan_content = std::fs::read_to_string(&plan_path).unwrap();
    plan_content.push_str("   \n");
    std::fs::write(&plan_path, plan_content).unwrap();

    let envelope = expect_err(write_file(&mut state, "src/a.txt", "changed\n", &plan_hash));
    assert_eq!(envelope.error_code.as_str(), "PLAN_ENFORCEMENT_FAILED");
    assert_eq!(std::fs::read_to_string(dir.path().join("src/a.txt")).unwrap(), "hello\n");

    let last = ledger_lines(dir.path()).pop().unwrap();
    assert_eq!(last["error_code"], "PLAN_ENFORCEMENT_FAILED");
}

#[cfg(debug_assertions)]
#[test]
fn s5_engaged_kill_switch_gates_writes_but_not_reads() {
    let dir = tempdir().unwrap();
    let plan_hash = seed_plan(dir.path());

    let mut state = KernelState::new();
    initialize(&mut state, dir.path(), "EXECUTION");
    place_intent(dir.path(), "src/a.txt", &plan_hash);
    expect_ok(write_file(&mut state, "src/a.txt", "hello\n", &plan_hash));

    let halt = kaiza_kernel::drill::inject_failure(
        &state,
        kaiza_killswitch::FailureId::AuditWrite,
        "fabricated append failure",
    )
    .unwrap();
    assert!(halt.path.exists());

    let switch = kaiza_killswitch::read_state(&dir.path().join(".kaiza/kill_switch.json")).unwrap();
    assert!(switch.engaged);
    assert_eq!(switch.triggers, vec!["F-AUDIT-WRITE".to_string()]);

    let envelope = expect_err(write_file(&mut state, "src/a.txt", "changed\n", &plan_hash));
    assert_eq!(envelope.error_code.as_str(), "KILL_SWITCH_ENGAGED");
    assert_eq!(std::fs::read_to_string(dir.path().join("src/a.txt")).unwrap(), "hello\n");

    let params = handlers::session::ReadFileParams { path: "src/a.txt".to_string() };
    let args = serde_json::to_value(&params).unwrap();
    let value = expect_ok(dispatch(&mut state, "read_file", &args, |s| {
        handlers::session::read_file(s, &params)
    }));
    assert_eq!(value["content"], "hello\n");

    // Unlock without the recorded acknowledgement/confirmation steps.
    let unlock = handlers::recovery::UnlockKillSwitchParams {
        operator_id: "alice".to_string(),
        operator_role: "OWNER".to_string(),
    };
    let args = serde_json::to_value(&unlock).unwrap();
    let envelope = expect_err(dispatch(&mut state, "unlock_kill_switch", &args, |s| {
        handlers::recovery::unlock_kill_switch(s, &unlock)
    }));
    assert_eq!(envelope.error_code.as_str(), "INVARIANT_VIOLATION");

    // Maturity is forced to zero while engaged.
    let value = expect_ok(dispatch(&mut state, "compute_maturity_score", &json!({}), |s| {
        handlers::maturity::compute_maturity_score(s)
    }));
    assert_eq!(value["overall"].as_f64().unwrap(), 0.0);
}

#[test]
fn s6_back_to_back_bundles_collide_on_id_and_signature() {
    let dir = tempdir().unwrap();
    seed_plan(dir.path());

    let mut state = KernelState::new();
    initialize(&mut state, dir.path(), "EXECUTION");

    let first = expect_ok(dispatch(&mut state, "generate_attestation_bundle", &json!({}), |s| {
        handlers::attestation::generate_attestation_bundle(s)
    }));
    let second = expect_ok(dispatch(&mut state, "generate_attestation_bundle", &json!({}), |s| {
        handlers::attestation::generate_attestation_bundle(s)
    }));

    assert_eq!(first["bundle_id"], second["bundle_id"]);
    assert_eq!(first["signature"], second["signature"]);
}

#[test]
fn pre_session_refusals_are_flushed_as_buffered_entries_on_initialize() {
    let dir = tempdir().unwrap();
    let mut state = KernelState::new();

    let params = handlers::session::ReadFileParams { path: "a.txt".to_string() };
    let args = serde_json::to_value(&params).unwrap();
    let envelope = expect_err(dispatch(&mut state, "read_file", &args, |s| {
        handlers::session::read_file(s, &params)
    }));
    assert_eq!(envelope.error_code.as_str(), "SESSION_NOT_INITIALIZED");

    initialize(&mut state, dir.path(), "EXECUTION");

    let entries = ledger_lines(dir.path());
    assert_eq!(entries[0]["tool"], "read_file");
    assert_eq!(entries[0]["result"], "error");
    assert_eq!(entries[0]["buffered"], true);
    assert_eq!(entries[1]["tool"], "initialize");
    assert_eq!(entries[1]["result"], "ok");
}

#[test]
fn planning_role_cannot_mutate_and_execution_role_cannot_bootstrap() {
    let dir = tempdir().unwrap();
    let plan_hash = seed_plan(dir.path());

    let mut state = KernelState::new();
    initialize(&mut state, dir.path(), "PLANNING");
    let envelope = expect_err(write_file(&mut state, "src/a.txt", "hello\n", &plan_hash));
    assert_eq!(envelope.error_code.as_str(), "UNAUTHORIZED_ACTION");

    let dir_b = tempdir().unwrap();
    let mut state_b = KernelState::new();
    initialize(&mut state_b, dir_b.path(), "EXECUTION");
    let params = handlers::plans::BootstrapPlanParams { plan_body: PLAN_BODY.to_string() };
    let args = json!({"plan_body_length": params.plan_body.len()});
    let envelope = expect_err(dispatch(&mut state_b, "bootstrap_create_foundation_plan", &args, |s| {
        handlers::plans::bootstrap_create_foundation_plan(s, &params)
    }));
    assert_eq!(envelope.error_code.as_str(), "UNAUTHORIZED_ACTION");
}

#[test]
fn replay_over_an_unchanged_ledger_is_byte_identical() {
    let dir = tempdir().unwrap();
    let plan_hash = seed_plan(dir.path());

    let mut state = KernelState::new();
    initialize(&mut state, dir.path(), "EXECUTION");
    place_intent(dir.path(), "src/a.txt", &plan_hash);
    expect_ok(write_file(&mut state, "src/a.txt", "hello\n", &plan_hash));

    let params = handlers::replay::ReplayExecutionParams {
        plan_hash: plan_hash.clone(),
        phase_id: None,
        tool: None,
        seq_start: None,
        seq_end: None,
    };
    let args = serde_json::to_value(&params).unwrap();
    let first = expect_ok(dispatch(&mut state, "replay_execution", &args, |s| {
        handlers::replay::replay_execution(s, &params)
    }));
    let second = expect_ok(dispatch(&mut state, "replay_execution", &args, |s| {
        handlers::replay::replay_execution(s, &params)
    }));

    assert_eq!(first["verdict"], "PASS");
    assert_eq!(first["report_markdown"], second["report_markdown"]);
    assert_eq!(first["findings"], second["findings"]);
}

#[test]
fn every_tool_call_lands_exactly_one_ledger_entry() {
    let dir = tempdir().unwrap();
    let plan_hash = seed_plan(dir.path());

    let mut state = KernelState::new();
    initialize(&mut state, dir.path(), "EXECUTION");
    place_intent(dir.path(), "src/a.txt", &plan_hash);

    let before = ledger_lines(dir.path()).len();
    expect_ok(write_file(&mut state, "src/a.txt", "hello\n", &plan_hash));
    let after_ok = ledger_lines(dir.path()).len();
    assert_eq!(after_ok, before + 1);

    let _ = expect_err(write_file(&mut state, "outside/a.txt", "hello\n", &plan_hash));
    let after_err = ledger_lines(dir.path()).len();
    assert_eq!(after_err, after_ok + 1);
}
