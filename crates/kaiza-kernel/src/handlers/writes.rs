// writes.rs — `write_file`: the full mediated mutation pipeline:
// path resolve (C1) → plan authority (C6) → policy + intent (C8, C7) →
// filesystem write. The audit entries on both sides of the write are the
// boundary's job, not this handler's.

use kaiza_errors::KaizaError;
use kaiza_intent::{intent_artifact_path, is_exempt, load_intent_content, validate_intent};
use kaiza_policy::{evaluate, is_rust_profile_violation, Operation, WriteRequest};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::boundary::{HandlerError, HandlerOutcome};
use crate::state::KernelState;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WriteFileParams {
    /// Workspace-relative path of the file to write.
    pub path: String,
    /// Full UTF-8 content of the file.
    pub content: String,
    /// Hash of the approved plan authorizing this write.
    pub plan_hash: String,
    /// Phase of that plan this write executes under.
    pub phase_id: String,
}

pub fn write_file(state: &mut KernelState, params: &WriteFileParams) -> Result<HandlerOutcome, HandlerError> {
    let with_authority =
        |e: KaizaError| HandlerError::from(e).with_plan(params.plan_hash.clone(), params.phase_id.clone());

    let resolved = state
        .gate
        .resolver()
        .resolve_write_target(&params.path)
        .map_err(|e| with_authority(e).with_invariant("INV_PATH_WITHIN_REPO"))?;

    // Plan authority: re-hashed, re-linted, approval re-checked on every
    // execution (INV_PLAN_IMMUTABILITY, INV_PLAN_APPROVED).
    let plan = state
        .plans()?
        .load(&params.plan_hash)
        .map_err(|e| with_authority(e).with_invariant("INV_PLAN_IMMUTABILITY"))?;
    if !plan.has_phase(&params.phase_id) {
        return Err(with_authority(KaizaError::PlanScopeViolation(format!(
            "plan {} has no phase {}",
            params.plan_hash, params.phase_id
        ))));
    }
    if !plan.allows_path(&params.path) {
        return Err(with_authority(KaizaError::PlanScopeViolation(format!(
            "path {} is not covered by the plan's allowlist",
            params.path
        ))));
    }

    let content_hash = kaiza_audit::hash_str(&params.content);
    let operation = if resolved.exists() { Operation::Modify } else { Operation::Create };
    let root = state.gate.resolver().root_path()?;
    let root_str = root.display().to_string();
    let session_id = state.gate.session_id().to_string();
    let role_str = state
        .gate
        .role()
        .map(|r| r.as_str().to_string())
        .unwrap_or_default();

    let request = WriteRequest {
        workspace_root: Some(&root_str),
        role: Some(&role_str),
        session_id: Some(&session_id),
        tool_name: Some("write_file"),
        plan_hash: Some(&params.plan_hash),
        phase_id: Some(&params.phase_id),
        operation: Some(operation),
        path: Some(&params.path),
        content: Some(&params.content),
        content_hash: Some(&content_hash),
        content_length: Some(params.content.len()),
    };

    let report = evaluate(state.gate.resolver(), &request, || {
        if is_exempt(&params.path) {
            return Ok(());
        }
        let intent = load_intent_content(&root, &params.path)?
            .ok_or_else(|| KaizaError::IntentArtifactMissing(params.path.clone()))?;
        validate_intent(&intent, &params.path, &params.plan_hash, &params.phase_id)
    })
    .map_err(|e| with_authority(e).with_invariant("MANDATORY_INTENT"))?;

    if !report.is_pass() {
        let detail: Vec<String> = report
            .violations
            .iter()
            .map(|v| format!("{} at line {} ({:?})", v.pattern, v.line, v.category))
            .collect();
        let invariant = report
            .violations
            .first()
            .map(|v| v.invariant_id)
            .unwrap_or("NO_PLACEHOLDERS_NO_FALLBACKS");
        let error = if is_rust_profile_violation(report.detected_language, &report.violations) {
            KaizaError::RustPolicyViolation(detail.join("; "))
        } else {
            KaizaError::PolicyViolation(detail.join("; "))
        };
        return Err(with_authority(error).with_invariant(invariant));
    }

    if let Some(parent) = resolved.parent() {
        std::fs::create_dir_all(parent).map_err(|source| {
            with_authority(KaizaError::FileWriteFailed {
                path: parent.display().to_string(),
                source,
            })
        })?;
    }
    std::fs::write(&resolved, &params.content).map_err(|source| {
        with_authority(KaizaError::FileWriteFailed {
            path: resolved.display().to_string(),
            source,
        })
    })?;
    tracing::debug!(path = %params.path, %content_hash, "write committed");

    let mut outcome = HandlerOutcome::new(json!({
        "path": params.path,
        "operation": match operation {
            Operation::Create => "CREATE",
            Operation::Modify => "MODIFY",
        },
        "detected_language": report.detected_language.as_str(),
        "content_hash": content_hash,
        "content_length": params.content.len(),
    }))
    .with_plan(params.plan_hash.clone(), params.phase_id.clone())
    .with_result_hash(content_hash.clone());
    if !is_exempt(&params.path) {
        outcome = outcome.with_intent(intent_artifact_path(&params.path).display().to_string());
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::plans::{bootstrap_create_foundation_plan, BootstrapPlanParams};
    use crate::handlers::session::{initialize, InitializeParams};
    use crate::handlers::test_support::{intent_for, PLAN_BODY};
    use tempfile::tempdir;

    fn ready_state(root: &std::path::Path) -> (KernelState, String) {
        let mut state = KernelState::new();
        initialize(
            &mut state,
            &InitializeParams {
                workspace_root: root.display().to_string(),
                role: "EXECUTION".to_string(),
                operator_id: None,
                operator_role: None,
                authentication_context: None,
            },
        )
        .unwrap();
        let outcome = bootstrap_create_foundation_plan(
            &mut state,
            &BootstrapPlanParams { plan_body: PLAN_BODY.to_string() },
        )
        .unwrap();
        let hash = outcome.value["plan_hash"].as_str().unwrap().to_string();
        (state, hash)
    }

    fn place_intent(root: &std::path::Path, target: &str, plan_hash: &str) {
        let artifact = root.join(format!("{target}.intent.md"));
        std::fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        std::fs::write(artifact, intent_for(target, plan_hash, "PHASE_1")).unwrap();
    }

    #[test]
    fn clean_write_with_intent_succeeds() {
        let dir = tempdir().unwrap();
        let (mut state, hash) = ready_state(dir.path());
        place_intent(dir.path(), "src/a.txt", &hash);

        let outcome = write_file(
            &mut state,
            &WriteFileParams {
                path: "src/a.txt".to_string(),
                content: "hello\n".to_string(),
                plan_hash: hash.clone(),
                phase_id: "PHASE_1".to_string(),
            },
        )
        .unwrap();
        assert_eq!(outcome.value["operation"], "CREATE");
        assert_eq!(std::fs::read_to_string(dir.path().join("src/a.txt")).unwrap(), "hello\n");
    }

    #[test]
    fn missing_intent_refuses_the_write() {
        let dir = tempdir().unwrap();
        let (mut state, hash) = ready_state(dir.path());

        let err = write_file(
            &mut state,
            &WriteFileParams {
                path: "src/a.txt".to_string(),
                content: "hello\n".to_string(),
                plan_hash: hash,
                phase_id: "PHASE_1".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.error.code().as_str(), "INTENT_ARTIFACT_MISSING");
        assert!(!dir.path().join("src/a.txt").exists());
    }

    #[test]
    fn rust_profile_hit_is_a_rust_policy_violation() {
        let dir = tempdir().unwrap();
        let (mut state, hash) = ready_state(dir.path());
        place_intent(dir.path(), "src/a.rs", &hash);

        let err = write_file(
            &mut state,
            &WriteFileParams {
                path: "src/a.rs".to_string(),
                content: "let x = todo!();\n".to_string(),
                plan_hash: hash,
                phase_id: "PHASE_1".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.error.code().as_str(), "RUST_POLICY_VIOLATION");
        assert_eq!(err.invariant_id.as_deref(), Some("RUST_REALITY_LOCK"));
        assert!(!dir.path().join("src/a.rs").exists());
    }

    #[test]
    fn unknown_phase_is_a_scope_violation() {
        let dir = tempdir().unwrap();
        let (mut state, hash) = ready_state(dir.path());
        let err = write_file(
            &mut state,
            &WriteFileParams {
                path: "src/a.txt".to_string(),
                content: "hello\n".to_string(),
                plan_hash: hash,
                phase_id: "PHASE_99".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.error.code().as_str(), "PLAN_SCOPE_VIOLATION");
    }

    #[test]
    fn path_outside_the_allowlist_is_a_scope_violation() {
        let dir = tempdir().unwrap();
        let (mut state, hash) = ready_state(dir.path());
        let err = write_file(
            &mut state,
            &WriteFileParams {
                path: "elsewhere/a.txt".to_string(),
                content: "hello\n".to_string(),
                plan_hash: hash,
                phase_id: "PHASE_1".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.error.code().as_str(), "PLAN_SCOPE_VIOLATION");
    }
}
