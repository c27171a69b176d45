// plans.rs — `bootstrap_create_foundation_plan`, `list_plans`, `lint_plan`
// (C6).

use kaiza_errors::KaizaError;
use kaiza_plan::{lint_plan, strip_header};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::boundary::{HandlerError, HandlerOutcome};
use crate::state::KernelState;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BootstrapPlanParams {
    /// Full Markdown body of the plan (without the hash/status header).
    pub plan_body: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LintPlanParams {
    /// Hash of a stored plan to lint. Mutually exclusive with `plan_body`.
    #[serde(default)]
    pub plan_hash: Option<String>,
    /// Plan body to lint directly, for drafts not yet stored.
    #[serde(default)]
    pub plan_body: Option<String>,
}

pub fn bootstrap_create_foundation_plan(
    state: &mut KernelState,
    params: &BootstrapPlanParams,
) -> Result<HandlerOutcome, HandlerError> {
    let plan = state
        .plans()?
        .approve_new_plan(&params.plan_body)
        .map_err(|e| HandlerError::from(e).with_invariant("INV_PLAN_APPROVED"))?;
    tracing::info!(plan_hash = %plan.hash, "foundation plan approved");
    Ok(HandlerOutcome::new(json!({
        "plan_hash": plan.hash,
        "path": plan.path.display().to_string(),
        "phase_ids": plan.phase_ids,
    }))
    .with_result_hash(plan.hash.clone())
    .with_notes("foundation plan created and approved"))
}

pub fn list_plans(state: &mut KernelState) -> Result<HandlerOutcome, HandlerError> {
    let registry = state.plans()?;
    let hashes = registry.list_hashes()?;
    let plans: Vec<serde_json::Value> = hashes
        .iter()
        .map(|hash| match registry.load(hash) {
            Ok(plan) => json!({
                "plan_hash": hash,
                "status": "APPROVED",
                "phase_ids": plan.phase_ids,
            }),
            Err(e) => json!({
                "plan_hash": hash,
                "status": "INVALID",
                "error_code": e.code().as_str(),
            }),
        })
        .collect();
    Ok(HandlerOutcome::new(json!({
        "plans": plans,
        "count": hashes.len(),
    })))
}

pub fn lint_plan_tool(state: &mut KernelState, params: &LintPlanParams) -> Result<HandlerOutcome, HandlerError> {
    let body = match (&params.plan_hash, &params.plan_body) {
        (Some(hash), None) => {
            let path = state.gate.resolver().resolve_plan_path(hash)?;
            let content = std::fs::read_to_string(&path).map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    KaizaError::PlanNotApproved(format!("no plan stored at hash {hash}"))
                } else {
                    KaizaError::FileReadFailed {
                        path: path.display().to_string(),
                        source,
                    }
                }
            })?;
            strip_header(&content)
        }
        (None, Some(body)) => body.clone(),
        _ => {
            return Err(KaizaError::InvalidInputValue(
                "exactly one of plan_hash or plan_body is required".to_string(),
            )
            .into())
        }
    };

    let report = lint_plan(&body);
    let value = serde_json::to_value(&report)
        .map_err(|e| KaizaError::InternalError(format!("serializing lint report: {e}")))?;
    let result_hash = kaiza_audit::hash_json(&value);
    Ok(HandlerOutcome::new(value).with_result_hash(result_hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::session::{initialize, InitializeParams};
    use crate::handlers::test_support::PLAN_BODY;
    use tempfile::tempdir;

    fn execution_state(root: &std::path::Path) -> KernelState {
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
        state
    }

    #[test]
    fn bootstrap_then_list_round_trips() {
        let dir = tempdir().unwrap();
        let mut state = execution_state(dir.path());
        let outcome = bootstrap_create_foundation_plan(
            &mut state,
            &BootstrapPlanParams { plan_body: PLAN_BODY.to_string() },
        )
        .unwrap();
        let hash = outcome.value["plan_hash"].as_str().unwrap().to_string();
        assert_eq!(hash.len(), 64);

        let listed = list_plans(&mut state).unwrap();
        assert_eq!(listed.value["count"], 1);
        assert_eq!(listed.value["plans"][0]["plan_hash"], hash.as_str());
    }

    #[test]
    fn lint_plan_flags_ambiguous_language() {
        let dir = tempdir().unwrap();
        let mut state = execution_state(dir.path());
        let vague = PLAN_BODY.replace(
            "- **Objective:** Create the initial project files",
            "- **Objective:** Try to create the initial project files if possible",
        );
        let outcome = lint_plan_tool(
            &mut state,
            &LintPlanParams { plan_hash: None, plan_body: Some(vague) },
        )
        .unwrap();
        assert_eq!(outcome.value["valid"], false);
    }

    #[test]
    fn lint_plan_requires_exactly_one_input() {
        let dir = tempdir().unwrap();
        let mut state = execution_state(dir.path());
        let err = lint_plan_tool(&mut state, &LintPlanParams { plan_hash: None, plan_body: None }).unwrap_err();
        assert_eq!(err.error.code().as_str(), "INVALID_INPUT_VALUE");
    }
}
