// session.rs — `initialize`, `read_file`, and `read_prompt` (C5).

use std::path::Path;

use kaiza_audit::AuditLog;
use kaiza_errors::KaizaError;
use kaiza_operator::OperatorIdentity;
use kaiza_plan::PlanRegistry;
use kaiza_remediation::ProposalStore;
use kaiza_session::Role;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::boundary::{HandlerError, HandlerOutcome};
use crate::state::{KernelState, OpenedWorkspace};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct InitializeParams {
    /// Absolute path of the workspace root to bind for this session.
    pub workspace_root: String,
    /// Session role: "PLANNING" or "EXECUTION".
    pub role: String,
    /// Operator identity to bind for high-risk approvals (optional).
    #[serde(default)]
    pub operator_id: Option<String>,
    #[serde(default)]
    pub operator_role: Option<String>,
    #[serde(default)]
    pub authentication_context: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadFileParams {
    /// Workspace-relative path to read.
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadPromptParams {
    /// Prompt document name under docs/prompts/ (without extension).
    pub name: String,
}

pub fn initialize(state: &mut KernelState, params: &InitializeParams) -> Result<HandlerOutcome, HandlerError> {
    let role = Role::parse(&params.role)
        .ok_or_else(|| KaizaError::InvalidInputValue(format!("unknown role: {}", params.role)))?;

    let candidate = Path::new(&params.workspace_root);
    if !candidate.is_absolute() {
        return Err(KaizaError::InvalidPath(format!(
            "workspace root must be absolute: {}",
            params.workspace_root
        ))
        .into());
    }
    let canonical = candidate.canonicalize().map_err(|source| {
        KaizaError::InvalidPath(format!("cannot resolve workspace root {}: {source}", params.workspace_root))
    })?;

    // Second call: idempotent for the same root, refused for a different one.
    if state.gate.is_initialized() {
        let current = state.gate.resolver().root_path()?;
        if current == canonical {
            return Ok(HandlerOutcome::new(json!({
                "session_id": state.gate.session_id(),
                "role": state.gate.role().map(|r| r.as_str()),
                "workspace_root": current.display().to_string(),
                "already_initialized": true,
            })));
        }
        return Err(KaizaError::SessionAlreadyInitialized.into());
    }

    let log = AuditLog::open(canonical.join(".kaiza/audit.log"), canonical.join(".kaiza/audit.lock"))?;
    let flushed = state.gate.initialize(&canonical, role, &log)?;
    let resolver = state.gate.resolver();
    let plans = PlanRegistry::new(resolver.plans_dir()?);
    let proposals = ProposalStore::new(
        resolver.proposals_dir()?,
        resolver.proposals_index_path()?,
        resolver.proposal_approvals_path()?,
    );
    state.workspace = Some(OpenedWorkspace {
        audit: log,
        plans,
        proposals,
    });

    if let Some(operator_id) = &params.operator_id {
        state.operator.bind(OperatorIdentity {
            operator_id: operator_id.clone(),
            operator_role: params.operator_role.clone().unwrap_or_else(|| "OPERATOR".to_string()),
            authentication_context: params
                .authentication_context
                .clone()
                .unwrap_or_else(|| "unspecified".to_string()),
        })?;
    }

    Ok(HandlerOutcome::new(json!({
        "session_id": state.gate.session_id(),
        "role": role.as_str(),
        "workspace_root": canonical.display().to_string(),
        "buffered_entries_flushed": flushed.len(),
    }))
    .with_notes(format!("{} pre-session entries flushed", flushed.len())))
}

pub fn read_file(state: &mut KernelState, params: &ReadFileParams) -> Result<HandlerOutcome, HandlerError> {
    let resolved = state
        .gate
        .resolver()
        .resolve_write_target(&params.path)
        .map_err(|e| HandlerError::from(e).with_invariant("INV_PATH_WITHIN_REPO"))?;
    let content = std::fs::read_to_string(&resolved).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            KaizaError::FileNotFound(params.path.clone())
        } else {
            KaizaError::FileReadFailed {
                path: resolved.display().to_string(),
                source,
            }
        }
    })?;
    let content_hash = kaiza_audit::hash_str(&content);
    Ok(HandlerOutcome::new(json!({
        "path": params.path,
        "content": content,
        "content_hash": content_hash,
    }))
    .with_result_hash(content_hash))
}

pub fn read_prompt(state: &mut KernelState, params: &ReadPromptParams) -> Result<HandlerOutcome, HandlerError> {
    let rel = format!("docs/prompts/{}.md", params.name);
    let resolved = state
        .gate
        .resolver()
        .resolve_write_target(&rel)
        .map_err(|e| HandlerError::from(e).with_invariant("INV_PATH_WITHIN_REPO"))?;
    let content = std::fs::read_to_string(&resolved).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            KaizaError::FileNotFound(rel.clone())
        } else {
            KaizaError::FileReadFailed {
                path: resolved.display().to_string(),
                source,
            }
        }
    })?;
    Ok(HandlerOutcome::new(json!({
        "name": params.name,
        "content": content,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn init_params(root: &Path, role: &str) -> InitializeParams {
        InitializeParams {
            workspace_root: root.display().to_string(),
            role: role.to_string(),
            operator_id: None,
            operator_role: None,
            authentication_context: None,
        }
    }

    #[test]
    fn initialize_binds_session_and_opens_workspace() {
        let dir = tempdir().unwrap();
        let mut state = KernelState::new();
        let outcome = initialize(&mut state, &init_params(dir.path(), "EXECUTION")).unwrap();
        assert!(state.gate.is_initialized());
        assert!(state.workspace.is_some());
        assert_eq!(outcome.value["role"], "EXECUTION");
    }

    #[test]
    fn initialize_with_unknown_role_is_refused() {
        let dir = tempdir().unwrap();
        let mut state = KernelState::new();
        let err = initialize(&mut state, &init_params(dir.path(), "ADMIN")).unwrap_err();
        assert_eq!(err.error.code().as_str(), "INVALID_INPUT_VALUE");
    }

    #[test]
    fn second_initialize_same_root_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut state = KernelState::new();
        initialize(&mut state, &init_params(dir.path(), "EXECUTION")).unwrap();
        let outcome = initialize(&mut state, &init_params(dir.path(), "EXECUTION")).unwrap();
        assert_eq!(outcome.value["already_initialized"], true);
    }

    #[test]
    fn second_initialize_different_root_is_refused() {
        let dir_a = tempdir().unwrap();
        let dir_b = tempdir().unwrap();
        let mut state = KernelState::new();
        initialize(&mut state, &init_params(dir_a.path(), "EXECUTION")).unwrap();
        let err = initialize(&mut state, &init_params(dir_b.path(), "EXECUTION")).unwrap_err();
        assert_eq!(err.error.code().as_str(), "SESSION_ALREADY_INITIALIZED");
    }

    #[test]
    fn read_file_returns_content_within_bounds() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello\n").unwrap();
        let mut state = KernelState::new();
        initialize(&mut state, &init_params(dir.path(), "EXECUTION")).unwrap();
        let outcome = read_file(&mut state, &ReadFileParams { path: "a.txt".to_string() }).unwrap();
        assert_eq!(outcome.value["content"], "hello\n");
    }

    #[test]
    fn read_file_refuses_traversal() {
        let dir = tempdir().unwrap();
        let mut state = KernelState::new();
        initialize(&mut state, &init_params(dir.path(), "EXECUTION")).unwrap();
        let err = read_file(&mut state, &ReadFileParams { path: "../outside".to_string() }).unwrap_err();
        assert_eq!(err.error.code().as_str(), "PATH_TRAVERSAL_BLOCKED");
    }
}
