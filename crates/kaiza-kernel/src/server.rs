// server.rs — the MCP server for the Kaiza kernel.
//
// KernelServer implements the rmcp ServerHandler trait, exposing the
// kernel's closed tool surface as MCP tools. Every method locks the one
// KernelState and routes through `boundary::dispatch`, so the session
// gate, kill-switch gate, role manifest, and audit append all run on every
// call — the `#[tool]` methods themselves are pure plumbing.
//
// `write_file` is the one tool whose raw arguments never reach the
// ledger: its audit args collapse the content to {path, content_hash,
// content_length} before dispatch hashes them.

use std::sync::{Arc, Mutex};

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde_json::{json, Value};

use crate::boundary::{dispatch, DispatchOutcome, HandlerError, HandlerOutcome};
use crate::config::KaizaConfig;
use crate::handlers::attestation::{ExportBundleParams, VerifyBundleParams};
use crate::handlers::ledger::ReadAuditLogParams;
use crate::handlers::maturity::ExplainMaturityGapParams;
use crate::handlers::plans::{BootstrapPlanParams, LintPlanParams};
use crate::handlers::recovery::{ConfirmRecoveryParams, InitiateRecoveryParams, UnlockKillSwitchParams};
use crate::handlers::remediation::{ApproveProposalParams, GenerateProposalsParams};
use crate::handlers::replay::ReplayExecutionParams;
use crate::handlers::session::{InitializeParams, ReadFileParams, ReadPromptParams};
use crate::handlers::writes::WriteFileParams;
use crate::handlers;
use crate::state::KernelState;

pub struct KernelServer {
    state: Arc<Mutex<KernelState>>,
    tool_router: ToolRouter<Self>,
}

fn to_result(outcome: DispatchOutcome) -> Result<CallToolResult, McpError> {
    match outcome {
        DispatchOutcome::Ok(value) => Ok(CallToolResult::success(vec![
            Content::json(value).map_err(|e| McpError::internal_error(e.to_string(), None))?,
        ])),
        DispatchOutcome::Err(envelope) => {
            let data = serde_json::to_value(&envelope).ok();
            Err(McpError::invalid_request(
                format!("{}: {}", envelope.error_code.as_str(), envelope.human_message),
                data,
            ))
        }
    }
}

#[tool_router]
impl KernelServer {
    pub fn new(config: KaizaConfig) -> Self {
        Self::with_state(KernelState::with_config(config))
    }

    /// Wrap existing state (for tests).
    pub fn with_state(state: KernelState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            tool_router: Self::tool_router(),
        }
    }

    pub fn state(&self) -> &Arc<Mutex<KernelState>> {
        &self.state
    }

    fn call<F>(&self, tool: &str, audit_args: Value, handler: F) -> Result<CallToolResult, McpError>
    where
        F: FnOnce(&mut KernelState) -> Result<HandlerOutcome, HandlerError>,
    {
        let mut state = self
            .state
            .lock()
            .map_err(|e| McpError::internal_error(format!("lock poisoned: {e}"), None))?;
        to_result(dispatch(&mut state, tool, &audit_args, handler))
    }

    fn args_of<T: serde::Serialize>(params: &T) -> Value {
        serde_json::to_value(params).unwrap_or(Value::Null)
    }

    // ── Session ──────────────────────────────────────────────

    #[tool(
        description = "Bind this session to a workspace root and role (PLANNING or EXECUTION). Must be the first call; every other tool refuses until the session is initialized."
    )]
    fn initialize(&self, Parameters(params): Parameters<InitializeParams>) -> Result<CallToolResult, McpError> {
        self.call("initialize", Self::args_of(&params), |s| {
            handlers::session::initialize(s, &params)
        })
    }

    #[tool(description = "Read a file inside the workspace root.")]
    fn read_file(&self, Parameters(params): Parameters<ReadFileParams>) -> Result<CallToolResult, McpError> {
        self.call("read_file", Self::args_of(&params), |s| {
            handlers::session::read_file(s, &params)
        })
    }

    #[tool(description = "Read a prompt document from docs/prompts/ by name.")]
    fn read_prompt(&self, Parameters(params): Parameters<ReadPromptParams>) -> Result<CallToolResult, McpError> {
        self.call("read_prompt", Self::args_of(&params), |s| {
            handlers::session::read_prompt(s, &params)
        })
    }

    // ── Plans ────────────────────────────────────────────────

    #[tool(
        description = "Create and approve the foundation plan for a fresh workspace. Planning role only; the plan body is linted, hashed, and stored under docs/plans/<hash>.md."
    )]
    fn bootstrap_create_foundation_plan(
        &self,
        Parameters(params): Parameters<BootstrapPlanParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call("bootstrap_create_foundation_plan", Self::args_of(&params), |s| {
            handlers::plans::bootstrap_create_foundation_plan(s, &params)
        })
    }

    #[tool(description = "List every plan stored in the registry with its validity status.")]
    fn list_plans(&self) -> Result<CallToolResult, McpError> {
        self.call("list_plans", json!({}), handlers::plans::list_plans)
    }

    #[tool(description = "Lint a plan body (or a stored plan by hash) against the structural rules.")]
    fn lint_plan(&self, Parameters(params): Parameters<LintPlanParams>) -> Result<CallToolResult, McpError> {
        self.call("lint_plan", Self::args_of(&params), |s| {
            handlers::plans::lint_plan_tool(s, &params)
        })
    }

    // ── Writes ───────────────────────────────────────────────

    #[tool(
        description = "Write a file under an approved plan and phase. The path must resolve inside the workspace and the plan's allowlist, the content must pass the policy engine, and a valid <path>.intent.md must exist."
    )]
    fn write_file(&self, Parameters(params): Parameters<WriteFileParams>) -> Result<CallToolResult, McpError> {
        // File contents are never logged: the audited args
        // carry only the path, hash, length, and authority.
        let audit_args = json!({
            "path": params.path,
            "content_hash": kaiza_audit::hash_str(&params.content),
            "content_length": params.content.len(),
            "plan_hash": params.plan_hash,
            "phase_id": params.phase_id,
        });
        self.call("write_file", audit_args, |s| handlers::writes::write_file(s, &params))
    }

    // ── Ledger ───────────────────────────────────────────────

    #[tool(description = "Read the audit ledger, optionally limited to the last N entries.")]
    fn read_audit_log(&self, Parameters(params): Parameters<ReadAuditLogParams>) -> Result<CallToolResult, McpError> {
        self.call("read_audit_log", Self::args_of(&params), |s| {
            handlers::ledger::read_audit_log(s, &params)
        })
    }

    #[tool(
        description = "Verify the whole workspace: walk the hash chain, re-validate every stored plan, and report the kill-switch state."
    )]
    fn verify_workspace_integrity(&self) -> Result<CallToolResult, McpError> {
        self.call("verify_workspace_integrity", json!({}), handlers::ledger::verify_workspace_integrity)
    }

    // ── Replay ───────────────────────────────────────────────

    #[tool(
        description = "Reconstruct execution history for a plan from the ledger without re-invoking any tool. Returns the verdict, classified findings, and a Markdown report."
    )]
    fn replay_execution(
        &self,
        Parameters(params): Parameters<ReplayExecutionParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call("replay_execution", Self::args_of(&params), |s| {
            handlers::replay::replay_execution(s, &params)
        })
    }

    // ── Remediation ──────────────────────────────────────────

    #[tool(
        description = "Write evidence-bound remediation proposals for an approved plan. Propose-only: nothing is applied until a human approves and a separate authorized plan executes."
    )]
    fn generate_remediation_proposals(
        &self,
        Parameters(params): Parameters<GenerateProposalsParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call("generate_remediation_proposals", Self::args_of(&params), |s| {
            handlers::remediation::generate_remediation_proposals(s, &params)
        })
    }

    #[tool(description = "List remediation proposals and their statuses.")]
    fn list_proposals(&self) -> Result<CallToolResult, McpError> {
        self.call("list_proposals", json!({}), handlers::remediation::list_proposals)
    }

    #[tool(
        description = "Decide a pending proposal (APPROVE or REJECT). Two-step: the first call issues a confirmation token, the second call with that token lands the decision."
    )]
    fn approve_proposal(
        &self,
        Parameters(params): Parameters<ApproveProposalParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call("approve_proposal", Self::args_of(&params), |s| {
            handlers::remediation::approve_proposal(s, &params)
        })
    }

    // ── Kill-switch recovery ─────────────────────────────────

    #[tool(
        description = "Step 1 of kill-switch recovery (OWNER only): acknowledge the halt report and receive a confirmation code."
    )]
    fn initiate_recovery_acknowledgement(
        &self,
        Parameters(params): Parameters<InitiateRecoveryParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call("initiate_recovery_acknowledgement", Self::args_of(&params), |s| {
            handlers::recovery::initiate_recovery_acknowledgement(s, &params)
        })
    }

    #[tool(
        description = "Step 2 of kill-switch recovery (OWNER only): re-state the four acknowledgements with the confirmation code."
    )]
    fn confirm_recovery(
        &self,
        Parameters(params): Parameters<ConfirmRecoveryParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call("confirm_recovery", Self::args_of(&params), |s| {
            handlers::recovery::confirm_recovery(s, &params)
        })
    }

    #[tool(
        description = "Clear the engaged kill switch (OWNER only) after recovery is confirmed and audit verify, plan lint, and maturity recompute all pass."
    )]
    fn unlock_kill_switch(
        &self,
        Parameters(params): Parameters<UnlockKillSwitchParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call("unlock_kill_switch", Self::args_of(&params), |s| {
            handlers::recovery::unlock_kill_switch(s, &params)
        })
    }

    // ── Attestation ──────────────────────────────────────────

    #[tool(
        description = "Generate a deterministic, HMAC-signed attestation bundle over the workspace's current evidence."
    )]
    fn generate_attestation_bundle(&self) -> Result<CallToolResult, McpError> {
        self.call("generate_attestation_bundle", json!({}), handlers::attestation::generate_attestation_bundle)
    }

    #[tool(description = "Verify an attestation bundle's signature, id, and checksums under the workspace secret.")]
    fn verify_attestation_bundle(
        &self,
        Parameters(params): Parameters<VerifyBundleParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call("verify_attestation_bundle", Self::args_of(&params), |s| {
            handlers::attestation::verify_attestation_bundle(s, &params)
        })
    }

    #[tool(description = "Export an attestation bundle as canonical JSON or a non-coder Markdown report.")]
    fn export_attestation_bundle(
        &self,
        Parameters(params): Parameters<ExportBundleParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call("export_attestation_bundle", Self::args_of(&params), |s| {
            handlers::attestation::export_attestation_bundle(s, &params)
        })
    }

    // ── Maturity ─────────────────────────────────────────────

    #[tool(description = "Compute the six-dimension maturity score from the workspace's evidence. Overall is the minimum dimension.")]
    fn compute_maturity_score(&self) -> Result<CallToolResult, McpError> {
        self.call("compute_maturity_score", json!({}), handlers::maturity::compute_maturity_score)
    }

    #[tool(description = "Explain, in plain English, what is holding one maturity dimension below the ceiling.")]
    fn explain_maturity_gap(
        &self,
        Parameters(params): Parameters<ExplainMaturityGapParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call("explain_maturity_gap", Self::args_of(&params), |s| {
            handlers::maturity::explain_maturity_gap_tool(s, &params)
        })
    }

    // ── Operator ─────────────────────────────────────────────

    #[tool(description = "List every HUMAN_FACTOR_DECISION recorded on the ledger.")]
    fn inspect_operator_actions(&self) -> Result<CallToolResult, McpError> {
        self.call("inspect_operator_actions", json!({}), handlers::operator::inspect_operator_actions)
    }

    #[tool(description = "List only HIGH and IRREVERSIBLE operator decisions from the ledger.")]
    fn inspect_high_risk_approvals(&self) -> Result<CallToolResult, McpError> {
        self.call("inspect_high_risk_approvals", json!({}), handlers::operator::inspect_high_risk_approvals)
    }
}

#[tool_handler]
impl ServerHandler for KernelServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "kaiza-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("Kaiza policy-and-audit kernel".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Kaiza MCP server. Call initialize first to bind a workspace \
                 root and role. Every mutation requires an approved plan, a \
                 co-located intent artifact, and a passing policy scan, and \
                 every call lands on the hash-chained audit ledger."
                    .into(),
            ),
        }
    }
}
