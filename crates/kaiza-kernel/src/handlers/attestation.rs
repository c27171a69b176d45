// attestation.rs — `generate_attestation_bundle`,
// `verify_attestation_bundle`, `export_attestation_bundle` (C12). Bundles
// snapshot evidence the other components already produced; nothing here
// re-runs a tool.

use chrono::Utc;
use kaiza_attestation::{
    export_json, export_markdown, generate_bundle, resolve_secret, verify_bundle, write_secret_file,
    AttestationBundle, AttestationInputs, TimeWindow,
};
use kaiza_audit::GENESIS;
use kaiza_errors::KaizaError;
use kaiza_maturity::compute_maturity;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::boundary::{HandlerError, HandlerOutcome};
use crate::handlers::maturity::gather_evidence;
use crate::state::KernelState;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VerifyBundleParams {
    /// The bundle to verify, as the JSON produced at generation time.
    pub bundle_json: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ExportBundleParams {
    /// The bundle to export, as the JSON produced at generation time.
    pub bundle_json: String,
    /// Either "json" (canonical, re-verifiable) or "markdown" (non-coder).
    pub format: String,
}

fn workspace_secret(state: &KernelState) -> Result<Vec<u8>, KaizaError> {
    let secret_path = state.gate.resolver().attestation_secret_path()?;
    let had_file = secret_path.exists();
    let secret = resolve_secret(&secret_path)?;
    // A secret minted on the spot is persisted (unless configured off) so
    // bundles stay verifiable by later processes in this workspace.
    if !had_file && std::env::var(kaiza_attestation::ENV_VAR).is_err() && state.config.persist_attestation_secret {
        write_secret_file(&secret_path, &secret)?;
    }
    Ok(secret)
}

pub fn generate_attestation_bundle(state: &mut KernelState) -> Result<HandlerOutcome, HandlerError> {
    let secret = workspace_secret(state)?;
    let gathered = gather_evidence(state)?;
    let maturity = compute_maturity(&gathered.evidence);

    let root = state.gate.resolver().root_path()?;
    let (first_ts, last_ts) = match (gathered.entries.first(), gathered.entries.last()) {
        (Some(first), Some(last)) => (first.ts, last.ts),
        _ => {
            let now = Utc::now();
            (now, now)
        }
    };
    let audit_log_root_hash = gathered
        .entries
        .last()
        .and_then(|e| e.entry_hash.clone())
        .unwrap_or_else(|| GENESIS.to_string());

    let failures = gathered
        .evidence
        .audit_failures
        .unwrap_or(0);
    let inputs = AttestationInputs {
        workspace_root_hash: kaiza_audit::hash_str(&root.display().to_string()),
        time_window: TimeWindow { start: first_ts, end: last_ts },
        audit_log_root_hash,
        plan_hashes: state.plans()?.list_hashes()?,
        audit_metrics: json!({
            "total_entries": gathered.entries.len(),
            "failure_count": failures,
            "first_timestamp": first_ts.to_rfc3339(),
            "last_timestamp": last_ts.to_rfc3339(),
        }),
        policy_enforcement: json!({
            "write_attempts": gathered.write_attempts,
            "refusals": gathered.policy_refusals,
            "pass_rate": gathered.evidence.policy_pass_rate,
        }),
        intent_coverage: gathered.evidence.intent_coverage.unwrap_or(0.0),
        replay_verdict: if gathered.chain_valid { "PASS".to_string() } else { "FAIL".to_string() },
        maturity_scores: serde_json::to_value(&maturity)
            .map_err(|e| KaizaError::InternalError(format!("serializing maturity scores: {e}")))?,
    };

    let bundle = generate_bundle(inputs, &secret);
    let bundle_id = bundle.bundle_id.clone();
    let value = serde_json::to_value(&bundle)
        .map_err(|e| KaizaError::InternalError(format!("serializing attestation bundle: {e}")))?;
    tracing::info!(%bundle_id, "attestation bundle generated");
    Ok(HandlerOutcome::new(value)
        .with_result_hash(bundle_id)
        .with_notes("attestation bundle generated"))
}

fn parse_bundle(raw: &str) -> Result<AttestationBundle, KaizaError> {
    serde_json::from_str(raw).map_err(|e| KaizaError::InvalidInputFormat(format!("attestation bundle: {e}")))
}

pub fn verify_attestation_bundle(
    state: &mut KernelState,
    params: &VerifyBundleParams,
) -> Result<HandlerOutcome, HandlerError> {
    let bundle = parse_bundle(&params.bundle_json)?;
    let secret = workspace_secret(state)?;
    verify_bundle(&bundle, &secret)?;
    Ok(HandlerOutcome::new(json!({
        "verdict": "PASS",
        "bundle_id": bundle.bundle_id,
    }))
    .with_result_hash(bundle.bundle_id.clone()))
}

pub fn export_attestation_bundle(
    state: &mut KernelState,
    params: &ExportBundleParams,
) -> Result<HandlerOutcome, HandlerError> {
    let _ = state.gate.resolver().root_path()?;
    let bundle = parse_bundle(&params.bundle_json)?;
    let content = match params.format.as_str() {
        "json" => export_json(&bundle)?,
        "markdown" => export_markdown(&bundle),
        other => {
            return Err(KaizaError::InvalidInputValue(format!(
                "unknown export format '{other}', expected json or markdown"
            ))
            .into())
        }
    };
    Ok(HandlerOutcome::new(json!({
        "bundle_id": bundle.bundle_id,
        "format": params.format,
        "content": content,
    }))
    .with_result_hash(kaiza_audit::hash_str(&content)))
}
