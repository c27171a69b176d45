// report.rs — export an attestation bundle as canonical JSON or a
// non-coder Markdown report.

use kaiza_errors::KaizaError;

use crate::bundle::AttestationBundle;

pub fn export_json(bundle: &AttestationBundle) -> Result<String, KaizaError> {
    serde_json::to_string_pretty(bundle)
        .map_err(|e| KaizaError::InternalError(format!("serializing attestation bundle: {e}")))
}

pub fn export_markdown(bundle: &AttestationBundle) -> String {
    format!(
        "# Attestation Bundle {id}\n\n\
## Summary\n\
- Generated: {generated}\n\
- Window: {start} to {end}\n\
- Plans covered: {plan_count}\n\
- Replay verdict: {verdict}\n\
- Intent coverage: {coverage:.1}%\n\n\
## Evidence Checksums\n\
- audit_metric_hash: {audit_hash}\n\
- policy_summary_hash: {policy_hash}\n\
- maturity_hash: {maturity_hash}\n\n\
## Signature\n\
HMAC-SHA256: {signature}\n",
        id = bundle.bundle_id,
        generated = bundle.generated_timestamp.to_rfc3339(),
        start = bundle.time_window.start.to_rfc3339(),
        end = bundle.time_window.end.to_rfc3339(),
        plan_count = bundle.plan_hashes.len(),
        verdict = bundle.replay_verdict,
        coverage = bundle.intent_coverage * 100.0,
        audit_hash = bundle.verifier_checksums.audit_metric_hash,
        policy_hash = bundle.verifier_checksums.policy_summary_hash,
        maturity_hash = bundle.verifier_checksums.maturity_hash,
        signature = bundle.signature,
    )
}
