// bundle.rs — the attestation bundle: generation and verification
// (C12).

use chrono::{DateTime, Utc};
use kaiza_audit::{canonical_json, hash_str};
use kaiza_errors::KaizaError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sign::{sign_hex, verify_hex};

pub const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierChecksums {
    pub audit_metric_hash: String,
    pub policy_summary_hash: String,
    pub maturity_hash: String,
}

/// The evidence the caller (the kernel, which owns the other components'
/// outputs) hands to `generate_bundle`. `audit_metrics`, `policy_enforcement`
/// and `maturity_scores` are opaque JSON blobs so this crate never needs to
/// depend on kaiza-plan/kaiza-maturity/kaiza-replay directly.
#[derive(Debug, Clone)]
pub struct AttestationInputs {
    pub workspace_root_hash: String,
    pub time_window: TimeWindow,
    pub audit_log_root_hash: String,
    pub plan_hashes: Vec<String>,
    pub audit_metrics: Value,
    pub policy_enforcement: Value,
    pub intent_coverage: f64,
    pub replay_verdict: String,
    pub maturity_scores: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationBundle {
    pub bundle_id: String,
    pub schema_version: String,
    pub workspace_root_hash: String,
    pub time_window: TimeWindow,
    pub audit_log_root_hash: String,
    pub plan_hashes: Vec<String>,
    pub audit_metrics: Value,
    pub policy_enforcement: Value,
    pub intent_coverage: f64,
    pub replay_verdict: String,
    pub maturity_scores: Value,
    pub verifier_checksums: VerifierChecksums,
    pub generated_timestamp: DateTime<Utc>,
    pub signature: String,
}

impl AttestationBundle {
    /// The canonical JSON form used both to derive `bundle_id` and to sign
    /// the bundle: recursive key sort, whitespace-free, with `bundle_id`,
    /// `generated_timestamp`, and `signature` removed.
    fn canonical_form(&self) -> String {
        let mut value = serde_json::to_value(self).expect("AttestationBundle always serializes");
        if let Value::Object(map) = &mut value {
            map.remove("bundle_id");
            map.remove("generated_timestamp");
            map.remove("signature");
        }
        canonical_json(&value)
    }
}

pub fn generate_bundle(inputs: AttestationInputs, secret: &[u8]) -> AttestationBundle {
    let checksums = VerifierChecksums {
        audit_metric_hash: hash_str(&canonical_json(&inputs.audit_metrics)),
        policy_summary_hash: hash_str(&canonical_json(&inputs.policy_enforcement)),
        maturity_hash: hash_str(&canonical_json(&inputs.maturity_scores)),
    };

    let mut draft = AttestationBundle {
        bundle_id: String::new(),
        schema_version: SCHEMA_VERSION.to_string(),
        workspace_root_hash: inputs.workspace_root_hash,
        time_window: inputs.time_window,
        audit_log_root_hash: inputs.audit_log_root_hash,
        plan_hashes: inputs.plan_hashes,
        audit_metrics: inputs.audit_metrics,
        policy_enforcement: inputs.policy_enforcement,
        intent_coverage: inputs.intent_coverage,
        replay_verdict: inputs.replay_verdict,
        maturity_scores: inputs.maturity_scores,
        verifier_checksums: checksums,
        generated_timestamp: Utc::now(),
        signature: String::new(),
    };

    let canonical = draft.canonical_form();
    draft.bundle_id = hash_str(&canonical);
    draft.signature = sign_hex(secret, &canonical);
    draft
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyStep {
    Signature,
    BundleId,
    AuditMetricHash,
    PolicySummaryHash,
    MaturityHash,
}

impl VerifyStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signature => "signature",
            Self::BundleId => "bundle_id",
            Self::AuditMetricHash => "audit_metric_hash",
            Self::PolicySummaryHash => "policy_summary_hash",
            Self::MaturityHash => "maturity_hash",
        }
    }
}

/// Verification steps run in order; the first failure halts and is
/// returned.
pub fn verify_bundle(bundle: &AttestationBundle, secret: &[u8]) -> Result<(), KaizaError> {
    let canonical = bundle.canonical_form();

    if !verify_hex(secret, &canonical, &bundle.signature) {
        return Err(fail(VerifyStep::Signature));
    }
    if hash_str(&canonical) != bundle.bundle_id {
        return Err(fail(VerifyStep::BundleId));
    }
    if hash_str(&canonical_json(&bundle.audit_metrics)) != bundle.verifier_checksums.audit_metric_hash {
        return Err(fail(VerifyStep::AuditMetricHash));
    }
    if hash_str(&canonical_json(&bundle.policy_enforcement)) != bundle.verifier_checksums.policy_summary_hash {
        return Err(fail(VerifyStep::PolicySummaryHash));
    }
    if hash_str(&canonical_json(&bundle.maturity_scores)) != bundle.verifier_checksums.maturity_hash {
        return Err(fail(VerifyStep::MaturityHash));
    }
    Ok(())
}

fn fail(step: VerifyStep) -> KaizaError {
    KaizaError::AttestationVerificationFailed(format!("verification failed at step: {}", step.as_str()))
}
