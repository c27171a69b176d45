//! # kaiza-attestation
//!
//! Deterministic, HMAC-SHA256-signed attestation bundles (C12): a read-only
//! snapshot of audit, policy, intent, replay, and maturity evidence, signed
//! under a workspace secret and verifiable without re-running any analysis.

mod bundle;
mod report;
mod secret;
mod sign;

pub use bundle::{
    generate_bundle, verify_bundle, AttestationBundle, AttestationInputs, TimeWindow, VerifierChecksums, VerifyStep,
    SCHEMA_VERSION,
};
pub use report::{export_json, export_markdown};
pub use secret::{resolve_secret, write_secret_file, ENV_VAR};
