// error.rs — KaizaError: the Rust-side error type every kernel crate
// returns. Each variant carries the ErrorCode it maps to so conversion to
// an ErrorEnvelope is mechanical and exhaustive.

use thiserror::Error;

use crate::code::ErrorCode;

#[derive(Debug, Error)]
pub enum KaizaError {
    #[error("session not initialized")]
    SessionNotInitialized,

    #[error("session already initialized with a different workspace root")]
    SessionAlreadyInitialized,

    #[error("invalid input: {0}")]
    InvalidInputType(String),

    #[error("invalid input format: {0}")]
    InvalidInputFormat(String),

    #[error("invalid input value: {0}")]
    InvalidInputValue(String),

    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("path traversal blocked: {0}")]
    PathTraversalBlocked(String),

    #[error("path outside workspace: {0}")]
    OutsideWorkspace(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("file read failed at {path}: {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("file write failed at {path}: {source}")]
    FileWriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("unauthorized action: {0}")]
    UnauthorizedAction(String),

    #[error("role mismatch: {0}")]
    RoleMismatch(String),

    #[error("plan not approved: {0}")]
    PlanNotApproved(String),

    #[error("plan enforcement failed: {0}")]
    PlanEnforcementFailed(String),

    #[error("plan scope violation: {0}")]
    PlanScopeViolation(String),

    #[error("policy violation: {0}")]
    PolicyViolation(String),

    #[error("rust policy violation: {0}")]
    RustPolicyViolation(String),

    #[error("intent artifact missing: {0}")]
    IntentArtifactMissing(String),

    #[error("intent schema invalid: {0}")]
    IntentSchemaInvalid(String),

    #[error("intent path consistency violation: {0}")]
    IntentPathConsistency(String),

    #[error("intent authority drift: {0}")]
    IntentAuthorityDrift(String),

    #[error("intent contains forbidden patterns: {0}")]
    IntentContainsForbiddenPatterns(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("self-audit failure: {0}")]
    SelfAuditFailure(String),

    #[error("kill switch engaged: {0}")]
    KillSwitchEngaged(String),

    #[error("bootstrap failure: {0}")]
    BootstrapFailure(String),

    #[error("audit append failed: {0}")]
    AuditAppendFailed(String),

    #[error("audit lock failed: {0}")]
    AuditLockFailed(String),

    #[error("internal error: {0}")]
    InternalError(String),

    #[error("remediation not evidence bound: {0}")]
    RemediationNotEvidenceBound(String),

    #[error("remediation references a stale plan: {0}")]
    RemediationStalePlan(String),

    #[error("attestation verification failed: {0}")]
    AttestationVerificationFailed(String),

    #[error("operator rebind rejected: {0}")]
    OperatorRebindRejected(String),

    #[error("confirmation window expired")]
    ConfirmationWindowExpired,

    #[error("confirmation payload does not match the original acknowledgement")]
    ConfirmationMismatch,

    #[error("approval fatigue limit reached: {0}")]
    ApprovalFatigueLimit(String),

    #[error("manipulative language detected: {0}")]
    ManipulativeLanguageDetected(String),
}

impl KaizaError {
    pub fn code(&self) -> ErrorCode {
        match self {
            KaizaError::SessionNotInitialized => ErrorCode::SessionNotInitialized,
            KaizaError::SessionAlreadyInitialized => ErrorCode::SessionAlreadyInitialized,
            KaizaError::InvalidInputType(_) => ErrorCode::InvalidInputType,
            KaizaError::InvalidInputFormat(_) => ErrorCode::InvalidInputFormat,
            KaizaError::InvalidInputValue(_) => ErrorCode::InvalidInputValue,
            KaizaError::MissingRequiredField(_) => ErrorCode::MissingRequiredField,
            KaizaError::InvalidPath(_) => ErrorCode::InvalidPath,
            KaizaError::PathTraversalBlocked(_) => ErrorCode::PathTraversalBlocked,
            KaizaError::OutsideWorkspace(_) => ErrorCode::OutsideWorkspace,
            KaizaError::FileNotFound(_) => ErrorCode::FileNotFound,
            KaizaError::FileReadFailed { .. } => ErrorCode::FileReadFailed,
            KaizaError::FileWriteFailed { .. } => ErrorCode::FileWriteFailed,
            KaizaError::HashMismatch { .. } => ErrorCode::HashMismatch,
            KaizaError::UnauthorizedAction(_) => ErrorCode::UnauthorizedAction,
            KaizaError::RoleMismatch(_) => ErrorCode::RoleMismatch,
            KaizaError::PlanNotApproved(_) => ErrorCode::PlanNotApproved,
            KaizaError::PlanEnforcementFailed(_) => ErrorCode::PlanEnforcementFailed,
            KaizaError::PlanScopeViolation(_) => ErrorCode::PlanScopeViolation,
            KaizaError::PolicyViolation(_) => ErrorCode::PolicyViolation,
            KaizaError::RustPolicyViolation(_) => ErrorCode::RustPolicyViolation,
            KaizaError::IntentArtifactMissing(_) => ErrorCode::IntentArtifactMissing,
            KaizaError::IntentSchemaInvalid(_) => ErrorCode::IntentSchemaInvalid,
            KaizaError::IntentPathConsistency(_) => ErrorCode::IntentPathConsistency,
            KaizaError::IntentAuthorityDrift(_) => ErrorCode::IntentAuthorityDrift,
            KaizaError::IntentContainsForbiddenPatterns(_) => {
                ErrorCode::IntentContainsForbiddenPatterns
            }
            KaizaError::InvariantViolation(_) => ErrorCode::InvariantViolation,
            KaizaError::SelfAuditFailure(_) => ErrorCode::SelfAuditFailure,
            KaizaError::KillSwitchEngaged(_) => ErrorCode::KillSwitchEngaged,
            KaizaError::BootstrapFailure(_) => ErrorCode::BootstrapFailure,
            KaizaError::AuditAppendFailed(_) => ErrorCode::AuditAppendFailed,
            KaizaError::AuditLockFailed(_) => ErrorCode::AuditLockFailed,
            KaizaError::InternalError(_) => ErrorCode::InternalError,
            KaizaError::RemediationNotEvidenceBound(_) => ErrorCode::RemediationNotEvidenceBound,
            KaizaError::RemediationStalePlan(_) => ErrorCode::RemediationStalePlan,
            KaizaError::AttestationVerificationFailed(_) => {
                ErrorCode::AttestationVerificationFailed
            }
            KaizaError::OperatorRebindRejected(_) => ErrorCode::OperatorRebindRejected,
            KaizaError::ConfirmationWindowExpired => ErrorCode::ConfirmationWindowExpired,
            KaizaError::ConfirmationMismatch => ErrorCode::ConfirmationMismatch,
            KaizaError::ApprovalFatigueLimit(_) => ErrorCode::ApprovalFatigueLimit,
            KaizaError::ManipulativeLanguageDetected(_) => {
                ErrorCode::ManipulativeLanguageDetected
            }
        }
    }

    /// Coerce into the JSON-safe envelope returned at the tool boundary.
    pub fn into_envelope(self) -> crate::envelope::ErrorEnvelope {
        let code = self.code();
        crate::envelope::ErrorEnvelope::new(code, self.to_string())
            .with_cause_if_debug(format!("{self:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_condition_yields_same_code() {
        let a = KaizaError::KillSwitchEngaged("F-AUDIT".into());
        let b = KaizaError::KillSwitchEngaged("F-POLICY".into());
        assert_eq!(a.code(), b.code());
        assert_eq!(a.code().as_str(), "KILL_SWITCH_ENGAGED");
    }

    #[test]
    fn into_envelope_preserves_code() {
        let err = KaizaError::PathTraversalBlocked("../etc/passwd".into());
        let envelope = err.into_envelope();
        assert_eq!(envelope.error_code.as_str(), "PATH_TRAVERSAL_BLOCKED");
    }
}
