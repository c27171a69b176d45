// code.rs — the closed error_code registry.
//
// Every code here is a stable, uppercase identifier. Adding a new failure
// mode means adding a variant; nothing in the kernel is allowed to stringify
// an ad-hoc code at a call site.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Session / identity (C5)
    SessionNotInitialized,
    SessionAlreadyInitialized,

    // Input errors
    InvalidInputType,
    InvalidInputFormat,
    InvalidInputValue,
    MissingRequiredField,

    // Path & file errors (C1)
    InvalidPath,
    PathTraversalBlocked,
    OutsideWorkspace,
    FileNotFound,
    FileReadFailed,
    FileWriteFailed,
    HashMismatch,

    // Authority errors (C6)
    UnauthorizedAction,
    RoleMismatch,
    PlanNotApproved,
    PlanEnforcementFailed,
    PlanScopeViolation,

    // Policy & intent errors (C7, C8)
    PolicyViolation,
    RustPolicyViolation,
    IntentArtifactMissing,
    IntentSchemaInvalid,
    IntentPathConsistency,
    IntentAuthorityDrift,
    IntentContainsForbiddenPatterns,

    // Governance errors (C9)
    InvariantViolation,
    SelfAuditFailure,
    KillSwitchEngaged,
    BootstrapFailure,

    // Infrastructure errors (C3, C4)
    AuditAppendFailed,
    AuditLockFailed,
    InternalError,

    // Remediation (C11)
    RemediationNotEvidenceBound,
    RemediationStalePlan,

    // Attestation (C12)
    AttestationVerificationFailed,

    // Operator trust boundary (C14)
    OperatorRebindRejected,
    ConfirmationWindowExpired,
    ConfirmationMismatch,
    ApprovalFatigueLimit,
    ManipulativeLanguageDetected,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::SessionNotInitialized => "SESSION_NOT_INITIALIZED",
            ErrorCode::SessionAlreadyInitialized => "SESSION_ALREADY_INITIALIZED",
            ErrorCode::InvalidInputType => "INVALID_INPUT_TYPE",
            ErrorCode::InvalidInputFormat => "INVALID_INPUT_FORMAT",
            ErrorCode::InvalidInputValue => "INVALID_INPUT_VALUE",
            ErrorCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorCode::InvalidPath => "INVALID_PATH",
            ErrorCode::PathTraversalBlocked => "PATH_TRAVERSAL_BLOCKED",
            ErrorCode::OutsideWorkspace => "OUTSIDE_WORKSPACE",
            ErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ErrorCode::FileReadFailed => "FILE_READ_FAILED",
            ErrorCode::FileWriteFailed => "FILE_WRITE_FAILED",
            ErrorCode::HashMismatch => "HASH_MISMATCH",
            ErrorCode::UnauthorizedAction => "UNAUTHORIZED_ACTION",
            ErrorCode::RoleMismatch => "ROLE_MISMATCH",
            ErrorCode::PlanNotApproved => "PLAN_NOT_APPROVED",
            ErrorCode::PlanEnforcementFailed => "PLAN_ENFORCEMENT_FAILED",
            ErrorCode::PlanScopeViolation => "PLAN_SCOPE_VIOLATION",
            ErrorCode::PolicyViolation => "POLICY_VIOLATION",
            ErrorCode::RustPolicyViolation => "RUST_POLICY_VIOLATION",
            ErrorCode::IntentArtifactMissing => "INTENT_ARTIFACT_MISSING",
            ErrorCode::IntentSchemaInvalid => "INTENT_SCHEMA_INVALID",
            ErrorCode::IntentPathConsistency => "INTENT_PATH_CONSISTENCY",
            ErrorCode::IntentAuthorityDrift => "INTENT_AUTHORITY_DRIFT",
            ErrorCode::IntentContainsForbiddenPatterns => "INTENT_CONTAINS_FORBIDDEN_PATTERNS",
            ErrorCode::InvariantViolation => "INVARIANT_VIOLATION",
            ErrorCode::SelfAuditFailure => "SELF_AUDIT_FAILURE",
            ErrorCode::KillSwitchEngaged => "KILL_SWITCH_ENGAGED",
            ErrorCode::BootstrapFailure => "BOOTSTRAP_FAILURE",
            ErrorCode::AuditAppendFailed => "AUDIT_APPEND_FAILED",
            ErrorCode::AuditLockFailed => "AUDIT_LOCK_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::RemediationNotEvidenceBound => "REMEDIATION_NOT_EVIDENCE_BOUND",
            ErrorCode::RemediationStalePlan => "REMEDIATION_STALE_PLAN",
            ErrorCode::AttestationVerificationFailed => "ATTESTATION_VERIFICATION_FAILED",
            ErrorCode::OperatorRebindRejected => "OPERATOR_REBIND_REJECTED",
            ErrorCode::ConfirmationWindowExpired => "CONFIRMATION_WINDOW_EXPIRED",
            ErrorCode::ConfirmationMismatch => "CONFIRMATION_MISMATCH",
            ErrorCode::ApprovalFatigueLimit => "APPROVAL_FATIGUE_LIMIT",
            ErrorCode::ManipulativeLanguageDetected => "MANIPULATIVE_LANGUAGE_DETECTED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
