// envelope.rs — the JSON-safe error record every tool boundary failure is
// coerced into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::code::ErrorCode;

/// Deterministic, JSON-safe error record returned to the transport.
///
/// Same error condition must always produce the same `error_code`; the
/// remaining fields are context, not branching keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error_code: ErrorCode,
    pub human_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invariant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorEnvelope {
    pub fn new(error_code: ErrorCode, human_message: impl Into<String>) -> Self {
        Self {
            error_code,
            human_message: human_message.into(),
            role: None,
            session_id: None,
            workspace_root: None,
            tool_name: None,
            invariant_id: None,
            phase_id: None,
            plan_hash: None,
            cause: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_workspace_root(mut self, root: impl Into<String>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    pub fn with_tool_name(mut self, tool: impl Into<String>) -> Self {
        self.tool_name = Some(tool.into());
        self
    }

    pub fn with_invariant_id(mut self, invariant_id: impl Into<String>) -> Self {
        self.invariant_id = Some(invariant_id.into());
        self
    }

    pub fn with_phase_id(mut self, phase_id: impl Into<String>) -> Self {
        self.phase_id = Some(phase_id.into());
        self
    }

    pub fn with_plan_hash(mut self, plan_hash: impl Into<String>) -> Self {
        self.plan_hash = Some(plan_hash.into());
        self
    }

    /// Attach a cause, only when `DEBUG_STACK=true` is set.
    pub fn with_cause_if_debug(mut self, cause: impl Into<String>) -> Self {
        if std::env::var("DEBUG_STACK").as_deref() == Ok("true") {
            self.cause = Some(cause.into());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test covers both states of DEBUG_STACK: two separate tests would
    // race on the process environment under the parallel test runner.
    #[test]
    fn cause_follows_debug_stack_setting() {
        std::env::remove_var("DEBUG_STACK");
        let envelope = ErrorEnvelope::new(ErrorCode::InternalError, "boom")
            .with_cause_if_debug("stack trace here");
        assert!(envelope.cause.is_none());

        std::env::set_var("DEBUG_STACK", "true");
        let envelope = ErrorEnvelope::new(ErrorCode::InternalError, "boom")
            .with_cause_if_debug("stack trace here");
        assert_eq!(envelope.cause.as_deref(), Some("stack trace here"));
        std::env::remove_var("DEBUG_STACK");
    }

    #[test]
    fn envelope_omits_absent_optional_fields_in_json() {
        let envelope = ErrorEnvelope::new(ErrorCode::SessionNotInitialized, "not ready");
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("cause").is_none());
        assert!(json.get("session_id").is_none());
    }
}
