// entry.rs — AuditEntry: one JSON-Lines record in the hash-chained ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryResult {
    Ok,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub ts: DateTime<Utc>,
    pub seq: u64,
    pub prev_hash: String,
    /// Present once the entry has been appended; `None` while building it
    /// (the field is excluded from the canonical form that is hashed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_hash: Option<String>,
    pub session_id: Uuid,
    pub role: String,
    pub workspace_root: String,
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args_hash: Option<String>,
    pub result: EntryResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invariant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// True when this entry was queued before `initialize` and flushed
    /// as part of the session's opening entries.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub buffered: bool,
}

pub const GENESIS: &str = "GENESIS";

impl AuditEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: Uuid,
        role: impl Into<String>,
        workspace_root: impl Into<String>,
        tool: impl Into<String>,
        result: EntryResult,
    ) -> Self {
        Self {
            ts: Utc::now(),
            seq: 0,
            prev_hash: String::new(),
            entry_hash: None,
            session_id,
            role: role.into(),
            workspace_root: workspace_root.into(),
            tool: tool.into(),
            intent: None,
            plan_hash: None,
            phase_id: None,
            args_hash: None,
            result,
            error_code: None,
            invariant_id: None,
            result_hash: None,
            notes: None,
            buffered: false,
        }
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn with_plan(mut self, plan_hash: impl Into<String>, phase_id: impl Into<String>) -> Self {
        self.plan_hash = Some(plan_hash.into());
        self.phase_id = Some(phase_id.into());
        self
    }

    pub fn with_args_hash(mut self, args_hash: impl Into<String>) -> Self {
        self.args_hash = Some(args_hash.into());
        self
    }

    pub fn with_error(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    pub fn with_invariant(mut self, invariant_id: impl Into<String>) -> Self {
        self.invariant_id = Some(invariant_id.into());
        self
    }

    pub fn with_result_hash(mut self, result_hash: impl Into<String>) -> Self {
        self.result_hash = Some(result_hash.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn buffered(mut self) -> Self {
        self.buffered = true;
        self
    }

    /// The canonical form hashed to produce `entry_hash`: the full entry as
    /// JSON with `entry_hash` itself removed, then run through
    /// [`crate::hasher::canonical_json`].
    pub fn canonical_form(&self) -> Value {
        let mut value = serde_json::to_value(self).expect("AuditEntry always serializes");
        if let Value::Object(map) = &mut value {
            map.remove("entry_hash");
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_excludes_entry_hash() {
        let mut entry = AuditEntry::new(Uuid::new_v4(), "EXECUTION", "/w", "write_file", EntryResult::Ok);
        entry.entry_hash = Some("deadbeef".to_string());
        let canonical = entry.canonical_form();
        assert!(canonical.get("entry_hash").is_none());
    }

    #[test]
    fn result_serializes_lowercase() {
        let entry = AuditEntry::new(Uuid::new_v4(), "EXECUTION", "/w", "read_file", EntryResult::Error);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["result"], "error");
    }
}
