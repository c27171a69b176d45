// gate.rs — the session gate (C5): while workspace_root is null, only
// `initialize` is accepted; all other tool calls fail with
// SESSION_NOT_INITIALIZED.

use kaiza_audit::{AuditEntry, AuditLog, PreSessionBuffer};
use kaiza_errors::KaizaError;
use kaiza_path::PathResolver;
use uuid::Uuid;

use crate::role::Role;

pub struct SessionGate {
    session_id: Uuid,
    role: Option<Role>,
    resolver: PathResolver,
    is_locked: bool,
    buffer: PreSessionBuffer,
}

impl SessionGate {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            role: None,
            resolver: PathResolver::new(),
            is_locked: false,
            buffer: PreSessionBuffer::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_initialized(&self) -> bool {
        self.role.is_some()
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    pub fn lock(&mut self) {
        self.is_locked = true;
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Queue an audit event raised before `initialize` has run. Flushed,
    /// marked `buffered=true`, in arrival order once the ledger opens.
    pub fn buffer_event(&mut self, entry: AuditEntry) -> Result<(), KaizaError> {
        self.buffer.push(entry)
    }

    /// Any tool other than `initialize` must call this first.
    pub fn ensure_initialized(&self) -> Result<(), KaizaError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(KaizaError::SessionNotInitialized)
        }
    }

    pub fn require_role(&self, expected: Role) -> Result<(), KaizaError> {
        self.ensure_initialized()?;
        match self.role {
            Some(r) if r == expected => Ok(()),
            _ => Err(KaizaError::UnauthorizedAction(format!(
                "tool requires role {}",
                expected.as_str()
            ))),
        }
    }

    /// Bind the session to a workspace root and role. Idempotent only up
    /// to rejecting a second call with a different workspace root.
    pub fn initialize(
        &mut self,
        workspace_root: impl AsRef<std::path::Path>,
        role: Role,
        log: &AuditLog,
    ) -> Result<Vec<AuditEntry>, KaizaError> {
        self.resolver.lock_workspace_root(workspace_root)?;
        self.role = Some(role);
        tracing::info!(session_id = %self.session_id, role = role.as_str(), "session initialized");
        let buffer = std::mem::replace(&mut self.buffer, PreSessionBuffer::new());
        buffer.flush(log)
    }
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaiza_audit::EntryResult;
    use tempfile::tempdir;

    fn entry(tool: &str) -> AuditEntry {
        AuditEntry::new(Uuid::nil(), "EXECUTION", "/workspace", tool, EntryResult::Ok)
    }

    #[test]
    fn rejects_calls_before_initialize() {
        let gate = SessionGate::new();
        assert!(gate.ensure_initialized().is_err());
    }

    #[test]
    fn initialize_flushes_buffered_events_in_order() {
        let dir = tempdir().unwrap();
        let log = AuditLog::open(dir.path().join("audit.jsonl"), dir.path().join("audit.lock")).unwrap();
        let mut gate = SessionGate::new();
        gate.buffer_event(entry("tool_a")).unwrap();
        gate.buffer_event(entry("tool_b")).unwrap();

        let flushed = gate.initialize(dir.path(), Role::Execution, &log).unwrap();
        assert_eq!(flushed.len(), 2);
        assert!(flushed[0].buffered);
        assert_eq!(flushed[0].tool, "tool_a");
        assert_eq!(flushed[1].tool, "tool_b");
        assert!(gate.ensure_initialized().is_ok());
    }

    #[test]
    fn second_initialize_with_different_root_is_rejected() {
        let dir_a = tempdir().unwrap();
        let dir_b = tempdir().unwrap();
        let log = AuditLog::open(dir_a.path().join("audit.jsonl"), dir_a.path().join("audit.lock")).unwrap();
        let mut gate = SessionGate::new();
        gate.initialize(dir_a.path(), Role::Execution, &log).unwrap();
        let err = gate.initialize(dir_b.path(), Role::Execution, &log).unwrap_err();
        assert_eq!(err.code().as_str(), "SESSION_ALREADY_INITIALIZED");
    }

    #[test]
    fn require_role_rejects_mismatched_role() {
        let dir = tempdir().unwrap();
        let log = AuditLog::open(dir.path().join("audit.jsonl"), dir.path().join("audit.lock")).unwrap();
        let mut gate = SessionGate::new();
        gate.initialize(dir.path(), Role::Execution, &log).unwrap();
        assert!(gate.require_role(Role::Execution).is_ok());
        assert!(gate.require_role(Role::Planning).is_err());
    }
}
