// filter.rs — the replay request: which slice of the ledger to analyze.

#[derive(Debug, Clone)]
pub struct ReplayFilter {
    pub plan_hash: String,
    pub phase_id: Option<String>,
    pub tool: Option<String>,
    pub seq_range: Option<(u64, u64)>,
}

impl ReplayFilter {
    pub fn new(plan_hash: impl Into<String>) -> Self {
        Self {
            plan_hash: plan_hash.into(),
            phase_id: None,
            tool: None,
            seq_range: None,
        }
    }

    pub fn with_phase(mut self, phase_id: impl Into<String>) -> Self {
        self.phase_id = Some(phase_id.into());
        self
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn with_seq_range(mut self, start: u64, end: u64) -> Self {
        self.seq_range = Some((start, end));
        self
    }

    /// An entry matches when its `plan_hash` is this filter's plan, or
    /// when it is a plan-scoped mutation carrying no `plan_hash` at all —
    /// an orphaned write is exactly the kind of authority gap a replay of
    /// this plan needs to surface, and it can never match any filter's
    /// plan_hash otherwise. Read-only and system-scoped entries without a
    /// plan stay out of every timeline.
    pub fn matches(&self, entry: &kaiza_audit::AuditEntry) -> bool {
        match entry.plan_hash.as_deref() {
            Some(hash) if hash != self.plan_hash => return false,
            Some(_) => {}
            None => {
                if !crate::engine::is_plan_scoped_tool(&entry.tool) {
                    return false;
                }
            }
        }
        if let Some(phase) = &self.phase_id {
            if entry.phase_id.as_deref() != Some(phase.as_str()) {
                return false;
            }
        }
        if let Some(tool) = &self.tool {
            if entry.tool != *tool {
                return false;
            }
        }
        if let Some((start, end)) = self.seq_range {
            if entry.seq < start || entry.seq > end {
                return false;
            }
        }
        true
    }
}
