// plan.rs — the Plan entity.

use std::path::PathBuf;

use crate::header::PlanHeader;

#[derive(Debug, Clone)]
pub struct Plan {
    pub hash: String,
    pub path: PathBuf,
    pub header: PlanHeader,
    pub body: String,
    pub phase_ids: Vec<String>,
}

impl Plan {
    pub fn has_phase(&self, phase_id: &str) -> bool {
        self.phase_ids.iter().any(|p| p == phase_id)
    }

    /// Entries of the plan's Path Allowlist section, in document order.
    pub fn path_allowlist(&self) -> Vec<String> {
        let mut entries = Vec::new();
        let mut in_section = false;
        for line in self.body.lines() {
            let trimmed = line.trim();
            if let Some(header) = trimmed.strip_prefix("## ") {
                in_section = header.trim() == "Path Allowlist";
                continue;
            }
            if in_section {
                if let Some(entry) = trimmed.strip_prefix("- ") {
                    entries.push(entry.trim().to_string());
                }
            }
        }
        entries
    }

    /// Whether a workspace-relative write target is covered by the
    /// allowlist. An entry ending in `/**` covers everything beneath that
    /// directory; every other entry must match the path exactly.
    pub fn allows_path(&self, rel_path: &str) -> bool {
        self.path_allowlist().iter().any(|entry| {
            match entry.strip_suffix("/**") {
                Some(prefix) => rel_path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/') && rest.len() > 1),
                None => entry == rel_path,
            }
        })
    }
}
