// registry.rs — the plan registry (C6): hash-addressed storage, approval,
// and re-validation at execution time (INV_PLAN_IMMUTABILITY,
// INV_PLAN_APPROVED).

use std::path::{Path, PathBuf};

use kaiza_errors::KaizaError;
use kaiza_path::is_hex64;

use crate::canonical::{canonicalize_plan, plan_hash, strip_header};
use crate::header::PlanHeader;
use crate::linter::{lint_plan, phase_ids_in};
use crate::plan::Plan;

pub struct PlanRegistry {
    plans_dir: PathBuf,
}

impl PlanRegistry {
    pub fn new(plans_dir: impl Into<PathBuf>) -> Self {
        Self {
            plans_dir: plans_dir.into(),
        }
    }

    fn plan_path(&self, hash: &str) -> Result<PathBuf, KaizaError> {
        if !is_hex64(hash) {
            return Err(KaizaError::InvalidInputValue(format!(
                "plan hash is not 64 hex characters: {hash}"
            )));
        }
        Ok(self.plans_dir.join(format!("{hash}.md")))
    }

    /// Lint, hash, write, and register a brand-new approved plan. Used only
    /// by `bootstrap_create_foundation_plan` (planning role), never by the
    /// execution path.
    pub fn approve_new_plan(&self, body: &str) -> Result<Plan, KaizaError> {
        let report = lint_plan(body);
        if !report.valid {
            return Err(KaizaError::PlanEnforcementFailed(format!(
                "plan failed lint: {:?}",
                report.violations
            )));
        }
        let hash = plan_hash(body);
        std::fs::create_dir_all(&self.plans_dir).map_err(|source| {
            KaizaError::FileWriteFailed {
                path: self.plans_dir.display().to_string(),
                source,
            }
        })?;
        // Stored in canonical normal form (header + canonical body + one
        // newline), so any post-approval edit to the file — even appended
        // whitespace the hash itself would not see — breaks the normal
        // form and refuses execution.
        let header = format!("<!-- ATLAS-GATE_PLAN_HASH: {hash} STATUS: APPROVED -->\n");
        let content = format!("{header}{}\n", canonicalize_plan(body));
        let path = self.plan_path(&hash)?;
        std::fs::write(&path, &content).map_err(|source| KaizaError::FileWriteFailed {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(plan_hash = %hash, "plan approved and stored");
        self.load(&hash)
    }

    /// Load a plan by hash, re-validating immutability, approval, and lint
    /// status every time.
    pub fn load(&self, hash: &str) -> Result<Plan, KaizaError> {
        let path = self.plan_path(hash)?;
        let content = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                KaizaError::PlanNotApproved(format!("no plan stored at hash {hash}"))
            } else {
                KaizaError::FileReadFailed {
                    path: path.display().to_string(),
                    source,
                }
            }
        })?;
        self.validate_loaded(hash, &path, &content)
    }

    fn validate_loaded(&self, hash: &str, path: &Path, content: &str) -> Result<Plan, KaizaError> {
        let header = PlanHeader::parse(content);
        let body = strip_header(content);
        let canonical = canonicalize_plan(content);
        let recomputed = kaiza_audit::hash_str(&canonical);

        if recomputed != hash {
            return Err(KaizaError::PlanEnforcementFailed(format!(
                "filename hash {hash} does not match recomputed hash {recomputed}"
            )));
        }
        // Stripping the header comment leaves the newline that followed it.
        let body_norm = body.strip_prefix('\n').unwrap_or(&body);
        if body_norm != format!("{canonical}\n") {
            return Err(KaizaError::PlanEnforcementFailed(format!(
                "plan {hash} on-disk bytes deviate from the approved canonical form"
            )));
        }
        match &header.embedded_hash {
            Some(embedded) if embedded == hash => {}
            Some(embedded) => {
                return Err(KaizaError::PlanEnforcementFailed(format!(
                    "header hash {embedded} does not match filename hash {hash}"
                )))
            }
            None => {
                return Err(KaizaError::PlanEnforcementFailed(
                    "plan is missing its hash header".to_string(),
                ))
            }
        }
        if !header.is_approved() {
            return Err(KaizaError::PlanNotApproved(format!(
                "plan {hash} is not STATUS: APPROVED"
            )));
        }
        let report = lint_plan(&body);
        if !report.valid {
            return Err(KaizaError::PlanEnforcementFailed(format!(
                "plan {hash} no longer passes lint: {:?}",
                report.violations
            )));
        }

        Ok(Plan {
            hash: hash.to_string(),
            path: path.to_path_buf(),
            header,
            phase_ids: phase_ids_in(&body),
            body,
        })
    }

    /// Every plan hash with a stored file (used by `list_plans` and by
    /// safe-halt recovery's "plan lint on all plans in the registry" gate).
    pub fn list_hashes(&self) -> Result<Vec<String>, KaizaError> {
        if !self.plans_dir.exists() {
            return Ok(Vec::new());
        }
        let mut hashes = Vec::new();
        for entry in std::fs::read_dir(&self.plans_dir).map_err(|source| {
            KaizaError::FileReadFailed {
                path: self.plans_dir.display().to_string(),
                source,
            }
        })? {
            let entry = entry.map_err(|e| KaizaError::InternalError(e.to_string()))?;
            if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                if is_hex64(stem) {
                    hashes.push(stem.to_string());
                }
            }
        }
        hashes.sort();
        Ok(hashes)
    }
}
