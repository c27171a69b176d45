// resolver.rs — PathResolver: a single, total function resolve(kind, input)
// for every filesystem reference the kernel makes.
//
// Containment is checked after resolution: resolve, then verify the
// result still starts_with the locked root. Fail closed on any ambiguity
// (missing parent directories, non-existent targets) by resolving the
// deepest existing ancestor and re-joining the remainder.

use std::path::{Path, PathBuf};

use kaiza_errors::KaizaError;

/// Locks a workspace root for the lifetime of a session and resolves every
/// other path the kernel touches relative to it.
#[derive(Debug, Default)]
pub struct PathResolver {
    root: Option<PathBuf>,
}

impl PathResolver {
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Lock the workspace root. Accepts only an absolute path; normalizes
    /// and symlink-resolves it to its canonical real path. A second call —
    /// even with the same path — fails with `SESSION_ALREADY_INITIALIZED`.
    pub fn lock_workspace_root(&mut self, candidate: impl AsRef<Path>) -> Result<PathBuf, KaizaError> {
        if self.root.is_some() {
            return Err(KaizaError::SessionAlreadyInitialized);
        }
        let candidate = candidate.as_ref();
        if !candidate.is_absolute() {
            return Err(KaizaError::InvalidPath(format!(
                "workspace root must be absolute: {}",
                candidate.display()
            )));
        }
        let canonical = candidate.canonicalize().map_err(|source| {
            KaizaError::InvalidPath(format!(
                "cannot resolve workspace root {}: {source}",
                candidate.display()
            ))
        })?;
        if !canonical.is_dir() {
            return Err(KaizaError::InvalidPath(format!(
                "workspace root is not a directory: {}",
                canonical.display()
            )));
        }
        self.root = Some(canonical.clone());
        tracing::info!(root = %canonical.display(), "workspace root locked");
        Ok(canonical)
    }

    fn root(&self) -> Result<&Path, KaizaError> {
        self.root
            .as_deref()
            .ok_or(KaizaError::SessionNotInitialized)
    }

    pub fn root_path(&self) -> Result<PathBuf, KaizaError> {
        Ok(self.root()?.to_path_buf())
    }

    /// `<root>/.kaiza`
    pub fn kaiza_dir(&self) -> Result<PathBuf, KaizaError> {
        Ok(self.root()?.join(".kaiza"))
    }

    /// `<root>/docs/plans`
    pub fn plans_dir(&self) -> Result<PathBuf, KaizaError> {
        Ok(self.root()?.join("docs").join("plans"))
    }

    /// `<root>/docs/proposals`
    pub fn proposals_dir(&self) -> Result<PathBuf, KaizaError> {
        Ok(self.root()?.join("docs").join("proposals"))
    }

    /// `<root>/docs/reports`
    pub fn reports_dir(&self) -> Result<PathBuf, KaizaError> {
        Ok(self.root()?.join("docs").join("reports"))
    }

    /// `<root>/.kaiza/audit.log`
    pub fn audit_log_path(&self) -> Result<PathBuf, KaizaError> {
        Ok(self.kaiza_dir()?.join("audit.log"))
    }

    /// `<root>/.kaiza/audit.lock`
    pub fn audit_lock_path(&self) -> Result<PathBuf, KaizaError> {
        Ok(self.kaiza_dir()?.join("audit.lock"))
    }

    /// `<root>/.kaiza/kill_switch.json`
    pub fn kill_switch_path(&self) -> Result<PathBuf, KaizaError> {
        Ok(self.kaiza_dir()?.join("kill_switch.json"))
    }

    /// `<root>/.kaiza/attestation_secret.json`
    pub fn attestation_secret_path(&self) -> Result<PathBuf, KaizaError> {
        Ok(self.kaiza_dir()?.join("attestation_secret.json"))
    }

    /// `<root>/.kaiza/proposals-index.jsonl`
    pub fn proposals_index_path(&self) -> Result<PathBuf, KaizaError> {
        Ok(self.kaiza_dir()?.join("proposals-index.jsonl"))
    }

    /// `<root>/.kaiza/proposal-approvals.jsonl`
    pub fn proposal_approvals_path(&self) -> Result<PathBuf, KaizaError> {
        Ok(self.kaiza_dir()?.join("proposal-approvals.jsonl"))
    }

    /// Resolve a write target, rejecting `..` escapes and any path that
    /// would land outside the locked workspace root.
    pub fn resolve_write_target(&self, rel_or_abs: &str) -> Result<PathBuf, KaizaError> {
        let root = self.root()?;
        if contains_traversal(rel_or_abs) {
            return Err(KaizaError::PathTraversalBlocked(rel_or_abs.to_string()));
        }
        let candidate = Path::new(rel_or_abs);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            root.join(candidate)
        };
        let resolved = resolve_within(root, &joined)?;
        if !resolved.starts_with(root) {
            return Err(KaizaError::OutsideWorkspace(rel_or_abs.to_string()));
        }
        Ok(resolved)
    }

    /// `<plans_dir>/<plan_hash>.md`; refuses non-64-hex-char inputs.
    pub fn resolve_plan_path(&self, plan_hash: &str) -> Result<PathBuf, KaizaError> {
        if !is_hex64(plan_hash) {
            return Err(KaizaError::InvalidInputValue(format!(
                "plan hash is not 64 hex characters: {plan_hash}"
            )));
        }
        Ok(self.plans_dir()?.join(format!("{plan_hash}.md")))
    }
}

fn contains_traversal(input: &str) -> bool {
    let lowered = input.to_ascii_lowercase();
    input.contains("..") || lowered.contains("%2e%2e")
}

pub fn is_hex64(candidate: &str) -> bool {
    candidate.len() == 64 && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Resolve `joined` against `root` without requiring `joined` to exist:
/// canonicalize the deepest existing ancestor, then re-append the
/// non-existent tail. This lets callers resolve a write target for a file
/// that has not been created yet while still catching symlink escapes on
/// every ancestor that does exist.
fn resolve_within(root: &Path, joined: &Path) -> Result<PathBuf, KaizaError> {
    let mut existing = joined.to_path_buf();
    let mut tail: Vec<std::ffi::OsString> = Vec::new();
    loop {
        if existing.exists() {
            break;
        }
        match existing.file_name() {
            Some(name) => {
                tail.push(name.to_os_string());
                existing.pop();
            }
            None => break,
        }
    }
    let canonical_existing = if existing.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        existing.canonicalize().map_err(|source| {
            KaizaError::InvalidPath(format!("cannot resolve {}: {source}", existing.display()))
        })?
    };
    let mut result = canonical_existing;
    for component in tail.into_iter().rev() {
        result.push(component);
    }
    Ok(result)
}
