// artifact.rs — locating and loading intent artifacts for a write target.

use std::fs;
use std::path::{Path, PathBuf};

use kaiza_errors::KaizaError;

/// Files under this workspace-relative prefix never require an intent
/// artifact: they are kernel-generated reports, not agent-authored writes.
pub const EXEMPT_PREFIX: &str = "docs/reports/";

/// Intent artifacts live alongside the file they authorize, suffixed
/// `.intent.md`.
pub fn intent_artifact_path(target_path: &str) -> PathBuf {
    PathBuf::from(format!("{target_path}.intent.md"))
}

pub fn is_exempt(target_path: &str) -> bool {
    target_path.starts_with(EXEMPT_PREFIX)
}

/// Load the intent artifact content for `target_path`, resolved under
/// `root`. Returns `INTENT_ARTIFACT_MISSING` if absent and not exempt.
pub fn load_intent_content(root: &Path, target_path: &str) -> Result<Option<String>, KaizaError> {
    if is_exempt(target_path) {
        return Ok(None);
    }
    let artifact_path = root.join(intent_artifact_path(target_path));
    match fs::read_to_string(&artifact_path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(KaizaError::IntentArtifactMissing(
            format!("no intent artifact at {}", artifact_path.display()),
        )),
        Err(e) => Err(KaizaError::IntentArtifactMissing(format!(
            "could not read intent artifact at {}: {e}",
            artifact_path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn exempt_paths_skip_lookup() {
        assert!(is_exempt("docs/reports/audit.md"));
        assert!(!is_exempt("src/lib.rs"));
    }

    #[test]
    fn missing_artifact_is_reported() {
        let dir = tempdir().unwrap();
        let err = load_intent_content(dir.path(), "src/lib.rs").unwrap_err();
        assert_eq!(err.code().as_str(), "INTENT_ARTIFACT_MISSING");
    }

    #[test]
    fn exempt_target_returns_none_without_touching_disk() {
        let dir = tempdir().unwrap();
        let result = load_intent_content(dir.path(), "docs/reports/x.md").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn present_artifact_is_loaded() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/lib.rs.intent.md"), "content").unwrap();
        let result = load_intent_content(dir.path(), "src/lib.rs").unwrap();
        assert_eq!(result.as_deref(), Some("content"));
    }
}
