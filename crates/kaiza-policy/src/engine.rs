// engine.rs — the write-time policy engine (C8).
//
// Invoked after path and plan authorization, before the filesystem call.
// Four layers run in order and the first hit wins: path bounds, the
// universal denylist, the language profile, then the C7 intent
// co-requirement. Any missing required input refuses the write outright.

use kaiza_errors::KaizaError;
use kaiza_path::PathResolver;

use crate::language::{detect_language, Language};
use crate::patterns::{language_profile, Category, UNIVERSAL_DENYLIST};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Modify,
}

/// One pattern hit against the write's content.
#[derive(Debug, Clone)]
pub struct Violation {
    pub pattern: String,
    pub line: usize,
    pub category: Category,
    pub invariant_id: &'static str,
}

/// The full set of inputs the engine requires for a single write.
/// Every field is required; a missing one refuses the write.
pub struct WriteRequest<'a> {
    pub workspace_root: Option<&'a str>,
    pub role: Option<&'a str>,
    pub session_id: Option<&'a str>,
    pub tool_name: Option<&'a str>,
    pub plan_hash: Option<&'a str>,
    pub phase_id: Option<&'a str>,
    pub operation: Option<Operation>,
    pub path: Option<&'a str>,
    pub content: Option<&'a str>,
    pub content_hash: Option<&'a str>,
    pub content_length: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct PolicyReport {
    pub detected_language: Language,
    pub violations: Vec<Violation>,
}

impl PolicyReport {
    pub fn is_pass(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Whether a set of violations should surface as `RUST_POLICY_VIOLATION`
/// (a Rust language-profile hit) rather than the generic `POLICY_VIOLATION`.
pub fn is_rust_profile_violation(language: Language, violations: &[Violation]) -> bool {
    language == Language::Rust
        && violations
            .iter()
            .any(|v| matches!(v.category, Category::LanguageProfile))
}

/// Evaluate a single write against the four policy layers. `resolver` must
/// already have its workspace root locked. `intent_check` performs C7's
/// validation for layer 4 and is only invoked once layers 1-3 pass.
pub fn evaluate(
    resolver: &PathResolver,
    request: &WriteRequest,
    intent_check: impl FnOnce() -> Result<(), KaizaError>,
) -> Result<PolicyReport, KaizaError> {
    require(request.workspace_root, "workspace_root")?;
    require(request.role, "role")?;
    require(request.session_id, "session_id")?;
    require(request.tool_name, "tool_name")?;
    require(request.plan_hash, "plan_hash")?;
    require(request.phase_id, "phase_id")?;
    if request.operation.is_none() {
        return Err(KaizaError::MissingRequiredField("operation".to_string()));
    }
    let path = require(request.path, "path")?;
    let content = require(request.content, "content")?;
    require(request.content_hash, "content_hash")?;
    if request.content_length.is_none() {
        return Err(KaizaError::MissingRequiredField("content_length".to_string()));
    }

    // Layer 1: path bounds, re-verified independently of C1's own check.
    resolver.resolve_write_target(path)?;

    let language = detect_language(path, content);

    let mut violations = Vec::new();
    scan(content, UNIVERSAL_DENYLIST, &mut violations);
    scan(content, language_profile(language), &mut violations);

    if !violations.is_empty() {
        tracing::warn!(path, hits = violations.len(), language = language.as_str(), "policy scan refused a write");
        return Ok(PolicyReport {
            detected_language: language,
            violations,
        });
    }

    // Layer 4: intent co-requirement.
    intent_check()?;

    Ok(PolicyReport {
        detected_language: language,
        violations: Vec::new(),
    })
}

fn require<'a>(field: Option<&'a str>, name: &str) -> Result<&'a str, KaizaError> {
    field.ok_or_else(|| KaizaError::MissingRequiredField(name.to_string()))
}

fn scan(content: &str, rules: &[crate::patterns::PatternRule], out: &mut Vec<Violation>) {
    for (i, line) in content.lines().enumerate() {
        for rule in rules {
            // "pass" refuses only a bare statement line, not every word
            // that happens to contain it.
            let hit = if rule.pattern == "pass" {
                line.trim() == "pass"
            } else {
                line.contains(rule.pattern)
            };
            if hit {
                out.push(Violation {
                    pattern: rule.pattern.to_string(),
                    line: i + 1,
                    category: rule.category,
                    invariant_id: rule.invariant_id,
                });
            }
        }
    }
}
