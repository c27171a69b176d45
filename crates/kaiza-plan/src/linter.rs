// linter.rs — decides whether a plan is structurally enforceable before
// approval.
//
// Plan bodies are Markdown with `## <Section>` headers for the seven
// mandatory top-level sections and `### <PHASE_ID>` sub-headers inside
// "Phase Definitions" for each phase. Phase fields are bullet lines of the
// form `- **Field Name:** value`.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

pub const CANONICAL_SECTIONS: [&str; 7] = [
    "Metadata",
    "Scope & Constraints",
    "Phase Definitions",
    "Path Allowlist",
    "Verification Gates",
    "Forbidden Actions",
    "Rollback Policy",
];

const PHASE_FIELDS: [&str; 8] = [
    "Phase ID",
    "Objective",
    "Allowed operations",
    "Forbidden operations",
    "Required intent artifacts",
    "Verification commands",
    "Expected outcomes",
    "Failure stop conditions",
];

const AMBIGUOUS_PHRASES: [&str; 6] = [
    "may",
    "should",
    "could",
    "if possible",
    "try to",
    "use best judgment",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LintViolationKind {
    MissingSection,
    SectionOutOfOrder,
    DuplicateSection,
    PhaseMissingField,
    PhaseIdInvalid,
    PhaseIdDuplicate,
    ObjectiveContainsCodeSymbols,
    PathAllowlistTraversal,
    PathAllowlistAbsoluteOutsideWorkspace,
    PathAllowlistUnresolvedVariable,
    AmbiguousLanguage,
}

#[derive(Debug, Clone, Serialize)]
pub struct LintViolation {
    pub kind: LintViolationKind,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LintReport {
    pub valid: bool,
    pub violations: Vec<LintViolation>,
}

fn section_header() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^##\s+(.+?)\s*$").expect("static pattern compiles"))
}

fn phase_header() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^###\s+(.+?)\s*$").expect("static pattern compiles"))
}

fn phase_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9_]+$").expect("static pattern compiles"))
}

fn code_symbol_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"`|\{|\}|;|=>").expect("static pattern compiles"))
}

fn field_value(block: &str, field: &str) -> Option<String> {
    let pattern = format!(r"(?m)^\-\s*\*\*{}\s*:\*\*\s*(.+)$", regex::escape(field));
    Regex::new(&pattern)
        .ok()
        .and_then(|re| re.captures(block))
        .map(|c| c[1].trim().to_string())
}

fn contains_ambiguous_language(text: &str) -> Option<String> {
    let lowered = text.to_ascii_lowercase();
    for phrase in AMBIGUOUS_PHRASES {
        let pattern = format!(r"\b{}\b", regex::escape(phrase));
        if Regex::new(&pattern).unwrap().is_match(&lowered) {
            return Some(phrase.to_string());
        }
    }
    None
}

/// Split `content` into an ordered list of (section name, body) pairs using
/// `## ` headers as boundaries.
fn split_sections(content: &str) -> Vec<(String, String)> {
    let headers: Vec<_> = section_header().captures_iter(content).collect();
    let mut sections = Vec::new();
    for (i, cap) in headers.iter().enumerate() {
        let name = cap[1].trim().to_string();
        let start = cap.get(0).unwrap().end();
        let end = headers
            .get(i + 1)
            .map(|next| next.get(0).unwrap().start())
            .unwrap_or(content.len());
        sections.push((name, content[start..end].to_string()));
    }
    sections
}

fn split_phase_blocks(section_body: &str) -> Vec<(String, String)> {
    let headers: Vec<_> = phase_header().captures_iter(section_body).collect();
    let mut blocks = Vec::new();
    for (i, cap) in headers.iter().enumerate() {
        let name = cap[1].trim().to_string();
        let start = cap.get(0).unwrap().end();
        let end = headers
            .get(i + 1)
            .map(|next| next.get(0).unwrap().start())
            .unwrap_or(section_body.len());
        blocks.push((name, section_body[start..end].to_string()));
    }
    blocks
}

/// Extract the phase ids declared under "Phase Definitions", in document
/// order, without re-running the full lint.
pub fn phase_ids_in(content: &str) -> Vec<String> {
    let sections = split_sections(content);
    sections
        .iter()
        .find(|(n, _)| n == "Phase Definitions")
        .map(|(_, body)| split_phase_blocks(body).into_iter().map(|(id, _)| id).collect())
        .unwrap_or_default()
}

/// Lint a plan body (the content *after* the hash/status header has been
/// stripped). Returns every violation found, not just the first.
pub fn lint_plan(content: &str) -> LintReport {
    let mut violations = Vec::new();
    let sections = split_sections(content);
    let found_names: Vec<&str> = sections.iter().map(|(name, _)| name.as_str()).collect();

    let mut seen = HashSet::new();
    for name in &found_names {
        if !seen.insert(*name) {
            violations.push(LintViolation {
                kind: LintViolationKind::DuplicateSection,
                detail: format!("section '{name}' appears more than once"),
            });
        }
    }

    for required in CANONICAL_SECTIONS {
        if !found_names.contains(&required) {
            violations.push(LintViolation {
                kind: LintViolationKind::MissingSection,
                detail: format!("missing required section '{required}'"),
            });
        }
    }

    let canonical_present: Vec<&str> = found_names
        .iter()
        .copied()
        .filter(|n| CANONICAL_SECTIONS.contains(n))
        .collect();
    let mut sorted = canonical_present.clone();
    sorted.sort_by_key(|n| CANONICAL_SECTIONS.iter().position(|c| c == n).unwrap());
    if canonical_present != sorted {
        violations.push(LintViolation {
            kind: LintViolationKind::SectionOutOfOrder,
            detail: format!("sections out of canonical order: {canonical_present:?}"),
        });
    }

    let mut seen_phase_ids = HashSet::new();
    if let Some((_, phase_section)) = sections.iter().find(|(n, _)| n == "Phase Definitions") {
        let blocks = split_phase_blocks(phase_section);
        if blocks.is_empty() {
            violations.push(LintViolation {
                kind: LintViolationKind::PhaseMissingField,
                detail: "Phase Definitions section contains no phases".to_string(),
            });
        }
        for (header_name, block) in &blocks {
            for field in PHASE_FIELDS {
                match field_value(block, field) {
                    None => violations.push(LintViolation {
                        kind: LintViolationKind::PhaseMissingField,
                        detail: format!("phase '{header_name}' missing field '{field}'"),
                    }),
                    Some(value) if field == "Objective" => {
                        if code_symbol_pattern().is_match(&value) {
                            violations.push(LintViolation {
                                kind: LintViolationKind::ObjectiveContainsCodeSymbols,
                                detail: format!("phase '{header_name}' objective contains code symbols"),
                            });
                        }
                        if let Some(phrase) = contains_ambiguous_language(&value) {
                            violations.push(LintViolation {
                                kind: LintViolationKind::AmbiguousLanguage,
                                detail: format!(
                                    "phase '{header_name}' objective uses ambiguous language '{phrase}'"
                                ),
                            });
                        }
                    }
                    Some(_) => {}
                }
            }
            if !phase_id_pattern().is_match(header_name) {
                violations.push(LintViolation {
                    kind: LintViolationKind::PhaseIdInvalid,
                    detail: format!("phase id '{header_name}' must match [A-Z0-9_]+"),
                });
            } else if !seen_phase_ids.insert(header_name.clone()) {
                violations.push(LintViolation {
                    kind: LintViolationKind::PhaseIdDuplicate,
                    detail: format!("duplicate phase id '{header_name}'"),
                });
            }
        }
    }

    if let Some((_, allowlist)) = sections.iter().find(|(n, _)| n == "Path Allowlist") {
        for line in allowlist.lines() {
            let trimmed = line.trim_start_matches('-').trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.contains("..") {
                violations.push(LintViolation {
                    kind: LintViolationKind::PathAllowlistTraversal,
                    detail: format!("path allowlist entry contains '..': {trimmed}"),
                });
            }
            if trimmed.starts_with('/') {
                violations.push(LintViolation {
                    kind: LintViolationKind::PathAllowlistAbsoluteOutsideWorkspace,
                    detail: format!("path allowlist entry is an absolute path: {trimmed}"),
                });
            }
            if trimmed.contains('$') || (trimmed.contains('<') && trimmed.contains('>')) {
                violations.push(LintViolation {
                    kind: LintViolationKind::PathAllowlistUnresolvedVariable,
                    detail: format!("path allowlist entry has an unresolved variable: {trimmed}"),
                });
            }
        }
    }

    LintReport {
        valid: violations.is_empty(),
        violations,
    }
}
