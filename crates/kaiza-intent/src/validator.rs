// validator.rs — the intent artifact validator (C7).
//
// An intent artifact is a nine-section Markdown document: a `# Intent: <P>`
// title followed by eight `## <Section>` bodies in a fixed order. It binds
// a write to the plan hash and phase id that authorize it.

use std::sync::OnceLock;

use kaiza_errors::KaizaError;
use regex::Regex;

pub const REQUIRED_SECTIONS: [&str; 8] = [
    "Purpose",
    "Authority",
    "Inputs",
    "Outputs",
    "Invariants",
    "Failure Modes",
    "Debug Signals",
    "Out-of-Scope",
];

const CONDITIONAL_WORDS: [&str; 3] = ["might", "should", "could"];
const WORK_MARKERS: [&str; 3] = ["TODO", "FIXME", "HACK"];

fn title_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^#\s+Intent:\s*(.+?)\s*$").expect("static pattern compiles"))
}

fn section_header() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^##\s+(.+?)\s*$").expect("static pattern compiles"))
}

fn code_symbol_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"`|\{|\}|;|=>").expect("static pattern compiles"))
}

fn code_fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"```").expect("static pattern compiles"))
}

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\d{4}-\d{2}-\d{2}([T ]\d{2}:\d{2}(:\d{2})?)?").expect("static pattern compiles")
    })
}

fn author_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\bauthor\s*:|\bwritten\s+by\b|@[a-z0-9_-]+").expect("static pattern compiles")
    })
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?://\S+").expect("static pattern compiles"))
}

fn plan_hash_field() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Plan Hash:\s*([0-9a-fA-F]{64})").expect("static pattern compiles")
    })
}

fn phase_id_field() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"Phase ID:\s*(PHASE_\S+)").expect("static pattern compiles"))
}

struct Sections {
    title_target: Option<String>,
    bodies: Vec<(String, String)>,
}

fn parse(content: &str) -> Sections {
    let title_target = title_pattern().captures(content).map(|c| c[1].trim().to_string());
    let headers: Vec<_> = section_header().captures_iter(content).collect();
    let mut bodies = Vec::new();
    for (i, cap) in headers.iter().enumerate() {
        let name = cap[1].trim().to_string();
        let start = cap.get(0).unwrap().end();
        let end = headers
            .get(i + 1)
            .map(|n| n.get(0).unwrap().start())
            .unwrap_or(content.len());
        bodies.push((name, content[start..end].to_string()));
    }
    Sections { title_target, bodies }
}

/// Validate an intent artifact's content against the write it authorizes.
///
/// `target_path` is the workspace-relative path being written (without the
/// `.intent.md` suffix); `plan_hash`/`phase_id` are the ones authorizing
/// the current write.
pub fn validate_intent(
    content: &str,
    target_path: &str,
    plan_hash: &str,
    phase_id: &str,
) -> Result<(), KaizaError> {
    let sections = parse(content);

    match &sections.title_target {
        Some(t) if t == target_path => {}
        Some(other) => {
            return Err(KaizaError::IntentPathConsistency(format!(
                "intent title names '{other}', expected '{target_path}'"
            )))
        }
        None => {
            return Err(KaizaError::IntentSchemaInvalid(
                "missing '# Intent: <path>' title".to_string(),
            ))
        }
    }

    let found_names: Vec<&str> = sections.bodies.iter().map(|(n, _)| n.as_str()).collect();
    if found_names != REQUIRED_SECTIONS.to_vec() {
        return Err(KaizaError::IntentSchemaInvalid(format!(
            "sections must appear in order {REQUIRED_SECTIONS:?}, found {found_names:?}"
        )));
    }
    for (name, body) in &sections.bodies {
        if body.trim().is_empty() {
            return Err(KaizaError::IntentSchemaInvalid(format!(
                "section '{name}' is empty"
            )));
        }
    }

    let authority = sections
        .bodies
        .iter()
        .find(|(n, _)| n == "Authority")
        .map(|(_, b)| b.as_str())
        .unwrap_or_default();
    let embedded_hash = plan_hash_field().captures(authority).map(|c| c[1].to_ascii_lowercase());
    let embedded_phase = phase_id_field().captures(authority).map(|c| c[1].to_string());
    if embedded_hash.as_deref() != Some(plan_hash) {
        return Err(KaizaError::IntentAuthorityDrift(format!(
            "Authority plan hash {embedded_hash:?} does not match executing plan {plan_hash}"
        )));
    }
    if embedded_phase.as_deref() != Some(phase_id) {
        return Err(KaizaError::IntentAuthorityDrift(format!(
            "Authority phase id {embedded_phase:?} does not match executing phase {phase_id}"
        )));
    }

    let purpose = sections
        .bodies
        .iter()
        .find(|(n, _)| n == "Purpose")
        .map(|(_, b)| b.as_str())
        .unwrap_or_default();
    if code_symbol_pattern().is_match(purpose) {
        return Err(KaizaError::IntentContainsForbiddenPatterns(
            "Purpose contains code symbols".to_string(),
        ));
    }

    let invariants = sections
        .bodies
        .iter()
        .find(|(n, _)| n == "Invariants")
        .map(|(_, b)| b.as_str())
        .unwrap_or_default();
    if code_symbol_pattern().is_match(invariants) {
        return Err(KaizaError::IntentContainsForbiddenPatterns(
            "Invariants contains code symbols".to_string(),
        ));
    }
    let lowered_invariants = invariants.to_ascii_lowercase();
    for word in CONDITIONAL_WORDS {
        if Regex::new(&format!(r"\b{word}\b")).unwrap().is_match(&lowered_invariants) {
            return Err(KaizaError::IntentContainsForbiddenPatterns(format!(
                "Invariants contains conditional language '{word}'"
            )));
        }
    }
    if lowered_invariants.contains("if") && lowered_invariants.contains("then") {
        return Err(KaizaError::IntentContainsForbiddenPatterns(
            "Invariants contains conditional 'if ... then' language".to_string(),
        ));
    }

    if code_fence_pattern().is_match(content) {
        return Err(KaizaError::IntentContainsForbiddenPatterns(
            "contains a triple-backtick code fence".to_string(),
        ));
    }
    if timestamp_pattern().is_match(content) {
        return Err(KaizaError::IntentContainsForbiddenPatterns(
            "contains a timestamp".to_string(),
        ));
    }
    if author_pattern().is_match(content) {
        return Err(KaizaError::IntentContainsForbiddenPatterns(
            "contains an author attribution".to_string(),
        ));
    }
    for marker in WORK_MARKERS {
        if content.contains(marker) {
            return Err(KaizaError::IntentContainsForbiddenPatterns(format!(
                "contains work marker '{marker}'"
            )));
        }
    }
    let outside_authority: String = sections
        .bodies
        .iter()
        .filter(|(n, _)| n != "Authority")
        .map(|(_, b)| b.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    if url_pattern().is_match(&outside_authority) {
        return Err(KaizaError::IntentContainsForbiddenPatterns(
            "contains a bare URL outside Authority".to_string(),
        ));
    }

    Ok(())
}

/// Deterministic content hash: identical content always hashes identically.
pub fn intent_hash(content: &str) -> String {
    kaiza_audit::hash_str(content)
}
