// canonical.rs — the plan-side canonicalizer: string-level, distinct
// from the JSON one in kaiza-audit::canonical_json.
//
// Steps, in order: (a) locate and remove the header comment carrying the
// hash/status marker, (b) trim leading/trailing whitespace, (c) right-trim
// each line, (d) join with `\n`.

use std::sync::OnceLock;

use regex::Regex;

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)<!--\s*ATLAS-GATE_PLAN_HASH:.*?-->").expect("static pattern compiles")
    })
}

/// Remove the hash/status header comment, if present.
pub fn strip_header(content: &str) -> String {
    header_pattern().replace(content, "").into_owned()
}

/// Canonicalize plan content for hashing: strip header, trim as a whole,
/// right-trim every line, rejoin with `\n`.
pub fn canonicalize_plan(content: &str) -> String {
    let stripped = strip_header(content);
    let trimmed = stripped.trim();
    trimmed
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn plan_hash(content: &str) -> String {
    kaiza_audit::hash_str(&canonicalize_plan(content))
}
