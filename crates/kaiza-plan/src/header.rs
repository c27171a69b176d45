// header.rs — parsing the HTML-comment header every plan file carries:
// `<!-- ATLAS-GATE_PLAN_HASH: <hex64> ... STATUS: APPROVED -->`.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanHeader {
    pub embedded_hash: Option<String>,
    pub status: Option<String>,
}

fn hash_field() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"ATLAS-GATE_PLAN_HASH:\s*([0-9a-fA-F]{64})").expect("static pattern compiles")
    })
}

fn status_field() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"STATUS:\s*(\w+)").expect("static pattern compiles"))
}

impl PlanHeader {
    pub fn parse(content: &str) -> PlanHeader {
        let embedded_hash = hash_field()
            .captures(content)
            .map(|c| c[1].to_ascii_lowercase());
        let status = status_field().captures(content).map(|c| c[1].to_string());
        PlanHeader {
            embedded_hash,
            status,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status.as_deref() == Some("APPROVED")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hash_and_status() {
        let content = "<!-- ATLAS-GATE_PLAN_HASH: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa STATUS: APPROVED -->\nBody";
        let header = PlanHeader::parse(content);
        assert_eq!(header.embedded_hash.as_deref(), Some("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
        assert!(header.is_approved());
    }

    #[test]
    fn missing_header_yields_none() {
        let header = PlanHeader::parse("# Just a body\n");
        assert!(header.embedded_hash.is_none());
        assert!(!header.is_approved());
    }
}
