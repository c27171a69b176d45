// sanitizer.rs — language sanitization for approval text (C14).
// Strips urgency/manipulation keywords and refuses outright when a pattern
// is detected, rather than silently approving doctored text.

use kaiza_errors::KaizaError;

const MANIPULATIVE_PATTERNS: &[&str] = &[
    "right now",
    "immediately",
    "urgent",
    "asap",
    "don't think",
    "just trust",
    "no time to review",
    "everyone else approved",
    "you'll be blamed",
    "last chance",
    "before it's too late",
];

/// Refuses if the text contains a known manipulation/urgency pattern;
/// otherwise returns the text unchanged. Sanitization here is a
/// detect-and-refuse gate, not a silent rewrite — a human approval
/// channel must never be quietly edited out from under the operator.
pub fn sanitize_approval_text(text: &str) -> Result<String, KaizaError> {
    let lower = text.to_lowercase();
    for pattern in MANIPULATIVE_PATTERNS {
        if lower.contains(pattern) {
            return Err(KaizaError::ManipulativeLanguageDetected(format!(
                "approval text contains a manipulation/urgency pattern: \"{pattern}\""
            )));
        }
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_passes_through() {
        let text = "Approving after reviewing the diff and the evidence bundle.";
        assert_eq!(sanitize_approval_text(text).unwrap(), text);
    }

    #[test]
    fn urgency_language_is_refused() {
        let err = sanitize_approval_text("Approve this ASAP, no time to review the details.").unwrap_err();
        assert_eq!(err.code().as_str(), "MANIPULATIVE_LANGUAGE_DETECTED");
    }

    #[test]
    fn social_pressure_language_is_refused() {
        let err = sanitize_approval_text("Everyone else approved this already, just trust me.").unwrap_err();
        assert_eq!(err.code().as_str(), "MANIPULATIVE_LANGUAGE_DETECTED");
    }

    #[test]
    fn detection_is_case_insensitive() {
        let err = sanitize_approval_text("URGENT: sign off now.").unwrap_err();
        assert_eq!(err.code().as_str(), "MANIPULATIVE_LANGUAGE_DETECTED");
    }
}
