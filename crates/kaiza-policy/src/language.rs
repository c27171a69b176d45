// language.rs — extension-based detection with content-heuristic fallback.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Rust,
    TypeScript,
    JavaScript,
    Python,
    Markdown,
    Unknown,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Markdown => "markdown",
            Language::Unknown => "unknown",
        }
    }
}

/// Detect language from a workspace-relative path, falling back to content
/// heuristics when the extension is unrecognized.
pub fn detect_language(path: &str, content: &str) -> Language {
    let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "rs" => return Language::Rust,
        "ts" | "tsx" => return Language::TypeScript,
        "js" | "mjs" | "cjs" | "jsx" => return Language::JavaScript,
        "py" | "pyi" => return Language::Python,
        "md" | "markdown" => return Language::Markdown,
        _ => {}
    }
    detect_from_content(content)
}

fn detect_from_content(content: &str) -> Language {
    if content.contains("fn ") || content.contains("impl ") {
        Language::Rust
    } else if content.contains("def ") || content.contains("import ") {
        Language::Python
    } else {
        Language::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_takes_priority() {
        assert_eq!(detect_language("src/a.rs", ""), Language::Rust);
        assert_eq!(detect_language("src/a.py", ""), Language::Python);
        assert_eq!(detect_language("src/a.tsx", ""), Language::TypeScript);
        assert_eq!(detect_language("src/a.mjs", ""), Language::JavaScript);
    }

    #[test]
    fn falls_back_to_content_heuristics() {
        assert_eq!(detect_language("src/a.unknown", "fn main() {}"), Language::Rust);
        assert_eq!(detect_language("src/a.unknown", "def main():"), Language::Python);
        assert_eq!(detect_language("src/a.unknown", "nothing recognizable"), Language::Unknown);
    }
}
