// patterns.rs — the universal denylist and per-language profiles (C8 layers 2-3).

use crate::language::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Placeholder,
    SilentFailure,
    DebugBypass,
    LanguageProfile,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Placeholder => "placeholder",
            Category::SilentFailure => "silent_failure",
            Category::DebugBypass => "debug_bypass",
            Category::LanguageProfile => "language_profile",
        }
    }
}

pub struct PatternRule {
    pub pattern: &'static str,
    pub category: Category,
    pub invariant_id: &'static str,
}

/// Layer 2: applies to every language, including `Language::Unknown`.
pub const UNIVERSAL_DENYLIST: &[PatternRule] = &[
    PatternRule { pattern: "TODO", category: Category::Placeholder, invariant_id: "NO_PLACEHOLDERS_NO_FALLBACKS" },
    PatternRule { pattern: "FIXME", category: Category::Placeholder, invariant_id: "NO_PLACEHOLDERS_NO_FALLBACKS" },
    PatternRule { pattern: "XXX", category: Category::Placeholder, invariant_id: "NO_PLACEHOLDERS_NO_FALLBACKS" },
    PatternRule { pattern: "pass", category: Category::Placeholder, invariant_id: "NO_PLACEHOLDERS_NO_FALLBACKS" },
    PatternRule { pattern: "catch (e) {}", category: Category::SilentFailure, invariant_id: "NO_PLACEHOLDERS_NO_FALLBACKS" },
    PatternRule { pattern: ".catch(() => {})", category: Category::SilentFailure, invariant_id: "NO_PLACEHOLDERS_NO_FALLBACKS" },
    PatternRule { pattern: "unwrap_or(", category: Category::SilentFailure, invariant_id: "NO_PLACEHOLDERS_NO_FALLBACKS" },
    PatternRule { pattern: "unwrap_or_default", category: Category::SilentFailure, invariant_id: "NO_PLACEHOLDERS_NO_FALLBACKS" },
    PatternRule { pattern: "orElse", category: Category::SilentFailure, invariant_id: "NO_PLACEHOLDERS_NO_FALLBACKS" },
    PatternRule { pattern: "getOrElse", category: Category::SilentFailure, invariant_id: "NO_PLACEHOLDERS_NO_FALLBACKS" },
    PatternRule { pattern: "console.log(", category: Category::DebugBypass, invariant_id: "DETERMINISM_REQUIRED" },
    PatternRule { pattern: "assert(false)", category: Category::DebugBypass, invariant_id: "DETERMINISM_REQUIRED" },
];

const RUST_PROFILE: &[PatternRule] = &[
    PatternRule { pattern: "unwrap()", category: Category::LanguageProfile, invariant_id: "RUST_REALITY_LOCK" },
    PatternRule { pattern: "expect(", category: Category::LanguageProfile, invariant_id: "RUST_REALITY_LOCK" },
    PatternRule { pattern: "panic!", category: Category::LanguageProfile, invariant_id: "RUST_REALITY_LOCK" },
    PatternRule { pattern: "todo!", category: Category::LanguageProfile, invariant_id: "RUST_REALITY_LOCK" },
    PatternRule { pattern: "unimplemented!", category: Category::LanguageProfile, invariant_id: "RUST_REALITY_LOCK" },
    PatternRule { pattern: "unsafe {", category: Category::LanguageProfile, invariant_id: "RUST_REALITY_LOCK" },
    PatternRule { pattern: "static mut", category: Category::LanguageProfile, invariant_id: "RUST_REALITY_LOCK" },
    PatternRule { pattern: "Box::leak(", category: Category::LanguageProfile, invariant_id: "RUST_REALITY_LOCK" },
    PatternRule { pattern: "#[allow(", category: Category::LanguageProfile, invariant_id: "RUST_REALITY_LOCK" },
];

const TS_JS_PROFILE: &[PatternRule] = &[
    PatternRule { pattern: ": any", category: Category::LanguageProfile, invariant_id: "DETERMINISM_REQUIRED" },
    PatternRule { pattern: "@ts-ignore", category: Category::LanguageProfile, invariant_id: "DETERMINISM_REQUIRED" },
    PatternRule { pattern: "Math.random()", category: Category::LanguageProfile, invariant_id: "DETERMINISM_REQUIRED" },
    PatternRule { pattern: "Date.now()", category: Category::LanguageProfile, invariant_id: "DETERMINISM_REQUIRED" },
];

const PYTHON_PROFILE: &[PatternRule] = &[
    PatternRule { pattern: "import random", category: Category::LanguageProfile, invariant_id: "DETERMINISM_REQUIRED" },
    PatternRule { pattern: "from random import", category: Category::LanguageProfile, invariant_id: "DETERMINISM_REQUIRED" },
    PatternRule { pattern: "import time", category: Category::LanguageProfile, invariant_id: "DETERMINISM_REQUIRED" },
    PatternRule { pattern: "time.time()", category: Category::LanguageProfile, invariant_id: "DETERMINISM_REQUIRED" },
    PatternRule { pattern: "except:", category: Category::LanguageProfile, invariant_id: "DETERMINISM_REQUIRED" },
];

/// Layer 3: per-language profile. Unknown-language files get no extra rules.
pub fn language_profile(language: Language) -> &'static [PatternRule] {
    match language {
        Language::Rust => RUST_PROFILE,
        Language::TypeScript | Language::JavaScript => TS_JS_PROFILE,
        Language::Python => PYTHON_PROFILE,
        Language::Markdown | Language::Unknown => &[],
    }
}
