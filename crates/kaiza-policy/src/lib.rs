//! # kaiza-policy
//!
//! The write-time policy engine (C8): path bounds, a universal denylist,
//! per-language pattern profiles, and the C7 intent co-requirement. Fail
//! closed — any missing input or layer hit refuses the write.

mod engine;
mod language;
mod patterns;

pub use engine::{evaluate, is_rust_profile_violation, Operation, PolicyReport, Violation, WriteRequest};
pub use language::{detect_language, Language};
pub use patterns::{language_profile, Category, PatternRule, UNIVERSAL_DENYLIST};
