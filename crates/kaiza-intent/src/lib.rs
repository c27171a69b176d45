//! # kaiza-intent
//!
//! Intent artifact parsing and validation (C7). Every non-exempt write
//! the kernel mediates must be accompanied by an intent artifact binding
//! it to the plan hash and phase id currently executing.
//!
//! ```
//! use kaiza_intent::{validate_intent, intent_hash};
//!
//! let plan_hash = "a".repeat(64);
//! let content = format!(
//!     "# Intent: src/a.txt\n\n## Purpose\nCreate the file.\n\n## Authority\nPlan Hash: {plan_hash}\nPhase ID: PHASE_1\n\n## Inputs\nNone.\n\n## Outputs\nThe written file.\n\n## Invariants\nThe file exists after the write.\n\n## Failure Modes\nDisk full.\n\n## Debug Signals\nExit code.\n\n## Out-of-Scope\nUnrelated files.\n"
//! );
//! validate_intent(&content, "src/a.txt", &plan_hash, "PHASE_1").unwrap();
//! let _ = intent_hash(&content);
//! ```

mod artifact;
mod validator;

pub use artifact::{intent_artifact_path, is_exempt, load_intent_content, EXEMPT_PREFIX};
pub use validator::{intent_hash, validate_intent, REQUIRED_SECTIONS};
