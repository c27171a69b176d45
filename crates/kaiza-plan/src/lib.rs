//! # kaiza-plan
//!
//! Plan canonicalization, hashing, linting, and the hash-addressed plan
//! registry (C6). Plans are referenced only by hash; name-based lookup is
//! not supported.

mod canonical;
mod header;
mod linter;
mod plan;
mod registry;

pub use canonical::{canonicalize_plan, plan_hash, strip_header};
pub use header::PlanHeader;
pub use linter::{lint_plan, phase_ids_in, LintReport, LintViolation, LintViolationKind, CANONICAL_SECTIONS};
pub use plan::Plan;
pub use registry::PlanRegistry;
