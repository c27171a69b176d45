//! # kaiza-replay
//!
//! Pure, side-effect-free analysis of the audit ledger (C10). Given a
//! filter over `(plan_hash, phase_id, tool, seq_range)`, the engine
//! reconstructs a timeline and classifies findings from a closed set of
//! 18 codes across six families. It never re-invokes a tool and never
//! writes a file of its own; the caller is responsible for appending the
//! one audit entry that records the replay itself.
//!
//! ```
//! use kaiza_audit::{AuditEntry, EntryResult, VerifyReport};
//! use kaiza_replay::{run_replay, ReplayFilter};
//! use uuid::Uuid;
//!
//! let mut entry = AuditEntry::new(Uuid::nil(), "EXECUTION", "/w", "write_file", EntryResult::Ok);
//! entry.seq = 1;
//! entry.plan_hash = Some("a".repeat(64));
//! entry.phase_id = Some("PHASE_ONE".to_string());
//! entry.result_hash = Some("b".repeat(64));
//!
//! let chain = VerifyReport { valid: true, status: "PASS".to_string(), entries: 1, failures: Vec::new() };
//! let filter = ReplayFilter::new("a".repeat(64));
//! let report = run_replay(&[entry], &chain, &filter);
//! assert_eq!(report.verdict.as_str(), "PASS");
//! ```

mod engine;
mod filter;
mod finding;
mod report;

pub use engine::{is_mutating_tool, is_plan_scoped_tool, run_replay, ReplayReport, Verdict, READ_ONLY_TOOLS};
pub use filter::ReplayFilter;
pub use finding::{Finding, FindingCode, FindingFamily};
pub use report::render_replay_report;
