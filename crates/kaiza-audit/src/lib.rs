//! # kaiza-audit
//!
//! The append-only, hash-chained, redacted audit ledger (C4) and the
//! directory-based file lock that serializes access to it (C3).
//!
//! ```
//! use kaiza_audit::{AuditEntry, AuditLog, EntryResult};
//! use uuid::Uuid;
//!
//! # let dir = tempfile::tempdir().unwrap();
//! let log = AuditLog::open(dir.path().join(".kaiza/audit.log"), dir.path().join(".kaiza/audit.lock")).unwrap();
//! let entry = AuditEntry::new(Uuid::new_v4(), "EXECUTION", "/w", "write_file", EntryResult::Ok);
//! let written = log.append(entry).unwrap();
//! assert_eq!(written.seq, 1);
//! assert!(log.verify_chain().unwrap().valid);
//! ```

mod buffer;
mod entry;
mod hasher;
mod lock;
mod log;
mod redact;

pub use buffer::PreSessionBuffer;
pub use entry::{AuditEntry, EntryResult, GENESIS};
pub use hasher::{canonical_json, hash_bytes, hash_json, hash_str};
pub use lock::FileLock;
pub use log::{AuditLog, VerifyFailure, VerifyFailureKind, VerifyReport};
pub use redact::redact;
