// log.rs — AuditLog: the append-only, hash-chained, fail-closed ledger
// (C4).

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use kaiza_errors::KaizaError;
use serde_json::Value;

use crate::entry::{AuditEntry, GENESIS};
use crate::hasher::{canonical_json, hash_str};
use crate::lock::FileLock;

pub struct AuditLog {
    path: PathBuf,
    lock_path: PathBuf,
}

/// Outcome of walking the ledger end to end.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VerifyReport {
    pub valid: bool,
    pub status: String,
    pub entries: u64,
    pub failures: Vec<VerifyFailure>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct VerifyFailure {
    pub line: u64,
    pub kind: VerifyFailureKind,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyFailureKind {
    InvalidJson,
    SequenceGap,
    BrokenChain,
    HashMismatch,
}

impl AuditLog {
    /// Open (or create the parent directories for) the ledger at `path`,
    /// using `lock_path` as the C3 directory mutex.
    pub fn open(path: impl Into<PathBuf>, lock_path: impl Into<PathBuf>) -> Result<Self, KaizaError> {
        let path = path.into();
        let lock_path = lock_path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| {
                KaizaError::AuditAppendFailed(format!(
                    "cannot prepare ledger directory {}: {source}",
                    parent.display()
                ))
            })?;
        }
        Ok(Self { path, lock_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Force the ledger file to durable storage. Used by the kill-switch's
    /// safe-halt routine before it verifies the chain.
    pub fn fsync(&self) -> Result<(), KaizaError> {
        let file = OpenOptions::new().read(true).open(&self.path).map_err(|source| {
            KaizaError::AuditAppendFailed(format!(
                "open ledger {} for fsync: {source}",
                self.path.display()
            ))
        })?;
        file.sync_all().map_err(|e| KaizaError::AuditAppendFailed(format!("fsync ledger: {e}")))
    }

    /// Append one entry under the C3 lock. Fills in `ts` (already set by
    /// the caller via `AuditEntry::new`), `seq`, `prev_hash`, and
    /// `entry_hash`, then appends exactly one `\n`-terminated line. Never
    /// truncates or rewrites (INV_AUDIT_APPEND_ONLY).
    pub fn append(&self, mut entry: AuditEntry) -> Result<AuditEntry, KaizaError> {
        let _lock = FileLock::acquire(&self.lock_path)?;

        let (last_seq, last_hash) = self.tail_under_lock()?;
        entry.seq = last_seq + 1;
        entry.prev_hash = last_hash;
        entry.entry_hash = None;

        let canonical = canonical_json(&entry.canonical_form());
        let entry_hash = hash_str(&canonical);
        entry.entry_hash = Some(entry_hash);

        let line = serde_json::to_string(&entry)
            .map_err(|e| KaizaError::AuditAppendFailed(format!("serialize entry: {e}")))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| {
                KaizaError::AuditAppendFailed(format!(
                    "open ledger {} for append: {source}",
                    self.path.display()
                ))
            })?;
        writeln!(file, "{line}")
            .map_err(|e| KaizaError::AuditAppendFailed(format!("write ledger line: {e}")))?;
        file.flush()
            .map_err(|e| KaizaError::AuditAppendFailed(format!("flush ledger: {e}")))?;

        Ok(entry)
    }

    /// Read the last entry's `seq`/`entry_hash` to compute the next entry's
    /// `seq`/`prev_hash`. Must be called with the lock already held.
    fn tail_under_lock(&self) -> Result<(u64, String), KaizaError> {
        if !self.path.exists() {
            return Ok((0, GENESIS.to_string()));
        }
        let file = std::fs::File::open(&self.path).map_err(|source| {
            KaizaError::AuditAppendFailed(format!("read ledger {}: {source}", self.path.display()))
        })?;
        let reader = BufReader::new(file);
        let mut last: Option<String> = None;
        for line in reader.lines() {
            let line = line.map_err(|e| KaizaError::AuditAppendFailed(e.to_string()))?;
            if !line.trim().is_empty() {
                last = Some(line);
            }
        }
        match last {
            None => Ok((0, GENESIS.to_string())),
            Some(line) => {
                let value: Value = serde_json::from_str(&line)
                    .map_err(|e| KaizaError::AuditAppendFailed(format!("parse last line: {e}")))?;
                let seq = value
                    .get("seq")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| KaizaError::AuditAppendFailed("last line missing seq".into()))?;
                let hash = value
                    .get("entry_hash")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        KaizaError::AuditAppendFailed("last line missing entry_hash".into())
                    })?
                    .to_string();
                Ok((seq, hash))
            }
        }
    }

    pub fn read_all(&self) -> Result<Vec<AuditEntry>, KaizaError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            KaizaError::AuditAppendFailed(format!("read ledger {}: {source}", self.path.display()))
        })?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .map_err(|e| KaizaError::AuditAppendFailed(format!("parse entry: {e}")))
            })
            .collect()
    }

    /// Walk the ledger line by line, reporting every failure found (not
    /// just the first): invalid JSON, sequence gaps, broken chain links,
    /// and recomputed-hash mismatches.
    pub fn verify_chain(&self) -> Result<VerifyReport, KaizaError> {
        if !self.path.exists() {
            return Ok(VerifyReport {
                valid: true,
                status: "empty".to_string(),
                entries: 0,
                failures: Vec::new(),
            });
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            KaizaError::AuditAppendFailed(format!("read ledger {}: {source}", self.path.display()))
        })?;

        let mut failures = Vec::new();
        let mut expected_seq: u64 = 1;
        let mut previous_hash: Option<String> = None;
        let mut count: u64 = 0;

        for (idx, raw_line) in content.lines().enumerate() {
            if raw_line.trim().is_empty() {
                continue;
            }
            let line_no = (idx + 1) as u64;
            count += 1;

            let value: Value = match serde_json::from_str(raw_line) {
                Ok(v) => v,
                Err(e) => {
                    failures.push(VerifyFailure {
                        line: line_no,
                        kind: VerifyFailureKind::InvalidJson,
                        detail: e.to_string(),
                    });
                    continue;
                }
            };

            let seq = value.get("seq").and_then(Value::as_u64);
            if seq != Some(expected_seq) {
                failures.push(VerifyFailure {
                    line: line_no,
                    kind: VerifyFailureKind::SequenceGap,
                    detail: format!("expected seq {expected_seq}, found {seq:?}"),
                });
            }

            let prev_hash = value.get("prev_hash").and_then(Value::as_str);
            let expected_prev = previous_hash.as_deref().unwrap_or(GENESIS);
            if prev_hash != Some(expected_prev) {
                failures.push(VerifyFailure {
                    line: line_no,
                    kind: VerifyFailureKind::BrokenChain,
                    detail: format!("expected prev_hash {expected_prev}, found {prev_hash:?}"),
                });
            }

            let stored_hash = value.get("entry_hash").and_then(Value::as_str).map(str::to_string);
            let mut without_hash = value.clone();
            if let Value::Object(map) = &mut without_hash {
                map.remove("entry_hash");
            }
            let recomputed = hash_str(&canonical_json(&without_hash));
            if stored_hash.as_deref() != Some(recomputed.as_str()) {
                failures.push(VerifyFailure {
                    line: line_no,
                    kind: VerifyFailureKind::HashMismatch,
                    detail: format!(
                        "stored {stored_hash:?} != recomputed {recomputed}"
                    ),
                });
            }

            previous_hash = stored_hash;
            expected_seq += 1;
        }

        let valid = failures.is_empty();
        Ok(VerifyReport {
            valid,
            status: if valid { "PASS".to_string() } else { "FAIL".to_string() },
            entries: count,
            failures,
        })
    }
}
