// lock.rs — directory-based mutex serializing access to the audit ledger
// (C3).
//
// `fs::create_dir` is atomic on every platform the kernel targets: exactly
// one caller observes `Ok(())` when several race to create the same
// directory. That makes an empty directory a portable, dependency-free
// mutex without flock()/libc.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use kaiza_errors::KaizaError;

const RETRY_INTERVAL: Duration = Duration::from_millis(50);
const MAX_RETRIES: u32 = 500;

/// Held for the lifetime of one audit append. Dropping it always releases
/// the lock, including on panic unwind, so a failure mid-append never
/// leaves the ledger permanently unreachable.
pub struct FileLock {
    path: PathBuf,
}

impl FileLock {
    /// Acquire the lock at `path`, retrying every 50 ms up to 500 times
    /// (a 25 s ceiling) before giving up with `AUDIT_LOCK_FAILED`.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, KaizaError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| {
                KaizaError::AuditLockFailed(format!(
                    "cannot prepare lock parent {}: {source}",
                    parent.display()
                ))
            })?;
        }
        for attempt in 0..MAX_RETRIES {
            match std::fs::create_dir(&path) {
                Ok(()) => return Ok(Self { path }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if attempt + 1 == MAX_RETRIES {
                        break;
                    }
                    thread::sleep(RETRY_INTERVAL);
                }
                Err(e) => {
                    return Err(KaizaError::AuditLockFailed(format!(
                        "cannot create lock directory {}: {e}",
                        path.display()
                    )))
                }
            }
        }
        Err(KaizaError::AuditLockFailed(format!(
            "timed out after {} attempts waiting for {}",
            MAX_RETRIES,
            path.display()
        )))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir(&self.path) {
            tracing::error!(path = %self.path.display(), error = %e, "failed to release audit lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn acquire_creates_and_release_removes_the_directory() {
        let dir = tempdir().unwrap();
        let lock_path = dir.path().join("audit.lock");
        {
            let _lock = FileLock::acquire(&lock_path).unwrap();
            assert!(lock_path.exists());
        }
        assert!(!lock_path.exists());
    }

    #[test]
    fn second_acquire_blocks_until_first_releases() {
        let dir = tempdir().unwrap();
        let lock_path = dir.path().join("audit.lock");
        let released = Arc::new(AtomicBool::new(false));

        let first = FileLock::acquire(&lock_path).unwrap();
        let released_clone = released.clone();
        let lock_path_clone = lock_path.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            released_clone.store(true, Ordering::SeqCst);
            drop(first);
            let _ = lock_path_clone;
        });

        let second = FileLock::acquire(&lock_path).unwrap();
        assert!(released.load(Ordering::SeqCst));
        drop(second);
        handle.join().unwrap();
    }

    #[test]
    fn lock_released_even_if_holder_is_dropped_on_panic() {
        let dir = tempdir().unwrap();
        let lock_path = dir.path().join("audit.lock");
        let lock_path_clone = lock_path.clone();
        let result = std::panic::catch_unwind(move || {
            let _lock = FileLock::acquire(&lock_path_clone).unwrap();
            panic!("simulated handler failure mid-append");
        });
        assert!(result.is_err());
        assert!(!lock_path.exists());
    }
}
