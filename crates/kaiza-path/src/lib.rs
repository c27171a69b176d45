//! # kaiza-path
//!
//! Canonical path resolver (C1). Locks a workspace root exactly once per
//! session and resolves every other filesystem reference the kernel makes
//! relative to it, refusing anything that would escape the root.
//!
//! ```
//! use kaiza_path::PathResolver;
//! # let dir = tempfile::tempdir().unwrap();
//! let mut resolver = PathResolver::new();
//! resolver.lock_workspace_root(dir.path()).unwrap();
//! let target = resolver.resolve_write_target("src/a.txt").unwrap();
//! assert!(target.starts_with(dir.path().canonicalize().unwrap()));
//! ```

mod resolver;

pub use resolver::{is_hex64, PathResolver};
