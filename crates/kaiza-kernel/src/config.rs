// config.rs — operational configuration (optional `kaiza.toml`).
//
// Nothing here may change a kernel invariant: the persisted layout, lock
// timing, and hash/canonicalization rules are fixed by the components that
// own them. Config only tunes diagnostics and whether a freshly minted
// attestation secret is persisted for reuse by later processes.

use std::path::Path;

use kaiza_errors::KaizaError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KaizaConfig {
    /// Overrides the `RUST_LOG` filter for the stderr tracing subscriber.
    pub log_filter: Option<String>,

    /// When true (the default), an attestation secret minted because
    /// neither the environment variable nor the secret file provided one
    /// is written to `.kaiza/attestation_secret.json`, so bundles signed
    /// by this process remain verifiable by later processes.
    pub persist_attestation_secret: bool,
}

impl Default for KaizaConfig {
    fn default() -> Self {
        Self {
            log_filter: None,
            persist_attestation_secret: true,
        }
    }
}

impl KaizaConfig {
    /// Load `kaiza.toml` from `path`; a missing file is the default
    /// config, a malformed file is an error.
    pub fn load_or_default(path: &Path) -> Result<Self, KaizaError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => toml::from_str(&raw)
                .map_err(|e| KaizaError::InvalidInputFormat(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(KaizaError::FileReadFailed {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}
