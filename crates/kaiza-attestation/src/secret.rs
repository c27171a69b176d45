// secret.rs — resolve the workspace HMAC secret: environment
// first, then the on-disk secret file, then an ephemeral random key with a
// warning (a bundle signed this way only verifies within the same process).

use std::fs;
use std::path::Path;

use kaiza_errors::KaizaError;
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};

pub const ENV_VAR: &str = "KAIZA_ATTESTATION_SECRET";

#[derive(Debug, Serialize, Deserialize)]
struct SecretFile {
    secret_hex: String,
}

pub fn resolve_secret(secret_file_path: &Path) -> Result<Vec<u8>, KaizaError> {
    if let Ok(value) = std::env::var(ENV_VAR) {
        return decode_hex(&value);
    }
    if let Ok(raw) = fs::read_to_string(secret_file_path) {
        let parsed: SecretFile = serde_json::from_str(&raw)
            .map_err(|e| KaizaError::InvalidInputFormat(format!("attestation_secret.json: {e}")))?;
        return decode_hex(&parsed.secret_hex);
    }
    tracing::warn!(
        "no attestation secret found in {} or on disk at {}; generating an ephemeral key for this process only",
        ENV_VAR,
        secret_file_path.display()
    );
    ephemeral_secret()
}

fn ephemeral_secret() -> Result<Vec<u8>, KaizaError> {
    let rng = SystemRandom::new();
    let mut key = vec![0u8; 32];
    rng.fill(&mut key)
        .map_err(|_| KaizaError::InternalError("failed to generate ephemeral attestation secret".to_string()))?;
    Ok(key)
}

fn decode_hex(value: &str) -> Result<Vec<u8>, KaizaError> {
    (0..value.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(value.get(i..i + 2).unwrap_or(""), 16)
                .map_err(|_| KaizaError::InvalidInputFormat("attestation secret is not valid hex".to_string()))
        })
        .collect()
}

/// Persist a freshly generated secret so later processes in the same
/// workspace can reuse it instead of minting a new ephemeral key each time.
pub fn write_secret_file(secret_file_path: &Path, secret: &[u8]) -> Result<(), KaizaError> {
    if let Some(parent) = secret_file_path.parent() {
        fs::create_dir_all(parent).map_err(|source| KaizaError::FileWriteFailed {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let hex: String = secret.iter().map(|b| format!("{b:02x}")).collect();
    let raw = serde_json::to_string_pretty(&SecretFile { secret_hex: hex })
        .map_err(|e| KaizaError::InternalError(format!("serializing attestation secret: {e}")))?;
    fs::write(secret_file_path, raw).map_err(|source| KaizaError::FileWriteFailed {
        path: secret_file_path.display().to_string(),
        source,
    })
}
