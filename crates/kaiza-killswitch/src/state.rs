// state.rs — persisted kill-switch state (`.kaiza/kill_switch.json`).
//
// Every tool entry point re-reads this file on each call; there is no
// trust-the-cache shortcut, because engagement can be triggered by a
// concurrent handler.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use kaiza_errors::KaizaError;
use serde::{Deserialize, Serialize};

use crate::failure::FailureId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KillSwitchState {
    pub engaged: bool,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub engaged_at: Option<DateTime<Utc>>,
}

impl KillSwitchState {
    pub fn clear() -> Self {
        Self {
            engaged: false,
            triggers: Vec::new(),
            reason: String::new(),
            engaged_at: None,
        }
    }

    pub fn engaged_with(triggers: Vec<String>, reason: String) -> Self {
        Self {
            engaged: true,
            triggers,
            reason,
            engaged_at: Some(Utc::now()),
        }
    }
}

/// Read the current state; a missing file means the switch has never been
/// engaged.
pub fn read_state(path: &Path) -> Result<KillSwitchState, KaizaError> {
    match fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw)
            .map_err(|e| KaizaError::InvalidInputFormat(format!("kill_switch.json: {e}"))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(KillSwitchState::clear()),
        Err(e) => Err(KaizaError::FileReadFailed {
            path: path.display().to_string(),
            source: e,
        }),
    }
}

pub fn write_state(path: &Path, state: &KillSwitchState) -> Result<(), KaizaError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| KaizaError::FileWriteFailed {
            path: path.display().to_string(),
            source: e,
        })?;
    }
    let raw = serde_json::to_string_pretty(state)
        .map_err(|e| KaizaError::InternalError(format!("serializing kill_switch.json: {e}")))?;
    fs::write(path, raw).map_err(|e| KaizaError::FileWriteFailed {
        path: path.display().to_string(),
        source: e,
    })
}

/// The session-facing gate: read the file fresh and refuse mutating tools
/// while engaged. Read-only tools (ledger read, plan list, verify, replay)
/// are never blocked here.
pub fn check_gate(path: &Path, tool_is_mutating: bool) -> Result<KillSwitchState, KaizaError> {
    let state = read_state(path)?;
    if state.engaged && tool_is_mutating {
        return Err(KaizaError::KillSwitchEngaged(state.reason.clone()));
    }
    Ok(state)
}

pub fn engage(path: &Path, failure: FailureId, reason: impl Into<String>) -> Result<KillSwitchState, KaizaError> {
    let state = KillSwitchState::engaged_with(vec![failure.as_str().to_string()], reason.into());
    write_state(path, &state)?;
    tracing::error!(failure = failure.as_str(), reason = %state.reason, "kill switch engaged");
    Ok(state)
}
