// drill.rs — deterministic failure injection for tests. Compiled only
// into debug builds; release binaries carry no way to fabricate a
// critical failure.

use chrono::Utc;
use kaiza_errors::KaizaError;
use kaiza_killswitch::{run_safe_halt, FailureId, HaltReport};

use crate::state::KernelState;

/// Fabricate a critical failure: engage the kill switch for `failure` and
/// run the full safe-halt routine (fsync, chain verify, HALT report, audit
/// entry), exactly as the boundary would on a real breach.
pub fn inject_failure(state: &KernelState, failure: FailureId, reason: &str) -> Result<HaltReport, KaizaError> {
    let resolver = state.gate.resolver();
    let switch = kaiza_killswitch::engage(&resolver.kill_switch_path()?, failure, reason)?;

    let role = state
        .gate
        .role()
        .map(|r| r.as_str().to_string())
        .unwrap_or_else(|| "UNINITIALIZED".to_string());
    let root = resolver.root_path()?;
    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();

    run_safe_halt(
        state.audit()?,
        &resolver.reports_dir()?,
        &switch,
        state.gate.session_id(),
        &role,
        &root.display().to_string(),
        &timestamp,
    )
}
