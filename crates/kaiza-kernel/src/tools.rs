// tools.rs — the closed tool registry and the three role-visibility
// sets. `kaiza_replay::READ_ONLY_TOOLS` is the single
// source of truth for which tools never mutate; everything here is derived
// from it so the registry and the replay engine's `is_mutating_tool` can
// never drift apart.

pub use kaiza_replay::READ_ONLY_TOOLS;

/// Execution-only tools: every mutating tool plus the two kill-switch
/// recovery steps and the operator-facing approval tool, none of which
/// read-only planning sessions may call.
pub const MUTATION_TOOLS: [&str; 7] = [
    "write_file",
    "generate_remediation_proposals",
    "approve_proposal",
    "initiate_recovery_acknowledgement",
    "confirm_recovery",
    "unlock_kill_switch",
    "generate_attestation_bundle",
];

/// Planning-only tool: creating the very first approved plan in a fresh
/// workspace, before any execution session exists to request writes
/// against it.
pub const PLANNING_ONLY_TOOLS: [&str; 1] = ["bootstrap_create_foundation_plan"];

/// The one mutating path that must stay callable while the kill switch is
/// engaged: without it, an engaged workspace could never recover.
pub const RECOVERY_TOOLS: [&str; 3] = [
    "initiate_recovery_acknowledgement",
    "confirm_recovery",
    "unlock_kill_switch",
];

pub const TOOL_REGISTRY_LEN: usize = READ_ONLY_TOOLS.len() + MUTATION_TOOLS.len() + PLANNING_ONLY_TOOLS.len();

/// Every tool name this kernel dispatches, in no particular order.
pub fn tool_registry() -> Vec<&'static str> {
    let mut all = Vec::with_capacity(TOOL_REGISTRY_LEN);
    all.extend_from_slice(&READ_ONLY_TOOLS);
    all.extend_from_slice(&MUTATION_TOOLS);
    all.extend_from_slice(&PLANNING_ONLY_TOOLS);
    all
}

/// Tools a PLANNING-role session may call.
pub fn planning_tools() -> Vec<&'static str> {
    let mut v = READ_ONLY_TOOLS.to_vec();
    v.extend_from_slice(&PLANNING_ONLY_TOOLS);
    v
}

/// Tools an EXECUTION-role session may call.
pub fn execution_tools() -> Vec<&'static str> {
    let mut v = READ_ONLY_TOOLS.to_vec();
    v.extend_from_slice(&MUTATION_TOOLS);
    v
}

pub fn is_mutating_tool(tool: &str) -> bool {
    kaiza_replay::is_mutating_tool(tool)
}
