// replay.rs — `replay_execution` (C10). The replay engine is
// pure; this handler feeds it the ledger and the chain report, then hands
// back the verdict, findings, and the rendered Markdown report.

use kaiza_replay::{render_replay_report, run_replay, ReplayFilter};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::boundary::{HandlerError, HandlerOutcome};
use crate::state::KernelState;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReplayExecutionParams {
    /// Hash of the plan whose execution history to reconstruct.
    pub plan_hash: String,
    #[serde(default)]
    pub phase_id: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub seq_start: Option<u64>,
    #[serde(default)]
    pub seq_end: Option<u64>,
}

pub fn replay_execution(state: &mut KernelState, params: &ReplayExecutionParams) -> Result<HandlerOutcome, HandlerError> {
    let audit = state.audit()?;
    let entries = audit.read_all()?;
    let chain = audit.verify_chain()?;

    let mut filter = ReplayFilter::new(params.plan_hash.clone());
    if let Some(phase) = &params.phase_id {
        filter = filter.with_phase(phase.clone());
    }
    if let Some(tool) = &params.tool {
        filter = filter.with_tool(tool.clone());
    }
    if let (Some(start), Some(end)) = (params.seq_start, params.seq_end) {
        filter = filter.with_seq_range(start, end);
    }

    let report = run_replay(&entries, &chain, &filter);
    let markdown = render_replay_report(&report, &params.plan_hash);

    let findings: Vec<serde_json::Value> = report
        .findings
        .iter()
        .map(|f| {
            json!({
                "code": f.code.as_str(),
                "context": f.context,
            })
        })
        .collect();

    let result_hash = kaiza_audit::hash_str(&markdown);
    // The replay's own ledger entry records the filter in notes rather
    // than claiming plan authority: a forensic read never executes under
    // the plan it analyzes.
    Ok(HandlerOutcome::new(json!({
        "verdict": report.verdict.as_str(),
        "timeline_entries": report.timeline.len(),
        "findings": findings,
        "report_markdown": markdown,
    }))
    .with_result_hash(result_hash)
    .with_notes(format!("replay of plan {}", params.plan_hash)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::session::{initialize, InitializeParams};
    use kaiza_audit::{AuditEntry, EntryResult};
    use tempfile::tempdir;
    use uuid::Uuid;

    fn ready_state(root: &std::path::Path) -> KernelState {
        let mut state = KernelState::new();
        initialize(
            &mut state,
            &InitializeParams {
                workspace_root: root.display().to_string(),
                role: "EXECUTION".to_string(),
                operator_id: None,
                operator_role: None,
                authentication_context: None,
            },
        )
        .unwrap();
        state
    }

    fn seed_write(state: &KernelState, plan_hash: &str) {
        let entry = AuditEntry::new(Uuid::nil(), "EXECUTION", "/w", "write_file", EntryResult::Ok)
            .with_plan(plan_hash, "PHASE_1")
            .with_args_hash("x")
            .with_result_hash("b".repeat(64));
        state.audit().unwrap().append(entry).unwrap();
    }

    #[test]
    fn clean_history_replays_to_pass() {
        let dir = tempdir().unwrap();
        let mut state = ready_state(dir.path());
        let plan_hash = "a".repeat(64);
        seed_write(&state, &plan_hash);

        let outcome = replay_execution(
            &mut state,
            &ReplayExecutionParams {
                plan_hash: plan_hash.clone(),
                phase_id: None,
                tool: None,
                seq_start: None,
                seq_end: None,
            },
        )
        .unwrap();
        assert_eq!(outcome.value["verdict"], "PASS");
        assert_eq!(outcome.value["timeline_entries"], 1);
    }

    #[test]
    fn unchanged_ledger_replays_byte_identically() {
        let dir = tempdir().unwrap();
        let mut state = ready_state(dir.path());
        let plan_hash = "a".repeat(64);
        seed_write(&state, &plan_hash);

        let params = ReplayExecutionParams {
            plan_hash,
            phase_id: None,
            tool: None,
            seq_start: None,
            seq_end: None,
        };
        let first = replay_execution(&mut state, &params).unwrap();
        let second = replay_execution(&mut state, &params).unwrap();
        assert_eq!(first.value["report_markdown"], second.value["report_markdown"]);
        assert_eq!(first.result_hash, second.result_hash);
    }
}
