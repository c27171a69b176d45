// report.rs — render a ReplayReport as a non-coder Markdown document:
// executive summary, key findings, a timeline table capped at 50 rows,
// detailed findings with plain-English meaning, recommended actions.

use kaiza_audit::{AuditEntry, EntryResult};

use crate::engine::ReplayReport;
use crate::finding::FindingFamily;

const TIMELINE_ROW_CAP: usize = 50;

pub fn render_replay_report(report: &ReplayReport, filter_label: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Replay Report: {filter_label}\n\n"));

    out.push_str("## Executive Summary\n\n");
    out.push_str(&format!(
        "Verdict: **{}**. {} ledger entries reviewed, {} findings.\n\n",
        report.verdict.as_str(),
        report.timeline.len(),
        report.findings.len(),
    ));

    out.push_str("## Key Findings\n\n");
    let blocking: Vec<_> = report
        .findings
        .iter()
        .filter(|f| {
            matches!(
                f.code.family(),
                FindingFamily::Tamper | FindingFamily::Authority | FindingFamily::Policy | FindingFamily::Divergence
            )
        })
        .collect();
    if blocking.is_empty() {
        out.push_str("- No tamper, authority, policy, or divergence findings.\n\n");
    } else {
        for finding in &blocking {
            out.push_str(&format!("- **{}**: {}\n", finding.code.as_str(), finding.context));
        }
        out.push('\n');
    }

    out.push_str("## Timeline\n\n");
    out.push_str("| seq | ts | tool | role | result | phase |\n");
    out.push_str("|---|---|---|---|---|---|\n");
    for entry in report.timeline.iter().take(TIMELINE_ROW_CAP) {
        out.push_str(&timeline_row(entry));
    }
    if report.timeline.len() > TIMELINE_ROW_CAP {
        out.push_str(&format!(
            "\n_{} additional entries not shown (50-row cap)._\n",
            report.timeline.len() - TIMELINE_ROW_CAP
        ));
    }
    out.push('\n');

    out.push_str("## Detailed Findings\n\n");
    if report.findings.is_empty() {
        out.push_str("No findings.\n\n");
    } else {
        for finding in &report.findings {
            out.push_str(&format!(
                "### {}\n\n- Context: {}\n- What this means: {}\n- Recommended action: {}\n\n",
                finding.code.as_str(),
                finding.context,
                finding.code.what_this_means(),
                finding.code.recommended_action(),
            ));
        }
    }

    out
}

fn timeline_row(entry: &AuditEntry) -> String {
    format!(
        "| {} | {} | {} | {} | {} | {} |\n",
        entry.seq,
        entry.ts.to_rfc3339(),
        entry.tool,
        entry.role,
        match entry.result {
            EntryResult::Ok => "ok",
            EntryResult::Error => "error",
        },
        entry.phase_id.as_deref().unwrap_or("-"),
    )
}
