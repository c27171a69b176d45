// score.rs — the six dimension scorers, the overall rollup, and the
// deterministic result_hash (C13).

use kaiza_audit::{canonical_json, hash_str};
use serde::Serialize;
use serde_json::json;

use crate::dimension::{floor_to_tenth, DimensionName, DimensionScore, CEILING, MISSING_EVIDENCE_CAP};
use crate::evidence::MaturityEvidence;

fn missing(name: DimensionName, reason: &str) -> DimensionScore {
    DimensionScore {
        name,
        score: MISSING_EVIDENCE_CAP,
        capped: true,
        reason: Some(reason.to_string()),
    }
}

fn score_reliability(ev: &MaturityEvidence) -> DimensionScore {
    let (Some(entries), Some(failures)) = (ev.audit_entries, ev.audit_failures) else {
        return missing(DimensionName::Reliability, "audit entry/failure counts are missing");
    };
    let failure_rate = if entries == 0 { 0.0 } else { failures as f64 / entries as f64 };
    let mut score = floor_to_tenth(CEILING - failure_rate * 10.0);
    let mut capped = false;
    let mut reason = None;
    if ev.chain_valid == Some(false) {
        score = score.min(3.0);
        capped = true;
        reason = Some("audit hash chain is broken".to_string());
    }
    DimensionScore {
        name: DimensionName::Reliability,
        score,
        capped,
        reason,
    }
}

fn score_security(ev: &MaturityEvidence) -> DimensionScore {
    let Some(pass_rate) = ev.policy_pass_rate else {
        return missing(DimensionName::Security, "policy pass rate is missing");
    };
    let mut score = floor_to_tenth(1.0 + pass_rate.clamp(0.0, 1.0) * 4.0);
    let mut capped = false;
    let mut reason = None;
    if ev.policy_bypass_detected {
        score = score.min(3.0);
        capped = true;
        reason = Some("a policy bypass was detected".to_string());
    }
    DimensionScore {
        name: DimensionName::Security,
        score,
        capped,
        reason,
    }
}

fn score_documentation(ev: &MaturityEvidence) -> DimensionScore {
    let (Some(intent), Some(docs)) = (ev.intent_coverage, ev.doc_coverage) else {
        return missing(DimensionName::Documentation, "intent or documentation coverage is missing");
    };
    let average = (intent.clamp(0.0, 1.0) + docs.clamp(0.0, 1.0)) / 2.0;
    DimensionScore {
        name: DimensionName::Documentation,
        score: floor_to_tenth(1.0 + average * 4.0),
        capped: false,
        reason: None,
    }
}

fn score_governance(ev: &MaturityEvidence) -> DimensionScore {
    let (Some(total), Some(failing)) = (ev.plans_total, ev.plans_failing_lint) else {
        return missing(DimensionName::Governance, "plan registry lint results are missing");
    };
    let clean_rate = if total == 0 { 1.0 } else { 1.0 - (failing as f64 / total as f64) };
    let mut score = floor_to_tenth(1.0 + clean_rate.clamp(0.0, 1.0) * 4.0);
    let mut capped = false;
    let mut reason = None;
    if ev.executions_without_approval > 0 {
        score = score.min(2.0);
        capped = true;
        reason = Some(format!("{} execution(s) ran without an approved plan", ev.executions_without_approval));
    }
    DimensionScore {
        name: DimensionName::Governance,
        score,
        capped,
        reason,
    }
}

fn score_integration(ev: &MaturityEvidence) -> DimensionScore {
    let Some(automated) = ev.automated_integration_checks else {
        return missing(DimensionName::Integration, "automated integration check count is missing");
    };
    let mut score = floor_to_tenth(CEILING.min(1.0 + automated as f64));
    let mut capped = false;
    let mut reason = None;
    if ev.manual_integration_steps > 0 {
        score = score.min(4.0);
        capped = true;
        reason = Some(format!("{} manual integration step(s) remain", ev.manual_integration_steps));
    }
    DimensionScore {
        name: DimensionName::Integration,
        score,
        capped,
        reason,
    }
}

fn score_performance(ev: &MaturityEvidence) -> DimensionScore {
    // Performance metrics are frequently stubbed upstream. Absence is
    // not treated as generic missing-evidence (cap 2.0) but as
    // its own named hard cap, so a caller never mistakes "we didn't wire
    // this up yet" for "this dimension scored 2.0 on real evidence".
    let Some(metrics) = &ev.performance_metrics else {
        return DimensionScore {
            name: DimensionName::Performance,
            score: 3.0,
            capped: true,
            reason: Some("performance metrics were not collected".to_string()),
        };
    };
    let latency_score = floor_to_tenth(CEILING - (metrics.p99_ms / 100.0).min(4.0));
    let error_penalty = metrics.error_rate.clamp(0.0, 1.0) * 4.0;
    let score = floor_to_tenth((latency_score - error_penalty).max(1.0));
    DimensionScore {
        name: DimensionName::Performance,
        score,
        capped: false,
        reason: None,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MaturityReport {
    pub dimensions: Vec<DimensionScore>,
    pub overall: f64,
    pub level_five_eligible: bool,
    pub result_hash: String,
}

pub fn compute_maturity(evidence: &MaturityEvidence) -> MaturityReport {
    let dimensions = vec![
        score_reliability(evidence),
        score_security(evidence),
        score_documentation(evidence),
        score_governance(evidence),
        score_integration(evidence),
        score_performance(evidence),
    ];
    finish(dimensions)
}

/// While the kill switch is engaged, the maturity score is forced to 0
/// regardless of other evidence.
pub fn apply_kill_switch_cap(mut report: MaturityReport) -> MaturityReport {
    for dim in &mut report.dimensions {
        dim.score = 0.0;
        dim.capped = true;
        dim.reason = Some("kill switch is engaged".to_string());
    }
    report.overall = 0.0;
    report.level_five_eligible = false;
    report.result_hash = result_hash(&report.dimensions, report.overall);
    report
}

fn finish(dimensions: Vec<DimensionScore>) -> MaturityReport {
    let overall = dimensions.iter().map(|d| d.score).fold(f64::INFINITY, f64::min);
    let level_five_eligible = dimensions.iter().all(|d| !d.capped && d.score >= CEILING);
    let result_hash = result_hash(&dimensions, overall);
    MaturityReport {
        dimensions,
        overall,
        level_five_eligible,
        result_hash,
    }
}

fn result_hash(dimensions: &[DimensionScore], overall: f64) -> String {
    let value = json!({
        "dimensions": dimensions.iter().map(|d| json!({
            "name": d.name.as_str(),
            "score": d.score,
            "capped": d.capped,
        })).collect::<Vec<_>>(),
        "overall": overall,
    });
    hash_str(&canonical_json(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::PerformanceMetrics;

    fn full_evidence() -> MaturityEvidence {
        MaturityEvidence {
            audit_entries: Some(100),
            audit_failures: Some(0),
            chain_valid: Some(true),
            policy_pass_rate: Some(1.0),
            policy_bypass_detected: false,
            intent_coverage: Some(1.0),
            doc_coverage: Some(1.0),
            plans_total: Some(10),
            plans_failing_lint: Some(0),
            executions_without_approval: 0,
            automated_integration_checks: Some(5),
            manual_integration_steps: 0,
            performance_metrics: Some(PerformanceMetrics { p50_ms: 10.0, p99_ms: 50.0, error_rate: 0.0 }),
        }
    }

    #[test]
    fn clean_evidence_scores_high_and_is_level_five_eligible() {
        let report = compute_maturity(&full_evidence());
        assert!(report.overall >= 4.0);
        assert!(report.level_five_eligible);
    }

    #[test]
    fn missing_evidence_caps_the_dimension_at_two() {
        let mut ev = full_evidence();
        ev.audit_entries = None;
        let report = compute_maturity(&ev);
        let reliability = report.dimensions.iter().find(|d| d.name == DimensionName::Reliability).unwrap();
        assert_eq!(reliability.score, 2.0);
        assert!(!report.level_five_eligible);
    }

    #[test]
    fn hash_chain_break_caps_reliability_at_three() {
        let mut ev = full_evidence();
        ev.chain_valid = Some(false);
        let report = compute_maturity(&ev);
        let reliability = report.dimensions.iter().find(|d| d.name == DimensionName::Reliability).unwrap();
        assert!(reliability.score <= 3.0);
        assert!(reliability.capped);
    }

    #[test]
    fn execution_without_approval_caps_governance_at_two() {
        let mut ev = full_evidence();
        ev.executions_without_approval = 1;
        let report = compute_maturity(&ev);
        let governance = report.dimensions.iter().find(|d| d.name == DimensionName::Governance).unwrap();
        assert_eq!(governance.score, 2.0);
    }

    #[test]
    fn missing_performance_metrics_caps_at_three_not_two() {
        let mut ev = full_evidence();
        ev.performance_metrics = None;
        let report = compute_maturity(&ev);
        let performance = report.dimensions.iter().find(|d| d.name == DimensionName::Performance).unwrap();
        assert_eq!(performance.score, 3.0);
    }

    #[test]
    fn kill_switch_forces_every_dimension_to_zero() {
        let report = apply_kill_switch_cap(compute_maturity(&full_evidence()));
        assert_eq!(report.overall, 0.0);
        assert!(report.dimensions.iter().all(|d| d.score == 0.0));
    }

    #[test]
    fn same_evidence_produces_the_same_result_hash() {
        let a = compute_maturity(&full_evidence());
        let b = compute_maturity(&full_evidence());
        assert_eq!(a.result_hash, b.result_hash);
    }
}
