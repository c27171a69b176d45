// evidence.rs — the evidence a maturity score is computed from. Every
// field is optional: a missing field is what drives a
// dimension's "missing evidence caps it at 2.0" rule rather than an error,
// since maturity scoring must never refuse to run.

#[derive(Debug, Clone, Default)]
pub struct PerformanceMetrics {
    pub p50_ms: f64,
    pub p99_ms: f64,
    pub error_rate: f64,
}

#[derive(Debug, Clone, Default)]
pub struct MaturityEvidence {
    pub audit_entries: Option<u64>,
    pub audit_failures: Option<u64>,
    pub chain_valid: Option<bool>,

    pub policy_pass_rate: Option<f64>,
    pub policy_bypass_detected: bool,

    pub intent_coverage: Option<f64>,
    pub doc_coverage: Option<f64>,

    pub plans_total: Option<u64>,
    pub plans_failing_lint: Option<u64>,
    pub executions_without_approval: u64,

    pub automated_integration_checks: Option<u64>,
    pub manual_integration_steps: u64,

    pub performance_metrics: Option<PerformanceMetrics>,
}
