// explain.rs — `explain_maturity_gap`: turn a dimension's score into a
// plain-English account of what is holding it back.

use kaiza_errors::KaizaError;

use crate::dimension::{DimensionName, CEILING};
use crate::score::MaturityReport;

pub fn explain_maturity_gap(report: &MaturityReport, dimension: DimensionName) -> Result<String, KaizaError> {
    let found = report
        .dimensions
        .iter()
        .find(|d| d.name == dimension)
        .ok_or_else(|| KaizaError::InvalidInputValue(format!("no such dimension: {}", dimension.as_str())))?;

    if found.score >= CEILING {
        return Ok(format!("{} is already at the ceiling ({:.1}).", dimension.as_str(), CEILING));
    }

    let cap_note = match &found.reason {
        Some(reason) => format!(" A hard cap is in effect: {reason}."),
        None => String::new(),
    };

    Ok(format!(
        "{} is scored {:.1} out of {:.1}.{} Improve the underlying evidence and recompute to raise this dimension.",
        dimension.as_str(),
        found.score,
        CEILING,
        cap_note,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::MaturityEvidence;
    use crate::score::compute_maturity;

    #[test]
    fn explains_a_capped_dimension() {
        let ev = MaturityEvidence {
            executions_without_approval: 1,
            plans_total: Some(1),
            plans_failing_lint: Some(0),
            ..Default::default()
        };
        let report = compute_maturity(&ev);
        let explanation = explain_maturity_gap(&report, DimensionName::Governance).unwrap();
        assert!(explanation.contains("execution"));
    }

    #[test]
    fn unknown_dimension_is_an_error() {
        // DimensionName is a closed enum, so this path only triggers if the
        // report is missing a dimension entirely — exercised here via an
        // empty report.
        let report = MaturityReport {
            dimensions: Vec::new(),
            overall: 0.0,
            level_five_eligible: false,
            result_hash: String::new(),
        };
        let err = explain_maturity_gap(&report, DimensionName::Security).unwrap_err();
        assert_eq!(err.code().as_str(), "INVALID_INPUT_VALUE");
    }
}
