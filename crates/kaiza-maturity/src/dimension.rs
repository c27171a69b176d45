// dimension.rs — a single scored dimension and the floor-to-0.1 quantizer
// shared by every dimension function.

use serde::Serialize;

pub const FLOOR: f64 = 1.0;
pub const CEILING: f64 = 5.0;
pub const MISSING_EVIDENCE_CAP: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionName {
    Reliability,
    Security,
    Documentation,
    Governance,
    Integration,
    Performance,
}

impl DimensionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reliability => "Reliability",
            Self::Security => "Security",
            Self::Documentation => "Documentation",
            Self::Governance => "Governance",
            Self::Integration => "Integration",
            Self::Performance => "Performance",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionScore {
    pub name: DimensionName,
    pub score: f64,
    pub capped: bool,
    pub reason: Option<String>,
}

/// Quantize to the nearest 0.1 step at or below `value`, then clamp to
/// `[FLOOR, CEILING]`.
pub fn floor_to_tenth(value: f64) -> f64 {
    let floored = (value * 10.0).floor() / 10.0;
    floored.clamp(FLOOR, CEILING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_to_tenth_never_rounds_up() {
        assert_eq!(floor_to_tenth(3.27), 3.2);
        assert_eq!(floor_to_tenth(3.29999), 3.2);
    }

    #[test]
    fn floor_to_tenth_clamps_to_the_band() {
        assert_eq!(floor_to_tenth(0.4), 1.0);
        assert_eq!(floor_to_tenth(9.9), 5.0);
    }
}
