// risk.rs — structured risk acknowledgement. Consequences are
// machine-generated by the caller from the actual mutation being approved,
// never free text typed by the operator.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Irreversible,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Irreversible => "IRREVERSIBLE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAcknowledgement {
    pub risk_level: RiskLevel,
    pub blast_radius: Vec<String>,
    pub reversible: bool,
    pub consequences: Vec<String>,
}

impl RiskAcknowledgement {
    /// A byte-identical copy of the consequences list, used to check that
    /// step 2 of confirmation re-submits the same facts rather than a
    /// differently-worded acknowledgement.
    pub fn consequences_fingerprint(&self) -> String {
        kaiza_audit::hash_str(&self.consequences.join("\n"))
    }
}
