//! # kaiza-maturity
//!
//! Six-dimension maturity scoring (C13): Reliability, Security,
//! Documentation, Governance, Integration, Performance, each a pure
//! function of its evidence, each deterministic given identical input.

mod dimension;
mod evidence;
mod explain;
mod score;

pub use dimension::{DimensionName, DimensionScore};
pub use evidence::{MaturityEvidence, PerformanceMetrics};
pub use explain::explain_maturity_gap;
pub use score::{apply_kill_switch_cap, compute_maturity, MaturityReport};
