// role.rs — the two disjoint tool-visibility roles.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Planning,
    Execution,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Planning => "PLANNING",
            Role::Execution => "EXECUTION",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "PLANNING" => Some(Role::Planning),
            "EXECUTION" => Some(Role::Execution),
            _ => None,
        }
    }

    /// Whether this role may call file-mutation tools.
    pub fn may_mutate(&self) -> bool {
        matches!(self, Role::Execution)
    }

    /// Whether this role may call plan-creation tools.
    pub fn may_plan(&self) -> bool {
        matches!(self, Role::Planning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_disjoint_on_the_mutation_axis() {
        assert!(Role::Execution.may_mutate());
        assert!(!Role::Planning.may_mutate());
        assert!(Role::Planning.may_plan());
        assert!(!Role::Execution.may_plan());
    }

    #[test]
    fn parse_round_trips_as_str() {
        assert_eq!(Role::parse(Role::Planning.as_str()), Some(Role::Planning));
        assert_eq!(Role::parse(Role::Execution.as_str()), Some(Role::Execution));
        assert_eq!(Role::parse("bogus"), None);
    }
}
