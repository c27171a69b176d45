// identity.rs — operator identity binding: bound once at
// session start, never rebindable mid-session.

use kaiza_errors::KaizaError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorIdentity {
    pub operator_id: String,
    pub operator_role: String,
    pub authentication_context: String,
}

#[derive(Debug, Default)]
pub struct OperatorBinding {
    bound: Option<OperatorIdentity>,
}

impl OperatorBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&OperatorIdentity> {
        self.bound.as_ref()
    }

    /// Bind the operator for the lifetime of the session. A second call
    /// with a different identity is a rebind and is refused; a second call
    /// with the identical identity is idempotent.
    pub fn bind(&mut self, identity: OperatorIdentity) -> Result<(), KaizaError> {
        match &self.bound {
            None => {
                self.bound = Some(identity);
                Ok(())
            }
            Some(existing) if *existing == identity => Ok(()),
            Some(existing) => Err(KaizaError::OperatorRebindRejected(format!(
                "session is bound to operator {}, cannot rebind to {}",
                existing.operator_id, identity.operator_id
            ))),
        }
    }
}
