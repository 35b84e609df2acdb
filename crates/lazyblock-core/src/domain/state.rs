//! Activation state machine for a block node.

use serde::{Deserialize, Serialize};

/// Activation state of a node.
///
/// State transitions:
/// - Unactivated -> Pending -> Activated
/// - Unactivated -> Pending -> Failed
///
/// Nodes absent from the controller's state map are `Unactivated`.
/// `Activated` and `Failed` are terminal; a failed node is never retried
/// within the page's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    /// Discovered, nothing in flight.
    Unactivated,

    /// Module and stylesheet fetches in flight.
    Pending,

    /// Module ran (or was skipped via `data-jsload="false"`) and the node is marked.
    Activated,

    /// Configuration, fetch or invocation error. The node stays inert.
    Failed,
}

impl ActivationState {
    /// May an activation attempt claim a node in this state?
    pub fn is_claimable(self) -> bool {
        matches!(self, ActivationState::Unactivated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unactivated_is_claimable() {
        assert!(ActivationState::Unactivated.is_claimable());
        assert!(!ActivationState::Pending.is_claimable());
        assert!(!ActivationState::Activated.is_claimable());
        assert!(!ActivationState::Failed.is_claimable());
    }
}
