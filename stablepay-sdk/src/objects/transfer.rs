//! Observable state of a withdrawal transfer.

use serde::{Deserialize, Serialize};

/// Stage of the withdrawal state machine.
///
/// Exactly one step is current at any time. A new transfer may only start
/// from [`Idle`](TransferStep::Idle), [`Completed`](TransferStep::Completed)
/// or [`Error`](TransferStep::Error).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferStep {
    #[default]
    Idle,
    CheckingAllowance,
    RequestingApproval,
    Approving,
    Transferring,
    Completed,
    Error,
}

impl TransferStep {
    /// A transfer is running and owns the state.
    pub fn is_in_flight(self) -> bool {
        !matches!(
            self,
            TransferStep::Idle | TransferStep::Completed | TransferStep::Error
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransferStep::Idle => "idle",
            TransferStep::CheckingAllowance => "checking-allowance",
            TransferStep::RequestingApproval => "requesting-approval",
            TransferStep::Approving => "approving",
            TransferStep::Transferring => "transferring",
            TransferStep::Completed => "completed",
            TransferStep::Error => "error",
        }
    }
}

impl std::fmt::Display for TransferStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the orchestrator state, as shown to a UI or printed by the
/// CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStateView {
    pub step: TransferStep,
    pub chain_id: Option<u64>,
    pub token_symbol: Option<String>,
    pub approval_hash: Option<String>,
    pub transaction_hash: Option<String>,
    /// Block explorer link for `transaction_hash`, when the chain has one.
    pub explorer_url: Option<String>,
    pub error: Option<String>,
    pub withdrawal_id: Option<uuid::Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_wire_names() {
        assert_eq!(
            serde_json::to_string(&TransferStep::CheckingAllowance).unwrap(),
            "\"checking-allowance\""
        );
        let parsed: TransferStep = serde_json::from_str("\"requesting-approval\"").unwrap();
        assert_eq!(parsed, TransferStep::RequestingApproval);
        assert_eq!(TransferStep::Approving.to_string(), "approving");
    }

    #[test]
    fn test_in_flight_steps() {
        assert!(!TransferStep::Idle.is_in_flight());
        assert!(!TransferStep::Completed.is_in_flight());
        assert!(!TransferStep::Error.is_in_flight());
        assert!(TransferStep::CheckingAllowance.is_in_flight());
        assert!(TransferStep::Transferring.is_in_flight());
    }
}
