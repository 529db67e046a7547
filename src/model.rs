use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct PanelConfig {
    pub rpc_url: String,
    #[serde(skip_serializing)]
    pub private_key: String,
    pub contract: String,
    #[serde(with = "humantime_serde")]
    pub status_ttl: Duration,
    #[serde(with = "humantime_serde")]
    pub confirm_poll: Duration,
}

/// The user-triggerable operations that go through the status gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationId {
    #[serde(rename = "mint")]
    Mint,
    #[serde(rename = "mintTo")]
    MintTo,
    #[serde(rename = "checkOwner")]
    CheckOwner,
    #[serde(rename = "burn")]
    Burn,
}

impl OperationId {
    pub const ALL: [OperationId; 4] = [
        OperationId::Mint,
        OperationId::MintTo,
        OperationId::CheckOwner,
        OperationId::Burn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OperationId::Mint => "mint",
            OperationId::MintTo => "mintTo",
            OperationId::CheckOwner => "checkOwner",
            OperationId::Burn => "burn",
        }
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }
}

/// Which controls a pending status locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockScope {
    /// Only the control of the operation holding the admission slot.
    Operation(OperationId),
    /// Lock-all when origin unknown: a pending status without an operation id
    /// disables every control.
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationStatus {
    pub phase: Phase,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationId>,
}

impl Default for OperationStatus {
    fn default() -> Self {
        Self::idle()
    }
}

impl OperationStatus {
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            message: String::new(),
            operation: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.phase == Phase::Pending
    }

    pub fn lock_scope(&self) -> Option<LockScope> {
        if !self.is_pending() {
            return None;
        }
        Some(match self.operation {
            Some(op) => LockScope::Operation(op),
            None => LockScope::All,
        })
    }

    /// Whether the control for `op` should be rendered disabled.
    pub fn is_disabled(&self, op: OperationId) -> bool {
        match self.lock_scope() {
            Some(LockScope::All) => true,
            Some(LockScope::Operation(held)) => held == op,
            None => false,
        }
    }

    /// Controls that are disabled right now, in display order.
    pub fn locked(&self) -> Vec<OperationId> {
        OperationId::ALL
            .into_iter()
            .filter(|op| self.is_disabled(*op))
            .collect()
    }

    /// Whether `op` is the operation currently in flight.
    #[cfg(feature = "tui")]
    pub fn is_running(&self, op: OperationId) -> bool {
        self.is_pending() && self.operation == Some(op)
    }
}

/// Display state for a value fetched from the contract.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReadState<T> {
    #[default]
    Loading,
    Ready(T),
    /// The first fetch failed and nothing has been loaded since.
    Failed(String),
}

impl<T> ReadState<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            ReadState::Ready(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractMetadata {
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerLookup {
    pub token_id: u64,
    pub owner: String,
}

/// Status line emitted by headless mode, one per transition.
#[derive(Debug, Clone, Serialize)]
pub struct StatusRecord<'a> {
    pub timestamp_utc: String,
    #[serde(flatten)]
    pub status: &'a OperationStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locked: Vec<OperationId>,
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(op: Option<OperationId>) -> OperationStatus {
        OperationStatus {
            phase: Phase::Pending,
            message: "working".into(),
            operation: op,
        }
    }

    #[test]
    fn pending_mint_only_disables_mint() {
        let s = pending(Some(OperationId::Mint));
        assert!(s.is_disabled(OperationId::Mint));
        assert!(!s.is_disabled(OperationId::Burn));
        assert!(!s.is_disabled(OperationId::MintTo));
        assert!(!s.is_disabled(OperationId::CheckOwner));
        assert_eq!(
            s.lock_scope(),
            Some(LockScope::Operation(OperationId::Mint))
        );
    }

    #[test]
    fn pending_without_origin_locks_everything() {
        let s = pending(None);
        assert_eq!(s.lock_scope(), Some(LockScope::All));
        for op in OperationId::ALL {
            assert!(s.is_disabled(op), "{op} should be locked");
        }
        assert_eq!(s.locked(), OperationId::ALL.to_vec());
    }

    #[test]
    fn terminal_and_idle_never_disable() {
        let mut s = OperationStatus::idle();
        assert!(!s.is_disabled(OperationId::Mint));
        s.phase = Phase::Failed;
        s.operation = Some(OperationId::Mint);
        assert!(!s.is_disabled(OperationId::Mint));
        assert_eq!(s.lock_scope(), None);
    }

    #[test]
    fn operation_ids_serialize_with_wire_names() {
        let s = pending(Some(OperationId::CheckOwner));
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["operation"], "checkOwner");
        assert_eq!(v["phase"], "Pending");

        let idle = serde_json::to_value(OperationStatus::idle()).unwrap();
        assert!(idle.get("operation").is_none());
    }
}
