//! Contract client boundary.
//!
//! The orchestrator only sees [`ContractClient`] and [`TxHandle`]; the alloy-backed
//! implementation lives in [`evm`].

mod abi;
pub(crate) mod evm;
mod validate;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(feature = "tui")]
pub(crate) use validate::is_valid_address;
pub(crate) use validate::{parse_address, parse_token_id};

/// Failure shape reported by the remote call layer.
///
/// Either field may be missing; classification decides what the user sees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", self.describe())]
pub struct RemoteFailure {
    pub reason: Option<String>,
    pub message: Option<String>,
}

impl RemoteFailure {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            reason: None,
            message: Some(message.into()),
        }
    }

    fn describe(&self) -> String {
        match (self.reason.as_deref(), self.message.as_deref()) {
            (Some(r), Some(m)) => format!("{r}: {m}"),
            (Some(r), None) => r.to_string(),
            (None, Some(m)) => m.to_string(),
            (None, None) => "remote call failed".to_string(),
        }
    }
}

/// Local input rejected before any remote call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid Ethereum address")]
    InvalidAddress,
    #[error("Please enter a valid token ID")]
    InvalidTokenId,
}

/// A submitted transaction that can be awaited to finality.
#[async_trait]
pub trait TxHandle: Send {
    /// Resolves once the transaction is mined successfully.
    async fn confirm(self: Box<Self>) -> Result<(), RemoteFailure>;
}

#[async_trait]
pub trait ContractClient: Send + Sync {
    async fn name(&self) -> Result<String, RemoteFailure>;
    async fn symbol(&self) -> Result<String, RemoteFailure>;
    /// Token balance of the signing account.
    async fn balance_of_caller(&self) -> Result<u64, RemoteFailure>;
    async fn owner_of(&self, token_id: u64) -> Result<String, RemoteFailure>;

    async fn mint(&self) -> Result<Box<dyn TxHandle>, RemoteFailure>;
    async fn mint_to(&self, recipient: &str) -> Result<Box<dyn TxHandle>, RemoteFailure>;
    async fn burn(&self, token_id: u64) -> Result<Box<dyn TxHandle>, RemoteFailure>;
}
