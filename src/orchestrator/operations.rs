//! The four panel operations, wired onto the runner.

use super::classify::{FailurePolicy, OWNER_NOT_FOUND};
use super::coordinator::StatusCoordinator;
use super::reads::ReadModel;
use super::runner::{OperationRunner, OperationSpec, Outcome, Submission};
use crate::chain::{self, ContractClient, RemoteFailure};
use crate::model::{OperationId, OwnerLookup};
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use std::time::Duration;

/// A user request with its raw input, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Operation {
    Mint,
    MintTo(String),
    CheckOwner(String),
    Burn(String),
}

impl Operation {
    pub(crate) fn id(&self) -> OperationId {
        match self {
            Operation::Mint => OperationId::Mint,
            Operation::MintTo(_) => OperationId::MintTo,
            Operation::CheckOwner(_) => OperationId::CheckOwner,
            Operation::Burn(_) => OperationId::Burn,
        }
    }
}

fn mint_spec() -> OperationSpec {
    OperationSpec {
        id: OperationId::Mint,
        pending: "Minting your NFT...".into(),
        success: "NFT minted successfully!".into(),
        failure: FailurePolicy::transaction(),
        refresh_balance: true,
    }
}

fn mint_to_spec(recipient: &str) -> OperationSpec {
    OperationSpec {
        id: OperationId::MintTo,
        pending: "Minting NFT to address...".into(),
        success: format!("NFT minted to {recipient} successfully!"),
        failure: FailurePolicy::transaction(),
        refresh_balance: true,
    }
}

fn check_owner_spec() -> OperationSpec {
    OperationSpec {
        id: OperationId::CheckOwner,
        pending: "Checking owner...".into(),
        success: String::new(),
        failure: FailurePolicy::Fixed(OWNER_NOT_FOUND),
        refresh_balance: false,
    }
}

fn burn_spec(token_id: u64) -> OperationSpec {
    OperationSpec {
        id: OperationId::Burn,
        pending: "Burning token...".into(),
        success: format!("Token {token_id} burned successfully!"),
        failure: FailurePolicy::burn(),
        refresh_balance: true,
    }
}

/// Everything the presentation layers need: one status gate, one read model,
/// one contract client.
#[derive(Clone)]
pub(crate) struct Panel {
    runner: OperationRunner,
    client: Arc<dyn ContractClient>,
}

impl Panel {
    pub(crate) fn new(client: Arc<dyn ContractClient>, status_ttl: Duration) -> Self {
        let status = StatusCoordinator::new(status_ttl);
        let reads = ReadModel::new(client.clone());
        Self {
            runner: OperationRunner::new(status, reads),
            client,
        }
    }

    pub(crate) fn status(&self) -> &StatusCoordinator {
        self.runner.status()
    }

    pub(crate) fn reads(&self) -> &ReadModel {
        self.runner.reads()
    }

    /// Validate `op` synchronously and return the task that performs it.
    ///
    /// Invalid input is reported straight to the status record without requesting
    /// admission; `None` is returned and nothing is sent to the contract.
    pub(crate) fn start(&self, op: Operation) -> Option<BoxFuture<'static, ()>> {
        let this = self.clone();
        match op {
            Operation::Mint => Some(this.mint().boxed()),
            Operation::MintTo(input) => match chain::parse_address(&input) {
                Ok(_) => Some(this.mint_to(input.trim().to_string()).boxed()),
                Err(e) => {
                    self.status().reject(&e.to_string());
                    None
                }
            },
            Operation::CheckOwner(input) => match chain::parse_token_id(&input) {
                Ok(token_id) => Some(this.check_owner(token_id).boxed()),
                Err(e) => {
                    self.status().reject(&e.to_string());
                    None
                }
            },
            Operation::Burn(input) => match chain::parse_token_id(&input) {
                Ok(token_id) => Some(this.burn(token_id).boxed()),
                Err(e) => {
                    self.status().reject(&e.to_string());
                    None
                }
            },
        }
    }

    async fn mint(self) {
        let client = self.client.clone();
        self.runner
            .run(&mint_spec(), || async move {
                Ok::<_, RemoteFailure>(Submission::confirm(client.mint().await?))
            })
            .await;
    }

    async fn mint_to(self, recipient: String) {
        let client = self.client.clone();
        let spec = mint_to_spec(&recipient);
        self.runner
            .run(&spec, || async move {
                Ok::<_, RemoteFailure>(Submission::confirm(client.mint_to(&recipient).await?))
            })
            .await;
    }

    async fn check_owner(self, token_id: u64) {
        let client = self.client.clone();
        let outcome = self
            .runner
            .run_with(
                &check_owner_spec(),
                || async move {
                    Ok::<_, RemoteFailure>(Submission::Ready(client.owner_of(token_id).await?))
                },
                |owner| format!("Owner found: {owner}"),
            )
            .await;
        match outcome {
            Outcome::Denied => {}
            Outcome::Done(owner) => {
                let lookup = OwnerLookup { token_id, owner };
                self.reads().set_owner(Some(lookup));
            }
            Outcome::Failed => self.reads().set_owner(None),
        }
    }

    async fn burn(self, token_id: u64) {
        let client = self.client.clone();
        self.runner
            .run(&burn_spec(token_id), || async move {
                // Wait for the receipt so the balance refresh already sees the burn.
                Ok::<_, RemoteFailure>(Submission::confirm(client.burn(token_id).await?))
            })
            .await;
    }
}
