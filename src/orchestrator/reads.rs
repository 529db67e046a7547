//! Read-only display state fetched from the contract.
//!
//! Each value has its own fetcher and its own `watch` channel. No admission gating
//! and no cross-fetcher ordering: the last completed fetch wins.

use crate::chain::{ContractClient, RemoteFailure};
use crate::model::{ContractMetadata, OwnerLookup, ReadState};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub(crate) struct ReadModel {
    client: Arc<dyn ContractClient>,
    metadata: Arc<watch::Sender<ReadState<ContractMetadata>>>,
    balance: Arc<watch::Sender<ReadState<u64>>>,
    owner: Arc<watch::Sender<Option<OwnerLookup>>>,
}

/// Receivers for presentation layers.
#[cfg(feature = "tui")]
#[derive(Clone)]
pub(crate) struct ReadViews {
    pub metadata: watch::Receiver<ReadState<ContractMetadata>>,
    pub balance: watch::Receiver<ReadState<u64>>,
    pub owner: watch::Receiver<Option<OwnerLookup>>,
}

impl ReadModel {
    pub(crate) fn new(client: Arc<dyn ContractClient>) -> Self {
        Self {
            client,
            metadata: Arc::new(watch::channel(ReadState::Loading).0),
            balance: Arc::new(watch::channel(ReadState::Loading).0),
            owner: Arc::new(watch::channel(None).0),
        }
    }

    #[cfg(feature = "tui")]
    pub(crate) fn views(&self) -> ReadViews {
        ReadViews {
            metadata: self.metadata.subscribe(),
            balance: self.balance.subscribe(),
            owner: self.owner.subscribe(),
        }
    }

    pub(crate) fn balance(&self) -> ReadState<u64> {
        self.balance.borrow().clone()
    }

    pub(crate) fn metadata(&self) -> ReadState<ContractMetadata> {
        self.metadata.borrow().clone()
    }

    pub(crate) fn owner(&self) -> Option<OwnerLookup> {
        self.owner.borrow().clone()
    }

    pub(crate) async fn refresh_all(&self) {
        tokio::join!(self.refresh_metadata(), self.refresh_balance());
    }

    pub(crate) async fn refresh_metadata(&self) {
        let fetched = async {
            let name = self.client.name().await?;
            let symbol = self.client.symbol().await?;
            Ok::<_, RemoteFailure>(ContractMetadata { name, symbol })
        }
        .await;
        match fetched {
            Ok(meta) => {
                self.metadata.send_replace(ReadState::Ready(meta));
            }
            Err(e) => {
                tracing::warn!(error = %e, "error fetching contract info");
                settle_failure(&self.metadata, e.to_string());
            }
        }
    }

    pub(crate) async fn refresh_balance(&self) {
        match self.client.balance_of_caller().await {
            Ok(balance) => {
                self.balance.send_replace(ReadState::Ready(balance));
            }
            Err(e) => {
                tracing::warn!(error = %e, "error fetching balance");
                settle_failure(&self.balance, e.to_string());
            }
        }
    }

    pub(crate) fn set_owner(&self, lookup: Option<OwnerLookup>) {
        self.owner.send_replace(lookup);
    }
}

/// A failed refresh keeps a previously loaded value; only a value that never loaded
/// turns into `Failed`.
fn settle_failure<T>(tx: &watch::Sender<ReadState<T>>, error: String) {
    tx.send_if_modified(|state| match state {
        ReadState::Ready(_) => false,
        _ => {
            *state = ReadState::Failed(error);
            true
        }
    });
}
