//! alloy-backed contract client.

use super::abi;
use super::validate::parse_address;
use super::{ContractClient, RemoteFailure, TxHandle};
use crate::model::PanelConfig;
use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::{SolCall, SolError};
use alloy::transports::http::{Client, Http};
use alloy::transports::{Transport, TransportError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Build a signing client for the configured contract.
pub(crate) fn connect(cfg: &PanelConfig) -> Result<Arc<dyn ContractClient>> {
    let signer: PrivateKeySigner = cfg
        .private_key
        .trim()
        .parse()
        .context("invalid private key (set --private-key or PRIVATE_KEY)")?;
    let caller = signer.address();
    let wallet = EthereumWallet::from(signer);
    let url = cfg
        .rpc_url
        .parse()
        .with_context(|| format!("invalid RPC URL {}", cfg.rpc_url))?;
    let address = parse_address(&cfg.contract)
        .map_err(|_| anyhow::anyhow!("invalid contract address {}", cfg.contract))?;

    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(wallet)
        .on_http(url);

    tracing::info!(%address, %caller, rpc = %cfg.rpc_url, "connected contract client");
    Ok(Arc::new(EvmContract::<_, Http<Client>>::new(
        provider,
        address,
        caller,
        cfg.confirm_poll,
    )))
}

pub(crate) struct EvmContract<P, T> {
    provider: P,
    address: Address,
    caller: Address,
    confirm_poll: Duration,
    _transport: PhantomData<fn() -> T>,
}

impl<P, T> EvmContract<P, T>
where
    P: Provider<T> + Clone + 'static,
    T: Transport + Clone,
{
    pub(crate) fn new(
        provider: P,
        address: Address,
        caller: Address,
        confirm_poll: Duration,
    ) -> Self {
        Self {
            provider,
            address,
            caller,
            confirm_poll,
            _transport: PhantomData,
        }
    }

    async fn read<C>(&self, call: C) -> Result<C::Return, RemoteFailure>
    where
        C: SolCall + Send,
    {
        let tx = TransactionRequest::default()
            .from(self.caller)
            .to(self.address)
            .input(call.abi_encode().into());
        let out = self
            .provider
            .call(&tx)
            .await
            .map_err(|e| failure_from_rpc(&e))?;
        C::abi_decode_returns(&out, true).map_err(|e| {
            RemoteFailure::message(format!("could not decode {} result: {e}", C::SIGNATURE))
        })
    }

    async fn submit<C>(&self, call: C) -> Result<Box<dyn TxHandle>, RemoteFailure>
    where
        C: SolCall + Send,
    {
        let tx = TransactionRequest::default()
            .from(self.caller)
            .to(self.address)
            .input(call.abi_encode().into());
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| failure_from_rpc(&e))?;
        let hash = *pending.tx_hash();
        tracing::debug!(%hash, call = C::SIGNATURE, "transaction submitted");
        Ok(Box::new(PendingReceipt::<P, T> {
            provider: self.provider.clone(),
            hash,
            poll: self.confirm_poll,
            _transport: PhantomData,
        }))
    }
}

#[async_trait]
impl<P, T> ContractClient for EvmContract<P, T>
where
    P: Provider<T> + Clone + 'static,
    T: Transport + Clone,
{
    async fn name(&self) -> Result<String, RemoteFailure> {
        Ok(self.read(abi::nameCall {}).await?.name)
    }

    async fn symbol(&self) -> Result<String, RemoteFailure> {
        Ok(self.read(abi::symbolCall {}).await?.symbol)
    }

    async fn balance_of_caller(&self) -> Result<u64, RemoteFailure> {
        let balance: U256 = self
            .read(abi::balanceOfCall { owner: self.caller })
            .await?
            .balance;
        u64::try_from(balance)
            .map_err(|_| RemoteFailure::message(format!("balance {balance} does not fit in u64")))
    }

    async fn owner_of(&self, token_id: u64) -> Result<String, RemoteFailure> {
        let owner = self
            .read(abi::ownerOfCall {
                token_id: U256::from(token_id),
            })
            .await?
            .owner;
        Ok(owner.to_checksum(None))
    }

    async fn mint(&self) -> Result<Box<dyn TxHandle>, RemoteFailure> {
        self.submit(abi::mintCall {}).await
    }

    async fn mint_to(&self, recipient: &str) -> Result<Box<dyn TxHandle>, RemoteFailure> {
        let to = parse_address(recipient).map_err(|e| RemoteFailure::message(e.to_string()))?;
        self.submit(abi::mintToCall { to }).await
    }

    async fn burn(&self, token_id: u64) -> Result<Box<dyn TxHandle>, RemoteFailure> {
        self.submit(abi::burnCall {
            token_id: U256::from(token_id),
        })
        .await
    }
}

/// Polls for the receipt of a submitted transaction.
struct PendingReceipt<P, T> {
    provider: P,
    hash: B256,
    poll: Duration,
    _transport: PhantomData<fn() -> T>,
}

#[async_trait]
impl<P, T> TxHandle for PendingReceipt<P, T>
where
    P: Provider<T> + Clone + 'static,
    T: Transport + Clone,
{
    async fn confirm(self: Box<Self>) -> Result<(), RemoteFailure> {
        loop {
            match self.provider.get_transaction_receipt(self.hash).await {
                Ok(Some(receipt)) => {
                    if receipt.status() {
                        tracing::debug!(
                            hash = %self.hash,
                            block = ?receipt.block_number,
                            "transaction confirmed"
                        );
                        return Ok(());
                    }
                    return Err(RemoteFailure::message(format!(
                        "transaction {} reverted",
                        self.hash
                    )));
                }
                Ok(None) => tokio::time::sleep(self.poll).await,
                Err(e) => return Err(failure_from_rpc(&e)),
            }
        }
    }
}

/// Map an RPC error into the uniform failure shape.
///
/// `reason` comes from revert data when the node returns any, `message` from the
/// node's error text.
fn failure_from_rpc(err: &TransportError) -> RemoteFailure {
    match err.as_error_resp() {
        Some(payload) => RemoteFailure {
            reason: payload
                .as_revert_data()
                .and_then(|data| revert_reason(&data)),
            message: Some(payload.message.to_string()),
        },
        None => RemoteFailure::message(err.to_string()),
    }
}

fn revert_reason(data: &[u8]) -> Option<String> {
    if let Some(name) = custom_error_name(data) {
        return Some(name.to_string());
    }
    if let Ok(revert) = alloy::sol_types::Revert::abi_decode(data, true) {
        return Some(revert.reason).filter(|r| !r.trim().is_empty());
    }
    alloy::sol_types::decode_revert_reason(data).filter(|r| !r.trim().is_empty())
}

fn custom_error_name(data: &[u8]) -> Option<&'static str> {
    use abi::{InvalidTokenId, NotApproved, NotOwner, ReceiverRefused, TransferToZero};

    let selector: [u8; 4] = data.get(..4)?.try_into().ok()?;
    let known: [([u8; 4], &'static str); 5] = [
        (InvalidTokenId::SELECTOR, InvalidTokenId::SIGNATURE),
        (NotOwner::SELECTOR, NotOwner::SIGNATURE),
        (NotApproved::SELECTOR, NotApproved::SIGNATURE),
        (TransferToZero::SELECTOR, TransferToZero::SIGNATURE),
        (ReceiverRefused::SELECTOR, ReceiverRefused::SIGNATURE),
    ];
    known
        .iter()
        .find(|(s, _)| *s == selector)
        .map(|(_, sig)| sig.split_once('(').map(|(name, _)| name).unwrap_or(sig))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_errors_are_reported_by_name() {
        let data = abi::InvalidTokenId {
            token_id: U256::from(7u64),
        }
        .abi_encode();
        assert_eq!(revert_reason(&data).as_deref(), Some("InvalidTokenId"));
    }

    #[test]
    fn string_reverts_are_decoded() {
        let data = alloy::sol_types::Revert {
            reason: "not allowed".into(),
        }
        .abi_encode();
        assert_eq!(revert_reason(&data).as_deref(), Some("not allowed"));
    }

    #[test]
    fn short_revert_data_has_no_custom_name() {
        assert_eq!(custom_error_name(&[0x01, 0x02]), None);
    }
}
