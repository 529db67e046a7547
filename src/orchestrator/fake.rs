//! Scripted in-memory contract used by the orchestrator tests.

use crate::chain::{ContractClient, RemoteFailure, TxHandle};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
struct State {
    balance: u64,
    owners: HashMap<u64, String>,
    read_failure: Option<RemoteFailure>,
    submit_failure: Option<RemoteFailure>,
    confirm_failure: Option<RemoteFailure>,
    gate: Option<Arc<Notify>>,
    writes: Vec<String>,
    balance_reads: usize,
}

#[derive(Default)]
pub(crate) struct FakeContract {
    state: Arc<Mutex<State>>,
}

impl FakeContract {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub(crate) fn set_balance(&self, balance: u64) {
        self.with(|s| s.balance = balance);
    }

    pub(crate) fn set_owner(&self, token_id: u64, owner: &str) {
        self.with(|s| s.owners.insert(token_id, owner.to_string()));
    }

    pub(crate) fn fail_reads(&self, failure: Option<RemoteFailure>) {
        self.with(|s| s.read_failure = failure);
    }

    pub(crate) fn fail_submit(&self, failure: Option<RemoteFailure>) {
        self.with(|s| s.submit_failure = failure);
    }

    pub(crate) fn fail_confirm(&self, failure: Option<RemoteFailure>) {
        self.with(|s| s.confirm_failure = failure);
    }

    /// Writes block until the returned `Notify` is signalled once per write.
    pub(crate) fn hold_writes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.with(|s| s.gate = Some(gate.clone()));
        gate
    }

    pub(crate) fn writes(&self) -> Vec<String> {
        self.with(|s| s.writes.clone())
    }

    pub(crate) fn balance_reads(&self) -> usize {
        self.with(|s| s.balance_reads)
    }

    fn read_result(&self) -> Result<(), RemoteFailure> {
        self.with(|s| s.read_failure.clone().map_or(Ok(()), Err))
    }

    async fn write(&self, call: String, delta: i64) -> Result<Box<dyn TxHandle>, RemoteFailure> {
        let gate = self.with(|s| s.gate.clone());
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.with(|s| {
            s.writes.push(call);
            s.submit_failure.clone().map_or(Ok(()), Err)
        })?;
        Ok(Box::new(FakeTx {
            state: self.state.clone(),
            delta,
        }))
    }
}

struct FakeTx {
    state: Arc<Mutex<State>>,
    delta: i64,
}

#[async_trait]
impl TxHandle for FakeTx {
    async fn confirm(self: Box<Self>) -> Result<(), RemoteFailure> {
        let mut s = self.state.lock().unwrap();
        if let Some(f) = s.confirm_failure.clone() {
            return Err(f);
        }
        s.balance = s.balance.saturating_add_signed(self.delta);
        Ok(())
    }
}

#[async_trait]
impl ContractClient for FakeContract {
    async fn name(&self) -> Result<String, RemoteFailure> {
        self.read_result().map(|_| "StylusNFT".to_string())
    }

    async fn symbol(&self) -> Result<String, RemoteFailure> {
        self.read_result().map(|_| "SNFT".to_string())
    }

    async fn balance_of_caller(&self) -> Result<u64, RemoteFailure> {
        self.with(|s| s.balance_reads += 1);
        self.read_result()?;
        Ok(self.with(|s| s.balance))
    }

    async fn owner_of(&self, token_id: u64) -> Result<String, RemoteFailure> {
        self.read_result()?;
        self.with(|s| s.owners.get(&token_id).cloned())
            .ok_or_else(|| RemoteFailure {
                reason: Some("InvalidTokenId".into()),
                message: None,
            })
    }

    async fn mint(&self) -> Result<Box<dyn TxHandle>, RemoteFailure> {
        self.write("mint".into(), 1).await
    }

    async fn mint_to(&self, recipient: &str) -> Result<Box<dyn TxHandle>, RemoteFailure> {
        self.write(format!("mintTo({recipient})"), 0).await
    }

    async fn burn(&self, token_id: u64) -> Result<Box<dyn TxHandle>, RemoteFailure> {
        self.write(format!("burn({token_id})"), -1).await
    }
}
