//! Drives one remote operation through the status coordinator.

use super::classify::{classify, FailurePolicy};
use super::coordinator::StatusCoordinator;
use super::reads::ReadModel;
use crate::chain::{RemoteFailure, TxHandle};
use crate::model::OperationId;
use std::future::Future;

/// Static description of one user-triggered operation.
#[derive(Debug, Clone)]
pub(crate) struct OperationSpec {
    pub id: OperationId,
    pub pending: String,
    pub success: String,
    pub failure: FailurePolicy,
    /// Re-read the caller's balance after success.
    pub refresh_balance: bool,
}

/// What an action hands back once its remote call returned.
pub(crate) enum Submission<T> {
    /// Nothing further to wait for.
    Ready(T),
    /// Await finality before reporting success.
    Confirm(Box<dyn TxHandle>, T),
}

/// How one `run` call ended.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Outcome<T> {
    /// Another operation held the admission slot; nothing happened.
    Denied,
    Done(T),
    Failed,
}

impl Submission<()> {
    pub(crate) fn confirm(handle: Box<dyn TxHandle>) -> Self {
        Submission::Confirm(handle, ())
    }
}

#[derive(Clone)]
pub(crate) struct OperationRunner {
    status: StatusCoordinator,
    reads: ReadModel,
}

impl OperationRunner {
    pub(crate) fn new(status: StatusCoordinator, reads: ReadModel) -> Self {
        Self { status, reads }
    }

    pub(crate) fn status(&self) -> &StatusCoordinator {
        &self.status
    }

    pub(crate) fn reads(&self) -> &ReadModel {
        &self.reads
    }

    /// Run `action` with a fixed success message.
    pub(crate) async fn run<T, A, Fut>(&self, spec: &OperationSpec, action: A) -> Outcome<T>
    where
        A: FnOnce() -> Fut,
        Fut: Future<Output = Result<Submission<T>, RemoteFailure>>,
    {
        let success = spec.success.clone();
        self.run_with(spec, action, move |_| success).await
    }

    /// Run `action`, deriving the success message from its value.
    ///
    /// A denied trigger is dropped, not queued.
    pub(crate) async fn run_with<T, A, Fut, D>(
        &self,
        spec: &OperationSpec,
        action: A,
        describe: D,
    ) -> Outcome<T>
    where
        A: FnOnce() -> Fut,
        Fut: Future<Output = Result<Submission<T>, RemoteFailure>>,
        D: FnOnce(&T) -> String,
    {
        if !self.status.try_begin(spec.id, &spec.pending) {
            return Outcome::Denied;
        }

        let outcome = async {
            match action().await? {
                Submission::Ready(value) => Ok::<T, RemoteFailure>(value),
                Submission::Confirm(handle, value) => {
                    handle.confirm().await?;
                    Ok(value)
                }
            }
        }
        .await;

        match outcome {
            Ok(value) => {
                self.status.succeed(&describe(&value));
                if spec.refresh_balance {
                    self.reads.refresh_balance().await;
                }
                Outcome::Done(value)
            }
            Err(failure) => {
                tracing::warn!(operation = %spec.id, error = %failure, "operation failed");
                self.status.fail(&classify(&failure, &spec.failure));
                Outcome::Failed
            }
        }
    }
}
