//! Single shared operation status with single-flight admission.

use crate::model::{OperationId, OperationStatus, Phase};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;

struct Inner {
    status: OperationStatus,
    // Bumped on every transition; an expiry timer only fires for its own generation.
    generation: u64,
}

/// Owner of the one `OperationStatus` record.
///
/// Cheap to clone; all clones share the same record. Every transition is published
/// on a `watch` channel for presentation layers.
#[derive(Clone)]
pub(crate) struct StatusCoordinator {
    inner: Arc<Mutex<Inner>>,
    publish: Arc<watch::Sender<OperationStatus>>,
    ttl: Duration,
}

impl StatusCoordinator {
    pub(crate) fn new(ttl: Duration) -> Self {
        let (tx, _rx) = watch::channel(OperationStatus::idle());
        Self {
            inner: Arc::new(Mutex::new(Inner {
                status: OperationStatus::idle(),
                generation: 0,
            })),
            publish: Arc::new(tx),
            ttl,
        }
    }

    pub(crate) fn ttl(&self) -> Duration {
        self.ttl
    }

    pub(crate) fn current(&self) -> OperationStatus {
        self.lock().status.clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<OperationStatus> {
        self.publish.subscribe()
    }

    /// Claim the admission slot for `op`. Returns false, changing nothing, while
    /// another operation is pending.
    pub(crate) fn try_begin(&self, op: OperationId, pending_message: &str) -> bool {
        let mut inner = self.lock();
        if inner.status.is_pending() {
            tracing::debug!(
                requested = %op,
                holder = ?inner.status.operation,
                "admission denied"
            );
            return false;
        }
        let status = OperationStatus {
            phase: Phase::Pending,
            message: pending_message.to_string(),
            operation: Some(op),
        };
        self.transition(&mut inner, status);
        tracing::info!(operation = %op, "operation admitted");
        true
    }

    pub(crate) fn succeed(&self, message: &str) {
        self.finish(Phase::Succeeded, message);
    }

    pub(crate) fn fail(&self, message: &str) {
        self.finish(Phase::Failed, message);
    }

    /// Report a validation failure for an operation that was never admitted.
    ///
    /// A pending record is left untouched so the held admission slot is not released;
    /// returns whether the rejection was shown.
    pub(crate) fn reject(&self, message: &str) -> bool {
        let mut inner = self.lock();
        if inner.status.is_pending() {
            tracing::warn!(
                message,
                "validation failure dropped while an operation is pending"
            );
            return false;
        }
        let generation = self.transition(&mut inner, terminal(Phase::Failed, message));
        drop(inner);
        self.schedule_expiry(generation);
        true
    }

    fn finish(&self, phase: Phase, message: &str) {
        let mut inner = self.lock();
        let generation = self.transition(&mut inner, terminal(phase, message));
        drop(inner);
        tracing::info!(?phase, message, "operation finished");
        self.schedule_expiry(generation);
    }

    fn transition(&self, inner: &mut Inner, status: OperationStatus) -> u64 {
        inner.generation += 1;
        inner.status = status;
        self.publish.send_replace(inner.status.clone());
        inner.generation
    }

    fn schedule_expiry(&self, generation: u64) {
        let deadline = tokio::time::Instant::now() + self.ttl;
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            this.expire(generation);
        });
    }

    /// Reset to idle if no transition happened since `generation` was stamped.
    fn expire(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation != generation || !inner.status.phase.is_terminal() {
            return;
        }
        self.transition(&mut inner, OperationStatus::idle());
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock still holds a consistent record: every write is a single assignment.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn terminal(phase: Phase, message: &str) -> OperationStatus {
    OperationStatus {
        phase,
        message: message.to_string(),
        operation: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(5);

    async fn settle() {
        // Let spawned expiry tasks observe the advanced clock.
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn second_begin_is_denied_while_pending() {
        let c = StatusCoordinator::new(TTL);
        assert!(c.try_begin(OperationId::Mint, "Minting your NFT..."));
        let before = c.current();

        for op in [
            OperationId::Mint,
            OperationId::MintTo,
            OperationId::CheckOwner,
            OperationId::Burn,
        ] {
            assert!(!c.try_begin(op, "other"));
            assert_eq!(c.current(), before);
        }

        c.succeed("done");
        assert!(c.try_begin(OperationId::Burn, "Burning token..."));
    }

    #[tokio::test(start_paused = true)]
    async fn pending_status_names_its_operation() {
        let c = StatusCoordinator::new(TTL);
        c.try_begin(OperationId::Mint, "Minting your NFT...");
        let s = c.current();
        assert_eq!(s.phase, Phase::Pending);
        assert_eq!(s.operation, Some(OperationId::Mint));
        assert!(s.is_disabled(OperationId::Mint));
        assert!(!s.is_disabled(OperationId::Burn));
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_status_expires_to_idle() {
        let c = StatusCoordinator::new(TTL);
        c.try_begin(OperationId::Mint, "Minting your NFT...");
        c.succeed("NFT minted successfully!");
        let s = c.current();
        assert_eq!(s.phase, Phase::Succeeded);
        assert_eq!(s.operation, None);

        tokio::time::advance(Duration::from_millis(4_999)).await;
        settle().await;
        assert_eq!(c.current().phase, Phase::Succeeded);

        tokio::time::advance(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(c.current(), OperationStatus::idle());
    }

    #[tokio::test(start_paused = true)]
    async fn older_timer_does_not_clear_newer_outcome() {
        let c = StatusCoordinator::new(TTL);
        c.try_begin(OperationId::Mint, "Minting your NFT...");
        c.succeed("A done");

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert!(c.try_begin(OperationId::Burn, "Burning token..."));
        c.fail("B failed");

        // A's timer fires at t+5s
        tokio::time::advance(Duration::from_secs(3)).await;
        settle().await;
        let s = c.current();
        assert_eq!(s.phase, Phase::Failed);
        assert_eq!(s.message, "B failed");

        // B's timer fires at t+7s
        tokio::time::advance(Duration::from_millis(2_010)).await;
        settle().await;
        assert_eq!(c.current(), OperationStatus::idle());
    }

    #[tokio::test(start_paused = true)]
    async fn older_timer_does_not_clear_newer_pending() {
        let c = StatusCoordinator::new(TTL);
        c.try_begin(OperationId::Mint, "Minting your NFT...");
        c.succeed("A done");
        tokio::time::advance(Duration::from_secs(1)).await;
        c.try_begin(OperationId::MintTo, "Minting NFT to address...");

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        let s = c.current();
        assert_eq!(s.phase, Phase::Pending);
        assert_eq!(s.operation, Some(OperationId::MintTo));
    }

    #[tokio::test(start_paused = true)]
    async fn reject_never_admits_and_keeps_pending() {
        let c = StatusCoordinator::new(TTL);
        for _ in 0..3 {
            assert!(c.reject("Please enter a valid token ID"));
            let s = c.current();
            assert_eq!(s.phase, Phase::Failed);
            assert_eq!(s.message, "Please enter a valid token ID");
            assert_eq!(s.operation, None);
        }

        assert!(c.try_begin(OperationId::Mint, "Minting your NFT..."));
        let pending = c.current();
        for _ in 0..3 {
            assert!(!c.reject("Please enter a valid token ID"));
            assert_eq!(c.current(), pending);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_every_transition() {
        let c = StatusCoordinator::new(TTL);
        let mut rx = c.subscribe();
        c.try_begin(OperationId::CheckOwner, "Checking owner...");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().phase, Phase::Pending);

        c.fail("Token ID not found or invalid");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().phase, Phase::Failed);

        tokio::time::advance(TTL).await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().phase, Phase::Idle);
    }
}
