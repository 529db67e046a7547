//! Command loop between the presentation layers and the panel.
//!
//! Validates each command synchronously, then runs admitted work as its own task so
//! a second trigger is evaluated while the first one is still in flight.

use super::operations::{Operation, Panel};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinSet;

/// Commands emitted by UI layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UiCommand {
    Run(Operation),
    /// Re-fetch contract metadata and balance.
    Refresh,
    Quit,
}

/// Serve UI commands until `Quit` or until every sender is gone.
pub(crate) async fn run_controller(panel: Panel, mut cmd_rx: UnboundedReceiver<UiCommand>) {
    let mut tasks = JoinSet::new();
    {
        let reads = panel.reads().clone();
        tasks.spawn(async move { reads.refresh_all().await });
    }

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Run(op)) => {
                        let id = op.id();
                        if let Some(work) = panel.start(op) {
                            tracing::debug!(operation = %id, "dispatching");
                            tasks.spawn(work);
                        }
                    }
                    Some(UiCommand::Refresh) => {
                        let reads = panel.reads().clone();
                        tasks.spawn(async move { reads.refresh_all().await });
                    }
                    Some(UiCommand::Quit) | None => break,
                }
            }
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "panel task failed");
                }
            }
        }
    }

    // In-flight remote calls cannot be cancelled; they are abandoned with the runtime.
    if !tasks.is_empty() {
        tracing::info!(tasks = tasks.len(), "leaving with tasks still running");
    }
    tasks.detach_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OperationId, Phase, ReadState};
    use crate::orchestrator::fake::FakeContract;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn startup_refresh_and_single_flight_through_commands() {
        let fake = Arc::new(FakeContract::new());
        fake.set_balance(4);
        let gate = fake.hold_writes();
        let panel = Panel::new(fake.clone(), Duration::from_secs(5));
        let (tx, rx) = mpsc::unbounded_channel();
        let ctrl = tokio::spawn(run_controller(panel.clone(), rx));

        settle().await;
        assert_eq!(panel.reads().balance(), ReadState::Ready(4));

        tx.send(UiCommand::Run(Operation::Mint)).unwrap();
        settle().await;
        let burn = UiCommand::Run(Operation::Burn("1".into()));
        tx.send(burn).unwrap();
        tx.send(UiCommand::Run(Operation::Mint)).unwrap();
        settle().await;
        let s = panel.status().current();
        assert_eq!(s.phase, Phase::Pending);
        assert_eq!(s.operation, Some(OperationId::Mint));

        gate.notify_one();
        settle().await;
        assert_eq!(panel.status().current().phase, Phase::Succeeded);
        assert_eq!(fake.writes(), vec!["mint".to_string()]);
        assert_eq!(panel.reads().balance(), ReadState::Ready(5));

        tx.send(UiCommand::Quit).unwrap();
        ctrl.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn controller_stops_when_senders_drop() {
        let fake = Arc::new(FakeContract::new());
        let panel = Panel::new(fake, Duration::from_secs(5));
        let (tx, rx) = mpsc::unbounded_channel();
        let ctrl = tokio::spawn(run_controller(panel, rx));
        drop(tx);
        ctrl.await.unwrap();
    }
}
