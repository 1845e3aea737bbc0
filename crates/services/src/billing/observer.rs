use seer_core::{BillingEvent, BillingSnapshot, EndReason, Money};
use tokio::sync::mpsc;

/// Receives billing callbacks from a running `SessionTicker`.
///
/// Callbacks run on the ticker task. A panicking observer stops the task
/// and surfaces as `TickerError::Panicked` when the ticker is joined.
pub trait BillingObserver: Send + 'static {
    /// Called on every whole-minute boundary with the new balance.
    fn on_balance_update(&mut self, balance: Money);

    /// Called once, the first time the balance drops under the threshold.
    fn on_low_balance(&mut self, _snapshot: &BillingSnapshot) {}

    /// Called at most once per session.
    fn on_session_end(&mut self, reason: EndReason, snapshot: &BillingSnapshot);
}

/// Ignores every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl BillingObserver for NoopObserver {
    fn on_balance_update(&mut self, _balance: Money) {}

    fn on_session_end(&mut self, _reason: EndReason, _snapshot: &BillingSnapshot) {}
}

/// Forwards callbacks as `BillingEvent`s into a channel.
///
/// Sends are best-effort: a dropped receiver does not stop billing.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<BillingEvent>,
}

impl ChannelObserver {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BillingEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl BillingObserver for ChannelObserver {
    fn on_balance_update(&mut self, balance: Money) {
        let _ = self.tx.send(BillingEvent::BalanceUpdated(balance));
    }

    fn on_low_balance(&mut self, snapshot: &BillingSnapshot) {
        let _ = self
            .tx
            .send(BillingEvent::LowBalance(snapshot.remaining_balance));
    }

    fn on_session_end(&mut self, reason: EndReason, _snapshot: &BillingSnapshot) {
        let _ = self.tx.send(BillingEvent::SessionEnded(reason));
    }
}
