use std::time::Duration;

use seer_core::{BillingEvent, BillingSnapshot, SessionBillingTimer};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::observer::BillingObserver;
use crate::error::TickerError;

/// One billing second.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
enum Command {
    SetActive(bool),
    End,
}

/// Drives a `SessionBillingTimer` from a tokio interval.
///
/// The interval only exists while the timer is running: it is created when
/// the session becomes active and dropped on pause, manual end or depletion.
/// Dropping the `SessionTicker` aborts the task, so no tick outlives it.
pub struct SessionTicker {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<BillingSnapshot>,
    task: Option<JoinHandle<BillingSnapshot>>,
}

impl SessionTicker {
    /// Spawn the driver on the current tokio runtime.
    ///
    /// `period` is the wall-clock length of one billed second; the demo CLI
    /// shortens it to fast-forward a session.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(
        timer: SessionBillingTimer,
        period: Duration,
        observer: Box<dyn BillingObserver>,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(timer.snapshot());
        let period = period.max(Duration::from_millis(1));
        let task = tokio::spawn(run(timer, period, observer, command_rx, snapshot_tx));
        Self {
            commands,
            snapshots,
            task: Some(task),
        }
    }

    /// Apply the external activity flag (Idle <-> Running).
    pub fn set_active(&self, active: bool) {
        let _ = self.commands.send(Command::SetActive(active));
    }

    /// Manual end. Repeated calls are ignored by the timer.
    pub fn end(&self) {
        let _ = self.commands.send(Command::End);
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> BillingSnapshot {
        *self.snapshots.borrow()
    }

    /// Wait for the next published snapshot.
    ///
    /// Returns `None` once the driver has stopped.
    pub async fn changed(&mut self) -> Option<BillingSnapshot> {
        self.snapshots.changed().await.ok()?;
        Some(*self.snapshots.borrow_and_update())
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the session to end and return its final snapshot.
    ///
    /// Does not end the session; pair with `end()` for a manual stop.
    ///
    /// # Errors
    ///
    /// Returns `TickerError` if the task panicked or was aborted.
    pub async fn join(mut self) -> Result<BillingSnapshot, TickerError> {
        match self.task.take() {
            Some(task) => Ok(task.await?),
            None => Ok(self.snapshot()),
        }
    }

    /// End the session now and return its final snapshot.
    ///
    /// # Errors
    ///
    /// Returns `TickerError` if the task panicked or was aborted.
    pub async fn finish(self) -> Result<BillingSnapshot, TickerError> {
        self.end();
        self.join().await
    }
}

impl Drop for SessionTicker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(
    mut timer: SessionBillingTimer,
    period: Duration,
    mut observer: Box<dyn BillingObserver>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<BillingSnapshot>,
) -> BillingSnapshot {
    let mut interval: Option<Interval> = None;

    while !timer.is_ended() {
        sync_interval(&timer, &mut interval, period);

        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("billing handle dropped, stopping driver");
                    break;
                };
                let events = match command {
                    Command::SetActive(active) => {
                        if timer.set_active(active) {
                            debug!(active, "billing activity changed");
                        }
                        Vec::new()
                    }
                    Command::End => timer.end().into_iter().collect(),
                };
                dispatch(&timer, observer.as_mut(), &events, &snapshots);
            }
            () = next_tick(&mut interval) => {
                let events = timer.tick();
                dispatch(&timer, observer.as_mut(), &events, &snapshots);
            }
        }
    }

    timer.snapshot()
}

/// Hold an interval exactly while the timer is running.
fn sync_interval(timer: &SessionBillingTimer, slot: &mut Option<Interval>, period: Duration) {
    match (timer.is_running(), slot.is_some()) {
        (true, false) => {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            *slot = Some(interval);
        }
        (false, true) => *slot = None,
        _ => {}
    }
}

async fn next_tick(slot: &mut Option<Interval>) {
    match slot {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn dispatch(
    timer: &SessionBillingTimer,
    observer: &mut dyn BillingObserver,
    events: &[BillingEvent],
    snapshots: &watch::Sender<BillingSnapshot>,
) {
    let snapshot = timer.snapshot();
    for event in events {
        match *event {
            BillingEvent::BalanceUpdated(balance) => observer.on_balance_update(balance),
            BillingEvent::LowBalance(balance) => {
                warn!(
                    %balance,
                    remaining_seconds = snapshot.remaining_seconds,
                    "reading balance is running low"
                );
                observer.on_low_balance(&snapshot);
            }
            BillingEvent::SessionEnded(reason) => {
                info!(
                    ?reason,
                    elapsed_seconds = snapshot.elapsed_seconds,
                    cost = %snapshot.cost_so_far,
                    "reading billing ended"
                );
                observer.on_session_end(reason, &snapshot);
            }
        }
    }
    snapshots.send_replace(snapshot);
}
