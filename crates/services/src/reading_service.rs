use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use seer_core::billing::DEFAULT_LOW_BALANCE_MINUTES;
use seer_core::model::{ReaderId, ReadingKind, SessionId, TransactionId, TransactionKind, UserId};
use seer_core::{BillingConfig, BillingSnapshot, EndReason, Money, SessionBillingTimer};
use storage::repository::{
    AccountRepository, NewTransaction, ReaderRepository, TransactionRepository,
};
use tracing::{error, info, warn};

use crate::Clock;
use crate::billing::{BillingObserver, DEFAULT_TICK, SessionTicker};
use crate::error::ReadingError;

/// A pay-per-minute reading in progress.
///
/// Dropping the session without calling `ReadingService::finish_reading`
/// stops billing but persists nothing.
pub struct ReadingSession {
    id: SessionId,
    client_id: UserId,
    reader_id: ReaderId,
    reader_name: String,
    kind: ReadingKind,
    started_at: DateTime<Utc>,
    ticker: SessionTicker,
}

impl ReadingSession {
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn client_id(&self) -> UserId {
        self.client_id
    }

    #[must_use]
    pub fn reader_id(&self) -> ReaderId {
        self.reader_id
    }

    #[must_use]
    pub fn reader_name(&self) -> &str {
        &self.reader_name
    }

    #[must_use]
    pub fn kind(&self) -> ReadingKind {
        self.kind
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Stop billing without ending, e.g. while the connection drops.
    pub fn pause(&self) {
        self.ticker.set_active(false);
    }

    pub fn resume(&self) {
        self.ticker.set_active(true);
    }

    /// Request a manual end. Persisting happens in `finish_reading`.
    pub fn end(&self) {
        self.ticker.end();
    }

    #[must_use]
    pub fn snapshot(&self) -> BillingSnapshot {
        self.ticker.snapshot()
    }

    /// Wait for the next billing update. `None` once billing has stopped.
    pub async fn changed(&mut self) -> Option<BillingSnapshot> {
        self.ticker.changed().await
    }
}

/// Settled outcome of a finished reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingReceipt {
    pub session_id: SessionId,
    pub elapsed_seconds: u64,
    pub billed: Money,
    pub new_balance: Money,
    pub end_reason: Option<EndReason>,
    pub transaction_id: Option<TransactionId>,
}

/// Starts billed readings and settles them against the stored balance.
#[derive(Clone)]
pub struct ReadingService {
    clock: Clock,
    accounts: Arc<dyn AccountRepository>,
    readers: Arc<dyn ReaderRepository>,
    transactions: Arc<dyn TransactionRepository>,
    tick: Duration,
    low_balance_minutes: u32,
}

impl ReadingService {
    #[must_use]
    pub fn new(
        clock: Clock,
        accounts: Arc<dyn AccountRepository>,
        readers: Arc<dyn ReaderRepository>,
        transactions: Arc<dyn TransactionRepository>,
    ) -> Self {
        Self {
            clock,
            accounts,
            readers,
            transactions,
            tick: DEFAULT_TICK,
            low_balance_minutes: DEFAULT_LOW_BALANCE_MINUTES,
        }
    }

    /// Wall-clock length of one billed second.
    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    #[must_use]
    pub fn with_low_balance_minutes(mut self, minutes: u32) -> Self {
        self.low_balance_minutes = minutes;
        self
    }

    /// Start a reading and begin billing immediately.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `ReadingError::UnknownClient` / `UnknownReader` for missing records.
    /// Returns `ReadingError::InsufficientBalance` if the balance does not cover one minute.
    /// Returns `ReadingError::Billing` for an invalid billing configuration.
    /// Returns `ReadingError::Storage` if repository access fails.
    pub async fn start_reading(
        &self,
        client_id: UserId,
        reader_id: ReaderId,
        kind: ReadingKind,
        observer: Box<dyn BillingObserver>,
    ) -> Result<ReadingSession, ReadingError> {
        let account = self
            .accounts
            .get_account(client_id)
            .await?
            .ok_or(ReadingError::UnknownClient(client_id))?;
        let reader = self
            .readers
            .get_reader(reader_id)
            .await?
            .ok_or(ReadingError::UnknownReader(reader_id))?;

        let rate = reader.rate();
        if account.balance() < rate.per_minute() {
            warn!(
                %client_id,
                %reader_id,
                balance = %account.balance(),
                %rate,
                "reading rejected, balance below one minute"
            );
            return Err(ReadingError::InsufficientBalance {
                required: rate.per_minute(),
                available: account.balance(),
            });
        }

        let config = BillingConfig::new(rate, account.balance())?
            .with_low_balance_minutes(self.low_balance_minutes)?;
        let ticker = SessionTicker::spawn(SessionBillingTimer::new(config), self.tick, observer);
        ticker.set_active(true);

        let session = ReadingSession {
            id: SessionId::new_random(),
            client_id,
            reader_id,
            reader_name: reader.name().to_owned(),
            kind,
            started_at: self.clock.now(),
            ticker,
        };
        info!(
            session_id = %session.id,
            %client_id,
            %reader_id,
            kind = kind.as_str(),
            %rate,
            balance = %account.balance(),
            "reading started"
        );
        Ok(session)
    }

    /// End the reading (if still running) and persist what it cost.
    ///
    /// The stored balance is reduced by the billed amount and a `Reading`
    /// transaction is recorded when anything was billed. A minute that
    /// overdraws on depletion is billed in full, so the stored balance can
    /// settle below zero. A failed write is logged and returned; nothing
    /// already written is undone.
    ///
    /// # Errors
    ///
    /// Returns `ReadingError::Ticker` if the billing task failed.
    /// Returns `ReadingError::UnknownClient` if the client vanished mid-session.
    /// Returns `ReadingError::Storage` if repository access fails.
    pub async fn finish_reading(
        &self,
        session: ReadingSession,
    ) -> Result<ReadingReceipt, ReadingError> {
        let ReadingSession {
            id,
            client_id,
            ticker,
            ..
        } = session;
        let snapshot = ticker.finish().await?;
        let billed = snapshot.cost_so_far;

        let account = self
            .accounts
            .get_account(client_id)
            .await?
            .ok_or(ReadingError::UnknownClient(client_id))?;
        let new_balance = account.balance() - billed;

        let mut transaction_id = None;
        if billed.is_positive() {
            self.accounts
                .update_balance(client_id, new_balance)
                .await
                .inspect_err(|e| {
                    error!(session_id = %id, %client_id, error = %e, "failed to persist reading balance");
                })?;
            let tx = NewTransaction::completed(
                client_id,
                TransactionKind::Reading,
                billed,
                self.clock.now(),
            );
            let recorded = self
                .transactions
                .insert_transaction(tx)
                .await
                .inspect_err(|e| {
                    error!(session_id = %id, %client_id, error = %e, "failed to record reading transaction");
                })?;
            transaction_id = Some(recorded);
        }

        info!(
            session_id = %id,
            %client_id,
            elapsed_seconds = snapshot.elapsed_seconds,
            %billed,
            %new_balance,
            reason = ?snapshot.end_reason,
            "reading settled"
        );
        Ok(ReadingReceipt {
            session_id: id,
            elapsed_seconds: snapshot.elapsed_seconds,
            billed,
            new_balance,
            end_reason: snapshot.end_reason,
            transaction_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::NoopObserver;
    use seer_core::time::fixed_now;
    use storage::repository::Storage;
    use storage::seed::seed_demo;

    fn service(storage: &Storage) -> ReadingService {
        ReadingService::new(
            Clock::Fixed(fixed_now()),
            Arc::clone(&storage.accounts),
            Arc::clone(&storage.readers),
            Arc::clone(&storage.transactions),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_balance_below_one_minute() {
        let storage = Storage::in_memory();
        let ids = seed_demo(&storage, Money::from_cents(398)).await.unwrap();

        let err = service(&storage)
            .start_reading(ids.client, ids.reader, ReadingKind::Chat, Box::new(NoopObserver))
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ReadingError::InsufficientBalance { required, available }
                if required == Money::from_cents(399) && available == Money::from_cents(398)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_reader_is_reported() {
        let storage = Storage::in_memory();
        let ids = seed_demo(&storage, Money::from_units(50)).await.unwrap();

        let err = service(&storage)
            .start_reading(ids.client, ReaderId::new(99), ReadingKind::Phone, Box::new(NoopObserver))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ReadingError::UnknownReader(id) if id == ReaderId::new(99)));
    }

    #[tokio::test(start_paused = true)]
    async fn short_reading_bills_nothing() {
        let storage = Storage::in_memory();
        let ids = seed_demo(&storage, Money::from_units(50)).await.unwrap();
        let service = service(&storage);

        let session = service
            .start_reading(ids.client, ids.reader, ReadingKind::Video, Box::new(NoopObserver))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20_500)).await;

        let receipt = service.finish_reading(session).await.unwrap();
        assert_eq!(receipt.elapsed_seconds, 20);
        assert_eq!(receipt.billed, Money::ZERO);
        assert_eq!(receipt.new_balance, Money::from_units(50));
        assert_eq!(receipt.end_reason, Some(EndReason::Manual));
        assert!(receipt.transaction_id.is_none());

        let txs = storage.transactions.list_transactions(ids.client, 10).await.unwrap();
        assert!(txs.is_empty());
    }
}
