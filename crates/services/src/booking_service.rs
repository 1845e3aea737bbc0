use std::sync::Arc;

use chrono::NaiveDate;
use seer_core::Money;
use seer_core::model::{
    Booking, BookingPolicy, ReaderId, ServiceId, TimeSlot, TransactionId, TransactionKind, UserId,
};
use storage::repository::{
    AccountRepository, BookingRepository, NewBooking, NewTransaction, ReaderRepository,
    TransactionRepository,
};
use tracing::{error, info, warn};

use crate::Clock;
use crate::error::BookingServiceError;

/// What a client asks for when scheduling a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub client_id: UserId,
    pub reader_id: ReaderId,
    pub service_id: ServiceId,
    pub price: Money,
    pub date: NaiveDate,
    pub slot: TimeSlot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingReceipt {
    pub booking: Booking,
    pub new_balance: Money,
    pub transaction_id: TransactionId,
}

/// Prepaid, scheduled readings.
#[derive(Clone)]
pub struct BookingService {
    clock: Clock,
    policy: BookingPolicy,
    accounts: Arc<dyn AccountRepository>,
    readers: Arc<dyn ReaderRepository>,
    bookings: Arc<dyn BookingRepository>,
    transactions: Arc<dyn TransactionRepository>,
}

impl BookingService {
    #[must_use]
    pub fn new(
        clock: Clock,
        policy: BookingPolicy,
        accounts: Arc<dyn AccountRepository>,
        readers: Arc<dyn ReaderRepository>,
        bookings: Arc<dyn BookingRepository>,
        transactions: Arc<dyn TransactionRepository>,
    ) -> Self {
        Self {
            clock,
            policy,
            accounts,
            readers,
            bookings,
            transactions,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    /// Slots on `date` that can still be booked right now.
    ///
    /// Every policy slot for a future date inside the booking window; the
    /// remaining ones for today; none outside the window.
    #[must_use]
    pub fn available_slots(&self, date: NaiveDate) -> Vec<TimeSlot> {
        let now = self.clock.now();
        self.policy
            .slots()
            .into_iter()
            .filter(|slot| self.policy.validate(now, date, *slot).is_ok())
            .collect()
    }

    /// Book a slot and pay for it up front.
    ///
    /// # Errors
    ///
    /// Returns `BookingServiceError::Booking` if the date or slot breaks the policy.
    /// Returns `BookingServiceError::UnknownClient` / `UnknownReader` for missing records.
    /// Returns `BookingServiceError::InsufficientBalance` if the balance is below the price.
    /// Returns `BookingServiceError::Storage` if repository access fails.
    pub async fn schedule(
        &self,
        request: ScheduleRequest,
    ) -> Result<BookingReceipt, BookingServiceError> {
        let ScheduleRequest {
            client_id,
            reader_id,
            service_id,
            price,
            date,
            slot,
        } = request;
        let now = self.clock.now();
        let scheduled_at = self
            .policy
            .validate(now, date, slot)
            .inspect_err(|e| warn!(%client_id, %date, %slot, error = %e, "booking rejected"))?;

        let client = self
            .accounts
            .get_account(client_id)
            .await?
            .ok_or(BookingServiceError::UnknownClient(client_id))?;
        self.readers
            .get_reader(reader_id)
            .await?
            .ok_or(BookingServiceError::UnknownReader(reader_id))?;

        if !client.can_afford(price) {
            warn!(%client_id, %price, balance = %client.balance(), "booking rejected, insufficient balance");
            return Err(BookingServiceError::InsufficientBalance {
                required: price,
                available: client.balance(),
            });
        }

        let new_booking = NewBooking {
            client_id,
            reader_id,
            service_id,
            scheduled_at,
            duration_minutes: self.policy.session_minutes(),
            amount: price,
            created_at: now,
        };
        let booking_id = self
            .bookings
            .insert_booking(new_booking.clone())
            .await
            .inspect_err(|e| error!(%client_id, error = %e, "failed to insert booking"))?;

        let new_balance = client.balance() - price;
        self.accounts
            .update_balance(client_id, new_balance)
            .await
            .inspect_err(|e| error!(%client_id, %booking_id, error = %e, "failed to persist booking balance"))?;
        let transaction_id = self
            .transactions
            .insert_transaction(NewTransaction::completed(
                client_id,
                TransactionKind::Booking,
                price,
                now,
            ))
            .await
            .inspect_err(|e| error!(%client_id, %booking_id, error = %e, "failed to record booking"))?;

        info!(%client_id, %reader_id, %booking_id, %scheduled_at, %price, "reading booked");
        Ok(BookingReceipt {
            booking: new_booking.into_booking(booking_id),
            new_balance,
            transaction_id,
        })
    }

    /// Upcoming and past bookings for a client, earliest first.
    ///
    /// # Errors
    ///
    /// Returns `BookingServiceError::Storage` if repository access fails.
    pub async fn client_bookings(
        &self,
        client_id: UserId,
    ) -> Result<Vec<Booking>, BookingServiceError> {
        Ok(self.bookings.list_client_bookings(client_id).await?)
    }
}
