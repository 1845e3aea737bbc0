//! Shared error types for the services crate.

use thiserror::Error;

use seer_core::Money;
use seer_core::billing::BillingConfigError;
use seer_core::model::{BookingError, CartError, GiftId, ProductId, ReaderId, UserId};
use storage::repository::StorageError;

/// Errors emitted by the payment gateway seam.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PaymentError {
    #[error("payment amount must be positive, got {0}")]
    InvalidAmount(Money),
    #[error("payment declined: {0}")]
    Declined(String),
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted by the billing tick driver.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TickerError {
    #[error("billing task was cancelled")]
    Cancelled,
    #[error("billing observer panicked")]
    Panicked,
}

impl From<tokio::task::JoinError> for TickerError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            TickerError::Panicked
        } else {
            TickerError::Cancelled
        }
    }
}

/// Errors emitted by `ReadingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadingError {
    #[error("unknown client {0}")]
    UnknownClient(UserId),
    #[error("unknown reader {0}")]
    UnknownReader(ReaderId),
    #[error("insufficient balance: {required} required, {available} available")]
    InsufficientBalance { required: Money, available: Money },
    #[error(transparent)]
    Billing(#[from] BillingConfigError),
    #[error(transparent)]
    Ticker(#[from] TickerError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ReaderService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReaderServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `WalletService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WalletError {
    #[error("minimum deposit is {minimum}, got {requested}")]
    BelowMinimum { minimum: Money, requested: Money },
    #[error("unknown account {0}")]
    UnknownAccount(UserId),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `GiftService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GiftError {
    #[error("unknown gift {0}")]
    UnknownGift(GiftId),
    #[error("unknown client {0}")]
    UnknownClient(UserId),
    #[error("unknown reader {0}")]
    UnknownReader(ReaderId),
    #[error("insufficient balance: {required} required, {available} available")]
    InsufficientBalance { required: Money, available: Money },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `BookingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BookingServiceError {
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error("unknown client {0}")]
    UnknownClient(UserId),
    #[error("unknown reader {0}")]
    UnknownReader(ReaderId),
    #[error("insufficient balance: {required} required, {available} available")]
    InsufficientBalance { required: Money, available: Money },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ShopService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ShopError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("shipping address is required")]
    MissingShippingAddress,
    #[error("unknown account {0}")]
    UnknownAccount(UserId),
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
