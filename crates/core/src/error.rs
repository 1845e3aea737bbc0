use thiserror::Error;

use crate::billing::BillingConfigError;
use crate::model::{AccountError, BookingError, CartError};
use crate::money::MoneyError;

/// Any validation failure raised by the domain layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Money(#[from] MoneyError),
    #[error(transparent)]
    Billing(#[from] BillingConfigError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error(transparent)]
    Cart(#[from] CartError),
}
