use async_trait::async_trait;
use chrono::{DateTime, Utc};
use seer_core::Money;
use seer_core::model::{
    Account, Booking, BookingId, BookingStatus, CartItem, Order, OrderId, OrderStatus, Product,
    ProductId, Reader, ReaderId, ServiceId, Transaction, TransactionId, TransactionKind,
    TransactionStatus, UserId,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── INSERT RECORDS ────────────────────────────────────────────────────────────
//

/// Insert shape for a transaction; the adapter assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: Money,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl NewTransaction {
    #[must_use]
    pub fn completed(
        user_id: UserId,
        kind: TransactionKind,
        amount: Money,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            kind,
            amount,
            status: TransactionStatus::Completed,
            created_at,
        }
    }

    #[must_use]
    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            user_id: self.user_id,
            kind: self.kind,
            amount: self.amount,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub client_id: UserId,
    pub reader_id: ReaderId,
    pub service_id: ServiceId,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

impl NewBooking {
    #[must_use]
    pub fn into_booking(self, id: BookingId) -> Booking {
        Booking {
            id,
            client_id: self.client_id,
            reader_id: self.reader_id,
            service_id: self.service_id,
            status: BookingStatus::Scheduled,
            scheduled_at: self.scheduled_at,
            duration_minutes: self.duration_minutes,
            amount: self.amount,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub subtotal: Money,
    pub shipping: Money,
    pub shipping_address: String,
    pub checkout_session: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    #[must_use]
    pub fn into_order(self, id: OrderId) -> Order {
        let item_count = self.items.iter().map(|i| i.quantity).sum();
        Order {
            id,
            user_id: self.user_id,
            items: self.items,
            subtotal: self.subtotal,
            shipping: self.shipping,
            total: self.subtotal + self.shipping,
            item_count,
            shipping_address: self.shipping_address,
            status: OrderStatus::Paid,
            checkout_session: self.checkout_session,
            created_at: self.created_at,
        }
    }
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// User accounts and their stored balance.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the account cannot be stored.
    async fn upsert_account(&self, account: &Account) -> Result<(), StorageError>;

    /// Fetch an account by ID. Missing accounts are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_account(&self, id: UserId) -> Result<Option<Account>, StorageError>;

    /// Overwrite the stored balance.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the account does not exist.
    async fn update_balance(&self, id: UserId, balance: Money) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ReaderRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the reader cannot be stored.
    async fn upsert_reader(&self, reader: &Reader) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_reader(&self, id: ReaderId) -> Result<Option<Reader>, StorageError>;

    /// Readers ordered by ID, optionally only those online.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_readers(&self, online_only: bool) -> Result<Vec<Reader>, StorageError>;
}

/// Append-only record of balance movements.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    async fn insert_transaction(&self, tx: NewTransaction) -> Result<TransactionId, StorageError>;

    /// Most recent first, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_transactions(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<Transaction>, StorageError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the booking cannot be written.
    async fn insert_booking(&self, booking: NewBooking) -> Result<BookingId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_booking(&self, id: BookingId) -> Result<Option<Booking>, StorageError>;

    /// Bookings for a client ordered by scheduled time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_client_bookings(&self, client_id: UserId) -> Result<Vec<Booking>, StorageError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the product cannot be stored.
    async fn upsert_product(&self, product: &Product) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, StorageError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the order cannot be written.
    async fn insert_order(&self, order: NewOrder) -> Result<OrderId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StorageError>;
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub accounts: Arc<dyn AccountRepository>,
    pub readers: Arc<dyn ReaderRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub orders: Arc<dyn OrderRepository>,
}
