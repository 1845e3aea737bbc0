use async_trait::async_trait;
use seer_core::Money;
use seer_core::model::{
    Account, Booking, BookingId, Order, OrderId, Product, ProductId, Reader, ReaderId,
    Transaction, TransactionId, UserId,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::repository::{
    AccountRepository, BookingRepository, NewBooking, NewOrder, NewTransaction, OrderRepository,
    ProductRepository, ReaderRepository, Storage, StorageError, TransactionRepository,
};

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<UserId, Account>,
    readers: BTreeMap<ReaderId, Reader>,
    transactions: Vec<Transaction>,
    bookings: BTreeMap<BookingId, Booking>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
}

/// Process-local stand-in for the hosted table API, for tests and demos.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

fn next_id<K: Ord + Copy>(map: &BTreeMap<K, impl Sized>, value: impl Fn(&K) -> u64) -> u64 {
    map.keys().next_back().map_or(1, |k| value(k) + 1)
}

#[async_trait]
impl AccountRepository for InMemoryRepository {
    async fn upsert_account(&self, account: &Account) -> Result<(), StorageError> {
        self.lock()?.accounts.insert(account.id(), account.clone());
        Ok(())
    }

    async fn get_account(&self, id: UserId) -> Result<Option<Account>, StorageError> {
        Ok(self.lock()?.accounts.get(&id).cloned())
    }

    async fn update_balance(&self, id: UserId, balance: Money) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let account = guard.accounts.get_mut(&id).ok_or(StorageError::NotFound)?;
        account.set_balance(balance);
        Ok(())
    }
}

#[async_trait]
impl ReaderRepository for InMemoryRepository {
    async fn upsert_reader(&self, reader: &Reader) -> Result<(), StorageError> {
        self.lock()?.readers.insert(reader.id(), reader.clone());
        Ok(())
    }

    async fn get_reader(&self, id: ReaderId) -> Result<Option<Reader>, StorageError> {
        Ok(self.lock()?.readers.get(&id).cloned())
    }

    async fn list_readers(&self, online_only: bool) -> Result<Vec<Reader>, StorageError> {
        Ok(self
            .lock()?
            .readers
            .values()
            .filter(|r| !online_only || r.is_online())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TransactionRepository for InMemoryRepository {
    async fn insert_transaction(&self, tx: NewTransaction) -> Result<TransactionId, StorageError> {
        let mut guard = self.lock()?;
        let id = TransactionId::new(guard.transactions.len() as u64 + 1);
        guard.transactions.push(tx.into_transaction(id));
        Ok(id)
    }

    async fn list_transactions(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<Transaction>, StorageError> {
        Ok(self
            .lock()?
            .transactions
            .iter()
            .rev()
            .filter(|tx| tx.user_id == user_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BookingRepository for InMemoryRepository {
    async fn insert_booking(&self, booking: NewBooking) -> Result<BookingId, StorageError> {
        let mut guard = self.lock()?;
        let id = BookingId::new(next_id(&guard.bookings, BookingId::value));
        guard.bookings.insert(id, booking.into_booking(id));
        Ok(id)
    }

    async fn get_booking(&self, id: BookingId) -> Result<Option<Booking>, StorageError> {
        Ok(self.lock()?.bookings.get(&id).cloned())
    }

    async fn list_client_bookings(&self, client_id: UserId) -> Result<Vec<Booking>, StorageError> {
        let mut bookings: Vec<Booking> = self
            .lock()?
            .bookings
            .values()
            .filter(|b| b.client_id == client_id)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.scheduled_at);
        Ok(bookings)
    }
}

#[async_trait]
impl ProductRepository for InMemoryRepository {
    async fn upsert_product(&self, product: &Product) -> Result<(), StorageError> {
        self.lock()?.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StorageError> {
        Ok(self.lock()?.products.get(&id).cloned())
    }

    async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, StorageError> {
        Ok(self
            .lock()?
            .products
            .values()
            .filter(|p| category.is_none_or(|c| p.category.eq_ignore_ascii_case(c)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrderRepository for InMemoryRepository {
    async fn insert_order(&self, order: NewOrder) -> Result<OrderId, StorageError> {
        let mut guard = self.lock()?;
        let id = OrderId::new(next_id(&guard.orders, OrderId::value));
        guard.orders.insert(id, order.into_order(id));
        Ok(id)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StorageError> {
        Ok(self.lock()?.orders.get(&id).cloned())
    }
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repo(InMemoryRepository::new())
    }

    /// Wire every repository to the same in-memory tables.
    #[must_use]
    pub fn from_repo(repo: InMemoryRepository) -> Self {
        Self {
            accounts: Arc::new(repo.clone()),
            readers: Arc::new(repo.clone()),
            transactions: Arc::new(repo.clone()),
            bookings: Arc::new(repo.clone()),
            products: Arc::new(repo.clone()),
            orders: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seer_core::model::{Role, TransactionKind};
    use seer_core::time::fixed_now;

    fn account(id: u64, cents: i64) -> Account {
        Account::new(
            UserId::new(id),
            format!("User {id}"),
            format!("user{id}@example.com"),
            Role::Client,
            Money::from_cents(cents),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn update_balance_requires_account() {
        let repo = InMemoryRepository::new();
        let err = repo
            .update_balance(UserId::new(1), Money::from_units(5))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));

        repo.upsert_account(&account(1, 0)).await.unwrap();
        repo.update_balance(UserId::new(1), Money::from_units(5))
            .await
            .unwrap();
        let stored = repo.get_account(UserId::new(1)).await.unwrap().unwrap();
        assert_eq!(stored.balance(), Money::from_units(5));
    }

    #[tokio::test]
    async fn transactions_list_newest_first_per_user() {
        let repo = InMemoryRepository::new();
        for (user, units) in [(1, 10), (2, 20), (1, 30)] {
            repo.insert_transaction(NewTransaction::completed(
                UserId::new(user),
                TransactionKind::Deposit,
                Money::from_units(units),
                fixed_now(),
            ))
            .await
            .unwrap();
        }

        let txs = repo.list_transactions(UserId::new(1), 10).await.unwrap();
        let amounts: Vec<_> = txs.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, [Money::from_units(30), Money::from_units(10)]);
        assert_eq!(txs[0].id, TransactionId::new(3));

        let limited = repo.list_transactions(UserId::new(1), 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn shared_tables_across_storage_handles() {
        let repo = InMemoryRepository::new();
        let storage = Storage::from_repo(repo.clone());
        storage.accounts.upsert_account(&account(7, 100)).await.unwrap();
        assert!(repo.get_account(UserId::new(7)).await.unwrap().is_some());
    }
}
