use std::sync::Arc;

use seer_core::Money;
use seer_core::model::{Transaction, TransactionId, TransactionKind, UserId};
use storage::repository::{AccountRepository, NewTransaction, TransactionRepository};
use tracing::{error, info, warn};

use crate::Clock;
use crate::error::WalletError;
use crate::payments::PaymentGateway;

/// Smallest deposit accepted by default.
pub const DEFAULT_MIN_DEPOSIT: Money = Money::from_cents(500);

/// Quick-pick deposit amounts offered to clients.
pub const PRESET_AMOUNTS: [Money; 4] = [
    Money::from_cents(1_000),
    Money::from_cents(2_500),
    Money::from_cents(5_000),
    Money::from_cents(10_000),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositReceipt {
    pub payment_id: String,
    pub amount: Money,
    pub new_balance: Money,
    pub transaction_id: TransactionId,
}

/// Client balances: top-ups and history.
#[derive(Clone)]
pub struct WalletService {
    clock: Clock,
    accounts: Arc<dyn AccountRepository>,
    transactions: Arc<dyn TransactionRepository>,
    gateway: Arc<dyn PaymentGateway>,
    min_deposit: Money,
}

impl WalletService {
    #[must_use]
    pub fn new(
        clock: Clock,
        accounts: Arc<dyn AccountRepository>,
        transactions: Arc<dyn TransactionRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            clock,
            accounts,
            transactions,
            gateway,
            min_deposit: DEFAULT_MIN_DEPOSIT,
        }
    }

    #[must_use]
    pub fn with_min_deposit(mut self, min_deposit: Money) -> Self {
        self.min_deposit = min_deposit;
        self
    }

    #[must_use]
    pub fn min_deposit(&self) -> Money {
        self.min_deposit
    }

    /// Charge the gateway and credit the account.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::BelowMinimum` for deposits under the minimum.
    /// Returns `WalletError::UnknownAccount` if the user does not exist.
    /// Returns `WalletError::Payment` if the charge fails; nothing is written.
    /// Returns `WalletError::Storage` if repository access fails.
    pub async fn add_funds(
        &self,
        user_id: UserId,
        amount: Money,
    ) -> Result<DepositReceipt, WalletError> {
        if amount < self.min_deposit {
            warn!(%user_id, %amount, minimum = %self.min_deposit, "deposit below minimum");
            return Err(WalletError::BelowMinimum {
                minimum: self.min_deposit,
                requested: amount,
            });
        }

        let account = self
            .accounts
            .get_account(user_id)
            .await?
            .ok_or(WalletError::UnknownAccount(user_id))?;

        let payment = self
            .gateway
            .confirm_payment(amount)
            .await
            .inspect_err(|e| warn!(%user_id, %amount, error = %e, "deposit charge failed"))?;

        let new_balance = account.balance() + amount;
        self.accounts
            .update_balance(user_id, new_balance)
            .await
            .inspect_err(|e| error!(%user_id, error = %e, "failed to persist deposit balance"))?;
        let transaction_id = self
            .transactions
            .insert_transaction(NewTransaction::completed(
                user_id,
                TransactionKind::Deposit,
                amount,
                self.clock.now(),
            ))
            .await
            .inspect_err(|e| error!(%user_id, error = %e, "failed to record deposit"))?;

        info!(%user_id, %amount, %new_balance, payment_id = %payment.id, "funds added");
        Ok(DepositReceipt {
            payment_id: payment.id,
            amount,
            new_balance,
            transaction_id,
        })
    }

    /// # Errors
    ///
    /// Returns `WalletError::UnknownAccount` if the user does not exist.
    /// Returns `WalletError::Storage` if repository access fails.
    pub async fn balance(&self, user_id: UserId) -> Result<Money, WalletError> {
        let account = self
            .accounts
            .get_account(user_id)
            .await?
            .ok_or(WalletError::UnknownAccount(user_id))?;
        Ok(account.balance())
    }

    /// Most recent transactions first.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::Storage` if repository access fails.
    pub async fn transactions(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<Transaction>, WalletError> {
        Ok(self.transactions.list_transactions(user_id, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::SimulatedGateway;
    use seer_core::time::fixed_now;
    use storage::repository::Storage;
    use storage::seed::seed_demo;

    fn service(storage: &Storage) -> WalletService {
        WalletService::new(
            Clock::Fixed(fixed_now()),
            Arc::clone(&storage.accounts),
            Arc::clone(&storage.transactions),
            Arc::new(SimulatedGateway::seeded(9)),
        )
    }

    #[tokio::test]
    async fn deposit_credits_balance_and_records_transaction() {
        let storage = Storage::in_memory();
        let ids = seed_demo(&storage, Money::from_units(3)).await.unwrap();
        let wallet = service(&storage);

        let receipt = wallet.add_funds(ids.client, PRESET_AMOUNTS[1]).await.unwrap();
        assert_eq!(receipt.new_balance, Money::from_units(28));
        assert!(receipt.payment_id.starts_with("pi_"));
        assert_eq!(wallet.balance(ids.client).await.unwrap(), Money::from_units(28));

        let txs = wallet.transactions(ids.client, 10).await.unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].kind, TransactionKind::Deposit);
        assert_eq!(txs[0].amount, Money::from_units(25));
        assert_eq!(txs[0].created_at, fixed_now());
    }

    #[tokio::test]
    async fn deposit_below_minimum_is_rejected() {
        let storage = Storage::in_memory();
        let ids = seed_demo(&storage, Money::ZERO).await.unwrap();
        let wallet = service(&storage);

        let err = wallet
            .add_funds(ids.client, Money::from_cents(499))
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::BelowMinimum { minimum, .. } if minimum == DEFAULT_MIN_DEPOSIT));
        assert_eq!(wallet.balance(ids.client).await.unwrap(), Money::ZERO);
    }

    #[tokio::test]
    async fn configured_minimum_applies() {
        let storage = Storage::in_memory();
        let ids = seed_demo(&storage, Money::ZERO).await.unwrap();
        let wallet = service(&storage).with_min_deposit(Money::from_units(20));

        assert!(wallet.add_funds(ids.client, Money::from_units(10)).await.is_err());
        assert!(wallet.add_funds(ids.client, Money::from_units(20)).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_account_is_reported() {
        let storage = Storage::in_memory();
        let wallet = service(&storage);
        let err = wallet
            .add_funds(UserId::new(404), Money::from_units(10))
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::UnknownAccount(id) if id == UserId::new(404)));
    }
}
