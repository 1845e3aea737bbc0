use std::sync::Arc;

use seer_core::Money;
use seer_core::model::{Gift, GiftCatalog, GiftId, ReaderId, TransactionId, TransactionKind, UserId};
use storage::repository::{
    AccountRepository, NewTransaction, ReaderRepository, TransactionRepository,
};
use tracing::{error, info, warn};

use crate::Clock;
use crate::error::GiftError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftReceipt {
    pub gift: Gift,
    pub new_balance: Money,
    pub transaction_id: TransactionId,
    /// Line for the stream chat, e.g. "Sky sent a Rose 🌹 to Mae!".
    pub announcement: String,
}

/// Live-stream tipping.
#[derive(Clone)]
pub struct GiftService {
    clock: Clock,
    catalog: Arc<GiftCatalog>,
    accounts: Arc<dyn AccountRepository>,
    readers: Arc<dyn ReaderRepository>,
    transactions: Arc<dyn TransactionRepository>,
}

impl GiftService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: GiftCatalog,
        accounts: Arc<dyn AccountRepository>,
        readers: Arc<dyn ReaderRepository>,
        transactions: Arc<dyn TransactionRepository>,
    ) -> Self {
        Self {
            clock,
            catalog: Arc::new(catalog),
            accounts,
            readers,
            transactions,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &GiftCatalog {
        &self.catalog
    }

    /// Pay for a gift from the client's balance.
    ///
    /// # Errors
    ///
    /// Returns `GiftError::UnknownGift` / `UnknownClient` / `UnknownReader` for missing records.
    /// Returns `GiftError::InsufficientBalance` if the balance is below the gift value;
    /// nothing is written in that case.
    /// Returns `GiftError::Storage` if repository access fails.
    pub async fn send_gift(
        &self,
        client_id: UserId,
        reader_id: ReaderId,
        gift_id: GiftId,
    ) -> Result<GiftReceipt, GiftError> {
        let gift = self
            .catalog
            .find(gift_id)
            .cloned()
            .ok_or(GiftError::UnknownGift(gift_id))?;
        let client = self
            .accounts
            .get_account(client_id)
            .await?
            .ok_or(GiftError::UnknownClient(client_id))?;
        let reader = self
            .readers
            .get_reader(reader_id)
            .await?
            .ok_or(GiftError::UnknownReader(reader_id))?;

        if !client.can_afford(gift.value) {
            warn!(%client_id, gift = %gift.name, balance = %client.balance(), "gift rejected, insufficient balance");
            return Err(GiftError::InsufficientBalance {
                required: gift.value,
                available: client.balance(),
            });
        }

        let new_balance = client.balance() - gift.value;
        self.accounts
            .update_balance(client_id, new_balance)
            .await
            .inspect_err(|e| error!(%client_id, error = %e, "failed to persist gift balance"))?;
        let transaction_id = self
            .transactions
            .insert_transaction(NewTransaction::completed(
                client_id,
                TransactionKind::Gift,
                gift.value,
                self.clock.now(),
            ))
            .await
            .inspect_err(|e| error!(%client_id, error = %e, "failed to record gift"))?;

        let announcement = format!(
            "{} sent a {} {} to {}!",
            client.name(),
            gift.name,
            gift.icon,
            reader.name()
        );
        info!(%client_id, %reader_id, gift = %gift.name, value = %gift.value, %new_balance, "gift sent");
        Ok(GiftReceipt {
            gift,
            new_balance,
            transaction_id,
            announcement,
        })
    }
}
