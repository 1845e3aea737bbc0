use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{TransactionId, UserId};
use crate::money::Money;

/// What a balance movement was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Gift,
    Booking,
    Purchase,
    Reading,
}

impl TransactionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Gift => "gift",
            TransactionKind::Booking => "booking",
            TransactionKind::Purchase => "purchase",
            TransactionKind::Reading => "reading",
        }
    }

    /// Deposits add to the balance; everything else spends it.
    #[must_use]
    pub fn is_credit(self) -> bool {
        matches!(self, TransactionKind::Deposit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// A recorded balance movement. `amount` is always the unsigned magnitude.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: Money,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Effect on the user's balance: positive for credits.
    #[must_use]
    pub fn signed_amount(&self) -> Money {
        if self.kind.is_credit() {
            self.amount
        } else {
            -self.amount
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn only_deposits_credit() {
        let mut tx = Transaction {
            id: TransactionId::new(1),
            user_id: UserId::new(1),
            kind: TransactionKind::Deposit,
            amount: Money::from_units(25),
            status: TransactionStatus::Completed,
            created_at: fixed_now(),
        };
        assert_eq!(tx.signed_amount(), Money::from_units(25));

        tx.kind = TransactionKind::Gift;
        assert_eq!(tx.signed_amount(), Money::from_units(-25));
    }
}
