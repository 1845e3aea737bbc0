use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seer_core::Money;
use seer_core::model::{CartItem, UserId};
use tracing::debug;

use crate::error::PaymentError;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub id: String,
    pub amount: Money,
}

/// Card processor seam.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidAmount` for non-positive amounts.
    async fn create_payment_intent(
        &self,
        amount: Money,
        user_id: UserId,
    ) -> Result<PaymentIntent, PaymentError>;

    /// # Errors
    ///
    /// Returns `PaymentError::InvalidAmount` when the items total nothing.
    async fn create_checkout_session(
        &self,
        items: &[CartItem],
        user_id: UserId,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Charge `amount` and report the settled payment.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` if the charge is rejected.
    async fn confirm_payment(&self, amount: Money) -> Result<PaymentConfirmation, PaymentError>;
}

/// Gateway that approves every valid request and makes up processor ids.
pub struct SimulatedGateway {
    rng: Mutex<StdRng>,
    latency: Option<Duration>,
}

impl SimulatedGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Deterministic ids for tests.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            latency: None,
        }
    }

    /// Delay each confirmation, like a real processor round trip.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn random_id(&self, prefix: &str) -> Result<String, PaymentError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| PaymentError::Unavailable(e.to_string()))?;
        let suffix: String = (0..ID_LEN)
            .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
            .collect();
        Ok(format!("{prefix}_{suffix}"))
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_positive(amount: Money) -> Result<(), PaymentError> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(PaymentError::InvalidAmount(amount))
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn create_payment_intent(
        &self,
        amount: Money,
        user_id: UserId,
    ) -> Result<PaymentIntent, PaymentError> {
        ensure_positive(amount)?;
        let id = self.random_id("pi")?;
        let secret = self.random_id("secret")?;
        debug!(%user_id, %amount, %id, "created payment intent");
        Ok(PaymentIntent {
            client_secret: format!("{id}_{secret}"),
            id,
            amount,
        })
    }

    async fn create_checkout_session(
        &self,
        items: &[CartItem],
        user_id: UserId,
    ) -> Result<CheckoutSession, PaymentError> {
        let amount: Money = items.iter().map(CartItem::line_total).sum();
        ensure_positive(amount)?;
        let id = self.random_id("cs")?;
        debug!(%user_id, %amount, items = items.len(), %id, "created checkout session");
        Ok(CheckoutSession { id, amount })
    }

    async fn confirm_payment(&self, amount: Money) -> Result<PaymentConfirmation, PaymentError> {
        ensure_positive(amount)?;
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let id = self.random_id("pi")?;
        Ok(PaymentConfirmation { id, amount })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seer_core::model::ProductId;

    fn is_processor_id(id: &str, prefix: &str) -> bool {
        let Some(rest) = id.strip_prefix(prefix).and_then(|r| r.strip_prefix('_')) else {
            return false;
        };
        rest.len() == ID_LEN && rest.bytes().all(|b| ID_ALPHABET.contains(&b))
    }

    #[tokio::test]
    async fn intent_ids_look_like_processor_ids() {
        let gateway = SimulatedGateway::seeded(7);
        let intent = gateway
            .create_payment_intent(Money::from_units(25), UserId::new(1))
            .await
            .unwrap();
        assert!(is_processor_id(&intent.id, "pi"));
        assert!(intent.client_secret.starts_with(&intent.id));
        assert!(intent.client_secret.contains("_secret_"));
        assert_eq!(intent.amount, Money::from_units(25));
    }

    #[tokio::test]
    async fn rejects_non_positive_amounts() {
        let gateway = SimulatedGateway::seeded(1);
        let err = gateway.confirm_payment(Money::ZERO).await.unwrap_err();
        assert!(matches!(err, PaymentError::InvalidAmount(m) if m == Money::ZERO));

        let err = gateway
            .create_checkout_session(&[], UserId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidAmount(_)));
    }

    #[tokio::test]
    async fn checkout_session_totals_items() {
        let gateway = SimulatedGateway::seeded(3);
        let items = [CartItem {
            product_id: ProductId::new(1),
            name: "Sage".into(),
            unit_price: Money::from_cents(899),
            quantity: 2,
        }];
        let session = gateway
            .create_checkout_session(&items, UserId::new(4))
            .await
            .unwrap();
        assert!(is_processor_id(&session.id, "cs"));
        assert_eq!(session.amount, Money::from_cents(1798));
    }

    #[tokio::test]
    async fn same_seed_same_ids() {
        let a = SimulatedGateway::seeded(42);
        let b = SimulatedGateway::seeded(42);
        let amount = Money::from_units(10);
        assert_eq!(
            a.confirm_payment(amount).await.unwrap(),
            b.confirm_payment(amount).await.unwrap()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_confirmation() {
        let gateway = SimulatedGateway::seeded(5).with_latency(Duration::from_secs(1));
        let started = tokio::time::Instant::now();
        gateway.confirm_payment(Money::from_units(5)).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(1));
    }
}
