use std::sync::Arc;

use seer_core::Money;
use seer_core::model::{
    Cart, FLAT_SHIPPING, Order, Product, ProductId, TransactionKind, UserId,
};
use storage::repository::{
    AccountRepository, NewOrder, NewTransaction, OrderRepository, ProductRepository,
    TransactionRepository,
};
use tracing::{error, info, warn};

use crate::Clock;
use crate::error::ShopError;
use crate::payments::PaymentGateway;

/// Product catalog and card checkout.
///
/// Purchases are paid by card through the gateway; the account balance is
/// not touched.
#[derive(Clone)]
pub struct ShopService {
    clock: Clock,
    accounts: Arc<dyn AccountRepository>,
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
    transactions: Arc<dyn TransactionRepository>,
    gateway: Arc<dyn PaymentGateway>,
    shipping_fee: Money,
}

impl ShopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        accounts: Arc<dyn AccountRepository>,
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        transactions: Arc<dyn TransactionRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            clock,
            accounts,
            products,
            orders,
            transactions,
            gateway,
            shipping_fee: FLAT_SHIPPING,
        }
    }

    #[must_use]
    pub fn with_shipping_fee(mut self, fee: Money) -> Self {
        self.shipping_fee = fee;
        self
    }

    /// Empty cart priced with this shop's shipping fee.
    #[must_use]
    pub fn new_cart(&self) -> Cart {
        Cart::new().with_shipping_fee(self.shipping_fee)
    }

    /// # Errors
    ///
    /// Returns `ShopError::Storage` if repository access fails.
    pub async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, ShopError> {
        Ok(self.products.list_products(category).await?)
    }

    /// Look up a product and add it to `cart`.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::UnknownProduct` if the product does not exist.
    /// Returns `ShopError::Cart` for an invalid quantity.
    /// Returns `ShopError::Storage` if repository access fails.
    pub async fn add_to_cart(
        &self,
        cart: &mut Cart,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), ShopError> {
        let product = self
            .products
            .get_product(product_id)
            .await?
            .ok_or(ShopError::UnknownProduct(product_id))?;
        cart.add(&product, quantity)?;
        Ok(())
    }

    /// Pay for the cart and place an order.
    ///
    /// The cart is left untouched; clear it after a successful checkout.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::EmptyCart` or `ShopError::MissingShippingAddress`
    /// before anything is charged.
    /// Returns `ShopError::UnknownAccount` if the user does not exist.
    /// Returns `ShopError::Payment` if the gateway rejects the session.
    /// Returns `ShopError::Storage` if repository access fails.
    pub async fn checkout(
        &self,
        user_id: UserId,
        cart: &Cart,
        shipping_address: &str,
    ) -> Result<Order, ShopError> {
        if cart.is_empty() {
            return Err(ShopError::EmptyCart);
        }
        let shipping_address = shipping_address.trim();
        if shipping_address.is_empty() {
            return Err(ShopError::MissingShippingAddress);
        }

        self.accounts
            .get_account(user_id)
            .await?
            .ok_or(ShopError::UnknownAccount(user_id))?;

        let session = self
            .gateway
            .create_checkout_session(cart.items(), user_id)
            .await
            .inspect_err(|e| warn!(%user_id, error = %e, "checkout session failed"))?;

        let now = self.clock.now();
        let new_order = NewOrder {
            user_id,
            items: cart.items().to_vec(),
            subtotal: cart.subtotal(),
            shipping: cart.shipping(),
            shipping_address: shipping_address.to_owned(),
            checkout_session: Some(session.id),
            created_at: now,
        };
        let order_id = self
            .orders
            .insert_order(new_order.clone())
            .await
            .inspect_err(|e| error!(%user_id, error = %e, "failed to insert order"))?;
        let order = new_order.into_order(order_id);

        self.transactions
            .insert_transaction(NewTransaction::completed(
                user_id,
                TransactionKind::Purchase,
                order.total,
                now,
            ))
            .await
            .inspect_err(|e| error!(%user_id, %order_id, error = %e, "failed to record purchase"))?;

        info!(
            %user_id,
            %order_id,
            items = order.item_count,
            total = %order.total,
            "order placed"
        );
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::SimulatedGateway;
    use seer_core::model::{CartError, OrderStatus};
    use seer_core::time::fixed_now;
    use storage::repository::Storage;
    use storage::seed::seed_demo;

    fn service(storage: &Storage) -> ShopService {
        ShopService::new(
            Clock::Fixed(fixed_now()),
            Arc::clone(&storage.accounts),
            Arc::clone(&storage.products),
            Arc::clone(&storage.orders),
            Arc::clone(&storage.transactions),
            Arc::new(SimulatedGateway::seeded(2)),
        )
    }

    #[tokio::test]
    async fn checkout_places_paid_order() {
        let storage = Storage::in_memory();
        let ids = seed_demo(&storage, Money::from_units(10)).await.unwrap();
        let shop = service(&storage);

        let mut cart = shop.new_cart();
        shop.add_to_cart(&mut cart, ProductId::new(3), 2).await.unwrap();
        shop.add_to_cart(&mut cart, ProductId::new(1), 1).await.unwrap();

        let order = shop.checkout(ids.client, &cart, "  1 Moon Way ").await.unwrap();
        assert_eq!(order.subtotal, Money::from_cents(4_297));
        assert_eq!(order.shipping, FLAT_SHIPPING);
        assert_eq!(order.total, Money::from_cents(4_896));
        assert_eq!(order.item_count, 3);
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.shipping_address, "1 Moon Way");
        assert!(order.checkout_session.as_deref().is_some_and(|s| s.starts_with("cs_")));

        assert_eq!(storage.orders.get_order(order.id).await.unwrap(), Some(order.clone()));
        let txs = storage.transactions.list_transactions(ids.client, 5).await.unwrap();
        assert_eq!(txs[0].kind, TransactionKind::Purchase);
        assert_eq!(txs[0].amount, order.total);

        // card purchase, balance unchanged
        let account = storage.accounts.get_account(ids.client).await.unwrap().unwrap();
        assert_eq!(account.balance(), Money::from_units(10));
    }

    #[tokio::test]
    async fn checkout_validates_before_charging() {
        let storage = Storage::in_memory();
        let ids = seed_demo(&storage, Money::ZERO).await.unwrap();
        let shop = service(&storage);

        let mut cart = shop.new_cart();
        let err = shop.checkout(ids.client, &cart, "1 Moon Way").await.unwrap_err();
        assert!(matches!(err, ShopError::EmptyCart));

        shop.add_to_cart(&mut cart, ProductId::new(2), 1).await.unwrap();
        let err = shop.checkout(ids.client, &cart, "   ").await.unwrap_err();
        assert!(matches!(err, ShopError::MissingShippingAddress));

        assert!(storage.transactions.list_transactions(ids.client, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cart_errors_surface() {
        let storage = Storage::in_memory();
        seed_demo(&storage, Money::ZERO).await.unwrap();
        let shop = service(&storage).with_shipping_fee(Money::ZERO);
        let mut cart = shop.new_cart();

        let err = shop
            .add_to_cart(&mut cart, ProductId::new(9), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::UnknownProduct(_)));

        let err = shop
            .add_to_cart(&mut cart, ProductId::new(1), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Cart(CartError::InvalidQuantity)));

        shop.add_to_cart(&mut cart, ProductId::new(1), 1).await.unwrap();
        assert_eq!(cart.total(), Money::from_cents(2_499));
    }

    #[tokio::test]
    async fn category_filter_is_case_insensitive() {
        let storage = Storage::in_memory();
        seed_demo(&storage, Money::ZERO).await.unwrap();
        let products = service(&storage).list_products(Some("Tarot")).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, ProductId::new(2));
    }
}
