use std::sync::Arc;
use std::time::Duration;

use seer_core::Money;
use seer_core::billing::DEFAULT_LOW_BALANCE_MINUTES;
use seer_core::model::{BookingPolicy, FLAT_SHIPPING, GiftCatalog};
use storage::repository::Storage;

use crate::Clock;
use crate::billing::DEFAULT_TICK;
use crate::booking_service::BookingService;
use crate::gift_service::GiftService;
use crate::payments::PaymentGateway;
use crate::reader_service::ReaderService;
use crate::reading_service::ReadingService;
use crate::shop_service::ShopService;
use crate::wallet_service::{DEFAULT_MIN_DEPOSIT, WalletService};

/// Tunables shared by the assembled services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicesConfig {
    pub tick: Duration,
    pub low_balance_minutes: u32,
    pub min_deposit: Money,
    pub shipping_fee: Money,
    pub booking: BookingPolicy,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            low_balance_minutes: DEFAULT_LOW_BALANCE_MINUTES,
            min_deposit: DEFAULT_MIN_DEPOSIT,
            shipping_fee: FLAT_SHIPPING,
            booking: BookingPolicy::default(),
        }
    }
}

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    readers: Arc<ReaderService>,
    readings: Arc<ReadingService>,
    wallet: Arc<WalletService>,
    gifts: Arc<GiftService>,
    bookings: Arc<BookingService>,
    shop: Arc<ShopService>,
}

impl AppServices {
    #[must_use]
    pub fn new(
        storage: &Storage,
        clock: Clock,
        gateway: Arc<dyn PaymentGateway>,
        config: ServicesConfig,
    ) -> Self {
        let readers = ReaderService::new(Arc::clone(&storage.readers));
        let readings = ReadingService::new(
            clock,
            Arc::clone(&storage.accounts),
            Arc::clone(&storage.readers),
            Arc::clone(&storage.transactions),
        )
        .with_tick(config.tick)
        .with_low_balance_minutes(config.low_balance_minutes);
        let wallet = WalletService::new(
            clock,
            Arc::clone(&storage.accounts),
            Arc::clone(&storage.transactions),
            Arc::clone(&gateway),
        )
        .with_min_deposit(config.min_deposit);
        let gifts = GiftService::new(
            clock,
            GiftCatalog::default(),
            Arc::clone(&storage.accounts),
            Arc::clone(&storage.readers),
            Arc::clone(&storage.transactions),
        );
        let bookings = BookingService::new(
            clock,
            config.booking,
            Arc::clone(&storage.accounts),
            Arc::clone(&storage.readers),
            Arc::clone(&storage.bookings),
            Arc::clone(&storage.transactions),
        );
        let shop = ShopService::new(
            clock,
            Arc::clone(&storage.accounts),
            Arc::clone(&storage.products),
            Arc::clone(&storage.orders),
            Arc::clone(&storage.transactions),
            gateway,
        )
        .with_shipping_fee(config.shipping_fee);

        Self {
            readers: Arc::new(readers),
            readings: Arc::new(readings),
            wallet: Arc::new(wallet),
            gifts: Arc::new(gifts),
            bookings: Arc::new(bookings),
            shop: Arc::new(shop),
        }
    }

    #[must_use]
    pub fn readers(&self) -> Arc<ReaderService> {
        Arc::clone(&self.readers)
    }

    #[must_use]
    pub fn readings(&self) -> Arc<ReadingService> {
        Arc::clone(&self.readings)
    }

    #[must_use]
    pub fn wallet(&self) -> Arc<WalletService> {
        Arc::clone(&self.wallet)
    }

    #[must_use]
    pub fn gifts(&self) -> Arc<GiftService> {
        Arc::clone(&self.gifts)
    }

    #[must_use]
    pub fn bookings(&self) -> Arc<BookingService> {
        Arc::clone(&self.bookings)
    }

    #[must_use]
    pub fn shop(&self) -> Arc<ShopService> {
        Arc::clone(&self.shop)
    }
}
