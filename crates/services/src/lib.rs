#![forbid(unsafe_code)]

pub mod app_services;
pub mod billing;
pub mod booking_service;
pub mod chatter;
pub mod error;
pub mod gift_service;
pub mod payments;
pub mod reader_service;
pub mod reading_service;
pub mod shop_service;
pub mod wallet_service;

pub use seer_core::Clock;

pub use app_services::{AppServices, ServicesConfig};
pub use billing::{BillingObserver, ChannelObserver, DEFAULT_TICK, NoopObserver, SessionTicker};
pub use booking_service::{BookingReceipt, BookingService, ScheduleRequest};
pub use chatter::{ChatMessage, ContentGenerator, RandomChatter};
pub use error::{
    BookingServiceError, GiftError, PaymentError, ReaderServiceError, ReadingError, ShopError,
    TickerError, WalletError,
};
pub use gift_service::{GiftReceipt, GiftService};
pub use payments::{PaymentGateway, SimulatedGateway};
pub use reader_service::ReaderService;
pub use reading_service::{ReadingReceipt, ReadingService, ReadingSession};
pub use shop_service::ShopService;
pub use wallet_service::{DepositReceipt, PRESET_AMOUNTS, WalletService};
